pub mod cache;
pub mod macro_data;
pub mod market_data;
pub mod reports;
