pub mod analysis;
pub mod config;
pub mod market;
pub mod meta;
pub mod scanning;
mod shared;
pub mod validation;

pub use shared::{normalize_symbol, resolve_mode};
