pub mod bar;
pub mod period;
pub mod position;
pub mod trading_mode;
