pub mod indicators;
pub mod intraday;
pub mod levels;
pub mod macro_score;
pub mod ohlcv;
pub mod profile;
pub mod signals;
pub mod state;
