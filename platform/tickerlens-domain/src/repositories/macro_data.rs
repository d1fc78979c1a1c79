use crate::repositories::market_data::FetchError;
use crate::services::macro_score::MacroOverview;

pub trait MacroRepository {
    fn load_overview(&self) -> Result<MacroOverview, FetchError>;
}
