use tickerlens_application::config::Config;
use tickerlens_domain::repositories::macro_data::MacroRepository;
use tickerlens_domain::repositories::market_data::MarketDataRepository;
use tickerlens_domain::repositories::reports::ReportWriter;
use tickerlens_infrastructure::macro_data::JsonMacroRepository;
use tickerlens_infrastructure::market_data::CsvMarketDataRepository;
use tickerlens_infrastructure::reporting::FilesystemReportWriter;

pub struct Adapters {
    pub market_data: Box<dyn MarketDataRepository>,
    pub macro_data: Option<Box<dyn MacroRepository>>,
    pub reports: Box<dyn ReportWriter>,
}

pub fn build_adapters(config: &Config) -> Adapters {
    let macro_data = config
        .paths
        .macro_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|path| Box::new(JsonMacroRepository::new(path)) as Box<dyn MacroRepository>);

    Adapters {
        market_data: Box::new(CsvMarketDataRepository::new(&config.paths.data_dir)),
        macro_data,
        reports: Box::new(FilesystemReportWriter::new()),
    }
}
