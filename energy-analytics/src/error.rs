use meter_data::TableError;

#[derive(thiserror::Error, Debug)]
pub enum AnalyticsError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] TableError),
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("sink error: {0}")]
    Sink(String),
}
