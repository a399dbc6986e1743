use taxquant::TaxQuantError;
use taxquant::errors::ServiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    TaxQuant(#[from] TaxQuantError),

    #[error("Remote service setup error: {0}")]
    Service(#[from] ServiceError),

    #[error("Logging setup error: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Configuration error: {0}")]
    Config(String),
}
