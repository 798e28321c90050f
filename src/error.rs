use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForwarderError {
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Decode error: {0}")]
    DecodeError(#[from] serde_json::Error),
    #[error("Key error: {0}")]
    KeyError(String),
    #[error("Ledger error: {0}")]
    LedgerError(String),
}

pub type Result<T> = std::result::Result<T, ForwarderError>;
