use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No transactions found")]
    EmptyInput,

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("No file given and no previously opened file to fall back on")]
    NoFile,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SpendError>;
