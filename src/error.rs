use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnippetError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Categorization error: {0}")]
    Categorize(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Backup integrity error: expected checksum {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Bridge input error: {0}")]
    Bridge(String),

    #[error("Invalid sheet URL: {0}")]
    SheetUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, SnippetError>;
