use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpendError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Unsupported file format (CSV/Excel only): {0}")]
    UnsupportedFormat(String),

    #[error("Unreadable table: {0}")]
    UnreadableTable(String),

    #[error("No transactions detected in {0}")]
    NoTransactions(String),

    #[error("Category already exists: {0}")]
    DuplicateRule(String),

    #[error("Invalid category rule: {0}")]
    InvalidRule(String),

    #[error("Transaction not found: {0}")]
    UnknownTransaction(i64),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SpendError>;

/// Failure to turn a single cell into a typed value. Never fatal: the row
/// holding the cell is skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty amount")]
    EmptyAmount,

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("unable to parse date: {0:?}")]
    InvalidDate(String),
}
