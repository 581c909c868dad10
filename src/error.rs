use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Statement is missing required column: {0}")]
    MissingColumn(String),

    #[error("Row {row}: could not parse {field} from {value:?}")]
    RowParse {
        row: usize,
        field: String,
        value: String,
    },

    #[error("Transaction already exists for this account, date, description and amount")]
    DuplicateConflict,

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown statement format: {0}")]
    UnknownFormat(String),

    #[error("Could not detect a statement format for this file")]
    NoFormatDetected,

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;
