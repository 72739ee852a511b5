use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Coin Symbol/Name is required")]
    MissingCoinSymbol,

    #[error("A custom field with key '{0}' already exists")]
    DuplicateFieldKey(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("No entry with id {0}")]
    EntryNotFound(Uuid),

    #[error("CoinlogError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for JournalError {
    fn from(error: std::io::Error) -> Self {
        JournalError::Io(Box::new(error))
    }
}
