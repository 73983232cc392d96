use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A row exists but its contents can't be interpreted.
    #[error("Malformed row: {0}")]
    MalformedRow(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
