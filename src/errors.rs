use thiserror::Error;

/// Unified error type for every store and engine in the crate.
///
/// Validation failures are raised before any statement touches storage;
/// `Storage` and `Schema` carry enough context to be logged verbatim.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Username '{0}' already exists")]
    AlreadyExists(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Schema migration error: {0}")]
    Schema(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl Error {
    /// True for errors caused by bad user input rather than a faulty store.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
