//! Error types for the ledger subsystem.

use thiserror::Error;

/// Errors emitted while constructing or querying a [`crate::Ledger`].
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The underlying SQLite connection could not be opened or queried.
    #[error("sqlite error: {source}")]
    Sqlite {
        /// Source [`rusqlite::Error`].
        #[from]
        source: rusqlite::Error,
    },
    /// A row's persisted payload or result could not be deserialized.
    #[error("serialization error: {source}")]
    Serialization {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },
}

/// Result type alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
