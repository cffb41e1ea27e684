//! Shared error definitions for agent primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the kernel crate family.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating kernel primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided agent or task identifier could not be parsed.
    #[error("invalid identifier: {source}")]
    InvalidId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// Manifest construction failed validation.
    #[error("invalid manifest: {reason}")]
    InvalidManifest {
        /// Human-readable reason for rejection.
        reason: String,
    },
}
