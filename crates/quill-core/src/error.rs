//! Error types for Quill domain logic.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in domain-level parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// A pagination cursor string could not be parsed.
    #[error("invalid pagination cursor: {0:?}")]
    InvalidCursor(String),
}
