//! Typed error enum for dictionary loading and parsing.

/// Errors produced while loading or parsing a mutations dictionary.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DictionaryError {
    /// File I/O failure reading a dictionary document.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("failed to parse mutations dictionary: {0}")]
    Json(#[from] serde_json::Error),

    /// A keyed-table entry uses a key that is neither a bare resource name
    /// nor a well-formed `<endpoint>/<method>/<propertyNameOrPath>` key.
    #[error("invalid dictionary key '{key}': {reason}")]
    InvalidKey {
        /// The offending key, verbatim from the document.
        key: String,
        /// Why it does not parse.
        reason: String,
    },
}

/// Convenience alias used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, DictionaryError>;
