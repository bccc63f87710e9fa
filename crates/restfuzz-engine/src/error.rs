//! Typed error enum for the `restfuzz-engine` library API.
//!
//! Library consumers can match on specific variants. The CLI (`main.rs`)
//! converts these to `anyhow::Error` at the binary boundary for richer
//! context messages.
//!
//! All variants are configuration errors: they abort the compilation pass
//! with no partial output. Resolution gaps (a consumer with no producer)
//! and ranking ambiguity are *not* errors — they resolve locally.

/// Errors produced by `restfuzz-engine` library operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File I/O failure (reading operations, annotations, or config files).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON parsing failure (operations or annotation documents).
    #[error("failed to parse document: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failure (engine config file).
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Mutations dictionary loading failure.
    #[error(transparent)]
    Dictionary(#[from] restfuzz_dictionary::DictionaryError),

    /// An annotation record has no `producer_endpoint`.
    #[error("annotation #{index}: missing required field 'producer_endpoint'")]
    MissingProducerEndpoint {
        /// Zero-based position of the record in the annotation list.
        index: usize,
    },

    /// An annotation record has no `producer_method`.
    #[error("annotation for producer '{endpoint}': missing required field 'producer_method'")]
    MissingProducerMethod {
        /// The annotation's producer endpoint.
        endpoint: String,
    },

    /// An annotation record names a method that is not a valid HTTP method.
    #[error("annotation for producer '{endpoint}': unrecognized method '{method}'")]
    InvalidAnnotationMethod {
        /// The annotation's producer endpoint.
        endpoint: String,
        /// The offending method string.
        method: String,
    },

    /// A consumer endpoint was given without a consumer method.
    #[error(
        "annotation for producer '{endpoint}': consumer_endpoint '{consumer_endpoint}' \
         requires consumer_method"
    )]
    ConsumerMethodMissing {
        /// The annotation's producer endpoint.
        endpoint: String,
        /// The consumer endpoint missing its method.
        consumer_endpoint: String,
    },

    /// An `except` clause entry could not be parsed.
    #[error("annotation for producer '{endpoint}': malformed except clause: {reason}")]
    MalformedExcept {
        /// The annotation's producer endpoint.
        endpoint: String,
        /// Why the clause does not parse.
        reason: String,
    },
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;
