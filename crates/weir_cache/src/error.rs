//! Error types for cache operations.

use std::path::PathBuf;

use weir_flow::UnitError;

use crate::codec::CodecError;

/// Errors surfaced to callers of the cache engine.
///
/// Corruption of a persisted entry is not represented here: the engine
/// recovers from it internally by deleting the entry and recomputing.
/// Permission-relaxation failures are ignored entirely.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The record has no field under the configured identity name, so no
    /// cache key can be derived. Fatal to the call.
    #[error("record has no '{field}' field to derive a cache key from")]
    MissingIdentityField {
        /// The configured identity field name.
        field: String,
    },

    /// A value could not be serialized or deserialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the codec failure.
        reason: String,
    },

    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The wrapped chain failed while processing the record.
    ///
    /// Passed through unmodified; the cache adds no suppression beyond the
    /// early-stop contract.
    #[error(transparent)]
    Flow(#[from] UnitError),
}

impl From<CodecError> for CacheError {
    fn from(err: CodecError) -> Self {
        CacheError::Serialization {
            reason: err.to_string(),
        }
    }
}
