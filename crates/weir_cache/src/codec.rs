//! Binary serialization glue around bincode.
//!
//! All persisted state goes through [`encode`] and [`decode`]. Decoding
//! distinguishes truncated input (treated as corruption by the engine) from
//! genuinely unsupported data, and keeps entries written by older builds
//! readable through a legacy byte-interpretation fallback.

use bincode::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Failures of the serialization codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input ended before a complete value was decoded.
    ///
    /// Signals a truncated or otherwise corrupted byte stream; the cache
    /// engine recovers from this by deleting the entry and recomputing.
    #[error("input ended before a complete value was decoded")]
    EndOfData,

    /// The value could not be serialized or deserialized.
    #[error("unsupported value: {reason}")]
    Unsupported {
        /// Description of the codec failure.
        reason: String,
    },
}

/// Serializes a value to bytes with the current wire layout.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serde::encode_to_vec(value, bincode::config::standard()).map_err(|e| {
        CodecError::Unsupported {
            reason: e.to_string(),
        }
    })
}

/// Deserializes a value from bytes.
///
/// The current layout is tried first. On a decode failure other than
/// truncation, the pre-2.0 legacy layout is attempted so entries written by
/// older builds still load. Truncation is reported as
/// [`CodecError::EndOfData`] from either attempt, never masked by the
/// fallback.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    match bincode::serde::decode_from_slice(bytes, bincode::config::standard()) {
        Ok((value, _)) => Ok(value),
        Err(DecodeError::UnexpectedEnd { .. }) => Err(CodecError::EndOfData),
        Err(_) => match bincode::serde::decode_from_slice(bytes, bincode::config::legacy()) {
            Ok((value, _)) => Ok(value),
            Err(DecodeError::UnexpectedEnd { .. }) => Err(CodecError::EndOfData),
            Err(e) => Err(CodecError::Unsupported {
                reason: e.to_string(),
            }),
        },
    }
}
