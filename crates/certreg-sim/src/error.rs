//! Error types for the simulation decoder.

use certreg_core::{CodecError, KeyError, KeyPrefix};
use certreg_store::StoreError;
use thiserror::Error;

/// Errors that abort decoding of a key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The key is empty or an ID value has the wrong width.
    #[error("key schema error: {0}")]
    Key(KeyError),

    /// The key's first byte is not an assigned record prefix.
    #[error("unknown store key prefix 0x{0:02X}")]
    UnknownPrefix(u8),

    /// The value does not decode as the record its prefix names.
    #[error("failed to decode {prefix} value: {source}")]
    Codec {
        prefix: KeyPrefix,
        #[source]
        source: CodecError,
    },
}

impl From<KeyError> for DecodeError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::UnknownPrefix(byte) => DecodeError::UnknownPrefix(byte),
            other => DecodeError::Key(other),
        }
    }
}

/// Errors from comparing two stores.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Reading a snapshot failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
