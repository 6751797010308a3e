//! Error types for the certification registry core.

use thiserror::Error;

/// Errors raised while building or interpreting store keys and ID values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("store key is empty")]
    EmptyKey,

    #[error("unknown store key prefix 0x{0:02X}")]
    UnknownPrefix(u8),

    #[error("certificate id must be 8 bytes, got {0}")]
    InvalidIdLength(usize),

    #[error("certificate id list length {0} is not a multiple of 8")]
    InvalidIdListLength(usize),
}

/// Errors from the binary codec and the certificate type registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("length prefix declares {declared} bytes, but {actual} follow")]
    LengthPrefix { declared: u64, actual: usize },

    #[error("no certificate kind registered for type url {0:?}")]
    UnregisteredType(String),

    #[error("certificate kind {0:?} is already registered")]
    DuplicateType(String),

    #[error("unsupported public key type url {0:?}")]
    UnsupportedPubKey(String),

    #[error("public key {type_url:?} must be {expected} bytes, got {actual}")]
    InvalidPubKeyLength {
        type_url: String,
        expected: usize,
        actual: usize,
    },
}

/// Genesis parsing and validation errors.
///
/// These are reported to the caller; whether to abort startup is its call.
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("failed to unmarshal cert genesis state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to validate cert genesis state: next_certificate_id must be positive, got {0}")]
    InvalidNextCertificateId(u64),

    #[error("failed to unpack cert genesis state: {0}")]
    Unpack(#[from] CodecError),
}
