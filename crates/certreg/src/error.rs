//! Error types for the module facade.

use certreg_core::{CodecError, GenesisError};
use certreg_sim::SimError;
use certreg_store::StoreError;
use thiserror::Error;

/// Errors that can occur during module operations.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Genesis could not be parsed or failed validation.
    #[error("genesis error: {0}")]
    Genesis(#[from] GenesisError),

    /// A certificate envelope could not be resolved.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Snapshot comparison failed.
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),

    /// The counter would hand out an ID already used by an imported certificate.
    #[error("next certificate id {next} does not exceed imported certificate id {max_id}")]
    CounterBehindCertificates { next: u64, max_id: u64 },

    /// Two imported certificates share an ID.
    #[error("duplicate certificate id {0} in genesis")]
    DuplicateCertificateId(u64),

    /// Two imported certificates certify the same content.
    #[error("certificates {first} and {duplicate} in genesis certify the same content")]
    DuplicateCertificateContent { first: u64, duplicate: u64 },
}

/// Result type for module operations.
pub type Result<T> = std::result::Result<T, ModuleError>;
