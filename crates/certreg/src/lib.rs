//! # Certification Registry
//!
//! The cert module of a certification registry: certifiers, certified
//! validators and platforms, certificates, and libraries, kept in a
//! namespaced key-value partition.
//!
//! ## Overview
//!
//! - **Key schema**: every store key starts with a one-byte record prefix
//! - **Content addressing**: certificates are indexed by a SHA-224 digest of
//!   their request content, so the same content maps to one certificate ID
//! - **Genesis**: default, validate, import, and export of module state
//! - **Simulation**: decode and compare raw store snapshots
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certreg::{CertModule, ModuleConfig};
//! use certreg::store::{MemoryStore, SqliteStore};
//!
//! async fn example() -> certreg::Result<()> {
//!     let module = CertModule::new(SqliteStore::open("certreg.db")?, ModuleConfig::default());
//!
//!     let genesis = CertModule::<SqliteStore>::default_genesis_json()?;
//!     module.init_genesis(&genesis).await?;
//!
//!     // Compare against another replica's store.
//!     let replica = MemoryStore::new();
//!     let diff = module.diff_against(&replica).await?;
//!     print!("{diff}");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `certreg::core` - Records, key schema, codec, genesis types
//! - `certreg::store` - Key-value backends and typed record access
//! - `certreg::sim` - Store diff decoder and snapshot comparison

pub mod error;
pub mod module;

// Re-export component crates
pub use certreg_core as core;
pub use certreg_sim as sim;
pub use certreg_store as store;

pub use error::{ModuleError, Result};
pub use module::{CertModule, ModuleConfig};

// Re-export commonly used types
pub use certreg_core::{
    Address, Any, CborCodec, Certificate, CertificateKind, CertificateRegistry, CertificateType,
    Certifier, CompilationCertificate, CompilationContent, GeneralCertificate, GenesisState,
    KeyPrefix, KvPair, Library, Platform, PubKey, RequestContent, RequestContentType, Validator,
};
pub use certreg_sim::{DecodeError, DiffConfig, DiffEntry, StoreDecoder, StoreDiff};
