//! # Certification Registry Store
//!
//! Storage for the certification registry. Provides an ordered key-value
//! trait with SQLite and in-memory implementations, and a typed layer that
//! reads and writes registry records through the key schema and codec.
//!
//! ## Key Types
//!
//! - [`KvStore`] - The async trait for raw key-value access
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests and snapshots
//! - [`CertStore`] - Typed records, indexes, and genesis import/export
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certreg_core::{CborCodec, CertificateRegistry, GenesisState};
//! use certreg_store::{CertStore, SqliteStore};
//!
//! async fn example() -> certreg_store::Result<()> {
//!     let store = CertStore::new(SqliteStore::open("certreg.db")?, CborCodec::default());
//!
//!     let registry = CertificateRegistry::with_builtin_kinds();
//!     store.init_genesis(&GenesisState::default(), &registry).await?;
//!
//!     let id = store.allocate_certificate_id().await?;
//!     assert_eq!(id, 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Bytewise ordering**: every backend orders keys by raw bytes
//! - **Alias index**: certifiers with an alias are stored twice
//! - **Content dedup**: certificates are indexed by a hash of their content

pub mod cert_store;
pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use cert_store::CertStore;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::KvStore;
