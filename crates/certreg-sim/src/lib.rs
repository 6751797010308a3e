//! # Certification Registry Simulation
//!
//! Introspection for randomized simulation runs: decode raw store entries
//! without knowing in advance which record each key belongs to, and
//! compare two store snapshots.
//!
//! ## Key Types
//!
//! - [`StoreDecoder`] - Renders a pair of entries sharing a key
//! - [`diff_snapshots`] / [`diff_stores`] - Pair entries across snapshots
//! - [`DiffConfig`] - Whether a decode failure aborts the run
//! - [`StoreDiff`] - The differences found
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certreg_core::KvPair;
//! use certreg_sim::{diff_snapshots, DiffConfig, StoreDecoder};
//!
//! fn example(a: &[KvPair], b: &[KvPair]) {
//!     let decoder: StoreDecoder = StoreDecoder::default();
//!     let diff = diff_snapshots(&decoder, a, b, &DiffConfig::default()).unwrap();
//!     print!("{diff}");
//! }
//! ```

pub mod decoder;
pub mod diff;
pub mod error;

pub use decoder::StoreDecoder;
pub use diff::{diff_snapshots, diff_stores, DiffConfig, DiffEntry, StoreDiff};
pub use error::{DecodeError, Result, SimError};
