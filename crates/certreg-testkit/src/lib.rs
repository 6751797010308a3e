//! # Certification Registry Testkit
//!
//! Testing utilities for the certification registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Store keys with their expected bytes
//! - **Generators**: Proptest strategies for records, certificates, and genesis
//! - **Fixtures**: A module over a memory store with ready-made identities
//!
//! ## Golden Vectors
//!
//! ```rust
//! use certreg_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, actual) in verify_all_vectors() {
//!     assert!(matches, "{name}: {actual}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use certreg_testkit::generators::{genesis_from_params, GenesisParams};
//!
//! proptest! {
//!     #[test]
//!     fn generated_genesis_validates(params: GenesisParams) {
//!         prop_assert!(genesis_from_params(&params).unwrap().validate().is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use certreg::{CertificateType, RequestContentType};
//! use certreg_testkit::fixtures::TestFixture;
//!
//! async fn example() -> certreg::Result<()> {
//!     let fixture = TestFixture::new();
//!     fixture.init().await?;
//!     let id = fixture
//!         .issue_certificate(CertificateType::Auditing, RequestContentType::SourceCodeHash, "0xabc")
//!         .await?;
//!     assert_eq!(id, 1);
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{genesis_from_params, GenesisParams};
pub use vectors::{all_vectors, verify_all_vectors, KeyVector};
