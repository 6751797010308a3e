//! # Certification Registry Core
//!
//! Pure primitives for the certification registry: records, the store key
//! schema, content addressing, and the value codec.
//!
//! This crate contains no I/O, no storage, no logging.
//!
//! ## Key Types
//!
//! - [`KeyPrefix`] - The record kind encoded in a store key's first byte
//! - [`StoreKey`] - A logical record identity, convertible to key bytes
//! - [`Certificate`] - Polymorphic certificate payloads
//! - [`CertificateRegistry`] - Type-URL registry resolving certificate kinds
//! - [`Codec`] / [`CborCodec`] - Value encoding for store records
//! - [`GenesisState`] - The module's import/export format
//!
//! ## Content Addressing
//!
//! Certificates are indexed by a SHA-224 digest of their request content
//! so that the same `(type, content)` always resolves to one certificate
//! ID. See [`content_cert_id_key`].

pub mod certificate;
pub mod codec;
pub mod error;
pub mod genesis;
pub mod keys;
pub mod records;
pub mod registry;
pub mod types;

pub use certificate::{
    Certificate, CertificateKind, CertificateType, CompilationCertificate, CompilationContent,
    GeneralCertificate, RequestContent, RequestContentType,
};
pub use codec::{Any, CborCodec, Codec};
pub use error::{CodecError, GenesisError, KeyError};
pub use genesis::{genesis_state_from_app_state, validate_genesis, GenesisState, MODULE_NAME};
pub use keys::{
    certificate_key, certifier_alias_key, certifier_cert_ids_key, certifier_key,
    content_cert_id_key, decode_id, decode_id_list, encode_id, encode_id_list, library_key,
    next_certificate_id_key, platform_key, validator_key, KeyPrefix, StoreKey,
};
pub use records::{Certifier, Library, Platform, Validator};
pub use registry::CertificateRegistry;
pub use types::{Address, KvPair, PubKey};
