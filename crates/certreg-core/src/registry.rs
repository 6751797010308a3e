//! Type registry for polymorphic certificate payloads.
//!
//! Maps a type URL to the function decoding that kind. Populate it at
//! startup, then share it immutably (it is `Send + Sync`).

use std::collections::HashMap;
use std::fmt;

use crate::certificate::{Certificate, CertificateKind, CompilationCertificate, GeneralCertificate};
use crate::codec::{from_cbor, Any};
use crate::error::CodecError;

/// Decodes the `value` of an envelope into a concrete certificate kind.
pub type DecodeFn = fn(&[u8]) -> Result<Box<dyn Certificate>, CodecError>;

fn decode_kind<C: CertificateKind>(bytes: &[u8]) -> Result<Box<dyn Certificate>, CodecError> {
    let certificate: C = from_cbor(bytes)?;
    Ok(Box::new(certificate))
}

/// Registry of certificate kinds, keyed by type URL.
#[derive(Default)]
pub struct CertificateRegistry {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl CertificateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in kinds registered.
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        registry
            .decoders
            .insert(GeneralCertificate::TYPE_URL, decode_kind::<GeneralCertificate>);
        registry.decoders.insert(
            CompilationCertificate::TYPE_URL,
            decode_kind::<CompilationCertificate>,
        );
        registry
    }

    /// Register a certificate kind under its type URL.
    ///
    /// Registering the same type URL twice is an error.
    pub fn register<C: CertificateKind>(&mut self) -> Result<(), CodecError> {
        if self.decoders.contains_key(C::TYPE_URL) {
            return Err(CodecError::DuplicateType(C::TYPE_URL.to_string()));
        }
        self.decoders.insert(C::TYPE_URL, decode_kind::<C>);
        Ok(())
    }

    /// Check whether a type URL is registered.
    pub fn is_registered(&self, type_url: &str) -> bool {
        self.decoders.contains_key(type_url)
    }

    /// All registered type URLs, sorted.
    pub fn type_urls(&self) -> Vec<&'static str> {
        let mut urls: Vec<_> = self.decoders.keys().copied().collect();
        urls.sort_unstable();
        urls
    }

    /// Resolve an envelope into its concrete certificate.
    pub fn resolve(&self, any: &Any) -> Result<Box<dyn Certificate>, CodecError> {
        let decode = self
            .decoders
            .get(any.type_url.as_str())
            .ok_or_else(|| CodecError::UnregisteredType(any.type_url.clone()))?;
        decode(&any.value)
    }
}

impl fmt::Debug for CertificateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateRegistry")
            .field("kinds", &self.type_urls())
            .finish()
    }
}
