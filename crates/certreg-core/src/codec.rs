//! Binary codec for store values.
//!
//! Two encodings are used by the registry's store:
//!
//! - **Length-prefixed** records: `uvarint(len) || cbor(record)`, used for
//!   every fixed-schema record (certifiers, validators, platforms, libraries).
//! - **Interface** records: `cbor(Any { type_url, value })`, used for
//!   certificates whose concrete kind is only known at runtime. The type URL
//!   is resolved through a [`CertificateRegistry`].
//!
//! The rest of the workspace depends on the [`Codec`] trait, not on CBOR.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::certificate::Certificate;
use crate::error::CodecError;
use crate::registry::CertificateRegistry;

/// Maximum encoded size of a u64 varint.
const MAX_UVARINT_LEN: usize = 10;

/// A type-URL envelope around an encoded value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Any {
    pub type_url: String,
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
}

impl Any {
    pub fn new(type_url: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            type_url: type_url.into(),
            value,
        }
    }

    /// Pack a certificate into an envelope carrying its type URL.
    pub fn pack(certificate: &dyn Certificate) -> Result<Self, CodecError> {
        Ok(Self::new(certificate.type_url(), certificate.encode_value()?))
    }
}

impl fmt::Debug for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Any({}, {} bytes)", self.type_url, self.value.len())
    }
}

/// Serialize byte vectors as hex strings so JSON genesis files stay readable.
mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(de::Error::custom)
    }
}

/// Encode a value as CBOR.
pub fn to_cbor<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CodecError::Encoding(e.to_string()))?;
    Ok(buf)
}

/// Decode a value from CBOR. The input must hold exactly one item.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let mut cursor = bytes;
    let value = ciborium::from_reader(&mut cursor)
        .map_err(|e| CodecError::Decoding(e.to_string()))?;
    if !cursor.is_empty() {
        return Err(CodecError::Decoding("trailing bytes".into()));
    }
    Ok(value)
}

/// Append an unsigned LEB128 varint.
fn put_uvarint(buf: &mut Vec<u8>, mut n: u64) {
    while n >= 0x80 {
        buf.push((n as u8) | 0x80);
        n >>= 7;
    }
    buf.push(n as u8);
}

/// Read an unsigned LEB128 varint, returning the value and bytes consumed.
fn read_uvarint(bytes: &[u8]) -> Result<(u64, usize), CodecError> {
    let mut n: u64 = 0;
    for (i, &b) in bytes.iter().take(MAX_UVARINT_LEN).enumerate() {
        if i == MAX_UVARINT_LEN - 1 && b > 1 {
            return Err(CodecError::Decoding("length prefix overflows u64".into()));
        }
        n |= u64::from(b & 0x7f) << (7 * i as u32);
        if b & 0x80 == 0 {
            return Ok((n, i + 1));
        }
    }
    Err(CodecError::Decoding("truncated length prefix".into()))
}

/// The codec capability the store and the simulation decoder depend on.
pub trait Codec: Send + Sync {
    /// Encode a fixed-schema record with a length prefix.
    fn marshal_length_prefixed<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode a fixed-schema record written by [`Codec::marshal_length_prefixed`].
    fn unmarshal_length_prefixed<T: DeserializeOwned>(&self, bytes: &[u8])
        -> Result<T, CodecError>;

    /// Encode a certificate together with its type URL.
    fn marshal_interface(&self, certificate: &dyn Certificate) -> Result<Vec<u8>, CodecError>;

    /// Decode a certificate, resolving its concrete kind by type URL.
    fn unmarshal_interface(&self, bytes: &[u8]) -> Result<Box<dyn Certificate>, CodecError>;
}

/// CBOR implementation of [`Codec`].
#[derive(Clone)]
pub struct CborCodec {
    registry: Arc<CertificateRegistry>,
}

impl CborCodec {
    /// Create a codec resolving certificates through `registry`.
    pub fn new(registry: Arc<CertificateRegistry>) -> Self {
        Self { registry }
    }

    /// The certificate registry backing interface decoding.
    pub fn registry(&self) -> &CertificateRegistry {
        &self.registry
    }
}

impl Default for CborCodec {
    fn default() -> Self {
        Self::new(Arc::new(CertificateRegistry::with_builtin_kinds()))
    }
}

impl fmt::Debug for CborCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CborCodec")
            .field("registry", &self.registry)
            .finish()
    }
}

impl Codec for CborCodec {
    fn marshal_length_prefixed<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let body = to_cbor(value)?;
        let mut buf = Vec::with_capacity(body.len() + MAX_UVARINT_LEN);
        put_uvarint(&mut buf, body.len() as u64);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    fn unmarshal_length_prefixed<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
    ) -> Result<T, CodecError> {
        let (declared, consumed) = read_uvarint(bytes)?;
        let body = &bytes[consumed..];
        if declared != body.len() as u64 {
            return Err(CodecError::LengthPrefix {
                declared,
                actual: body.len(),
            });
        }
        from_cbor(body)
    }

    fn marshal_interface(&self, certificate: &dyn Certificate) -> Result<Vec<u8>, CodecError> {
        to_cbor(&Any::pack(certificate)?)
    }

    fn unmarshal_interface(&self, bytes: &[u8]) -> Result<Box<dyn Certificate>, CodecError> {
        let any: Any = from_cbor(bytes)?;
        self.registry.resolve(&any)
    }
}
