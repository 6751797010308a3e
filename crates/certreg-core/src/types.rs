//! Strong type definitions for the certification registry.
//!
//! Identifiers are newtypes so an address can never be passed where a
//! public key is expected.

use bytes::Bytes;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::codec::Any;
use crate::error::CodecError;

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Type URL of an Ed25519 public key envelope.
pub const ED25519_PUBKEY_TYPE_URL: &str = "/certreg.crypto.ed25519.PubKey";

/// Type URL of a compressed secp256k1 public key envelope.
pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/certreg.crypto.secp256k1.PubKey";

/// A 20-byte account address.
///
/// Serialized as lowercase hex in every encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; ADDRESS_LEN] = slice.try_into()?;
        Ok(Self(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(de::Error::custom)
    }
}

/// A validator consensus public key.
///
/// On the wire a key travels inside an [`Any`] envelope, so decoding
/// rejects key kinds this build does not know about.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Any", into = "Any")]
pub enum PubKey {
    Ed25519([u8; 32]),
    Secp256k1([u8; 33]),
}

impl PubKey {
    /// Raw key bytes, as used in store keys.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PubKey::Ed25519(bytes) => bytes,
            PubKey::Secp256k1(bytes) => bytes,
        }
    }

    /// The type URL of this key kind.
    pub fn type_url(&self) -> &'static str {
        match self {
            PubKey::Ed25519(_) => ED25519_PUBKEY_TYPE_URL,
            PubKey::Secp256k1(_) => SECP256K1_PUBKEY_TYPE_URL,
        }
    }

    /// Pack into a type-URL envelope.
    pub fn to_any(&self) -> Any {
        Any::new(self.type_url(), self.as_bytes().to_vec())
    }

    /// Resolve a type-URL envelope into a concrete key.
    pub fn from_any(any: &Any) -> Result<Self, CodecError> {
        let length_error = |expected: usize| CodecError::InvalidPubKeyLength {
            type_url: any.type_url.clone(),
            expected,
            actual: any.value.len(),
        };

        match any.type_url.as_str() {
            ED25519_PUBKEY_TYPE_URL => {
                let arr: [u8; 32] = any
                    .value
                    .as_slice()
                    .try_into()
                    .map_err(|_| length_error(32))?;
                Ok(PubKey::Ed25519(arr))
            }
            SECP256K1_PUBKEY_TYPE_URL => {
                let arr: [u8; 33] = any
                    .value
                    .as_slice()
                    .try_into()
                    .map_err(|_| length_error(33))?;
                Ok(PubKey::Secp256k1(arr))
            }
            other => Err(CodecError::UnsupportedPubKey(other.to_string())),
        }
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl fmt::Debug for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PubKey::Ed25519(_) => write!(f, "Ed25519Pub({})", self.to_hex()),
            PubKey::Secp256k1(_) => write!(f, "Secp256k1Pub({})", self.to_hex()),
        }
    }
}

impl AsRef<[u8]> for PubKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<PubKey> for Any {
    fn from(key: PubKey) -> Self {
        key.to_any()
    }
}

impl TryFrom<Any> for PubKey {
    type Error = CodecError;

    fn try_from(any: Any) -> Result<Self, Self::Error> {
        PubKey::from_any(&any)
    }
}

/// A raw store entry: the unit the simulation harness pairs up across
/// two snapshots.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KvPair {
    pub key: Bytes,
    pub value: Bytes,
}

impl KvPair {
    /// Create a pair from anything convertible to `Bytes`.
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Debug for KvPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KvPair({} => {} bytes)",
            hex::encode(&self.key),
            self.value.len()
        )
    }
}
