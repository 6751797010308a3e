//! Store key schema.
//!
//! Every store key is a single prefix byte naming the record kind followed
//! by a kind-specific suffix:
//!
//! | Prefix | Record | Suffix |
//! |---|---|---|
//! | `0x00` | certifier | address |
//! | `0x01` | validator certification | public key bytes |
//! | `0x02` | platform certification | public key bytes |
//! | `0x05` | certificate | 8-byte little-endian ID |
//! | `0x06` | library | address |
//! | `0x07` | certifier alias | alias UTF-8 bytes |
//! | `0x08` | next certificate ID | (none) |
//! | `0x09` | certifier → certificate IDs | address |
//! | `0x0A` | content → certificate ID | certificate type tag, SHA-224 digest |
//!
//! `0x03` and `0x04` are reserved. A range scan over `[prefix, prefix + 1)`
//! covers exactly one record kind.
//!
//! This layout is persisted state: the byte values must not change.

use sha2::{Digest, Sha224};
use std::fmt;

use crate::certificate::{CertificateType, RequestContentType};
use crate::error::KeyError;
use crate::types::{Address, PubKey};

/// Width of an encoded certificate ID.
pub const ID_LEN: usize = 8;

/// Width of the SHA-224 content digest.
pub const CONTENT_HASH_LEN: usize = 28;

/// The record kind a store key belongs to, identified by its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum KeyPrefix {
    Certifier = 0x00,
    Validator = 0x01,
    Platform = 0x02,
    Certificate = 0x05,
    Library = 0x06,
    CertifierAlias = 0x07,
    NextCertificateId = 0x08,
    CertifierCertIds = 0x09,
    ContentCertId = 0x0A,
}

impl KeyPrefix {
    /// Every prefix, in byte order.
    pub const ALL: [KeyPrefix; 9] = [
        KeyPrefix::Certifier,
        KeyPrefix::Validator,
        KeyPrefix::Platform,
        KeyPrefix::Certificate,
        KeyPrefix::Library,
        KeyPrefix::CertifierAlias,
        KeyPrefix::NextCertificateId,
        KeyPrefix::CertifierCertIds,
        KeyPrefix::ContentCertId,
    ];

    /// The prefix byte.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Map a byte to its prefix; `None` for unassigned bytes.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Certifier),
            0x01 => Some(Self::Validator),
            0x02 => Some(Self::Platform),
            0x05 => Some(Self::Certificate),
            0x06 => Some(Self::Library),
            0x07 => Some(Self::CertifierAlias),
            0x08 => Some(Self::NextCertificateId),
            0x09 => Some(Self::CertifierCertIds),
            0x0A => Some(Self::ContentCertId),
            _ => None,
        }
    }

    /// The prefix of a full store key.
    pub fn of_key(key: &[u8]) -> Result<Self, KeyError> {
        let (&first, _) = key.split_first().ok_or(KeyError::EmptyKey)?;
        Self::try_from(first)
    }

    /// Start (inclusive) of the range scan over all records of this kind.
    pub const fn scan_prefix(self) -> [u8; 1] {
        [self as u8]
    }

    /// End (exclusive) of the range scan over all records of this kind.
    pub const fn scan_end(self) -> [u8; 1] {
        [self as u8 + 1]
    }

    /// Human-readable record kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Certifier => "certifier",
            Self::Validator => "validator",
            Self::Platform => "platform",
            Self::Certificate => "certificate",
            Self::Library => "library",
            Self::CertifierAlias => "certifier alias",
            Self::NextCertificateId => "next certificate id",
            Self::CertifierCertIds => "certifier certificate ids",
            Self::ContentCertId => "content certificate id",
        }
    }
}

impl TryFrom<u8> for KeyPrefix {
    type Error = KeyError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_byte(byte).ok_or(KeyError::UnknownPrefix(byte))
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.as_byte())
    }
}

/// A logical record identity, convertible to its store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey<'a> {
    Certifier(&'a Address),
    CertifierAlias(&'a str),
    Validator(&'a PubKey),
    Platform(&'a PubKey),
    Certificate(u64),
    Library(&'a Address),
    NextCertificateId,
    CertifierCertIds(&'a Address),
    ContentCertId {
        certificate_type: CertificateType,
        content_type: RequestContentType,
        content: &'a str,
    },
}

impl StoreKey<'_> {
    pub fn prefix(&self) -> KeyPrefix {
        match self {
            StoreKey::Certifier(_) => KeyPrefix::Certifier,
            StoreKey::CertifierAlias(_) => KeyPrefix::CertifierAlias,
            StoreKey::Validator(_) => KeyPrefix::Validator,
            StoreKey::Platform(_) => KeyPrefix::Platform,
            StoreKey::Certificate(_) => KeyPrefix::Certificate,
            StoreKey::Library(_) => KeyPrefix::Library,
            StoreKey::NextCertificateId => KeyPrefix::NextCertificateId,
            StoreKey::CertifierCertIds(_) => KeyPrefix::CertifierCertIds,
            StoreKey::ContentCertId { .. } => KeyPrefix::ContentCertId,
        }
    }

    /// Encode as `prefix || suffix`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut key = vec![self.prefix().as_byte()];
        match self {
            StoreKey::Certifier(address)
            | StoreKey::Library(address)
            | StoreKey::CertifierCertIds(address) => key.extend_from_slice(address.as_bytes()),
            StoreKey::CertifierAlias(alias) => key.extend_from_slice(alias.as_bytes()),
            StoreKey::Validator(pubkey) | StoreKey::Platform(pubkey) => {
                key.extend_from_slice(pubkey.as_bytes())
            }
            StoreKey::Certificate(id) => key.extend_from_slice(&encode_id(*id)),
            StoreKey::NextCertificateId => {}
            StoreKey::ContentCertId {
                certificate_type,
                content_type,
                content,
            } => {
                key.extend_from_slice(&certificate_type.tag_bytes());
                key.extend_from_slice(&content_hash(*content_type, content));
            }
        }
        key
    }
}

/// Store key of a certifier registration.
pub fn certifier_key(certifier: &Address) -> Vec<u8> {
    StoreKey::Certifier(certifier).to_bytes()
}

/// Store key of a certifier alias.
pub fn certifier_alias_key(alias: &str) -> Vec<u8> {
    StoreKey::CertifierAlias(alias).to_bytes()
}

/// Store key of a validator node certification.
pub fn validator_key(validator: &PubKey) -> Vec<u8> {
    StoreKey::Validator(validator).to_bytes()
}

/// Store key of a validator host platform certification.
pub fn platform_key(validator: &PubKey) -> Vec<u8> {
    StoreKey::Platform(validator).to_bytes()
}

/// Store key of a certificate.
pub fn certificate_key(id: u64) -> Vec<u8> {
    StoreKey::Certificate(id).to_bytes()
}

/// Store key of a library address.
pub fn library_key(library: &Address) -> Vec<u8> {
    StoreKey::Library(library).to_bytes()
}

/// Store key of the next certificate ID counter.
pub fn next_certificate_id_key() -> Vec<u8> {
    StoreKey::NextCertificateId.to_bytes()
}

/// Store key of the certificate IDs issued by a certifier.
pub fn certifier_cert_ids_key(certifier: &Address) -> Vec<u8> {
    StoreKey::CertifierCertIds(certifier).to_bytes()
}

/// Store key of the content dedup index.
///
/// `0x0A || certificate_type || SHA-224(content_type || content)`. Equal
/// inputs always give equal keys, so re-certifying the same content
/// resolves to the existing certificate ID.
pub fn content_cert_id_key(
    certificate_type: CertificateType,
    content_type: RequestContentType,
    content: &str,
) -> Vec<u8> {
    StoreKey::ContentCertId {
        certificate_type,
        content_type,
        content,
    }
    .to_bytes()
}

/// SHA-224 digest of `content_type || content`.
pub fn content_hash(content_type: RequestContentType, content: &str) -> [u8; CONTENT_HASH_LEN] {
    let mut hasher = Sha224::new();
    hasher.update(content_type.tag_bytes());
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();

    let mut out = [0u8; CONTENT_HASH_LEN];
    out.copy_from_slice(&digest);
    out
}

/// Encode a certificate ID as 8 little-endian bytes.
pub const fn encode_id(id: u64) -> [u8; ID_LEN] {
    id.to_le_bytes()
}

/// Decode an 8-byte little-endian certificate ID.
///
/// An empty value decodes to `0`, which is never an assigned ID.
pub fn decode_id(bytes: &[u8]) -> Result<u64, KeyError> {
    if bytes.is_empty() {
        return Ok(0);
    }
    let arr: [u8; ID_LEN] = bytes
        .try_into()
        .map_err(|_| KeyError::InvalidIdLength(bytes.len()))?;
    Ok(u64::from_le_bytes(arr))
}

/// Pack certificate IDs as consecutive 8-byte little-endian integers.
pub fn encode_id_list(ids: &[u64]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(ids.len() * ID_LEN);
    for id in ids {
        buf.extend_from_slice(&encode_id(*id));
    }
    buf
}

/// Split a packed ID list into its IDs, in order.
///
/// A length that is not a multiple of 8 is rejected rather than truncated.
pub fn decode_id_list(bytes: &[u8]) -> Result<Vec<u64>, KeyError> {
    if bytes.len() % ID_LEN != 0 {
        return Err(KeyError::InvalidIdListLength(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(ID_LEN)
        .map(|chunk| {
            let mut arr = [0u8; ID_LEN];
            arr.copy_from_slice(chunk);
            u64::from_le_bytes(arr)
        })
        .collect())
}
