//! Certificates: the certified artifacts of the registry.
//!
//! A certificate's payload is polymorphic. The set of certificate kinds is
//! open: any type implementing [`CertificateKind`] can be registered in a
//! [`CertificateRegistry`](crate::registry::CertificateRegistry) and is then
//! decodable from the store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec::to_cbor;
use crate::error::CodecError;
use crate::keys::content_cert_id_key;
use crate::types::Address;

/// What a certificate attests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CertificateType {
    Unspecified = 0,
    Compilation = 1,
    Auditing = 2,
    Proof = 3,
    OracleOperator = 4,
    ShieldPoolCreator = 5,
    Identity = 6,
    General = 7,
}

impl CertificateType {
    /// Every certificate type, in tag order.
    pub const ALL: [CertificateType; 8] = [
        CertificateType::Unspecified,
        CertificateType::Compilation,
        CertificateType::Auditing,
        CertificateType::Proof,
        CertificateType::OracleOperator,
        CertificateType::ShieldPoolCreator,
        CertificateType::Identity,
        CertificateType::General,
    ];

    /// Convert to the one-byte tag used in store keys.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from a tag byte.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Compilation),
            2 => Some(Self::Auditing),
            3 => Some(Self::Proof),
            4 => Some(Self::OracleOperator),
            5 => Some(Self::ShieldPoolCreator),
            6 => Some(Self::Identity),
            7 => Some(Self::General),
            _ => None,
        }
    }

    /// Tag bytes as concatenated into content keys.
    pub const fn tag_bytes(self) -> [u8; 1] {
        [self as u8]
    }
}

/// How the content of a certification request is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RequestContentType {
    Unspecified = 0,
    SourceCodeHash = 1,
    Address = 2,
    BytecodeHash = 3,
    General = 4,
}

impl RequestContentType {
    /// Every request content type, in tag order.
    pub const ALL: [RequestContentType; 5] = [
        RequestContentType::Unspecified,
        RequestContentType::SourceCodeHash,
        RequestContentType::Address,
        RequestContentType::BytecodeHash,
        RequestContentType::General,
    ];

    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unspecified),
            1 => Some(Self::SourceCodeHash),
            2 => Some(Self::Address),
            3 => Some(Self::BytecodeHash),
            4 => Some(Self::General),
            _ => None,
        }
    }

    pub const fn tag_bytes(self) -> [u8; 1] {
        [self as u8]
    }
}

/// The subject of a certification: a typed content string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestContent {
    pub content_type: RequestContentType,
    pub content: String,
}

impl RequestContent {
    pub fn new(content_type: RequestContentType, content: impl Into<String>) -> Self {
        Self {
            content_type,
            content: content.into(),
        }
    }
}

/// Behaviour shared by every certificate kind.
///
/// Used as a trait object (`Box<dyn Certificate>`) wherever the concrete
/// kind is only known at runtime. `Debug` is the rendering the simulation
/// decoder reports.
pub trait Certificate: fmt::Debug + Send + Sync {
    /// Type URL identifying the concrete kind in the registry.
    fn type_url(&self) -> &'static str;

    /// The certificate ID assigned at issuance.
    fn id(&self) -> u64;

    fn certificate_type(&self) -> CertificateType;

    fn request_content(&self) -> &RequestContent;

    /// Address of the certifier that issued this certificate.
    fn certifier(&self) -> &Address;

    fn description(&self) -> &str;

    /// Encode the kind-specific payload (the `value` of its envelope).
    fn encode_value(&self) -> Result<Vec<u8>, CodecError>;

    /// Store key of the content dedup index entry for this certificate.
    fn content_key(&self) -> Vec<u8> {
        let content = self.request_content();
        content_cert_id_key(
            self.certificate_type(),
            content.content_type,
            &content.content,
        )
    }
}

/// A certificate kind that can be registered for decoding by type URL.
pub trait CertificateKind: Certificate + Serialize + DeserializeOwned + 'static {
    const TYPE_URL: &'static str;
}

/// A certificate with no kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralCertificate {
    pub id: u64,
    pub certificate_type: CertificateType,
    pub request_content: RequestContent,
    pub description: String,
    pub certifier: Address,
}

impl GeneralCertificate {
    pub fn new(
        id: u64,
        certificate_type: CertificateType,
        request_content: RequestContent,
        description: impl Into<String>,
        certifier: Address,
    ) -> Self {
        Self {
            id,
            certificate_type,
            request_content,
            description: description.into(),
            certifier,
        }
    }
}

impl Certificate for GeneralCertificate {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn certificate_type(&self) -> CertificateType {
        self.certificate_type
    }

    fn request_content(&self) -> &RequestContent {
        &self.request_content
    }

    fn certifier(&self) -> &Address {
        &self.certifier
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn encode_value(&self) -> Result<Vec<u8>, CodecError> {
        to_cbor(self)
    }
}

impl CertificateKind for GeneralCertificate {
    const TYPE_URL: &'static str = "/certreg.cert.v1.GeneralCertificate";
}

/// Compiler output attested by a compilation certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationContent {
    pub compiler: String,
    pub bytecode_hash: String,
}

/// Attests that a source code hash compiles to a given bytecode hash.
///
/// Always of type [`CertificateType::Compilation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationCertificate {
    pub id: u64,
    pub issue_block_height: i64,
    pub request_content: RequestContent,
    pub compilation_content: CompilationContent,
    pub description: String,
    pub certifier: Address,
}

impl CompilationCertificate {
    pub fn new(
        id: u64,
        issue_block_height: i64,
        source_code_hash: impl Into<String>,
        compilation_content: CompilationContent,
        description: impl Into<String>,
        certifier: Address,
    ) -> Self {
        Self {
            id,
            issue_block_height,
            request_content: RequestContent::new(
                RequestContentType::SourceCodeHash,
                source_code_hash,
            ),
            compilation_content,
            description: description.into(),
            certifier,
        }
    }
}

impl Certificate for CompilationCertificate {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn certificate_type(&self) -> CertificateType {
        CertificateType::Compilation
    }

    fn request_content(&self) -> &RequestContent {
        &self.request_content
    }

    fn certifier(&self) -> &Address {
        &self.certifier
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn encode_value(&self) -> Result<Vec<u8>, CodecError> {
        to_cbor(self)
    }
}

impl CertificateKind for CompilationCertificate {
    const TYPE_URL: &'static str = "/certreg.cert.v1.CompilationCertificate";
}
