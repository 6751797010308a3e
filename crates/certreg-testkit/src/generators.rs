//! Proptest generators for property-based testing.

use std::collections::HashSet;

use proptest::prelude::*;

use certreg_core::{
    Address, Any, Certificate, CertificateType, Certifier, CodecError, GeneralCertificate, GenesisState,
    Library, Platform, PubKey, RequestContent, RequestContentType, Validator,
};
use ed25519_dalek::SigningKey;

/// Generate a random address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a real Ed25519 public key from a random seed.
pub fn ed25519_pubkey() -> impl Strategy<Value = PubKey> {
    any::<[u8; 32]>().prop_map(|seed| {
        PubKey::Ed25519(SigningKey::from_bytes(&seed).verifying_key().to_bytes())
    })
}

/// Generate a compressed-point-shaped secp256k1 key.
///
/// Only the encoding is realistic; the point is not checked to be on the curve.
pub fn secp256k1_pubkey() -> impl Strategy<Value = PubKey> {
    (prop_oneof![Just(0x02u8), Just(0x03u8)], any::<[u8; 32]>()).prop_map(|(tag, x)| {
        let mut bytes = [0u8; 33];
        bytes[0] = tag;
        bytes[1..].copy_from_slice(&x);
        PubKey::Secp256k1(bytes)
    })
}

pub fn pubkey() -> impl Strategy<Value = PubKey> {
    prop_oneof![ed25519_pubkey(), secp256k1_pubkey()]
}

pub fn certificate_type() -> impl Strategy<Value = CertificateType> {
    prop::sample::select(CertificateType::ALL.to_vec())
}

pub fn request_content_type() -> impl Strategy<Value = RequestContentType> {
    prop::sample::select(RequestContentType::ALL.to_vec())
}

/// Generate request content, including empty and non-ASCII strings.
pub fn content() -> impl Strategy<Value = String> {
    prop_oneof![
        "0x[0-9a-f]{8,64}".prop_map(String::from),
        "certik1[a-z0-9]{6,38}".prop_map(String::from),
        ".{0,48}".prop_map(String::from),
    ]
}

/// Generate a certifier alias; empty means no alias.
pub fn alias() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z][a-z0-9_]{2,15}".prop_map(String::from)]
}

pub fn certifier() -> impl Strategy<Value = Certifier> {
    (address(), alias(), address(), ".{0,32}").prop_map(|(addr, alias, proposer, desc)| {
        Certifier::new(addr, alias, proposer, desc)
    })
}

pub fn validator() -> impl Strategy<Value = Validator> {
    (pubkey(), address()).prop_map(|(pubkey, certifier)| Validator::new(pubkey, certifier))
}

pub fn platform() -> impl Strategy<Value = Platform> {
    (pubkey(), ".{0,32}").prop_map(|(pubkey, desc)| Platform::new(pubkey, desc))
}

pub fn library() -> impl Strategy<Value = Library> {
    (address(), address()).prop_map(|(addr, publisher)| Library::new(addr, publisher))
}

/// Generate a general certificate with the given ID.
pub fn general_certificate(id: u64) -> impl Strategy<Value = GeneralCertificate> {
    (
        certificate_type(),
        request_content_type(),
        content(),
        ".{0,32}",
        address(),
    )
        .prop_map(move |(ty, content_type, content, desc, certifier)| {
            GeneralCertificate::new(
                id,
                ty,
                RequestContent::new(content_type, content),
                desc,
                certifier,
            )
        })
}

/// Parameters for generating a consistent genesis state.
///
/// Certificates get distinct IDs from `1..=n` and certify distinct content;
/// the counter starts past the highest ID.
#[derive(Debug, Clone)]
pub struct GenesisParams {
    pub certifiers: Vec<Certifier>,
    pub validators: Vec<Validator>,
    pub platforms: Vec<Platform>,
    pub libraries: Vec<Library>,
    pub certificates: Vec<GeneralCertificate>,
    pub spare_ids: u64,
}

impl Arbitrary for GenesisParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::vec(certifier(), 0..4),
            prop::collection::vec(validator(), 0..4),
            prop::collection::vec(platform(), 0..3),
            prop::collection::vec(library(), 0..3),
            0usize..6,
            0u64..100,
        )
            .prop_flat_map(
                |(certifiers, validators, platforms, libraries, count, spare_ids)| {
                    let certificates = (1..=count as u64)
                        .map(general_certificate)
                        .collect::<Vec<_>>();
                    (
                        Just(certifiers),
                        Just(validators),
                        Just(platforms),
                        Just(libraries),
                        certificates,
                        Just(spare_ids),
                    )
                },
            )
            .prop_map(
                |(certifiers, validators, platforms, libraries, certificates, spare_ids)| {
                    let mut contents = HashSet::new();
                    let certificates = certificates
                        .into_iter()
                        .filter(|certificate| contents.insert(certificate.content_key()))
                        .collect();
                    GenesisParams {
                        certifiers,
                        validators,
                        platforms,
                        libraries,
                        certificates,
                        spare_ids,
                    }
                },
            )
            .boxed()
    }
}

/// Build the genesis state described by `params`.
pub fn genesis_from_params(params: &GenesisParams) -> Result<GenesisState, CodecError> {
    let max_id = params
        .certificates
        .iter()
        .map(|certificate| certificate.id())
        .max()
        .unwrap_or(0);
    let mut genesis = GenesisState::new(max_id + 1 + params.spare_ids);
    genesis.certifiers = params.certifiers.clone();
    genesis.validators = params.validators.clone();
    genesis.platforms = params.platforms.clone();
    genesis.libraries = params.libraries.clone();
    genesis.certificates = params
        .certificates
        .iter()
        .map(|certificate| Any::pack(certificate))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(genesis)
}
