//! Golden key vectors.
//!
//! Store keys and packed ID lists are persisted state, so their bytes must
//! never drift. Each vector pins the exact bytes produced for a fixed input.

use certreg_core::{
    certificate_key, certifier_alias_key, certifier_cert_ids_key, certifier_key,
    content_cert_id_key, encode_id_list, library_key, next_certificate_id_key, platform_key,
    validator_key, Address, CertificateType, PubKey, RequestContentType,
};

/// A golden key vector.
#[derive(Debug, Clone)]
pub struct KeyVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Builds the bytes under test.
    pub build: fn() -> Vec<u8>,
    /// Expected bytes (hex).
    pub expected: &'static str,
}

const ADDR: Address = Address::from_bytes([0x11; 20]);

/// Get all golden key vectors.
pub fn all_vectors() -> Vec<KeyVector> {
    vec![
        KeyVector {
            name: "certifier key",
            build: || certifier_key(&ADDR),
            expected: "001111111111111111111111111111111111111111",
        },
        KeyVector {
            name: "validator key",
            build: || validator_key(&PubKey::Ed25519([0xAB; 32])),
            expected: "01abababababababababababababababababababababababababababababababab",
        },
        KeyVector {
            name: "platform key",
            build: || platform_key(&PubKey::Ed25519([0xAB; 32])),
            expected: "02abababababababababababababababababababababababababababababababab",
        },
        KeyVector {
            name: "certificate key",
            build: || certificate_key(1),
            expected: "050100000000000000",
        },
        KeyVector {
            name: "library key",
            build: || library_key(&ADDR),
            expected: "061111111111111111111111111111111111111111",
        },
        KeyVector {
            name: "certifier alias key",
            build: || certifier_alias_key("alice"),
            expected: "07616c696365",
        },
        KeyVector {
            name: "next certificate id key",
            build: next_certificate_id_key,
            expected: "08",
        },
        KeyVector {
            name: "certifier certificate ids key",
            build: || certifier_cert_ids_key(&ADDR),
            expected: "091111111111111111111111111111111111111111",
        },
        KeyVector {
            name: "content key: auditing source code hash",
            build: || {
                content_cert_id_key(
                    CertificateType::Auditing,
                    RequestContentType::SourceCodeHash,
                    "0xabc123",
                )
            },
            expected: "0a02a685faeffe79e2a1c717a1ba085708f3af4d638eae1e80669b477e8d",
        },
        KeyVector {
            name: "content key: general content",
            build: || {
                content_cert_id_key(
                    CertificateType::General,
                    RequestContentType::General,
                    "hello",
                )
            },
            expected: "0a07556259f1105ce9c2888111b3504e068129a1e138b170f0c747980df7",
        },
        KeyVector {
            name: "content key: proof of address",
            build: || {
                content_cert_id_key(
                    CertificateType::Proof,
                    RequestContentType::Address,
                    "certik1qqq",
                )
            },
            expected: "0a03c341c657d00607714eb0b313e37cc7336ce003a4a13486cd85f2b08c",
        },
        KeyVector {
            name: "content key: empty bytecode hash",
            build: || {
                content_cert_id_key(
                    CertificateType::Compilation,
                    RequestContentType::BytecodeHash,
                    "",
                )
            },
            expected: "0a0115ebd4b8fdfc6905ea002a3efcc8faa71954739ee62bbbf16836eb5c",
        },
        KeyVector {
            name: "packed id list [3, 7, 42]",
            build: || encode_id_list(&[3, 7, 42]),
            expected: "030000000000000007000000000000002a00000000000000",
        },
    ]
}

/// Check every vector; returns `(name, matches, actual hex)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let actual = hex::encode((v.build)());
            (v.name.to_string(), actual == v.expected, actual)
        })
        .collect()
}
