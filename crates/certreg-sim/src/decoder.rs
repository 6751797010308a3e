//! Store diff decoder.
//!
//! Given two raw entries that share a store key, decodes both values as
//! the record kind named by the key's prefix byte and renders them one per
//! line. Only the first pair's key selects the decode path; the caller
//! guarantees both keys agree.
//!
//! Every failure is returned. An undecodable value in a simulation run is
//! itself a bug, so nothing here falls back to raw bytes.

use std::fmt::Debug;

use certreg_core::{
    decode_id, decode_id_list, CborCodec, Certifier, Codec, KeyPrefix, KvPair, Library, Platform,
    Validator,
};
use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Renders pairs of raw store entries as readable text.
#[derive(Debug, Clone, Default)]
pub struct StoreDecoder<C = CborCodec> {
    codec: C,
}

impl<C: Codec> StoreDecoder<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Decode both values and return `"{a}\n{b}"`.
    pub fn decode_pair(&self, kv_a: &KvPair, kv_b: &KvPair) -> Result<String, DecodeError> {
        let prefix = KeyPrefix::of_key(&kv_a.key)?;
        let a = self.render_value(prefix, &kv_a.value)?;
        let b = self.render_value(prefix, &kv_b.value)?;
        Ok(format!("{a}\n{b}"))
    }

    /// Decode a single value as the record kind `prefix` names.
    pub fn render_value(&self, prefix: KeyPrefix, value: &[u8]) -> Result<String, DecodeError> {
        match prefix {
            // Alias entries hold a full copy of the certifier.
            KeyPrefix::Certifier | KeyPrefix::CertifierAlias => {
                self.render_record::<Certifier>(prefix, value)
            }
            KeyPrefix::Validator => self.render_record::<Validator>(prefix, value),
            KeyPrefix::Platform => self.render_record::<Platform>(prefix, value),
            KeyPrefix::Library => self.render_record::<Library>(prefix, value),
            KeyPrefix::Certificate => {
                let certificate = self
                    .codec
                    .unmarshal_interface(value)
                    .map_err(|source| DecodeError::Codec { prefix, source })?;
                Ok(format!("{certificate:?}"))
            }
            KeyPrefix::NextCertificateId | KeyPrefix::ContentCertId => {
                Ok(decode_id(value)?.to_string())
            }
            KeyPrefix::CertifierCertIds => Ok(format!("{:?}", decode_id_list(value)?)),
        }
    }

    fn render_record<T>(&self, prefix: KeyPrefix, value: &[u8]) -> Result<String, DecodeError>
    where
        T: DeserializeOwned + Debug,
    {
        let record: T = self
            .codec
            .unmarshal_length_prefixed(value)
            .map_err(|source| DecodeError::Codec { prefix, source })?;
        Ok(format!("{record:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certreg_core::{
        certificate_key, certifier_alias_key, certifier_cert_ids_key, certifier_key,
        content_cert_id_key, encode_id, encode_id_list, next_certificate_id_key, validator_key,
        Address, Any, CertificateType, CodecError, GeneralCertificate, KeyError, PubKey,
        RequestContent, RequestContentType,
    };

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn decoder() -> StoreDecoder {
        StoreDecoder::default()
    }

    fn certifier_value(alias: &str) -> Vec<u8> {
        let certifier = Certifier::new(addr(1), alias, addr(2), "council");
        CborCodec::default()
            .marshal_length_prefixed(&certifier)
            .unwrap()
    }

    #[test]
    fn test_identical_pairs_render_identical_lines() {
        let pair = KvPair::new(certifier_key(&addr(1)), certifier_value("alice"));
        let out = decoder().decode_pair(&pair, &pair).unwrap();

        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], lines[1]);
        assert!(lines[0].contains("alice"));
    }

    #[test]
    fn test_alias_value_decodes_as_certifier() {
        let a = KvPair::new(certifier_alias_key("alice"), certifier_value("alice"));
        let b = KvPair::new(certifier_alias_key("alice"), certifier_value("alicia"));
        let out = decoder().decode_pair(&a, &b).unwrap();
        assert!(out.starts_with("Certifier {"));
        assert!(out.contains("alicia"));
    }

    #[test]
    fn test_unknown_prefix_is_fatal() {
        let pair = KvPair::new(vec![0xFFu8, 0x01], vec![0u8; 8]);
        assert_eq!(
            decoder().decode_pair(&pair, &pair),
            Err(DecodeError::UnknownPrefix(0xFF))
        );

        // Reserved bytes are not assigned either.
        let reserved = KvPair::new(vec![0x03u8], Vec::<u8>::new());
        assert_eq!(
            decoder().decode_pair(&reserved, &reserved),
            Err(DecodeError::UnknownPrefix(0x03))
        );
    }

    #[test]
    fn test_key_schema_prefix_error_has_one_shape() {
        let from_key_schema = KeyPrefix::of_key(&[0x04]).map_err(DecodeError::from);
        assert_eq!(from_key_schema, Err(DecodeError::UnknownPrefix(0x04)));

        let pair = KvPair::new(vec![0x04u8], Vec::<u8>::new());
        assert_eq!(
            decoder().decode_pair(&pair, &pair),
            Err(DecodeError::UnknownPrefix(0x04))
        );
    }

    #[test]
    fn test_certificate_with_trailing_garbage_is_fatal() {
        let certificate = GeneralCertificate::new(
            5,
            CertificateType::Proof,
            RequestContent::new(RequestContentType::Address, "certik1qqq"),
            "",
            addr(1),
        );
        let mut value = CborCodec::default().marshal_interface(&certificate).unwrap();
        value.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let pair = KvPair::new(certificate_key(5), value);

        assert_eq!(
            decoder().decode_pair(&pair, &pair),
            Err(DecodeError::Codec {
                prefix: KeyPrefix::Certificate,
                source: CodecError::Decoding("trailing bytes".into()),
            })
        );
    }

    #[test]
    fn test_certifier_body_with_trailing_garbage_is_fatal() {
        let certifier = Certifier::new(addr(1), "a", addr(2), "");
        let mut body = certreg_core::codec::to_cbor(&certifier).unwrap();
        body.extend_from_slice(&[0xff, 0xff]);
        let mut value = Vec::new();
        let mut len = body.len();
        while len >= 0x80 {
            value.push((len as u8) | 0x80);
            len >>= 7;
        }
        value.push(len as u8);
        value.extend_from_slice(&body);
        let pair = KvPair::new(certifier_key(&addr(1)), value);

        assert_eq!(
            decoder().decode_pair(&pair, &pair),
            Err(DecodeError::Codec {
                prefix: KeyPrefix::Certifier,
                source: CodecError::Decoding("trailing bytes".into()),
            })
        );
    }

    #[test]
    fn test_empty_key_is_fatal() {
        let pair = KvPair::new(Vec::<u8>::new(), Vec::<u8>::new());
        assert_eq!(
            decoder().decode_pair(&pair, &pair),
            Err(DecodeError::Key(KeyError::EmptyKey))
        );
    }

    #[test]
    fn test_counter_and_content_ids() {
        let a = KvPair::new(next_certificate_id_key(), encode_id(1).to_vec());
        let b = KvPair::new(next_certificate_id_key(), encode_id(9).to_vec());
        assert_eq!(decoder().decode_pair(&a, &b).unwrap(), "1\n9");

        let key = content_cert_id_key(
            CertificateType::Auditing,
            RequestContentType::SourceCodeHash,
            "0xabc123",
        );
        let a = KvPair::new(key.clone(), encode_id(4).to_vec());
        let b = KvPair::new(key, Vec::<u8>::new());
        assert_eq!(decoder().decode_pair(&a, &b).unwrap(), "4\n0");
    }

    #[test]
    fn test_certifier_id_list() {
        let key = certifier_cert_ids_key(&addr(1));
        let a = KvPair::new(key.clone(), encode_id_list(&[3, 7, 42]));
        let b = KvPair::new(key, encode_id_list(&[3, 7]));
        assert_eq!(decoder().decode_pair(&a, &b).unwrap(), "[3, 7, 42]\n[3, 7]");
    }

    #[test]
    fn test_truncated_id_list_is_fatal() {
        let key = certifier_cert_ids_key(&addr(1));
        let pair = KvPair::new(key, vec![0u8; 12]);
        assert_eq!(
            decoder().decode_pair(&pair, &pair),
            Err(DecodeError::Key(KeyError::InvalidIdListLength(12)))
        );
    }

    #[test]
    fn test_certificate_decodes_through_registry() {
        let codec = CborCodec::default();
        let certificate = GeneralCertificate::new(
            5,
            CertificateType::Proof,
            RequestContent::new(RequestContentType::Address, "certik1qqq"),
            "",
            addr(1),
        );
        let value = codec.marshal_interface(&certificate).unwrap();
        let pair = KvPair::new(certificate_key(5), value);

        let out = decoder().decode_pair(&pair, &pair).unwrap();
        assert!(out.starts_with("GeneralCertificate {"));
    }

    #[test]
    fn test_unregistered_certificate_kind_is_fatal() {
        let envelope = Any::new("/certreg.cert.v1.Unknown", vec![1, 2, 3]);
        let value = certreg_core::codec::to_cbor(&envelope).unwrap();
        let pair = KvPair::new(certificate_key(1), value);

        let err = decoder().decode_pair(&pair, &pair).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Codec {
                prefix: KeyPrefix::Certificate,
                source: CodecError::UnregisteredType("/certreg.cert.v1.Unknown".into()),
            }
        );
    }

    #[test]
    fn test_second_value_failure_is_fatal() {
        let key = validator_key(&PubKey::Ed25519([7; 32]));
        let good = CborCodec::default()
            .marshal_length_prefixed(&Validator::new(PubKey::Ed25519([7; 32]), addr(1)))
            .unwrap();
        let a = KvPair::new(key.clone(), good);
        let b = KvPair::new(key, vec![0x05u8, 0x00]);

        assert!(matches!(
            decoder().decode_pair(&a, &b),
            Err(DecodeError::Codec {
                prefix: KeyPrefix::Validator,
                ..
            })
        ));
    }

    #[test]
    fn test_only_first_key_selects_path() {
        let a = KvPair::new(next_certificate_id_key(), encode_id(2).to_vec());
        let b = KvPair::new(vec![0xFFu8], encode_id(3).to_vec());
        assert_eq!(decoder().decode_pair(&a, &b).unwrap(), "2\n3");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn identical_id_lists_render_identically(ids in proptest::collection::vec(any::<u64>(), 0..16)) {
                let pair = KvPair::new(certifier_cert_ids_key(&addr(1)), encode_id_list(&ids));
                let out = decoder().decode_pair(&pair, &pair).unwrap();
                let expected = format!("{ids:?}");
                prop_assert_eq!(out, format!("{expected}\n{expected}"));
            }

            #[test]
            fn unassigned_prefixes_never_render(byte in any::<u8>(), value in proptest::collection::vec(any::<u8>(), 0..16)) {
                prop_assume!(KeyPrefix::from_byte(byte).is_none());
                let pair = KvPair::new(vec![byte], value);
                prop_assert_eq!(
                    decoder().decode_pair(&pair, &pair),
                    Err(DecodeError::UnknownPrefix(byte))
                );
            }
        }
    }
}
