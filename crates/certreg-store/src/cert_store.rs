//! Typed access to the registry's records on top of a [`KvStore`].
//!
//! Every read and write goes through the key schema in
//! [`certreg_core::keys`] and the [`Codec`]. Authorization of mutations is
//! the caller's business; this layer only keeps the indexes consistent:
//!
//! - a certifier with an alias is also stored under its alias key
//! - a certificate is indexed by certifier and by content hash

use certreg_core::{
    certificate_key, certifier_alias_key, certifier_cert_ids_key, certifier_key,
    content_cert_id_key, decode_id, decode_id_list, encode_id, encode_id_list, library_key,
    next_certificate_id_key, platform_key, validator_key, Address, Any, CborCodec, Certificate,
    CertificateRegistry, CertificateType, Certifier, Codec, GenesisState, KeyPrefix, Library,
    Platform, PubKey, RequestContentType, Validator,
};

use crate::error::{Result, StoreError};
use crate::traits::KvStore;

/// Typed record store.
pub struct CertStore<S, C = CborCodec> {
    store: S,
    codec: C,
}

impl<S: KvStore, C: Codec> CertStore<S, C> {
    /// Wrap a raw store.
    pub fn new(store: S, codec: C) -> Self {
        Self { store, codec }
    }

    /// The underlying raw store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Certifiers
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a certifier, and its alias entry if it has one.
    ///
    /// Re-storing a certifier under a new alias drops its old alias entry.
    pub async fn set_certifier(&self, certifier: &Certifier) -> Result<()> {
        if let Some(previous) = self.get_certifier(&certifier.address).await? {
            if previous.has_alias() && previous.alias != certifier.alias {
                self.release_alias(&previous).await?;
            }
        }

        let value = self.codec.marshal_length_prefixed(certifier)?;
        self.store
            .set(&certifier_key(&certifier.address), &value)
            .await?;
        if certifier.has_alias() {
            self.store
                .set(&certifier_alias_key(&certifier.alias), &value)
                .await?;
        }
        Ok(())
    }

    pub async fn get_certifier(&self, address: &Address) -> Result<Option<Certifier>> {
        self.get_record(&certifier_key(address)).await
    }

    /// Look up a certifier by its alias.
    pub async fn get_certifier_by_alias(&self, alias: &str) -> Result<Option<Certifier>> {
        self.get_record(&certifier_alias_key(alias)).await
    }

    pub async fn is_certifier(&self, address: &Address) -> Result<bool> {
        self.store.has(&certifier_key(address)).await
    }

    /// Remove a certifier and its alias entry.
    pub async fn delete_certifier(&self, address: &Address) -> Result<()> {
        if let Some(certifier) = self.get_certifier(address).await? {
            if certifier.has_alias() {
                self.release_alias(&certifier).await?;
            }
        }
        self.store.delete(&certifier_key(address)).await
    }

    pub async fn certifiers(&self) -> Result<Vec<Certifier>> {
        self.scan_records(KeyPrefix::Certifier).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validators and platforms
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn set_validator(&self, validator: &Validator) -> Result<()> {
        let value = self.codec.marshal_length_prefixed(validator)?;
        self.store
            .set(&validator_key(&validator.pubkey), &value)
            .await
    }

    pub async fn get_validator(&self, pubkey: &PubKey) -> Result<Option<Validator>> {
        self.get_record(&validator_key(pubkey)).await
    }

    pub async fn delete_validator(&self, pubkey: &PubKey) -> Result<()> {
        self.store.delete(&validator_key(pubkey)).await
    }

    pub async fn validators(&self) -> Result<Vec<Validator>> {
        self.scan_records(KeyPrefix::Validator).await
    }

    pub async fn set_platform(&self, platform: &Platform) -> Result<()> {
        let value = self.codec.marshal_length_prefixed(platform)?;
        self.store
            .set(&platform_key(&platform.validator_pubkey), &value)
            .await
    }

    pub async fn get_platform(&self, pubkey: &PubKey) -> Result<Option<Platform>> {
        self.get_record(&platform_key(pubkey)).await
    }

    pub async fn platforms(&self) -> Result<Vec<Platform>> {
        self.scan_records(KeyPrefix::Platform).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Libraries
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn set_library(&self, library: &Library) -> Result<()> {
        let value = self.codec.marshal_length_prefixed(library)?;
        self.store.set(&library_key(&library.address), &value).await
    }

    pub async fn get_library(&self, address: &Address) -> Result<Option<Library>> {
        self.get_record(&library_key(address)).await
    }

    pub async fn is_library(&self, address: &Address) -> Result<bool> {
        self.store.has(&library_key(address)).await
    }

    pub async fn delete_library(&self, address: &Address) -> Result<()> {
        self.store.delete(&library_key(address)).await
    }

    pub async fn libraries(&self) -> Result<Vec<Library>> {
        self.scan_records(KeyPrefix::Library).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Certificates
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a certificate and update the certifier and content indexes.
    ///
    /// Overwriting an ID moves its index entries to the new content and
    /// certifier.
    pub async fn set_certificate(&self, certificate: &dyn Certificate) -> Result<()> {
        let id = certificate.id();
        if let Some(previous) = self.get_certificate(id).await? {
            let previous_content = previous.content_key();
            if previous_content != certificate.content_key() {
                self.release_content_key(&previous_content, id).await?;
            }
            if previous.certifier() != certificate.certifier() {
                self.remove_from_certifier_index(previous.certifier(), id)
                    .await?;
            }
        }

        let value = self.codec.marshal_interface(certificate)?;
        self.store.set(&certificate_key(id), &value).await?;
        self.store
            .set(&certificate.content_key(), &encode_id(id))
            .await?;

        let certifier = certificate.certifier();
        let mut ids = self.certificate_ids_by_certifier(certifier).await?;
        if !ids.contains(&id) {
            ids.push(id);
            self.store
                .set(&certifier_cert_ids_key(certifier), &encode_id_list(&ids))
                .await?;
        }
        Ok(())
    }

    pub async fn get_certificate(&self, id: u64) -> Result<Option<Box<dyn Certificate>>> {
        match self.store.get(&certificate_key(id)).await? {
            Some(bytes) => Ok(Some(self.codec.unmarshal_interface(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove a certificate and its index entries.
    pub async fn delete_certificate(&self, id: u64) -> Result<()> {
        let Some(certificate) = self.get_certificate(id).await? else {
            return Ok(());
        };

        self.release_content_key(&certificate.content_key(), id)
            .await?;
        self.remove_from_certifier_index(certificate.certifier(), id)
            .await?;
        self.store.delete(&certificate_key(id)).await
    }

    /// All certificates, ordered by store key.
    pub async fn certificates(&self) -> Result<Vec<Box<dyn Certificate>>> {
        let pairs = self.store.scan_prefix(KeyPrefix::Certificate).await?;
        pairs
            .iter()
            .map(|pair| {
                self.codec
                    .unmarshal_interface(&pair.value)
                    .map_err(StoreError::from)
            })
            .collect()
    }

    /// The certificate already issued for this content, if any.
    pub async fn certificate_id_by_content(
        &self,
        certificate_type: CertificateType,
        content_type: RequestContentType,
        content: &str,
    ) -> Result<Option<u64>> {
        let key = content_cert_id_key(certificate_type, content_type, content);
        match self.store.get(&key).await? {
            Some(bytes) => Ok(Some(decode_id(&bytes)?)),
            None => Ok(None),
        }
    }

    /// IDs of every certificate issued by `certifier`, in issuance order.
    pub async fn certificate_ids_by_certifier(&self, certifier: &Address) -> Result<Vec<u64>> {
        match self.store.get(&certifier_cert_ids_key(certifier)).await? {
            Some(bytes) => Ok(decode_id_list(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Certificate ID counter
    // ─────────────────────────────────────────────────────────────────────────

    /// The ID the next issued certificate will get.
    ///
    /// The counter is written at genesis; a missing counter is an error.
    pub async fn next_certificate_id(&self) -> Result<u64> {
        let bytes = self
            .store
            .get(&next_certificate_id_key())
            .await?
            .ok_or_else(|| StoreError::NotFound("next certificate id".into()))?;
        let id = decode_id(&bytes)?;
        if id < 1 {
            return Err(StoreError::InvalidData(
                "next certificate id must be positive".into(),
            ));
        }
        Ok(id)
    }

    pub async fn set_next_certificate_id(&self, id: u64) -> Result<()> {
        if id < 1 {
            return Err(StoreError::InvalidData(
                "next certificate id must be positive".into(),
            ));
        }
        self.store
            .set(&next_certificate_id_key(), &encode_id(id))
            .await
    }

    /// Take the next certificate ID and advance the counter.
    ///
    /// Callers must serialize issuance; two concurrent callers can observe
    /// the same ID.
    pub async fn allocate_certificate_id(&self) -> Result<u64> {
        let id = self.next_certificate_id().await?;
        let next = id
            .checked_add(1)
            .ok_or_else(|| StoreError::InvalidData("certificate id space exhausted".into()))?;
        self.set_next_certificate_id(next).await?;
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Genesis
    // ─────────────────────────────────────────────────────────────────────────

    /// Write a validated genesis state into the store.
    pub async fn init_genesis(
        &self,
        genesis: &GenesisState,
        registry: &CertificateRegistry,
    ) -> Result<()> {
        genesis.validate()?;
        let certificates = genesis.unpack_interfaces(registry)?;

        for certifier in &genesis.certifiers {
            self.set_certifier(certifier).await?;
        }
        for validator in &genesis.validators {
            self.set_validator(validator).await?;
        }
        for platform in &genesis.platforms {
            self.set_platform(platform).await?;
        }
        for library in &genesis.libraries {
            self.set_library(library).await?;
        }
        for certificate in &certificates {
            self.set_certificate(certificate.as_ref()).await?;
        }
        self.set_next_certificate_id(genesis.next_certificate_id)
            .await?;

        tracing::debug!(
            certifiers = genesis.certifiers.len(),
            validators = genesis.validators.len(),
            platforms = genesis.platforms.len(),
            libraries = genesis.libraries.len(),
            certificates = certificates.len(),
            next_certificate_id = genesis.next_certificate_id,
            "imported cert genesis"
        );
        Ok(())
    }

    /// Read the store back into a genesis state.
    pub async fn export_genesis(&self) -> Result<GenesisState> {
        let certificates = self
            .certificates()
            .await?
            .iter()
            .map(|certificate| Any::pack(certificate.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let genesis = GenesisState {
            certifiers: self.certifiers().await?,
            platforms: self.platforms().await?,
            certificates,
            libraries: self.libraries().await?,
            next_certificate_id: self.next_certificate_id().await?,
            validators: self.validators().await?,
        };

        tracing::debug!(
            certificates = genesis.certificates.len(),
            next_certificate_id = genesis.next_certificate_id,
            "exported cert genesis"
        );
        Ok(genesis)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop `certifier`'s alias entry unless another certifier now owns it.
    async fn release_alias(&self, certifier: &Certifier) -> Result<()> {
        match self.get_certifier_by_alias(&certifier.alias).await? {
            Some(owner) if owner.address == certifier.address => {
                self.store
                    .delete(&certifier_alias_key(&certifier.alias))
                    .await
            }
            _ => Ok(()),
        }
    }

    /// Drop a content index entry if it still resolves to `id`.
    async fn release_content_key(&self, key: &[u8], id: u64) -> Result<()> {
        match self.store.get(key).await? {
            Some(bytes) if decode_id(&bytes)? == id => self.store.delete(key).await,
            _ => Ok(()),
        }
    }

    async fn remove_from_certifier_index(&self, certifier: &Address, id: u64) -> Result<()> {
        let mut ids = self.certificate_ids_by_certifier(certifier).await?;
        ids.retain(|existing| *existing != id);
        let index_key = certifier_cert_ids_key(certifier);
        if ids.is_empty() {
            self.store.delete(&index_key).await
        } else {
            self.store.set(&index_key, &encode_id_list(&ids)).await
        }
    }

    async fn get_record<T>(&self, key: &[u8]) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.store.get(key).await? {
            Some(bytes) => Ok(Some(self.codec.unmarshal_length_prefixed(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn scan_records<T>(&self, prefix: KeyPrefix) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let pairs = self.store.scan_prefix(prefix).await?;
        pairs
            .iter()
            .map(|pair| {
                self.codec
                    .unmarshal_length_prefixed(&pair.value)
                    .map_err(StoreError::from)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use certreg_core::{
        CompilationCertificate, CompilationContent, GeneralCertificate, RequestContent,
    };

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn cert_store() -> CertStore<MemoryStore> {
        CertStore::new(MemoryStore::new(), CborCodec::default())
    }

    fn general(id: u64, certifier: Address, content: &str) -> GeneralCertificate {
        GeneralCertificate::new(
            id,
            CertificateType::Auditing,
            RequestContent::new(RequestContentType::SourceCodeHash, content),
            "audit",
            certifier,
        )
    }

    #[tokio::test]
    async fn test_certifier_alias_index() {
        let store = cert_store();
        let certifier = Certifier::new(addr(1), "alice", addr(9), "council member");
        store.set_certifier(&certifier).await.unwrap();

        assert_eq!(store.get_certifier(&addr(1)).await.unwrap(), Some(certifier.clone()));
        assert_eq!(
            store.get_certifier_by_alias("alice").await.unwrap(),
            Some(certifier)
        );
        assert!(store.is_certifier(&addr(1)).await.unwrap());

        store.delete_certifier(&addr(1)).await.unwrap();
        assert!(store.get_certifier_by_alias("alice").await.unwrap().is_none());
        assert!(store.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_alias_change_drops_old_alias() {
        let store = cert_store();
        store
            .set_certifier(&Certifier::new(addr(1), "alice", addr(9), ""))
            .await
            .unwrap();
        let renamed = Certifier::new(addr(1), "bob", addr(9), "");
        store.set_certifier(&renamed).await.unwrap();

        assert!(store.get_certifier_by_alias("alice").await.unwrap().is_none());
        assert_eq!(
            store.get_certifier_by_alias("bob").await.unwrap(),
            Some(renamed)
        );

        store.delete_certifier(&addr(1)).await.unwrap();
        assert!(store.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_delete_keeps_alias_taken_over_by_another_certifier() {
        let store = cert_store();
        store
            .set_certifier(&Certifier::new(addr(1), "alice", addr(9), ""))
            .await
            .unwrap();
        let successor = Certifier::new(addr(2), "alice", addr(9), "");
        store.set_certifier(&successor).await.unwrap();

        store.delete_certifier(&addr(1)).await.unwrap();
        assert_eq!(
            store.get_certifier_by_alias("alice").await.unwrap(),
            Some(successor)
        );
    }

    #[tokio::test]
    async fn test_certifier_without_alias_writes_one_key() {
        let store = cert_store();
        store
            .set_certifier(&Certifier::new(addr(2), "", addr(9), ""))
            .await
            .unwrap();
        assert_eq!(store.store().len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_certificate_indexes() {
        let store = cert_store();
        store.set_certificate(&general(1, addr(1), "0xaa")).await.unwrap();
        store.set_certificate(&general(2, addr(1), "0xbb")).await.unwrap();
        store.set_certificate(&general(3, addr(2), "0xcc")).await.unwrap();

        assert_eq!(
            store.certificate_ids_by_certifier(&addr(1)).await.unwrap(),
            vec![1, 2]
        );
        assert_eq!(
            store
                .certificate_id_by_content(
                    CertificateType::Auditing,
                    RequestContentType::SourceCodeHash,
                    "0xbb"
                )
                .await
                .unwrap(),
            Some(2)
        );
        assert_eq!(
            store
                .certificate_id_by_content(
                    CertificateType::Proof,
                    RequestContentType::SourceCodeHash,
                    "0xbb"
                )
                .await
                .unwrap(),
            None
        );

        let fetched = store.get_certificate(3).await.unwrap().unwrap();
        assert_eq!(fetched.certifier(), &addr(2));
        assert_eq!(store.certificates().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_same_content_resolves_to_one_id() {
        let store = cert_store();
        let first = general(1, addr(1), "0xsame");
        store.set_certificate(&first).await.unwrap();

        let existing = store
            .certificate_id_by_content(
                CertificateType::Auditing,
                RequestContentType::SourceCodeHash,
                "0xsame",
            )
            .await
            .unwrap();
        assert_eq!(existing, Some(1));

        // Re-storing is idempotent for the certifier index.
        store.set_certificate(&first).await.unwrap();
        assert_eq!(
            store.certificate_ids_by_certifier(&addr(1)).await.unwrap(),
            vec![1]
        );
    }

    #[tokio::test]
    async fn test_delete_certificate_cleans_indexes() {
        let store = cert_store();
        store.set_certificate(&general(1, addr(1), "0xaa")).await.unwrap();
        store.set_certificate(&general(2, addr(1), "0xbb")).await.unwrap();

        store.delete_certificate(1).await.unwrap();
        assert!(store.get_certificate(1).await.unwrap().is_none());
        assert_eq!(
            store.certificate_ids_by_certifier(&addr(1)).await.unwrap(),
            vec![2]
        );

        store.delete_certificate(2).await.unwrap();
        assert!(store.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_overwriting_certificate_moves_indexes() {
        let store = cert_store();
        store.set_certificate(&general(1, addr(1), "0xold")).await.unwrap();
        store.set_certificate(&general(2, addr(1), "0xkeep")).await.unwrap();
        store.set_certificate(&general(1, addr(2), "0xnew")).await.unwrap();

        for (content, expected) in [("0xold", None), ("0xnew", Some(1))] {
            let id = store
                .certificate_id_by_content(
                    CertificateType::Auditing,
                    RequestContentType::SourceCodeHash,
                    content,
                )
                .await
                .unwrap();
            assert_eq!(id, expected, "content {content}");
        }
        assert_eq!(
            store.certificate_ids_by_certifier(&addr(1)).await.unwrap(),
            vec![2]
        );
        assert_eq!(
            store.certificate_ids_by_certifier(&addr(2)).await.unwrap(),
            vec![1]
        );

        store.delete_certificate(1).await.unwrap();
        store.delete_certificate(2).await.unwrap();
        assert!(store.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_counter_allocation() {
        let store = cert_store();
        assert!(matches!(
            store.next_certificate_id().await,
            Err(StoreError::NotFound(_))
        ));

        store.set_next_certificate_id(1).await.unwrap();
        assert_eq!(store.allocate_certificate_id().await.unwrap(), 1);
        assert_eq!(store.allocate_certificate_id().await.unwrap(), 2);
        assert_eq!(store.next_certificate_id().await.unwrap(), 3);

        assert!(matches!(
            store.set_next_certificate_id(0).await,
            Err(StoreError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_id_list_is_an_error() {
        let store = cert_store();
        store
            .store()
            .set(&certifier_cert_ids_key(&addr(1)), &[1, 2, 3])
            .await
            .unwrap();
        assert!(matches!(
            store.certificate_ids_by_certifier(&addr(1)).await,
            Err(StoreError::Key(_))
        ));
    }

    #[tokio::test]
    async fn test_genesis_roundtrip() {
        let store = cert_store();
        let registry = CertificateRegistry::with_builtin_kinds();

        let compiled = CompilationCertificate::new(
            1,
            42,
            "0xsource",
            CompilationContent {
                compiler: "solc".into(),
                bytecode_hash: "0xbyte".into(),
            },
            "",
            addr(1),
        );

        let mut genesis = GenesisState::new(2);
        genesis
            .certifiers
            .push(Certifier::new(addr(1), "alice", addr(1), ""));
        genesis
            .validators
            .push(Validator::new(PubKey::Ed25519([3; 32]), addr(1)));
        genesis
            .platforms
            .push(Platform::new(PubKey::Ed25519([3; 32]), "bare metal"));
        genesis.libraries.push(Library::new(addr(5), addr(1)));
        genesis.certificates.push(Any::pack(&compiled).unwrap());

        store.init_genesis(&genesis, &registry).await.unwrap();
        let exported = store.export_genesis().await.unwrap();
        assert_eq!(exported, genesis);
    }

    #[tokio::test]
    async fn test_init_genesis_rejects_invalid() {
        let store = cert_store();
        let registry = CertificateRegistry::with_builtin_kinds();
        let result = store.init_genesis(&GenesisState::new(0), &registry).await;
        assert!(matches!(result, Err(StoreError::Genesis(_))));
        assert!(store.store().is_empty().unwrap());
    }
}
