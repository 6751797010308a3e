//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use certreg::store::MemoryStore;
use certreg::{
    Address, CertModule, CertificateType, Certifier, GeneralCertificate, ModuleConfig, PubKey,
    RequestContent, RequestContentType, Validator,
};
use ed25519_dalek::SigningKey;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A module over a memory store, plus a certifier identity and a
/// validator key.
pub struct TestFixture {
    pub module: CertModule<MemoryStore>,
    pub certifier: Address,
    pub validator_key: SigningKey,
}

impl TestFixture {
    /// Create a new fixture with random identities.
    pub fn new() -> Self {
        Self::with_seed(rand::thread_rng().gen())
    }

    /// Create with deterministic identities from a seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_config(seed, ModuleConfig::default())
    }

    pub fn with_config(seed: [u8; 32], config: ModuleConfig) -> Self {
        let mut rng = StdRng::from_seed(seed);
        let certifier = Address::from_bytes(rng.gen());
        let validator_key = SigningKey::generate(&mut rng);
        Self {
            module: CertModule::new(MemoryStore::new(), config),
            certifier,
            validator_key,
        }
    }

    /// The fixture validator's public key.
    pub fn validator_pubkey(&self) -> PubKey {
        PubKey::Ed25519(self.validator_key.verifying_key().to_bytes())
    }

    /// Import the default genesis.
    pub async fn init(&self) -> certreg::Result<()> {
        let genesis = CertModule::<MemoryStore>::default_genesis_json()?;
        self.module.init_genesis(&genesis).await
    }

    /// Register the fixture certifier under `alias`.
    pub async fn register_certifier(&self, alias: &str) -> certreg::Result<Certifier> {
        let certifier = Certifier::new(self.certifier, alias, self.certifier, "fixture certifier");
        self.module.store().set_certifier(&certifier).await?;
        Ok(certifier)
    }

    /// Certify the fixture validator by the fixture certifier.
    pub async fn certify_validator(&self) -> certreg::Result<Validator> {
        let validator = Validator::new(self.validator_pubkey(), self.certifier);
        self.module.store().set_validator(&validator).await?;
        Ok(validator)
    }

    /// Issue a general certificate for `content`, reusing the ID of an
    /// earlier certificate for the same content.
    pub async fn issue_certificate(
        &self,
        certificate_type: CertificateType,
        content_type: RequestContentType,
        content: &str,
    ) -> certreg::Result<u64> {
        let store = self.module.store();
        if let Some(id) = store
            .certificate_id_by_content(certificate_type, content_type, content)
            .await?
        {
            return Ok(id);
        }

        let id = store.allocate_certificate_id().await?;
        let certificate = GeneralCertificate::new(
            id,
            certificate_type,
            RequestContent::new(content_type, content),
            "",
            self.certifier,
        );
        store.set_certificate(&certificate).await?;
        Ok(id)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures with distinct deterministic identities.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_dedups_content() {
        let fixture = TestFixture::with_seed([7; 32]);
        fixture.init().await.unwrap();

        let first = fixture
            .issue_certificate(
                CertificateType::Auditing,
                RequestContentType::SourceCodeHash,
                "0xabc123",
            )
            .await
            .unwrap();
        let again = fixture
            .issue_certificate(
                CertificateType::Auditing,
                RequestContentType::SourceCodeHash,
                "0xabc123",
            )
            .await
            .unwrap();
        let other = fixture
            .issue_certificate(
                CertificateType::Proof,
                RequestContentType::SourceCodeHash,
                "0xabc123",
            )
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(again, 1);
        assert_eq!(other, 2);
    }

    #[tokio::test]
    async fn test_issue_requires_genesis() {
        let fixture = TestFixture::new();
        let result = fixture
            .issue_certificate(CertificateType::General, RequestContentType::General, "x")
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_seeded_fixtures_are_deterministic() {
        let a = TestFixture::with_seed([1; 32]);
        let b = TestFixture::with_seed([1; 32]);
        assert_eq!(a.certifier, b.certifier);
        assert_eq!(a.validator_pubkey(), b.validator_pubkey());
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);
        let keys: Vec<_> = parties.iter().map(|p| p.validator_pubkey()).collect();
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert_ne!(keys[0], keys[2]);
    }
}
