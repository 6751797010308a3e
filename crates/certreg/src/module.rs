//! The cert module: genesis lifecycle and simulation hooks over a store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use certreg_core::{
    genesis_state_from_app_state, CborCodec, CertificateRegistry, GenesisState, MODULE_NAME,
};
use certreg_sim::{diff_stores, DiffConfig, StoreDecoder, StoreDiff};
use certreg_store::{CertStore, KvStore};

use crate::error::{ModuleError, Result};

/// Configuration for the module.
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    /// Run [`CertModule::validate_genesis`] before importing genesis.
    pub validate_genesis_on_init: bool,
    /// Snapshot comparison configuration.
    pub diff: DiffConfig,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            validate_genesis_on_init: true,
            diff: DiffConfig::default(),
        }
    }
}

/// The certification registry module.
///
/// Owns the module's store partition and the certificate registry used to
/// resolve certificate kinds in genesis, in storage, and in simulation
/// decoding.
pub struct CertModule<S: KvStore> {
    store: CertStore<S>,
    registry: Arc<CertificateRegistry>,
    config: ModuleConfig,
}

impl<S: KvStore> CertModule<S> {
    /// Create a module resolving the built-in certificate kinds.
    pub fn new(store: S, config: ModuleConfig) -> Self {
        Self::with_registry(
            store,
            Arc::new(CertificateRegistry::with_builtin_kinds()),
            config,
        )
    }

    /// Create a module with a caller-built registry.
    ///
    /// The registry must be complete: it is shared and never mutated again.
    pub fn with_registry(
        store: S,
        registry: Arc<CertificateRegistry>,
        config: ModuleConfig,
    ) -> Self {
        let codec = CborCodec::new(Arc::clone(&registry));
        Self {
            store: CertStore::new(store, codec),
            registry,
            config,
        }
    }

    /// Module name, the key of its entry in the app genesis.
    pub fn name(&self) -> &'static str {
        MODULE_NAME
    }

    /// Typed access to the module's records.
    pub fn store(&self) -> &CertStore<S> {
        &self.store
    }

    pub fn registry(&self) -> &CertificateRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Genesis
    // ─────────────────────────────────────────────────────────────────────────

    /// The genesis a new chain starts from: no records, IDs start at 1.
    pub fn default_genesis() -> GenesisState {
        GenesisState::default()
    }

    /// [`CertModule::default_genesis`] as JSON.
    pub fn default_genesis_json() -> Result<Vec<u8>> {
        Ok(Self::default_genesis().to_json()?)
    }

    /// Parse and validate a raw genesis blob.
    ///
    /// Beyond the counter check, every certificate must resolve through the
    /// registry, certificate IDs and certified content must be unique, and
    /// the counter must be past every imported ID.
    pub fn validate_genesis(&self, bytes: &[u8]) -> Result<GenesisState> {
        let genesis = GenesisState::from_json(bytes)?;
        self.validate_genesis_state(&genesis)?;
        Ok(genesis)
    }

    /// Validate an already parsed genesis.
    pub fn validate_genesis_state(&self, genesis: &GenesisState) -> Result<()> {
        genesis.validate()?;

        let certificates = genesis.unpack_interfaces(&self.registry)?;
        let mut seen = HashSet::with_capacity(certificates.len());
        let mut by_content = HashMap::with_capacity(certificates.len());
        for certificate in &certificates {
            let id = certificate.id();
            if !seen.insert(id) {
                return Err(ModuleError::DuplicateCertificateId(id));
            }
            if let Some(&first) = by_content.get(&certificate.content_key()) {
                return Err(ModuleError::DuplicateCertificateContent {
                    first,
                    duplicate: id,
                });
            }
            by_content.insert(certificate.content_key(), id);
        }
        if let Some(max_id) = seen.into_iter().max() {
            if genesis.next_certificate_id <= max_id {
                return Err(ModuleError::CounterBehindCertificates {
                    next: genesis.next_certificate_id,
                    max_id,
                });
            }
        }
        Ok(())
    }

    /// Import a raw genesis blob into the store.
    pub async fn init_genesis(&self, bytes: &[u8]) -> Result<()> {
        let genesis = GenesisState::from_json(bytes)?;
        self.init_genesis_state(&genesis).await
    }

    /// Import a parsed genesis into the store.
    pub async fn init_genesis_state(&self, genesis: &GenesisState) -> Result<()> {
        if self.config.validate_genesis_on_init {
            self.validate_genesis_state(genesis)?;
        }
        self.store.init_genesis(genesis, &self.registry).await?;
        tracing::info!(
            module = MODULE_NAME,
            next_certificate_id = genesis.next_certificate_id,
            "initialized genesis"
        );
        Ok(())
    }

    /// Import this module's entry of the app genesis.
    ///
    /// An app genesis without a `cert` entry imports the default genesis.
    pub async fn init_genesis_from_app_state(
        &self,
        app_state: &BTreeMap<String, serde_json::Value>,
    ) -> Result<()> {
        let genesis = match genesis_state_from_app_state(app_state)? {
            Some(genesis) => genesis,
            None => {
                tracing::debug!(module = MODULE_NAME, "no genesis entry, using default");
                Self::default_genesis()
            }
        };
        self.init_genesis_state(&genesis).await
    }

    /// Read the store back into a genesis state.
    pub async fn export_genesis(&self) -> Result<GenesisState> {
        Ok(self.store.export_genesis().await?)
    }

    /// [`CertModule::export_genesis`] as JSON.
    pub async fn export_genesis_json(&self) -> Result<Vec<u8>> {
        Ok(self.export_genesis().await?.to_json()?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Simulation
    // ─────────────────────────────────────────────────────────────────────────

    /// A decoder for this module's store entries.
    pub fn store_decoder(&self) -> StoreDecoder {
        StoreDecoder::new(self.store.codec().clone())
    }

    /// Compare this module's store with another store of the same schema.
    pub async fn diff_against<O: KvStore>(&self, other: &O) -> Result<StoreDiff> {
        let diff = diff_stores(
            &self.store_decoder(),
            self.store.store(),
            other,
            &self.config.diff,
        )
        .await?;
        Ok(diff)
    }
}
