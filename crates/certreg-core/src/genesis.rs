//! Genesis state of the cert module.
//!
//! Genesis is exchanged as JSON. Validation runs before any state is
//! committed; failures are returned to the caller, which decides whether to
//! abort startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::certificate::Certificate;
use crate::codec::Any;
use crate::error::{CodecError, GenesisError};
use crate::records::{Certifier, Library, Platform, Validator};
use crate::registry::CertificateRegistry;

/// Name under which the module's genesis is nested in the app state.
pub const MODULE_NAME: &str = "cert";

/// The first certificate ID handed out by a fresh chain.
pub const DEFAULT_NEXT_CERTIFICATE_ID: u64 = 1;

/// Everything the module needs to (re)build its store.
///
/// Missing fields decode to their zero value, so a blob without
/// `next_certificate_id` fails [`GenesisState::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    #[serde(default)]
    pub certifiers: Vec<Certifier>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Certificates as type-URL envelopes; see [`GenesisState::unpack_interfaces`].
    #[serde(default)]
    pub certificates: Vec<Any>,
    #[serde(default)]
    pub libraries: Vec<Library>,
    #[serde(default)]
    pub next_certificate_id: u64,
    #[serde(default)]
    pub validators: Vec<Validator>,
}

impl GenesisState {
    /// An otherwise empty genesis starting issuance at `next_certificate_id`.
    pub fn new(next_certificate_id: u64) -> Self {
        Self {
            certifiers: Vec::new(),
            platforms: Vec::new(),
            certificates: Vec::new(),
            libraries: Vec::new(),
            next_certificate_id,
            validators: Vec::new(),
        }
    }

    /// Check the invariants of an already parsed genesis.
    pub fn validate(&self) -> Result<(), GenesisError> {
        if self.next_certificate_id < 1 {
            return Err(GenesisError::InvalidNextCertificateId(
                self.next_certificate_id,
            ));
        }
        Ok(())
    }

    /// Resolve every certificate envelope through `registry`.
    ///
    /// Validator and platform keys are resolved while deserializing, so only
    /// certificates remain to be unpacked here.
    pub fn unpack_interfaces(
        &self,
        registry: &CertificateRegistry,
    ) -> Result<Vec<Box<dyn Certificate>>, CodecError> {
        self.certificates
            .iter()
            .map(|any| registry.resolve(any))
            .collect()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, GenesisError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse from JSON without validating.
    pub fn from_json(bytes: &[u8]) -> Result<Self, GenesisError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl Default for GenesisState {
    fn default() -> Self {
        Self::new(DEFAULT_NEXT_CERTIFICATE_ID)
    }
}

/// Parse and validate a raw genesis blob.
pub fn validate_genesis(bytes: &[u8]) -> Result<(), GenesisError> {
    GenesisState::from_json(bytes)?.validate()
}

/// Extract this module's genesis from the application's genesis map.
///
/// Returns `None` when the app state has no entry for the module.
pub fn genesis_state_from_app_state(
    app_state: &BTreeMap<String, serde_json::Value>,
) -> Result<Option<GenesisState>, GenesisError> {
    app_state
        .get(MODULE_NAME)
        .map(|raw| serde_json::from_value(raw.clone()).map_err(GenesisError::from))
        .transpose()
}
