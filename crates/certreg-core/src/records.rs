//! Fixed-schema registry records.
//!
//! These are stored length-prefixed under the keys in [`crate::keys`].

use serde::{Deserialize, Serialize};

use crate::types::{Address, PubKey};

/// A member of the certifying council.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certifier {
    pub address: Address,
    /// Secondary lookup name; empty when the certifier has no alias.
    pub alias: String,
    pub proposer: Address,
    pub description: String,
}

impl Certifier {
    pub fn new(
        address: Address,
        alias: impl Into<String>,
        proposer: Address,
        description: impl Into<String>,
    ) -> Self {
        Self {
            address,
            alias: alias.into(),
            proposer,
            description: description.into(),
        }
    }

    pub fn has_alias(&self) -> bool {
        !self.alias.is_empty()
    }
}

/// Attests that a validator node is certified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub pubkey: PubKey,
    pub certifier: Address,
}

impl Validator {
    pub fn new(pubkey: PubKey, certifier: Address) -> Self {
        Self { pubkey, certifier }
    }
}

/// Attests the host platform of a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub validator_pubkey: PubKey,
    pub description: String,
}

impl Platform {
    pub fn new(validator_pubkey: PubKey, description: impl Into<String>) -> Self {
        Self {
            validator_pubkey,
            description: description.into(),
        }
    }
}

/// An address granted certificate-issuing trust.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub address: Address,
    pub publisher: Address,
}

impl Library {
    pub fn new(address: Address, publisher: Address) -> Self {
        Self { address, publisher }
    }
}
