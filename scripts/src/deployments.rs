//! The `deployments.json` record of the contract addresses on each network
//!
//! ```json
//! {
//!     "ropsten": {
//!         "token_contract": "0x...",
//!         "controller_contract": "0x..."
//!     }
//! }
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use alloy::primitives::Address;

use crate::errors::ScriptError;

/// The recorded contract addresses, keyed by network and then by contract key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deployments {
    /// The addresses per network
    networks: BTreeMap<String, BTreeMap<String, Address>>,
}

impl Deployments {
    /// Reads the deployments file, treating a missing file as an empty record
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        let networks = serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ReadDeployments(format!("{}: {}", path.display(), e)))?;

        Ok(Self { networks })
    }

    /// Writes the record to the deployments file
    pub fn save(&self, path: &Path) -> Result<(), ScriptError> {
        let contents = serde_json::to_string_pretty(&self.networks)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;

        fs::write(path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }

    /// The address recorded for `contract_key` on `network`
    pub fn get(&self, network: &str, contract_key: &str) -> Option<Address> {
        self.networks.get(network)?.get(contract_key).copied()
    }

    /// Records `address` for `contract_key` on `network`, replacing any previous entry
    pub fn insert(&mut self, network: &str, contract_key: &str, address: Address) {
        self.networks
            .entry(network.to_string())
            .or_default()
            .insert(contract_key.to_string(), address);
    }
}
