//! The network table: connection parameters for every network a migration can target
//!
//! The table is either the built-in one (see [`NetworkConfig::default`]) or a TOML
//! file of the form
//!
//! ```toml
//! [networks.ropsten]
//! url = "https://ropsten.infura.io/v3/<project id>"
//! network_id = 3
//! gas = 4500000
//! gas_price = 20000000000
//! private_key_env = "ROPSTEN_PRIVATE_KEY"
//! ```
//!
//! Signing credentials are never stored in the table itself, only the names of
//! the environment variables they are read from.

use std::{
    collections::BTreeMap,
    env,
    fmt::{self, Display},
    fs,
    path::Path,
    str::FromStr,
};

use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use serde::Deserialize;

use crate::{
    constants::{
        ANY_NETWORK_ID, DEVELOPMENT_NETWORK, LOCAL_GAS_LIMIT, LOCAL_NODE_HOST, LOCAL_NODE_PORT,
        ROPSTEN_CHAIN_ID, ROPSTEN_GAS_LIMIT, ROPSTEN_GAS_PRICE, ROPSTEN_NETWORK,
        ROPSTEN_PRIVATE_KEY_ENV_VAR, ROPSTEN_RPC_URL, TEST_NETWORK,
    },
    errors::ScriptError,
};

/// The chain a network profile is allowed to connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkId {
    /// Any chain, used for local development nodes
    Any,
    /// Exactly the chain with the given ID
    Id(u64),
}

impl NetworkId {
    /// Whether a node reporting `chain_id` satisfies this network ID
    pub fn matches(&self, chain_id: u64) -> bool {
        match self {
            NetworkId::Any => true,
            NetworkId::Id(id) => *id == chain_id,
        }
    }

    /// Fails with [`ScriptError::NetworkMismatch`] unless `chain_id` satisfies this network ID
    pub fn check(&self, chain_id: u64) -> Result<(), ScriptError> {
        match self {
            NetworkId::Id(expected) if !self.matches(chain_id) => {
                Err(ScriptError::NetworkMismatch {
                    expected: *expected,
                    actual: chain_id,
                })
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for NetworkId {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ANY_NETWORK_ID {
            return Ok(NetworkId::Any);
        }

        s.parse::<u64>()
            .map(NetworkId::Id)
            .map_err(|e| ScriptError::ConfigParsing(format!("invalid network ID `{}`: {}", s, e)))
    }
}

impl Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkId::Any => write!(f, "{}", ANY_NETWORK_ID),
            NetworkId::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Where the RPC node of a network is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A plain HTTP node at `host:port`
    Host {
        /// The node's host name
        host: String,
        /// The node's RPC port
        port: u16,
    },
    /// A full RPC URL
    Url(String),
}

impl Endpoint {
    /// The RPC URL of the endpoint
    pub fn url(&self) -> String {
        match self {
            Endpoint::Host { host, port } => format!("http://{}:{}", host, port),
            Endpoint::Url(url) => url.clone(),
        }
    }
}

/// Where the signing credential of a network is sourced from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerSource {
    /// A BIP-39 mnemonic phrase held in an environment variable
    Mnemonic {
        /// The environment variable holding the phrase
        env_var: String,
        /// The derivation index of the deploying account
        index: u32,
    },
    /// A hex-encoded private key held in an environment variable
    PrivateKey {
        /// The environment variable holding the key
        env_var: String,
    },
}

/// The connection parameters of a single network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    /// The name the network is selected by
    pub name: String,
    /// The network's RPC endpoint
    pub endpoint: Endpoint,
    /// The chain the network must report
    pub network_id: NetworkId,
    /// The gas limit for every transaction sent on this network
    pub gas: u64,
    /// The legacy gas price for every transaction, in wei. When absent, fees are
    /// estimated by the provider.
    pub gas_price: Option<u128>,
    /// The signing credential. When absent, transactions are signed by the node's
    /// unlocked accounts.
    pub signer: Option<SignerSource>,
}

impl NetworkProfile {
    /// A profile for a local development node accepting any chain
    pub fn local(name: &str) -> Self {
        Self {
            name: name.to_string(),
            endpoint: Endpoint::Host {
                host: LOCAL_NODE_HOST.to_string(),
                port: LOCAL_NODE_PORT,
            },
            network_id: NetworkId::Any,
            gas: LOCAL_GAS_LIMIT,
            gas_price: None,
            signer: None,
        }
    }

    /// The RPC URL of the network
    pub fn rpc_url(&self) -> String {
        self.endpoint.url()
    }

    /// Resolves the network's signer from the process environment
    pub fn credential(&self) -> Result<Option<PrivateKeySigner>, ScriptError> {
        self.credential_from(|var| env::var(var).ok())
    }

    /// Resolves the network's signer, reading credential variables through `lookup`
    pub fn credential_from(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<PrivateKeySigner>, ScriptError> {
        let Some(source) = &self.signer else {
            return Ok(None);
        };

        let signer = match source {
            SignerSource::PrivateKey { env_var } => {
                let key = read_secret(&lookup, env_var)?;
                PrivateKeySigner::from_str(key.trim())
                    .map_err(|e| ScriptError::MissingCredential(format!("{}: {}", env_var, e)))?
            }
            SignerSource::Mnemonic { env_var, index } => {
                let phrase = read_secret(&lookup, env_var)?;
                MnemonicBuilder::<English>::default()
                    .phrase(phrase.trim())
                    .index(*index)
                    .map_err(|e| ScriptError::MissingCredential(format!("{}: {}", env_var, e)))?
                    .build()
                    .map_err(|e| ScriptError::MissingCredential(format!("{}: {}", env_var, e)))?
            }
        };

        Ok(Some(signer))
    }
}

/// Reads a non-empty secret from the given environment variable
fn read_secret(
    lookup: &impl Fn(&str) -> Option<String>,
    env_var: &str,
) -> Result<String, ScriptError> {
    lookup(env_var)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ScriptError::MissingCredential(format!("{} is not set", env_var)))
}

/// The table of all networks a migration can target, keyed by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// The network profiles, keyed by network name
    networks: BTreeMap<String, NetworkProfile>,
}

impl NetworkConfig {
    /// Builds a network table from the given profiles
    pub fn new(profiles: impl IntoIterator<Item = NetworkProfile>) -> Self {
        let networks = profiles
            .into_iter()
            .map(|profile| (profile.name.clone(), profile))
            .collect();

        Self { networks }
    }

    /// Looks up the profile of the network with the given name
    pub fn get(&self, name: &str) -> Result<&NetworkProfile, ScriptError> {
        self.networks
            .get(name)
            .ok_or_else(|| ScriptError::UnknownNetwork(name.to_string()))
    }

    /// All network profiles, ordered by name
    pub fn profiles(&self) -> impl Iterator<Item = &NetworkProfile> {
        self.networks.values()
    }

    /// Reads a network table from a TOML file
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ConfigParsing(format!("{}: {}", path.display(), e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parses a network table from TOML
    pub fn from_toml_str(contents: &str) -> Result<Self, ScriptError> {
        let table: RawNetworkTable =
            toml::from_str(contents).map_err(|e| ScriptError::ConfigParsing(e.message().into()))?;

        let profiles = table
            .networks
            .into_iter()
            .map(|(name, raw)| raw.into_profile(name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(profiles))
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let ropsten = NetworkProfile {
            name: ROPSTEN_NETWORK.to_string(),
            endpoint: Endpoint::Url(ROPSTEN_RPC_URL.to_string()),
            network_id: NetworkId::Id(ROPSTEN_CHAIN_ID),
            gas: ROPSTEN_GAS_LIMIT,
            gas_price: Some(ROPSTEN_GAS_PRICE),
            signer: Some(SignerSource::PrivateKey {
                env_var: ROPSTEN_PRIVATE_KEY_ENV_VAR.to_string(),
            }),
        };

        Self::new([
            NetworkProfile::local(TEST_NETWORK),
            NetworkProfile::local(DEVELOPMENT_NETWORK),
            ropsten,
        ])
    }
}

// ----------------
// | TOML parsing |
// ----------------

/// The on-disk layout of the network table
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNetworkTable {
    /// The network entries, keyed by name
    #[serde(default)]
    networks: BTreeMap<String, RawNetworkProfile>,
}

/// The on-disk layout of a single network entry
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNetworkProfile {
    /// The node's host name
    host: Option<String>,
    /// The node's RPC port
    port: Option<u16>,
    /// A full RPC URL, exclusive with `host`/`port`
    url: Option<String>,
    /// Either `"*"` or a chain ID
    network_id: Option<toml::Value>,
    /// The gas limit
    gas: u64,
    /// The legacy gas price in wei
    gas_price: Option<u64>,
    /// The environment variable holding a mnemonic phrase
    mnemonic_env: Option<String>,
    /// The derivation index used with `mnemonic_env`
    mnemonic_index: Option<u32>,
    /// The environment variable holding a private key
    private_key_env: Option<String>,
}

impl RawNetworkProfile {
    /// Validates the entry and converts it into a [`NetworkProfile`]
    fn into_profile(self, name: String) -> Result<NetworkProfile, ScriptError> {
        let invalid = |msg: &str| ScriptError::ConfigParsing(format!("network `{}`: {}", name, msg));

        let endpoint = match (self.url, self.host, self.port) {
            (Some(url), None, None) => Endpoint::Url(url),
            (None, Some(host), Some(port)) => Endpoint::Host { host, port },
            (None, Some(host), None) => Endpoint::Host {
                host,
                port: LOCAL_NODE_PORT,
            },
            (None, None, _) => return Err(invalid("one of `url` or `host` is required")),
            (Some(_), _, _) => return Err(invalid("`url` cannot be combined with `host`/`port`")),
        };

        let network_id = match self.network_id {
            None => NetworkId::Any,
            Some(toml::Value::Integer(id)) => {
                NetworkId::Id(u64::try_from(id).map_err(|_| invalid("negative network ID"))?)
            }
            Some(toml::Value::String(id)) => id.parse()?,
            Some(_) => return Err(invalid("`network_id` must be \"*\" or an integer")),
        };

        let signer = match (self.mnemonic_env, self.private_key_env) {
            (Some(env_var), None) => Some(SignerSource::Mnemonic {
                env_var,
                index: self.mnemonic_index.unwrap_or_default(),
            }),
            (None, Some(env_var)) => Some(SignerSource::PrivateKey { env_var }),
            (None, None) => None,
            (Some(_), Some(_)) => {
                return Err(invalid(
                    "`mnemonic_env` and `private_key_env` are mutually exclusive",
                ))
            }
        };

        Ok(NetworkProfile {
            name,
            endpoint,
            network_id,
            gas: self.gas,
            gas_price: self.gas_price.map(u128::from),
            signer,
        })
    }
}
