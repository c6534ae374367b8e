//! Loading of compiled contract artifacts
//!
//! Artifacts are the JSON files emitted by the Solidity toolchain, one per
//! contract, named `<ContractName>.json`. Both the truffle layout (`"bytecode":
//! "0x..."`) and the forge layout (`"bytecode": { "object": "0x..." }`) are
//! accepted.

use std::{fs, path::PathBuf};

use alloy::primitives::{Address, Bytes, U256};
use serde::Deserialize;

use crate::{
    constants::{
        ARTIFACT_EXTENSION, DEFAULT_REGISTRY_FUNDING, REGISTRY_CONTRACT_NAME, REGISTRY_DEPLOYER,
    },
    errors::ScriptError,
};

/// The creation bytecode of a compiled contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    /// The contract's name
    pub name: String,
    /// The contract's creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Parses an artifact from its JSON representation
    pub fn from_json(name: &str, json: &str) -> Result<Self, ScriptError> {
        let raw: RawContractArtifact = serde_json::from_str(json)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", name, e)))?;

        let hex = match raw.bytecode {
            RawBytecode::Hex(hex) => hex,
            RawBytecode::Object { object } => object,
        };
        let bytecode: Bytes = hex
            .parse()
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", name, e)))?;

        // Interfaces and abstract contracts compile to empty bytecode
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has no creation bytecode",
                name
            )));
        }

        Ok(Self {
            name: raw.contract_name.unwrap_or_else(|| name.to_string()),
            bytecode,
        })
    }
}

/// The presigned, chain-agnostic deployment of the EIP-820 registry.
///
/// The registry is deployed by broadcasting a transaction signed by a throwaway
/// key, so that it lands at the same address on every chain. The throwaway
/// deployer only needs to be funded with enough ether to pay for that transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryArtifact {
    /// The sender of the presigned deployment transaction
    pub deployer: Address,
    /// The RLP-encoded, signed deployment transaction
    pub raw_tx: Bytes,
    /// The amount of wei the deployer must be funded with
    pub funding: U256,
}

impl RegistryArtifact {
    /// Parses a registry artifact from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let raw: RawRegistryArtifact = serde_json::from_str(json)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", REGISTRY_CONTRACT_NAME, e)))?;

        if raw.raw_tx.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has an empty deployment transaction",
                REGISTRY_CONTRACT_NAME
            )));
        }

        Ok(Self {
            deployer: raw.deployer.unwrap_or(REGISTRY_DEPLOYER),
            raw_tx: raw.raw_tx,
            funding: U256::from(raw.funding.unwrap_or(DEFAULT_REGISTRY_FUNDING)),
        })
    }
}

/// A directory of compiled contract artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// The directory containing the artifacts
    dir: PathBuf,
}

impl ArtifactStore {
    /// Opens the artifacts in the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Loads the artifact of the contract with the given name
    pub fn contract(&self, name: &str) -> Result<ContractArtifact, ScriptError> {
        ContractArtifact::from_json(name, &self.read(name)?)
    }

    /// Loads the EIP-820 registry's presigned deployment
    pub fn registry(&self) -> Result<RegistryArtifact, ScriptError> {
        RegistryArtifact::from_json(&self.read(REGISTRY_CONTRACT_NAME)?)
    }

    /// Reads the raw JSON of the artifact with the given name
    fn read(&self, name: &str) -> Result<String, ScriptError> {
        let path = self.dir.join(name).with_extension(ARTIFACT_EXTENSION);
        fs::read_to_string(&path)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))
    }
}

/// The subset of a compilation artifact used by the migrations
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContractArtifact {
    /// The contract name, only present in truffle artifacts
    contract_name: Option<String>,
    /// The creation bytecode
    bytecode: RawBytecode,
}

/// The two layouts in which toolchains emit bytecode
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// A bare hex string
    Hex(String),
    /// An object carrying the hex string alongside link references
    Object {
        /// The hex-encoded bytecode
        object: String,
    },
}

/// The layout of the registry deployment artifact
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRegistryArtifact {
    /// The sender of the presigned transaction, when not the canonical one
    deployer: Option<Address>,
    /// The signed deployment transaction
    raw_tx: Bytes,
    /// The deployer funding, in wei
    funding: Option<u128>,
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, bytes};

    use super::*;

    #[test]
    fn test_truffle_layout() {
        let json = r#"{ "contractName": "FilesFMToken", "abi": [], "bytecode": "0x6080604052" }"#;
        let artifact = ContractArtifact::from_json("FilesFMToken", json).unwrap();

        assert_eq!(artifact.name, "FilesFMToken");
        assert_eq!(artifact.bytecode, bytes!("6080604052"));
    }

    #[test]
    fn test_forge_layout() {
        let json = r#"{ "abi": [], "bytecode": { "object": "0x60806040", "linkReferences": {} } }"#;
        let artifact = ContractArtifact::from_json("FilesFMTokenController", json).unwrap();

        assert_eq!(artifact.name, "FilesFMTokenController");
        assert_eq!(artifact.bytecode, bytes!("60806040"));
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let json = r#"{ "contractName": "IERC20", "bytecode": "0x" }"#;
        assert!(matches!(
            ContractArtifact::from_json("IERC20", json),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }

    #[test]
    fn test_registry_artifact() {
        let json = r#"{ "rawTx": "0xf8a58085174876e800830c35008080b85260" }"#;
        let registry = RegistryArtifact::from_json(json).unwrap();

        assert_eq!(
            registry.deployer,
            address!("e6c244a1c10aa0085b0cf92f04cdad947c2f896b")
        );
        assert_eq!(registry.funding, U256::from(DEFAULT_REGISTRY_FUNDING));

        let json = r#"{
            "deployer": "0x00000000000000000000000000000000000000bb",
            "rawTx": "0xf8a5",
            "funding": 1000
        }"#;
        let registry = RegistryArtifact::from_json(json).unwrap();
        assert_eq!(
            registry.deployer,
            address!("00000000000000000000000000000000000000bb")
        );
        assert_eq!(registry.funding, U256::from(1000));
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        assert!(matches!(
            store.contract("FilesFMToken"),
            Err(ScriptError::ArtifactParsing(_))
        ));
        assert!(matches!(
            store.registry(),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }

    #[test]
    fn test_store_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("FilesFMToken.json"),
            r#"{ "contractName": "FilesFMToken", "bytecode": "0x6001" }"#,
        )
        .unwrap();

        let store = ArtifactStore::new(dir.path());
        assert_eq!(store.contract("FilesFMToken").unwrap().bytecode, bytes!("6001"));
    }
}
