//! Definitions of errors that can occur during the execution of the migration scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the migration scripts
#[derive(Debug)]
pub enum ScriptError {
    /// The requested network has no entry in the network table
    UnknownNetwork(String),
    /// The connected node reports a different chain than the network profile expects
    NetworkMismatch {
        /// The chain ID the network profile expects
        expected: u64,
        /// The chain ID reported by the node
        actual: u64,
    },
    /// Error parsing the network table
    ConfigParsing(String),
    /// A signing credential referenced by a network profile is unavailable
    MissingCredential(String),
    /// Error reading the `deployments.json` file
    ReadDeployments(String),
    /// Error writing the `deployments.json` file
    WriteDeployments(String),
    /// Error parsing a Solidity compilation artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// A step was attempted before the state it depends on exists
    PreconditionUnmet(String),
}

impl ScriptError {
    /// Whether this error stems from a transaction that was rejected, reverted,
    /// or could not be submitted
    pub fn is_transaction_failure(&self) -> bool {
        matches!(
            self,
            ScriptError::ContractDeployment(_) | ScriptError::ContractInteraction(_)
        )
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::UnknownNetwork(s) => write!(f, "unknown network: {}", s),
            ScriptError::NetworkMismatch { expected, actual } => write!(
                f,
                "network mismatch: expected chain ID {}, node reports {}",
                expected, actual
            ),
            ScriptError::ConfigParsing(s) => write!(f, "error parsing network config: {}", s),
            ScriptError::MissingCredential(s) => write!(f, "missing credential: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::PreconditionUnmet(s) => write!(f, "precondition unmet: {}", s),
        }
    }
}

impl Error for ScriptError {}
