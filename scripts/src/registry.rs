//! Deployment of the EIP-820 pseudo-introspection registry
//!
//! The registry lives at the same address on every chain: it is deployed by a
//! presigned transaction from a throwaway key, so deploying it only requires
//! funding that key and broadcasting the transaction. If the registry is
//! already present the deployment is skipped.

use alloy::primitives::{Address, Bytes};
use tracing::info;

use crate::{
    artifacts::ArtifactStore, client::ChainClient, constants::REGISTRY_ADDRESS,
    errors::ScriptError,
};

/// The result of a registry deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryOutcome {
    /// The registry was already deployed at the given address
    AlreadyDeployed(Address),
    /// The registry was deployed to the given address by this run
    Deployed(Address),
}

impl RegistryOutcome {
    /// The registry's address
    pub fn address(&self) -> Address {
        match self {
            RegistryOutcome::AlreadyDeployed(address) | RegistryOutcome::Deployed(address) => {
                *address
            }
        }
    }
}

/// Deploys the registry, funding its deployer from `deploying_account`.
///
/// Does nothing if code is already present at the registry's address. The
/// presigned deployment is only read from `artifacts` when it has to be sent.
pub async fn deploy_registry(
    client: &impl ChainClient,
    artifacts: &ArtifactStore,
    deploying_account: Address,
) -> Result<RegistryOutcome, ScriptError> {
    if !client.code_at(REGISTRY_ADDRESS).await?.is_empty() {
        info!("EIP-820 registry already deployed at {:#x}", REGISTRY_ADDRESS);
        return Ok(RegistryOutcome::AlreadyDeployed(REGISTRY_ADDRESS));
    }

    let registry = artifacts.registry()?;

    info!(
        "funding EIP-820 registry deployer {:#x} from {:#x}",
        registry.deployer, deploying_account
    );
    client
        .send(
            deploying_account,
            registry.deployer,
            Bytes::new(),
            registry.funding,
        )
        .await?;

    info!("deploying EIP-820 registry");
    client.send_raw(registry.raw_tx).await?;

    if client.code_at(REGISTRY_ADDRESS).await?.is_empty() {
        return Err(ScriptError::ContractDeployment(format!(
            "no code at {:#x} after registry deployment",
            REGISTRY_ADDRESS
        )));
    }

    info!("EIP-820 registry deployed at {:#x}", REGISTRY_ADDRESS);
    Ok(RegistryOutcome::Deployed(REGISTRY_ADDRESS))
}
