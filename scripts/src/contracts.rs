//! Handles to the deployed token and controller contracts, and the calls the
//! migrations make on them

use std::fmt::{self, Display};

use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::{SolCall, SolValue},
};
use tracing::info;

use crate::{
    artifacts::ContractArtifact,
    client::ChainClient,
    errors::ScriptError,
    solidity::{initializeCall, transferOwnershipCall},
};

/// A contract instance confirmed on chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    /// The contract's name
    pub name: String,
    /// The contract's on-chain address
    pub address: Address,
}

impl Display for DeployedContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {:#x}", self.name, self.address)
    }
}

/// Deploys the given artifact from `from`, appending the ABI-encoded constructor
/// arguments to its bytecode
pub async fn deploy_contract(
    client: &impl ChainClient,
    from: Address,
    artifact: &ContractArtifact,
    constructor_args: &[u8],
) -> Result<DeployedContract, ScriptError> {
    let code: Bytes = [&artifact.bytecode[..], constructor_args].concat().into();

    info!("deploying {}", artifact.name);
    let address = client.deploy(from, code).await?;
    let contract = DeployedContract {
        name: artifact.name.clone(),
        address,
    };
    info!("{} deployed", contract);

    Ok(contract)
}

/// Deploys the token contract, which takes no constructor arguments
pub async fn deploy_token(
    client: &impl ChainClient,
    from: Address,
    artifact: &ContractArtifact,
) -> Result<DeployedContract, ScriptError> {
    deploy_contract(client, from, artifact, &[]).await
}

/// Deploys the token controller, managing the token at `token`
pub async fn deploy_controller(
    client: &impl ChainClient,
    from: Address,
    artifact: &ContractArtifact,
    token: Address,
) -> Result<DeployedContract, ScriptError> {
    let constructor_args = (token,).abi_encode_params();
    deploy_contract(client, from, artifact, &constructor_args).await
}

/// Makes `new_owner` the owner of the token
pub async fn transfer_ownership(
    client: &impl ChainClient,
    from: Address,
    token: &DeployedContract,
    new_owner: Address,
) -> Result<(), ScriptError> {
    let calldata = transferOwnershipCall { newOwner: new_owner }.abi_encode();

    info!("transferring ownership of {} to {:#x}", token, new_owner);
    client
        .send(from, token.address, calldata.into(), U256::ZERO)
        .await?;

    Ok(())
}

/// Invokes the controller's one-time initialization
pub async fn initialize_controller(
    client: &impl ChainClient,
    from: Address,
    controller: &DeployedContract,
) -> Result<(), ScriptError> {
    let calldata = initializeCall {}.abi_encode();

    info!("initializing {}", controller);
    client
        .send(from, controller.address, calldata.into(), U256::ZERO)
        .await?;

    Ok(())
}
