//! The deployment steps, the per-network migration plan, and the runner that
//! executes a plan against a chain

use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use alloy::primitives::Address;
use clap::ValueEnum;
use tracing::{error, info, warn};

use crate::{
    artifacts::ArtifactStore,
    client::ChainClient,
    constants::{
        CONTROLLER_CONTRACT_KEY, CONTROLLER_CONTRACT_NAME, DEVELOPMENT_NETWORK,
        REGISTRY_CONTRACT_KEY, REGISTRY_CONTRACT_NAME, ROPSTEN_NETWORK, TOKEN_CONTRACT_KEY,
        TOKEN_CONTRACT_NAME,
    },
    contracts::{
        deploy_controller, deploy_token, initialize_controller, transfer_ownership,
        DeployedContract,
    },
    deployments::Deployments,
    errors::ScriptError,
    registry::deploy_registry,
};

/// A unit of work in a migration
#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeploymentStep {
    /// Deploy the EIP-820 registry, if it is not already present
    RegistryDependency,
    /// Deploy the token contract
    Token,
    /// Deploy the token controller, hand it the token's ownership, and initialize it
    Controller,
}

impl Display for DeploymentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStep::RegistryDependency => write!(f, "registry-dependency"),
            DeploymentStep::Token => write!(f, "token"),
            DeploymentStep::Controller => write!(f, "controller"),
        }
    }
}

/// The progress of a single step
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Not yet started
    Pending,
    /// Transactions have been submitted and are awaiting confirmation
    InFlight,
    /// All of the step's transactions are confirmed
    Confirmed,
    /// One of the step's transactions failed. Terminal.
    Failed,
}

impl Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::InFlight => write!(f, "in-flight"),
            StepStatus::Confirmed => write!(f, "confirmed"),
            StepStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The ordered steps applied to a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    /// The network the plan targets
    network: String,
    /// The steps, in execution order
    steps: Vec<DeploymentStep>,
}

impl MigrationPlan {
    /// The plan for the given network:
    /// - `development`: the registry dependency, then the token
    /// - `ropsten`: the token, then the controller
    /// - any other network: the token only
    pub fn for_network(network: &str) -> Self {
        let steps = match network {
            DEVELOPMENT_NETWORK => vec![DeploymentStep::RegistryDependency, DeploymentStep::Token],
            ROPSTEN_NETWORK => vec![DeploymentStep::Token, DeploymentStep::Controller],
            _ => vec![DeploymentStep::Token],
        };

        Self {
            network: network.to_string(),
            steps,
        }
    }

    /// Restricts the plan to a single step. The plan becomes empty if the step
    /// does not apply to the network.
    pub fn only(mut self, step: DeploymentStep) -> Self {
        self.steps.retain(|s| *s == step);
        self
    }

    /// The steps, in execution order
    pub fn steps(&self) -> &[DeploymentStep] {
        &self.steps
    }
}

/// The outcome of a completed migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// The network migrated
    pub network: String,
    /// Every step with its final status
    pub steps: Vec<(DeploymentStep, StepStatus)>,
    /// The contracts deployed or resolved during the run, in order
    pub contracts: Vec<DeployedContract>,
}

/// Executes a [`MigrationPlan`], strictly one transaction at a time
pub struct Migration<'a, C> {
    /// The client transactions are sent through
    client: &'a C,
    /// The network being migrated
    network: String,
    /// The compiled contracts
    artifacts: ArtifactStore,
    /// The recorded contract addresses
    deployments: Deployments,
    /// Where to persist the recorded addresses, if anywhere
    deployments_path: Option<PathBuf>,
    /// The status of every planned step
    progress: Vec<(DeploymentStep, StepStatus)>,
    /// The contracts deployed so far
    deployed: Vec<DeployedContract>,
}

impl<'a, C: ChainClient> Migration<'a, C> {
    /// Prepares the given plan, with every step pending
    pub fn new(
        client: &'a C,
        plan: &MigrationPlan,
        artifacts: ArtifactStore,
        deployments: Deployments,
    ) -> Self {
        Self {
            client,
            network: plan.network.clone(),
            artifacts,
            deployments,
            deployments_path: None,
            progress: plan
                .steps
                .iter()
                .map(|step| (*step, StepStatus::Pending))
                .collect(),
            deployed: Vec::new(),
        }
    }

    /// Writes the recorded addresses to `path` after every step
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.deployments_path = Some(path.into());
        self
    }

    /// The current status of the given step, if it is part of the plan
    pub fn status(&self, step: DeploymentStep) -> Option<StepStatus> {
        self.progress
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, status)| *status)
    }

    /// The recorded contract addresses
    pub fn deployments(&self) -> &Deployments {
        &self.deployments
    }

    /// Runs every pending step in order, stopping at the first failure
    pub async fn run(&mut self) -> Result<MigrationReport, ScriptError> {
        let accounts = self.client.accounts().await?;

        for i in 0..self.progress.len() {
            let step = self.progress[i].0;
            if self.progress[i].1 != StepStatus::Pending {
                continue;
            }

            self.progress[i].1 = StepStatus::InFlight;
            info!(network = %self.network, %step, "running step");

            let res = self.execute(step, &accounts).await;
            let persisted = self.persist();

            if let Err(e) = res {
                self.progress[i].1 = StepStatus::Failed;
                error!(network = %self.network, %step, "step failed: {}", e);
                if let Err(write_err) = persisted {
                    warn!("could not record partial deployment: {}", write_err);
                }
                return Err(e);
            }

            self.progress[i].1 = StepStatus::Confirmed;
            info!(network = %self.network, %step, "step confirmed");
            persisted?;
        }

        Ok(MigrationReport {
            network: self.network.clone(),
            steps: self.progress.clone(),
            contracts: self.deployed.clone(),
        })
    }

    /// Executes a single step
    async fn execute(
        &mut self,
        step: DeploymentStep,
        accounts: &[Address],
    ) -> Result<(), ScriptError> {
        match step {
            DeploymentStep::RegistryDependency => {
                let from = self.deployer(accounts)?;
                let outcome = deploy_registry(self.client, &self.artifacts, from).await?;

                self.record(
                    REGISTRY_CONTRACT_KEY,
                    DeployedContract {
                        name: REGISTRY_CONTRACT_NAME.to_string(),
                        address: outcome.address(),
                    },
                );
            }
            DeploymentStep::Token => {
                let from = self.deployer(accounts)?;
                let artifact = self.artifacts.contract(TOKEN_CONTRACT_NAME)?;
                let token = deploy_token(self.client, from, &artifact).await?;

                self.record(TOKEN_CONTRACT_KEY, token);
            }
            DeploymentStep::Controller => {
                let token = self.deployed_token()?;
                let from = self.deployer(accounts)?;
                let artifact = self.artifacts.contract(CONTROLLER_CONTRACT_NAME)?;

                let controller = deploy_controller(self.client, from, &artifact, token.address).await?;
                self.record(CONTROLLER_CONTRACT_KEY, controller.clone());

                transfer_ownership(self.client, from, &token, controller.address).await?;
                initialize_controller(self.client, from, &controller).await?;
            }
        }

        Ok(())
    }

    /// The account migration transactions are sent from
    fn deployer(&self, accounts: &[Address]) -> Result<Address, ScriptError> {
        accounts.first().copied().ok_or_else(|| {
            ScriptError::PreconditionUnmet(format!("no accounts available on {}", self.network))
        })
    }

    /// The token deployed on this network, either earlier in this run or by a
    /// previous one
    fn deployed_token(&self) -> Result<DeployedContract, ScriptError> {
        self.deployments
            .get(&self.network, TOKEN_CONTRACT_KEY)
            .map(|address| DeployedContract {
                name: TOKEN_CONTRACT_NAME.to_string(),
                address,
            })
            .ok_or_else(|| {
                ScriptError::PreconditionUnmet(format!(
                    "no {} deployed on {}",
                    TOKEN_CONTRACT_NAME, self.network
                ))
            })
    }

    /// Records a contract confirmed on chain
    fn record(&mut self, contract_key: &str, contract: DeployedContract) {
        self.deployments
            .insert(&self.network, contract_key, contract.address);
        self.deployed.push(contract);
    }

    /// Writes the recorded addresses to the deployments file, if one is set
    fn persist(&self) -> Result<(), ScriptError> {
        match &self.deployments_path {
            Some(path) => self.deployments.save(path),
            None => Ok(()),
        }
    }
}
