//! Implementations of the migration commands

use std::path::PathBuf;

use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    artifacts::ArtifactStore,
    cli::MigrateArgs,
    client::connect,
    config::{NetworkConfig, NetworkProfile},
    deployments::Deployments,
    errors::ScriptError,
    steps::{Migration, MigrationPlan},
};

/// Runs the migration plan of the given network, recording the deployed
/// addresses in the deployments file
pub async fn migrate(
    args: MigrateArgs,
    profile: &NetworkProfile,
    rpc_url: Option<&str>,
    artifacts: PathBuf,
    deployments_path: PathBuf,
) -> Result<(), ScriptError> {
    let mut plan = MigrationPlan::for_network(&profile.name);
    if let Some(step) = args.only {
        plan = plan.only(step);
        if plan.steps().is_empty() {
            warn!("step `{}` does not apply to {}, nothing to do", step, profile.name);
            return Ok(());
        }
    }

    info!(
        network = %profile.name,
        "migrating: {}",
        plan.steps().iter().join(" -> ")
    );

    let client = connect(profile, rpc_url).await?;
    let deployments = Deployments::load(&deployments_path)?;

    let report = Migration::new(&client, &plan, ArtifactStore::new(artifacts), deployments)
        .persist_to(deployments_path)
        .run()
        .await?;

    for (step, status) in &report.steps {
        info!(%step, "{}", status);
    }
    for contract in &report.contracts {
        info!("{}", contract);
    }
    info!(network = %report.network, "migration complete");

    Ok(())
}

/// Prints the steps the migration would run on the given network
pub fn show_plan(network: &str) {
    let plan = MigrationPlan::for_network(network);
    for (i, step) in plan.steps().iter().enumerate() {
        println!("{}. {}", i + 1, step);
    }
}

/// Prints every network in the network table
pub fn list_networks(config: &NetworkConfig) {
    for profile in config.profiles() {
        println!(
            "{}\t{}\tnetwork_id={}\tgas={}",
            profile.name,
            profile.rpc_url(),
            profile.network_id,
            profile.gas
        );
    }
}
