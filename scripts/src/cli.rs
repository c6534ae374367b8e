//! Definitions of CLI arguments and commands for the migration scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{list_networks, migrate, show_plan},
    config::NetworkConfig,
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEVELOPMENT_NETWORK},
    errors::ScriptError,
    steps::DeploymentStep,
};

/// Deploy and wire up the token contracts on a network
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the network to migrate, as listed in the network table
    #[arg(short, long, env = "NETWORK", default_value = DEVELOPMENT_NETWORK)]
    pub network: String,

    /// Path to a TOML network table, replacing the built-in one
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// RPC URL, overriding the endpoint configured for the network
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Directory containing the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Path to the file recording the deployed contract addresses
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The network table selected by the `--config` flag
    pub fn network_config(&self) -> Result<NetworkConfig, ScriptError> {
        match &self.config {
            Some(path) => NetworkConfig::load(path),
            None => Ok(NetworkConfig::default()),
        }
    }
}

/// The commands the migration scripts support
#[derive(Subcommand)]
pub enum Command {
    /// Run the migration for the selected network
    Migrate(MigrateArgs),
    /// Print the steps the migration would run on the selected network
    Plan,
    /// List the networks in the network table
    Networks,
}

impl Command {
    /// Runs the command against the selected network
    pub async fn run(
        self,
        config: &NetworkConfig,
        network: &str,
        rpc_url: Option<&str>,
        artifacts: PathBuf,
        deployments_path: PathBuf,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Migrate(args) => {
                let profile = config.get(network)?;
                migrate(args, profile, rpc_url, artifacts, deployments_path).await
            }
            Command::Plan => {
                config.get(network)?;
                show_plan(network);
                Ok(())
            }
            Command::Networks => {
                list_networks(config);
                Ok(())
            }
        }
    }
}

/// Run the migration
#[derive(Args)]
pub struct MigrateArgs {
    /// Run only the given step, if it applies to the network
    #[arg(long)]
    pub only: Option<DeploymentStep>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate() {
        let cli = Cli::try_parse_from([
            "migration-scripts",
            "--network",
            "ropsten",
            "migrate",
            "--only",
            "controller",
        ])
        .unwrap();

        assert_eq!(cli.network, "ropsten");
        assert!(matches!(
            cli.command,
            Command::Migrate(MigrateArgs {
                only: Some(DeploymentStep::Controller)
            })
        ));
    }

    #[test]
    fn test_builtin_network_table() {
        let cli = Cli::try_parse_from(["migration-scripts", "networks"]).unwrap();
        assert!(cli.network_config().unwrap().get("ropsten").is_ok());
    }
}
