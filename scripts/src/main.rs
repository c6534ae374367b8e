use clap::Parser;
use migration_scripts::{cli::Cli, errors::ScriptError};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let config = cli.network_config()?;
    let Cli {
        network,
        rpc_url,
        artifacts,
        deployments_path,
        command,
        ..
    } = cli;

    command
        .run(
            &config,
            &network,
            rpc_url.as_deref(),
            artifacts,
            deployments_path,
        )
        .await
}
