use clap::Parser;
use scripts::{cli::Cli, errors::ScriptError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        priv_key,
        rpc_url,
        network,
        deployments_dir,
        results_dir,
        confirmations,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ctx = scripts::utils::RunContext {
        priv_key,
        rpc_url,
        network,
        deployments_dir,
        results_dir,
        confirmations,
    };

    command.run(&ctx).await
}
