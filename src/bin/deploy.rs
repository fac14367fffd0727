//! Deploys the My404 token and the LaunchpadFactory.

use std::process::exit;

use clap::Parser;
use launchpad::{
    artifact::Artifacts,
    client::NodeClient,
    config::{self, DeployArgs, EnvConfig},
    deploy::{self, Deployment},
    error::{Result, exit_code},
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }
    config::init_logging();

    let args = DeployArgs::parse();
    let result = run(&args).await;
    match &result {
        Ok(deployment) => info!(
            token = %deployment.token,
            factory = %deployment.factory,
            "Deployment complete"
        ),
        Err(e) => error!(%e, "Deployment failed"),
    }
    exit(exit_code(&result));
}

async fn run(args: &DeployArgs) -> Result<Deployment> {
    let env = EnvConfig::from_env()?;
    let artifacts = Artifacts::load(
        &args.artifacts,
        &args.token_contract,
        &args.factory_contract,
    )?;
    let client = NodeClient::connect(env.node_url()?, env.wallet()?, env.timeout(), env.chain_id)
        .await?;
    deploy::run(&client, &artifacts, &args.options()).await
}
