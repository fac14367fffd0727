//! Creates and initializes the My404/WETH pool on Uniswap V3, then whitelists
//! the pool on the token.

use std::process::exit;

use clap::Parser;
use launchpad::{
    Network,
    client::NodeClient,
    config::{self, EnvConfig, PoolArgs},
    error::{Result, exit_code},
    pool::{self, PoolInitialization},
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }
    config::init_logging();

    let args = PoolArgs::parse();
    let result = run(&args).await;
    match &result {
        Ok(init) => info!(
            pool = %init.pool,
            whitelist_confirmed = init.whitelist_confirmed,
            "Pool initialization complete"
        ),
        Err(e) => error!(%e, "Pool initialization failed"),
    }
    exit(exit_code(&result));
}

async fn run(args: &PoolArgs) -> Result<PoolInitialization> {
    let network = Network::sepolia();
    let env = EnvConfig::from_env()?;
    let pool_config = args.to_pool_config(&network)?;
    let client = NodeClient::connect(
        env.node_url()?,
        env.wallet()?,
        env.timeout(),
        args.expected_chain_id(&env, &network),
    )
    .await?;
    pool::initialize(&client, &pool_config, args.whitelist_confirmation()).await
}
