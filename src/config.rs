//! Configuration for the deployment and pool initialization binaries.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): node connection, signing key
//! - CLI arguments: contract names, addresses and pool parameters, all
//!   defaulting to the Sepolia launch values

use std::{path::PathBuf, str::FromStr, time::Duration};

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U160},
    signers::local::{LocalSignerError, PrivateKeySigner},
};
use clap::Parser;
use url::Url;

use crate::{
    Network,
    deploy::DeployOptions,
    pool::{PoolConfig, PoolParams, WhitelistConfirmation},
};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment configuration (connection details, credentials).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// RPC URL for the node
    pub node_rpc_url: String,

    /// Private key for signing transactions
    pub private_key: String,

    /// Expected chain ID, checked against the node when set
    pub chain_id: Option<u64>,

    /// Optional timeout for transaction confirmations (default: 120s)
    pub timeout_seconds: Option<u64>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn node_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.node_rpc_url)
    }

    pub fn wallet(&self) -> Result<EthereumWallet, LocalSignerError> {
        let signer: PrivateKeySigner = self.private_key.parse()?;
        Ok(EthereumWallet::new(signer))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// CLI arguments of the deployer.
#[derive(Debug, Parser)]
#[command(name = "deploy")]
#[command(about = "Deploy the My404 token and the LaunchpadFactory")]
pub struct DeployArgs {
    /// Hardhat artifacts directory
    #[arg(long, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Token contract name
    #[arg(long, default_value = "My404")]
    pub token_contract: String,

    /// Factory contract name, its constructor takes the token address
    #[arg(long, default_value = "LaunchpadFactory")]
    pub factory_contract: String,

    /// Whitelist the deployer address on the token after deployment
    #[arg(long)]
    pub whitelist_deployer: bool,
}

impl DeployArgs {
    pub fn options(&self) -> DeployOptions {
        DeployOptions {
            whitelist_deployer: self.whitelist_deployer,
        }
    }
}

/// CLI arguments of the pool initializer.
///
/// Anything not given falls back to the [`Network::sepolia`] launch values.
#[derive(Debug, Parser)]
#[command(name = "init_pool")]
#[command(about = "Create and initialize the token/WETH pool on Uniswap V3 and whitelist it")]
pub struct PoolArgs {
    /// Pool token0, the token that whitelists the pool
    #[arg(long)]
    pub token0: Option<Address>,

    /// Pool token1 (e.g. WETH)
    #[arg(long)]
    pub token1: Option<Address>,

    /// Fee tier in hundredths of a basis point (10000 = 1%)
    #[arg(long)]
    pub fee: Option<u32>,

    /// Initial price encoded as sqrt(token1/token0) * 2^96
    #[arg(long)]
    pub sqrt_price_x96: Option<String>,

    /// NonfungiblePositionManager address
    #[arg(long)]
    pub position_manager: Option<Address>,

    /// UniswapV3Factory address
    #[arg(long)]
    pub pool_factory: Option<Address>,

    /// Do not wait for the whitelist transaction to be mined
    #[arg(long)]
    pub detach_whitelist: bool,
}

impl PoolArgs {
    pub fn to_pool_config(&self, network: &Network) -> Result<PoolConfig, ConfigError> {
        let sqrt_price_x96 = match &self.sqrt_price_x96 {
            Some(s) => U160::from_str(s).map_err(|_| ConfigError::InvalidSqrtPrice(s.clone()))?,
            None => network.sqrt_price_x96,
        };
        let position_manager = self.position_manager.unwrap_or(network.position_manager);
        if position_manager.is_zero() {
            return Err(ConfigError::ZeroAddress("position_manager"));
        }
        let pool_factory = self.pool_factory.unwrap_or(network.pool_factory);
        if pool_factory.is_zero() {
            return Err(ConfigError::ZeroAddress("pool_factory"));
        }

        let params = PoolParams::new(
            self.token0.unwrap_or(network.token),
            self.token1.unwrap_or(network.weth),
            self.fee.unwrap_or(network.fee),
            sqrt_price_x96,
        )
        .map_err(ConfigError::Pool)?;

        Ok(PoolConfig {
            position_manager,
            pool_factory,
            params,
        })
    }

    /// Chain the node must be on: the configured one, or the network's when
    /// all contract addresses are its defaults.
    pub fn expected_chain_id(&self, env: &EnvConfig, network: &Network) -> Option<u64> {
        let defaults = self.token0.is_none()
            && self.token1.is_none()
            && self.position_manager.is_none()
            && self.pool_factory.is_none();
        env.chain_id
            .or_else(|| defaults.then_some(network.chain_id))
    }

    pub fn whitelist_confirmation(&self) -> WhitelistConfirmation {
        if self.detach_whitelist {
            WhitelistConfirmation::Detached
        } else {
            WhitelistConfirmation::Await
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid sqrtPriceX96 value: {0}")]
    InvalidSqrtPrice(String),

    #[error("{0} can not be the zero address")]
    ZeroAddress(&'static str),

    #[error("Invalid pool parameters: {0}")]
    Pool(#[from] crate::pool::PoolParamsError),
}

/// Installs the `tracing` subscriber, defaulting to `info` when `RUST_LOG` is unset.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, uint};

    use super::*;
    use crate::pool::PoolParamsError;

    fn pool_args(args: &[&str]) -> PoolArgs {
        PoolArgs::parse_from(std::iter::once("init_pool").chain(args.iter().copied()))
    }

    #[test]
    fn test_pool_defaults_to_sepolia() {
        let config = pool_args(&[]).to_pool_config(&Network::sepolia()).unwrap();

        assert_eq!(
            config.params.token0(),
            address!("0x9c8a4762AB11A6Fa13313dDDEe8c879b1298F6a5")
        );
        assert_eq!(
            config.params.token1(),
            address!("0xfFf9976782d46CC05630D1f6eBAb18b2324d6B14")
        );
        assert_eq!(config.params.fee(), 10000);
        assert_eq!(
            config.params.sqrt_price_x96(),
            uint!(792281625000000000000000000_U160)
        );
        assert_eq!(
            config.position_manager,
            address!("0x1238536071E1c677A632429e3655c799b22cDA52")
        );
        assert_eq!(
            config.pool_factory,
            address!("0x0227628f3F023bb0B980b67D528571c95c6DaC1c")
        );
        assert_eq!(
            pool_args(&[]).whitelist_confirmation(),
            WhitelistConfirmation::Await
        );
    }

    #[test]
    fn test_pool_overrides() {
        let args = pool_args(&[
            "--fee",
            "3000",
            "--sqrt-price-x96",
            "79228162514264337593543950336",
            "--pool-factory",
            "0x0000000000000000000000000000000000000001",
            "--detach-whitelist",
        ]);
        let config = args.to_pool_config(&Network::sepolia()).unwrap();

        assert_eq!(config.params.fee(), 3000);
        assert_eq!(config.params.sqrt_price_x96(), uint!(1_U160) << 96);
        assert_eq!(
            config.pool_factory,
            address!("0x0000000000000000000000000000000000000001")
        );
        assert_eq!(args.whitelist_confirmation(), WhitelistConfirmation::Detached);
    }

    #[test]
    fn test_expected_chain_id() {
        let network = Network::sepolia();
        let mut env = EnvConfig {
            node_rpc_url: "http://localhost:8545".to_string(),
            private_key: String::new(),
            chain_id: None,
            timeout_seconds: None,
        };

        assert_eq!(
            pool_args(&[]).expected_chain_id(&env, &network),
            Some(11155111)
        );
        assert_eq!(
            pool_args(&["--token1", "0xfFf9976782d46CC05630D1f6eBAb18b2324d6B15"])
                .expected_chain_id(&env, &network),
            None
        );

        env.chain_id = Some(31337);
        assert_eq!(pool_args(&[]).expected_chain_id(&env, &network), Some(31337));
    }

    #[test]
    fn test_invalid_sqrt_price() {
        let args = pool_args(&["--sqrt-price-x96", "one"]);
        assert!(matches!(
            args.to_pool_config(&Network::sepolia()),
            Err(ConfigError::InvalidSqrtPrice(_))
        ));
    }

    #[test]
    fn test_invalid_fee_tier() {
        let args = pool_args(&["--fee", "1"]);
        assert!(matches!(
            args.to_pool_config(&Network::sepolia()),
            Err(ConfigError::Pool(PoolParamsError::UnsupportedFee(1)))
        ));
    }

    #[test]
    fn test_zero_position_manager() {
        let args = pool_args(&[
            "--position-manager",
            "0x0000000000000000000000000000000000000000",
        ]);
        assert!(matches!(
            args.to_pool_config(&Network::sepolia()),
            Err(ConfigError::ZeroAddress("position_manager"))
        ));
    }

    #[test]
    fn test_malformed_address_rejected_by_cli() {
        let res = PoolArgs::try_parse_from(["init_pool", "--token0", "0x1234"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_deploy_args_defaults() {
        let args = DeployArgs::parse_from(["deploy"]);
        assert_eq!(args.artifacts, PathBuf::from("artifacts"));
        assert_eq!(args.token_contract, "My404");
        assert_eq!(args.factory_contract, "LaunchpadFactory");
        assert!(!args.options().whitelist_deployer);
    }

    #[test]
    fn test_env_config() {
        let env = EnvConfig {
            node_rpc_url: "http://localhost:8545".to_string(),
            // first Anvil/Hardhat development key
            private_key: "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .to_string(),
            chain_id: None,
            timeout_seconds: None,
        };

        assert_eq!(env.node_url().unwrap().port(), Some(8545));
        assert_eq!(
            env.wallet().unwrap().default_signer().address(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(env.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_env_config_bad_key() {
        let env = EnvConfig {
            node_rpc_url: "not a url".to_string(),
            private_key: "0x1234".to_string(),
            chain_id: Some(11155111),
            timeout_seconds: Some(5),
        };

        assert!(env.node_url().is_err());
        assert!(env.wallet().is_err());
        assert_eq!(env.timeout(), Duration::from_secs(5));
    }
}
