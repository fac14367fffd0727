//! Launchpad deployment scripts.
//!
//! # Overview
//!
//! Two one-shot procedures driving an EVM node:
//!
//! * [`deploy::run`] deploys the My404 token and the LaunchpadFactory
//!   parameterized by the token address.
//!
//! * [`pool::initialize`] creates and initializes the token/WETH pool on
//!   Uniswap V3 and whitelists the pool on the token.
//!
//! Both talk to the chain through [`client::Client`], implemented by
//! [`client::NodeClient`] for a real node. The `deploy` and `init_pool`
//! binaries wire them to environment and CLI configuration.
//!
//! # Testing
//!
//! [`testing`] module provides a recording client to check call sequencing
//! without a node. `./tests` runs the procedures against Anvil.

pub mod abi;
pub mod artifact;
pub mod client;
pub mod config;
pub mod deploy;
pub mod error;
pub mod pool;
pub mod testing;

use alloy::primitives::{Address, U160, address, uint};

#[derive(Clone, Debug)]
/// Contracts and launch parameters of the network the token is launched on.
pub struct Network {
    pub chain_id: u64,
    /// Deployed My404 token, token0 of the pool
    pub token: Address,
    /// Wrapped native token, token1 of the pool
    pub weth: Address,
    pub position_manager: Address,
    pub pool_factory: Address,
    pub fee: u32,
    pub sqrt_price_x96: U160,
}

impl Network {
    pub fn sepolia() -> Self {
        Self {
            chain_id: 11155111,
            token: address!("0x9c8a4762AB11A6Fa13313dDDEe8c879b1298F6a5"),
            weth: address!("0xfFf9976782d46CC05630D1f6eBAb18b2324d6B14"),
            position_manager: address!("0x1238536071E1c677A632429e3655c799b22cDA52"),
            pool_factory: address!("0x0227628f3F023bb0B980b67D528571c95c6DaC1c"),
            fee: 10000,
            // sqrt(1/10000) * 2^96
            sqrt_price_x96: uint!(792281625000000000000000000_U160),
        }
    }
}
