//! Uniswap V3 pool parameters and the pool initialization procedure.
//!
//! [`initialize`] creates and initializes a pool through the position manager,
//! looks the pool up on the factory and whitelists it on the token so that
//! liquidity provision and swaps bypass the token's transfer restrictions.

use std::fmt;

use alloy::primitives::{Address, B256, TxHash, U160, U256, b256, keccak256};
use tracing::{info, warn};

use crate::{
    client::{Client, Confirm},
    error::{Error, Result},
};

/// Fee tiers enabled on the canonical factory, in hundredths of a basis point.
pub const FEE_TIERS: [u32; 4] = [100, 500, 3000, 10000];

/// Lowest `sqrtPriceX96` accepted by the pool, `getSqrtRatioAtTick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U160 = U160::from_limbs([4295128739, 0, 0]);

/// Upper bound (exclusive) of `sqrtPriceX96`, `getSqrtRatioAtTick(MAX_TICK)`.
pub const MAX_SQRT_RATIO: U160 =
    U160::from_limbs([0x5d951d5263988d26, 0xefd1fc6a50648849, 0xfffd8963]);

/// Keccak of the pool contract creation code used by the canonical factory.
pub const POOL_INIT_CODE_HASH: B256 =
    b256!("0xe34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54");

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PoolParamsError {
    #[error("pool token can not be the zero address")]
    ZeroToken,

    #[error("pool tokens must differ")]
    SameToken,

    #[error("token0 {0} must sort before token1 {1}")]
    Unsorted(Address, Address),

    #[error("fee tier {0} is not enabled, expected one of 100, 500, 3000, 10000")]
    UnsupportedFee(u32),

    #[error("sqrtPriceX96 {0} is outside of [MIN_SQRT_RATIO, MAX_SQRT_RATIO)")]
    PriceOutOfRange(U160),
}

/// Token pair, fee tier and initial price of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolParams {
    token0: Address,
    token1: Address,
    fee: u32,
    sqrt_price_x96: U160,
}

impl PoolParams {
    pub fn new(
        token0: Address,
        token1: Address,
        fee: u32,
        sqrt_price_x96: U160,
    ) -> std::result::Result<Self, PoolParamsError> {
        if token0.is_zero() || token1.is_zero() {
            return Err(PoolParamsError::ZeroToken);
        }
        if token0 == token1 {
            return Err(PoolParamsError::SameToken);
        }
        if token0 > token1 {
            return Err(PoolParamsError::Unsorted(token0, token1));
        }
        if !FEE_TIERS.contains(&fee) {
            return Err(PoolParamsError::UnsupportedFee(fee));
        }
        if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
            return Err(PoolParamsError::PriceOutOfRange(sqrt_price_x96));
        }
        Ok(Self {
            token0,
            token1,
            fee,
            sqrt_price_x96,
        })
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    pub fn fee(&self) -> u32 {
        self.fee
    }

    pub fn sqrt_price_x96(&self) -> U160 {
        self.sqrt_price_x96
    }

    pub fn key(&self) -> PoolKey {
        PoolKey {
            token0: self.token0,
            token1: self.token1,
            fee: self.fee,
        }
    }
}

/// Identifies a pool on the factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
}

impl PoolKey {
    /// CREATE2 address the canonical factory deploys this pool at.
    pub fn compute_address(&self, factory: Address) -> Address {
        let mut encoded = [0u8; 96];
        encoded[..32].copy_from_slice(self.token0.into_word().as_slice());
        encoded[32..64].copy_from_slice(self.token1.into_word().as_slice());
        encoded[64..].copy_from_slice(&U256::from(self.fee).to_be_bytes::<32>());
        factory.create2(keccak256(encoded), POOL_INIT_CODE_HASH)
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.token0, self.token1, self.fee)
    }
}

/// Contracts and parameters of a pool initialization run.
#[derive(Clone, Copy, Debug)]
pub struct PoolConfig {
    pub position_manager: Address,
    pub pool_factory: Address,
    pub params: PoolParams,
}

/// How the whitelist transaction is followed up once submitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WhitelistConfirmation {
    /// Wait for the transaction to be mined before returning.
    #[default]
    Await,
    /// Return right after submission, confirming in a spawned task that only
    /// logs the outcome. The transaction may still be pending (or fail) after
    /// the procedure completes.
    Detached,
}

#[derive(Clone, Copy, Debug)]
pub struct PoolInitialization {
    pub pool: Address,
    pub create_tx: TxHash,
    pub whitelist_tx: TxHash,
    pub whitelist_confirmed: bool,
}

/// Creates the pool if needed, initializes its price and whitelists it on
/// `token0`.
///
/// Steps run strictly in order and the first failure aborts the rest.
pub async fn initialize<C: Client>(
    client: &C,
    config: &PoolConfig,
    whitelist: WhitelistConfirmation,
) -> Result<PoolInitialization> {
    let params = config.params;
    info!(
        token0 = %params.token0(),
        token1 = %params.token1(),
        fee = params.fee(),
        sqrt_price_x96 = %params.sqrt_price_x96(),
        "Pool is initializing on Uniswap V3..."
    );

    let create = client
        .create_and_initialize_pool(config.position_manager, &params)
        .await?
        .confirm()
        .await?;
    info!(tx = %create.tx_hash, "Pool initialized");

    let key = params.key();
    let pool = client.get_pool(config.pool_factory, &key).await?;
    if pool.is_zero() {
        return Err(Error::PoolNotFound(key.to_string()));
    }
    info!(%pool, "Pool address");

    let expected = key.compute_address(config.pool_factory);
    if expected != pool {
        warn!(%pool, %expected, "Pool address differs from the canonical CREATE2 address");
    }

    info!(%pool, token = %params.token0(), "Pool address is being whitelisted...");
    let pending = client.set_whitelist(params.token0(), pool, true).await?;
    let whitelist_tx = pending.tx_hash();
    let whitelist_confirmed = match whitelist {
        WhitelistConfirmation::Await => {
            pending.confirm().await?;
            info!(tx = %whitelist_tx, "Pool whitelisted");
            true
        }
        WhitelistConfirmation::Detached => {
            tokio::spawn(async move {
                match pending.confirm().await {
                    Ok(_) => info!(tx = %whitelist_tx, "Pool whitelisted"),
                    Err(e) => warn!(%e, tx = %whitelist_tx, "Whitelist transaction failed"),
                }
            });
            warn!(tx = %whitelist_tx, "Whitelist transaction submitted, not waiting for confirmation");
            false
        }
    };

    Ok(PoolInitialization {
        pool,
        create_tx: create.tx_hash,
        whitelist_tx,
        whitelist_confirmed,
    })
}
