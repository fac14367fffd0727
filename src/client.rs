//! Chain access used by the procedures.
//!
//! [`Client`] is the narrow set of calls the deployment and pool procedures
//! issue. [`NodeClient`] implements it on top of an alloy provider with a
//! wallet attached; [`crate::testing::MockClient`] records calls instead.

use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, aliases::U24},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    rpc::{client::RpcClient, types::TransactionRequest},
};
use tracing::debug;
use url::Url;

use crate::{
    abi::{
        token::My404,
        uniswap_v3::{INonfungiblePositionManager, IUniswapV3Factory},
    },
    error::{Error, Result},
    pool::{PoolKey, PoolParams},
};

/// Mined transaction outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// Set for contract creation transactions.
    pub contract_address: Option<Address>,
}

/// Handle of a submitted transaction, consumed by waiting for it.
///
/// Handles are `Send + 'static` so the wait can be moved to a spawned task.
pub trait Confirm: Send + 'static {
    fn tx_hash(&self) -> TxHash;

    /// Waits until the transaction is mined. A mined but reverted transaction
    /// is an [`Error::Reverted`].
    fn confirm(self) -> impl Future<Output = Result<Confirmation>> + Send;
}

#[allow(async_fn_in_trait)]
pub trait Client {
    type Pending: Confirm;

    /// Address transactions are signed with.
    fn signer(&self) -> Address;

    /// Submits a contract creation transaction with the given init code.
    async fn deploy(&self, init_code: Bytes) -> Result<Self::Pending>;

    async fn create_and_initialize_pool(
        &self,
        position_manager: Address,
        params: &PoolParams,
    ) -> Result<Self::Pending>;

    async fn get_pool(&self, factory: Address, key: &PoolKey) -> Result<Address>;

    async fn set_whitelist(
        &self,
        token: Address,
        target: Address,
        state: bool,
    ) -> Result<Self::Pending>;
}

/// [`Client`] backed by an RPC node.
#[derive(Clone, Debug)]
pub struct NodeClient {
    provider: DynProvider,
    signer: Address,
    timeout: Duration,
}

impl NodeClient {
    /// Connects to the node, checking its chain id when one is expected.
    pub async fn connect(
        node_url: Url,
        wallet: EthereumWallet,
        timeout: Duration,
        chain_id: Option<u64>,
    ) -> Result<Self> {
        let signer = wallet.default_signer().address();
        let rpc_client = RpcClient::new_http(node_url);
        let provider = DynProvider::new(
            ProviderBuilder::new()
                .wallet(wallet)
                .connect_client(rpc_client),
        );

        let actual = provider.get_chain_id().await?;
        if let Some(expected) = chain_id {
            if expected != actual {
                return Err(Error::ChainMismatch { expected, actual });
            }
        }
        debug!(%signer, chain_id = actual, "Connected to node");

        Ok(Self::new(provider, signer, timeout))
    }

    /// Wraps a provider that already signs for `signer`.
    pub fn new(provider: DynProvider, signer: Address, timeout: Duration) -> Self {
        Self {
            provider,
            signer,
            timeout,
        }
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Sends a raw transaction request from the signer. Unset gas and fee
    /// fields are filled by the provider.
    pub async fn send(&self, tx: TransactionRequest) -> Result<NodePending> {
        let pending = self
            .provider
            .send_transaction(tx.with_from(self.signer))
            .await?;
        Ok(self.pending(pending))
    }

    fn pending(&self, inner: PendingTransactionBuilder<Ethereum>) -> NodePending {
        debug!(tx = %inner.tx_hash(), "Transaction submitted");
        NodePending {
            inner,
            timeout: self.timeout,
        }
    }
}

impl Client for NodeClient {
    type Pending = NodePending;

    fn signer(&self) -> Address {
        self.signer
    }

    async fn deploy(&self, init_code: Bytes) -> Result<NodePending> {
        self.send(TransactionRequest::default().with_deploy_code(init_code))
            .await
    }

    async fn create_and_initialize_pool(
        &self,
        position_manager: Address,
        params: &PoolParams,
    ) -> Result<NodePending> {
        let manager = INonfungiblePositionManager::new(position_manager, self.provider.clone());
        let pending = manager
            .createAndInitializePoolIfNecessary(
                params.token0(),
                params.token1(),
                fee_tier(params.fee())?,
                params.sqrt_price_x96(),
            )
            .send()
            .await?;
        Ok(self.pending(pending))
    }

    async fn get_pool(&self, factory: Address, key: &PoolKey) -> Result<Address> {
        let factory = IUniswapV3Factory::new(factory, self.provider.clone());
        Ok(factory
            .getPool(key.token0, key.token1, fee_tier(key.fee)?)
            .call()
            .await?)
    }

    async fn set_whitelist(
        &self,
        token: Address,
        target: Address,
        state: bool,
    ) -> Result<NodePending> {
        let token = My404::new(token, self.provider.clone());
        let pending = token.setWhitelist(target, state).send().await?;
        Ok(self.pending(pending))
    }
}

/// Fee as the `uint24` the contracts take.
fn fee_tier(fee: u32) -> Result<U24> {
    U24::try_from(fee).ok()
        .ok_or_else(|| Error::InvalidRequest(format!("fee {fee} does not fit in uint24")))
}

#[derive(Debug)]
pub struct NodePending {
    inner: PendingTransactionBuilder<Ethereum>,
    timeout: Duration,
}

impl Confirm for NodePending {
    fn tx_hash(&self) -> TxHash {
        *self.inner.tx_hash()
    }

    async fn confirm(self) -> Result<Confirmation> {
        let receipt = self
            .inner
            .with_timeout(Some(self.timeout))
            .get_receipt()
            .await?;
        debug!(?receipt, "Transaction receipt");

        if !receipt.status() {
            return Err(Error::Reverted(format!(
                "transaction {} failed",
                receipt.transaction_hash
            )));
        }
        Ok(Confirmation {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            contract_address: receipt.contract_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_tier_range() {
        assert_eq!(fee_tier(10000).unwrap(), U24::from(10000));
        assert_eq!(fee_tier(0xff_ffff).unwrap(), U24::MAX);
        assert!(matches!(fee_tier(1 << 24), Err(Error::InvalidRequest(_))));
    }
}
