//! Recording [`Client`] for procedure tests.
//!
//! [`MockClient`] records every call it receives, deploys contracts at the
//! addresses a real chain would assign (`signer.create(nonce)`), and can be
//! told to fail submissions, revert confirmations or delay confirmations per
//! [`Step`].

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::primitives::{Address, Bytes, TxHash, address, keccak256};

use crate::{
    client::{Client, Confirm, Confirmation},
    error::{Error, Result},
    pool::{PoolKey, PoolParams},
};

const SIGNER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const POOL: Address = address!("0x0000000000000000000000000000000000000b00");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Deploy,
    CreatePool,
    GetPool,
    SetWhitelist,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Deploy {
        init_code: Bytes,
    },
    CreateAndInitializePool {
        manager: Address,
        params: PoolParams,
    },
    GetPool {
        factory: Address,
        key: PoolKey,
    },
    SetWhitelist {
        token: Address,
        target: Address,
        state: bool,
    },
}

impl Call {
    pub fn step(&self) -> Step {
        match self {
            Call::Deploy { .. } => Step::Deploy,
            Call::CreateAndInitializePool { .. } => Step::CreatePool,
            Call::GetPool { .. } => Step::GetPool,
            Call::SetWhitelist { .. } => Step::SetWhitelist,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<Call>,
    confirmed: Vec<TxHash>,
    nonce: u64,
}

#[derive(Clone, Debug)]
pub struct MockClient {
    signer: Address,
    pool: Address,
    fail_submit: HashSet<Step>,
    revert: HashSet<Step>,
    delays: HashMap<Step, Duration>,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            signer: SIGNER,
            pool: POOL,
            fail_submit: HashSet::new(),
            revert: HashSet::new(),
            delays: HashMap::new(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Address returned by `get_pool`.
    pub fn with_pool(mut self, pool: Address) -> Self {
        self.pool = pool;
        self
    }

    /// Submissions of `step` fail with a transport error.
    pub fn fail_submit(mut self, step: Step) -> Self {
        self.fail_submit.insert(step);
        self
    }

    /// Transactions of `step` are mined but reverted.
    pub fn revert(mut self, step: Step) -> Self {
        self.revert.insert(step);
        self
    }

    /// Confirmations of `step` take `delay` to arrive.
    pub fn confirm_delay(mut self, step: Step, delay: Duration) -> Self {
        self.delays.insert(step, delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, step: Step) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.step() == step)
            .count()
    }

    /// Hashes of transactions confirmed so far, in confirmation order.
    pub fn confirmed(&self) -> Vec<TxHash> {
        self.state.lock().unwrap().confirmed.clone()
    }

    /// Address of the `n`-th contract deployed by this client.
    pub fn deployed_address(&self, n: u64) -> Address {
        self.signer.create(n)
    }

    fn record(&self, call: Call) -> Result<(usize, Step)> {
        let step = call.step();
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if self.fail_submit.contains(&step) {
            return Err(Error::Transport(format!("mock {step:?} submission failed")));
        }
        Ok((state.calls.len(), step))
    }

    fn pending(&self, idx: usize, step: Step, contract_address: Option<Address>) -> MockPending {
        MockPending {
            tx_hash: keccak256((idx as u64).to_be_bytes()),
            step,
            contract_address,
            revert: self.revert.contains(&step),
            delay: self.delays.get(&step).copied(),
            state: self.state.clone(),
        }
    }
}

impl Client for MockClient {
    type Pending = MockPending;

    fn signer(&self) -> Address {
        self.signer
    }

    async fn deploy(&self, init_code: Bytes) -> Result<MockPending> {
        let (idx, step) = self.record(Call::Deploy { init_code })?;
        let address = {
            let mut state = self.state.lock().unwrap();
            let address = self.signer.create(state.nonce);
            state.nonce += 1;
            address
        };
        Ok(self.pending(idx, step, Some(address)))
    }

    async fn create_and_initialize_pool(
        &self,
        position_manager: Address,
        params: &PoolParams,
    ) -> Result<MockPending> {
        let (idx, step) = self.record(Call::CreateAndInitializePool {
            manager: position_manager,
            params: *params,
        })?;
        Ok(self.pending(idx, step, None))
    }

    async fn get_pool(&self, factory: Address, key: &PoolKey) -> Result<Address> {
        self.record(Call::GetPool { factory, key: *key })?;
        Ok(self.pool)
    }

    async fn set_whitelist(
        &self,
        token: Address,
        target: Address,
        state: bool,
    ) -> Result<MockPending> {
        let (idx, step) = self.record(Call::SetWhitelist {
            token,
            target,
            state,
        })?;
        Ok(self.pending(idx, step, None))
    }
}

#[derive(Debug)]
pub struct MockPending {
    tx_hash: TxHash,
    step: Step,
    contract_address: Option<Address>,
    revert: bool,
    delay: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl Confirm for MockPending {
    fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    async fn confirm(self) -> Result<Confirmation> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.revert {
            return Err(Error::Reverted(format!("mock {:?} reverted", self.step)));
        }
        self.state.lock().unwrap().confirmed.push(self.tx_hash);
        Ok(Confirmation {
            tx_hash: self.tx_hash,
            block_number: Some(1),
            contract_address: self.contract_address,
        })
    }
}
