//! Common utilities for integration tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::{
    primitives::{address, Address, Bytes, TxHash, U256},
    sol_types::SolCall,
};
use async_trait::async_trait;
use tge_reward_console::{
    config::ContractAddresses,
    ethereum::{contracts::ContractRegistry, ChainGateway, Network, ReceiptOutcome},
    screens::ScreenContext,
    AppError, Config, Result, TgeConsoleServer,
};

pub const TREASURY: Address = address!("1111111111111111111111111111111111111111");
pub const SOURCE_TOKEN: Address = address!("2222222222222222222222222222222222222222");
pub const REGISTRY_DEV: Address = address!("3333333333333333333333333333333333333333");
pub const REGISTRY_PROD: Address = address!("4444444444444444444444444444444444444444");
pub const OPERATOR: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Contract addresses used by every mock test.
pub fn contract_addresses() -> ContractAddresses {
    ContractAddresses {
        treasury: TREASURY,
        source_token: SOURCE_TOKEN,
        target_token: None,
        registry_dev: REGISTRY_DEV,
        registry_prod: REGISTRY_PROD,
    }
}

pub fn contracts() -> ContractRegistry {
    ContractRegistry::new(&contract_addresses())
}

/// Screen context around a mock gateway.
pub fn context(gateway: Arc<MockGateway>) -> ScreenContext {
    ScreenContext::new(gateway, Arc::new(contracts()), POLL_INTERVAL)
}

/// Screen context whose read cache serves entries for a minute.
pub fn caching_context(gateway: Arc<MockGateway>) -> ScreenContext {
    context(gateway).with_query_stale_time(Duration::from_secs(60))
}

/// A transaction handed to the mock wallet.
#[derive(Debug, Clone)]
pub struct SentTx {
    pub to: Address,
    pub data: Bytes,
    pub hash: TxHash,
}

impl SentTx {
    /// Decode the calldata as `C`.
    pub fn decode<C: SolCall>(&self) -> C {
        C::abi_decode(&self.data).expect("calldata should decode")
    }

    pub fn selector(&self) -> [u8; 4] {
        self.data[..4].try_into().expect("calldata has a selector")
    }
}

struct MockState {
    wallet: Address,
    account: Option<Address>,
    chain_id: u64,
    reject_switch: bool,
    switch_requests: Vec<u64>,
    reads: Vec<(Address, Bytes)>,
    sent: Vec<SentTx>,
    responses: HashMap<(Address, Bytes), Bytes>,
    native_balances: HashMap<Address, U256>,
    send_error: Option<String>,
    receipt: Option<ReceiptOutcome>,
    receipts: HashMap<TxHash, ReceiptOutcome>,
}

/// In-memory [`ChainGateway`] that records every request.
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl MockGateway {
    /// Disconnected gateway on the dev chain. Receipts succeed by default.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                wallet: OPERATOR,
                account: None,
                chain_id: Network::Dev.chain_id(),
                reject_switch: false,
                switch_requests: Vec::new(),
                reads: Vec::new(),
                sent: Vec::new(),
                responses: HashMap::new(),
                native_balances: HashMap::new(),
                send_error: None,
                receipt: Some(ReceiptOutcome::Success),
                receipts: HashMap::new(),
            }),
        }
    }

    /// Gateway already connected as [`OPERATOR`].
    pub fn connected() -> Self {
        let gateway = Self::new();
        gateway.state.lock().unwrap().account = Some(OPERATOR);
        gateway
    }

    pub fn on_chain(self, chain_id: u64) -> Self {
        self.state.lock().unwrap().chain_id = chain_id;
        self
    }

    /// Answer `call` on `contract` with `ret`.
    pub fn respond<C: SolCall>(&self, contract: Address, call: &C, ret: &C::Return) {
        let key = (contract, Bytes::from(call.abi_encode()));
        let raw = Bytes::from(C::abi_encode_returns(ret));
        self.state.lock().unwrap().responses.insert(key, raw);
    }

    pub fn set_native_balance(&self, address: Address, balance: U256) {
        self.state.lock().unwrap().native_balances.insert(address, balance);
    }

    /// Make the wallet reject every submission with `message`.
    pub fn fail_sends(&self, message: &str) {
        self.state.lock().unwrap().send_error = Some(message.to_string());
    }

    /// Receipt returned for every transaction (`None` keeps them pending).
    pub fn set_receipt(&self, outcome: Option<ReceiptOutcome>) {
        self.state.lock().unwrap().receipt = outcome;
    }

    pub fn reject_chain_switches(&self) {
        self.state.lock().unwrap().reject_switch = true;
    }

    pub fn switch_requests(&self) -> Vec<u64> {
        self.state.lock().unwrap().switch_requests.clone()
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn reads(&self) -> Vec<(Address, Bytes)> {
        self.state.lock().unwrap().reads.clone()
    }

    /// Number of requests that reached the chain or the wallet.
    pub fn network_requests(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.reads.len() + state.sent.len() + state.switch_requests.len()
    }
}

#[async_trait]
impl ChainGateway for MockGateway {
    async fn connect(&self) -> Result<Address> {
        let mut state = self.state.lock().unwrap();
        let wallet = state.wallet;
        state.account = Some(wallet);
        Ok(wallet)
    }

    async fn disconnect(&self) {
        self.state.lock().unwrap().account = None;
    }

    async fn account(&self) -> Option<Address> {
        self.state.lock().unwrap().account
    }

    async fn chain_id(&self) -> u64 {
        self.state.lock().unwrap().chain_id
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.switch_requests.push(chain_id);
        if state.reject_switch {
            return Err(AppError::ChainSwitchRejected {
                chain_id,
                reason: "User rejected the request".to_string(),
            });
        }
        state.chain_id = chain_id;
        Ok(())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.reads.push((to, data.clone()));
        state
            .responses
            .get(&(to, data))
            .cloned()
            .ok_or_else(|| AppError::Rpc("execution reverted".to_string()))
    }

    async fn native_balance(&self, address: Address) -> Result<U256> {
        Ok(self.state.lock().unwrap().native_balances.get(&address).copied().unwrap_or_default())
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        if state.account.is_none() {
            return Err(AppError::WalletNotConnected);
        }
        if let Some(message) = &state.send_error {
            return Err(AppError::Wallet(message.clone()));
        }
        let hash = TxHash::with_last_byte(state.sent.len() as u8 + 1);
        state.sent.push(SentTx { to, data, hash });
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptOutcome>> {
        let state = self.state.lock().unwrap();
        Ok(state.receipts.get(&hash).copied().or(state.receipt))
    }
}

/// Helper to create a live server from environment variables.
pub fn create_test_server() -> Option<TgeConsoleServer> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env().ok()?;
    TgeConsoleServer::new(config).ok()
}

/// Skip test if server cannot be created (missing env vars).
#[macro_export]
macro_rules! skip_if_no_server {
    () => {
        match common::create_test_server() {
            Some(server) => server,
            None => {
                eprintln!("Skipping test: contract address environment variables not set");
                return;
            }
        }
    };
}
