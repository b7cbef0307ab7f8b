//! The seam between screens and the chain.
//!
//! Screens never talk to a provider directly. Everything goes through a
//! [`ChainGateway`], which the wallet session implements for real networks and
//! tests implement with recorders.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// Final state of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptOutcome {
    /// Executed successfully.
    Success,
    /// Mined but reverted.
    Reverted,
}

/// Account and chain access used by every screen.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Connect the wallet, returning its address.
    async fn connect(&self) -> Result<Address>;

    /// Disconnect the wallet. Reads keep working against the active chain.
    async fn disconnect(&self);

    /// Connected account, `None` when disconnected.
    async fn account(&self) -> Option<Address>;

    /// Chain ID the session is currently pointed at.
    async fn chain_id(&self) -> u64;

    /// Ask the wallet to move to another chain.
    async fn switch_chain(&self, chain_id: u64) -> Result<()>;

    /// Execute a read-only call and return the raw return data.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Native currency balance of an address.
    async fn native_balance(&self, address: Address) -> Result<U256>;

    /// Sign and broadcast a contract call from the connected account.
    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash>;

    /// Receipt outcome for a hash, `None` while the transaction is unmined.
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptOutcome>>;
}
