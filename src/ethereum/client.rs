//! Ethereum RPC client.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::{
    error::{AppError, Result},
    ethereum::gateway::ReceiptOutcome,
};

/// Ethereum RPC client wrapper with lazy initialization.
///
/// A client built with [`EthereumClient::with_wallet`] can sign; one built with
/// [`EthereumClient::new`] is read-only.
#[derive(Clone)]
pub struct EthereumClient {
    /// The underlying provider.
    provider: DynProvider,
    /// RPC URL for logging.
    rpc_url: String,
    /// Lazily initialized chain ID.
    chain_id: Arc<OnceCell<u64>>,
}

impl EthereumClient {
    /// Create a read-only client.
    ///
    /// Note: This does NOT make any network calls. The connection is
    /// established lazily when the first operation is performed.
    pub fn new(rpc_url: &str) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid RPC URL: {}", rpc_url)))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        tracing::info!(rpc_url = %rpc_url, "Ethereum client created (lazy initialization)");

        Ok(Self::from_provider(provider, rpc_url))
    }

    /// Create a client that signs transactions with `wallet`.
    pub fn with_wallet(rpc_url: &str, wallet: EthereumWallet) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid RPC URL: {}", rpc_url)))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url).erased();

        tracing::info!(rpc_url = %rpc_url, "Signing Ethereum client created");

        Ok(Self::from_provider(provider, rpc_url))
    }

    fn from_provider(provider: DynProvider, rpc_url: &str) -> Self {
        Self { provider, rpc_url: rpc_url.to_string(), chain_id: Arc::new(OnceCell::new()) }
    }

    /// Get the chain ID reported by the node (fetched on first call).
    pub async fn chain_id(&self) -> Result<u64> {
        self.chain_id
            .get_or_try_init(|| async {
                let chain_id = self.provider.get_chain_id().await?;
                tracing::info!(chain_id = chain_id, rpc_url = %self.rpc_url, "Connected to node");
                Ok(chain_id)
            })
            .await
            .copied()
    }

    /// RPC URL this client talks to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Get native balance for an address.
    pub async fn get_native_balance(&self, address: Address) -> Result<U256> {
        let balance = self.provider.get_balance(address).await?;
        Ok(balance)
    }

    /// Make a contract call (eth_call, nothing is broadcast).
    pub async fn call_contract(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default().to(to).input(data.into());
        let result = self.provider.call(tx).await?;
        Ok(result)
    }

    /// Sign and broadcast a contract call, returning its hash once accepted.
    pub async fn send_transaction(&self, from: Address, to: Address, data: Bytes) -> Result<TxHash> {
        let tx = TransactionRequest::default().from(from).to(to).input(data.into());
        let pending = self.provider.send_transaction(tx).await?;
        let hash = *pending.tx_hash();

        tracing::info!(tx_hash = %hash, to = %to, "Transaction broadcast");

        Ok(hash)
    }

    /// Look up a receipt.
    pub async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptOutcome>> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|r| {
            if r.status() {
                ReceiptOutcome::Success
            } else {
                ReceiptOutcome::Reverted
            }
        }))
    }
}

impl std::fmt::Debug for EthereumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumClient").field("rpc_url", &self.rpc_url).finish()
    }
}
