//! Wallet session: the connected account and the active chain.

use std::collections::HashMap;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    config::Config,
    error::{AppError, Result},
    ethereum::{
        gateway::{ChainGateway, ReceiptOutcome},
        EthereumClient, Network, WalletManager,
    },
};

struct SessionState {
    network: Network,
    client: EthereumClient,
    account: Option<Address>,
}

/// Process-wide wallet session.
///
/// Starts disconnected on the configured default network. Reads work in either
/// state; transactions need [`ChainGateway::connect`] first.
pub struct WalletSession {
    wallet: Option<WalletManager>,
    rpc_urls: HashMap<Network, String>,
    state: RwLock<SessionState>,
}

impl WalletSession {
    /// Create a session from configuration (no network calls).
    pub fn new(config: &Config) -> Result<Self> {
        let wallet = config.private_key.as_deref().map(WalletManager::from_private_key).transpose()?;

        let rpc_urls: HashMap<Network, String> =
            Network::ALL.into_iter().map(|n| (n, config.rpc_url(n).to_string())).collect();

        let network = config.default_network;
        let client = EthereumClient::new(&rpc_urls[&network])?;

        Ok(Self {
            wallet,
            rpc_urls,
            state: RwLock::new(SessionState { network, client, account: None }),
        })
    }

    /// Network the session is pointed at.
    pub async fn network(&self) -> Network {
        self.state.read().await.network
    }

    fn build_client(&self, network: Network, signing: bool) -> Result<EthereumClient> {
        let rpc_url = &self.rpc_urls[&network];
        match (&self.wallet, signing) {
            (Some(wallet), true) => EthereumClient::with_wallet(rpc_url, wallet.ethereum_wallet()),
            _ => EthereumClient::new(rpc_url),
        }
    }

    async fn client(&self) -> EthereumClient {
        self.state.read().await.client.clone()
    }
}

/// Check that the node behind `client` serves `network`.
async fn verify_chain(client: &EthereumClient, network: Network) -> Result<()> {
    let remote = client.chain_id().await?;
    if remote != network.chain_id() {
        return Err(AppError::ChainSwitchRejected {
            chain_id: network.chain_id(),
            reason: format!("RPC {} serves chain {}", client.rpc_url(), remote),
        });
    }
    Ok(())
}

#[async_trait]
impl ChainGateway for WalletSession {
    async fn connect(&self) -> Result<Address> {
        let wallet = self
            .wallet
            .as_ref()
            .ok_or_else(|| AppError::Wallet("WALLET_PRIVATE_KEY is not configured".into()))?;

        let mut state = self.state.write().await;
        if let Some(account) = state.account {
            return Ok(account);
        }

        let client = self.build_client(state.network, true)?;
        verify_chain(&client, state.network).await?;

        state.client = client;
        state.account = Some(wallet.address());

        tracing::info!(account = %wallet.address(), network = %state.network, "Wallet connected");

        Ok(wallet.address())
    }

    async fn disconnect(&self) {
        let mut state = self.state.write().await;
        if state.account.take().is_none() {
            return;
        }

        match self.build_client(state.network, false) {
            Ok(client) => state.client = client,
            Err(e) => tracing::warn!(error = %e, "Failed to rebuild read-only client"),
        }

        tracing::info!(network = %state.network, "Wallet disconnected");
    }

    async fn account(&self) -> Option<Address> {
        self.state.read().await.account
    }

    async fn chain_id(&self) -> u64 {
        self.state.read().await.network.chain_id()
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        let target = Network::from_chain_id(chain_id).ok_or_else(|| {
            AppError::ChainSwitchRejected { chain_id, reason: "unknown chain".to_string() }
        })?;

        let mut state = self.state.write().await;
        if state.network == target {
            return Ok(());
        }

        let client = self.build_client(target, state.account.is_some())?;
        verify_chain(&client, target).await?;

        tracing::info!(from = %state.network, to = %target, "Switched chain");

        state.network = target;
        state.client = client;
        Ok(())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.client().await.call_contract(to, data).await
    }

    async fn native_balance(&self, address: Address) -> Result<U256> {
        self.client().await.get_native_balance(address).await
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash> {
        let (client, account) = {
            let state = self.state.read().await;
            (state.client.clone(), state.account)
        };
        let from = account.ok_or(AppError::WalletNotConnected)?;
        client.send_transaction(from, to, data).await
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptOutcome>> {
        self.client().await.transaction_receipt(hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContractAddresses;
    use crate::ethereum::constants::{DEFAULT_QUERY_STALE_TIME, DEFAULT_RECEIPT_POLL_INTERVAL};

    fn config(private_key: Option<&str>) -> Config {
        Config {
            contracts: ContractAddresses {
                treasury: Address::repeat_byte(1),
                source_token: Address::repeat_byte(2),
                target_token: None,
                registry_dev: Address::repeat_byte(3),
                registry_prod: Address::repeat_byte(4),
            },
            private_key: private_key.map(str::to_string),
            default_network: Network::Dev,
            dev_rpc_url: None,
            prod_rpc_url: None,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
            query_stale_time: DEFAULT_QUERY_STALE_TIME,
            log_level: "warn".to_string(),
        }
    }

    #[tokio::test]
    async fn test_session_starts_disconnected_on_default_network() {
        let session = WalletSession::new(&config(None)).unwrap();
        assert_eq!(session.account().await, None);
        assert_eq!(session.chain_id().await, 7785);
        assert_eq!(session.network().await, Network::Dev);
    }

    #[tokio::test]
    async fn test_connect_without_key_is_wallet_error() {
        let session = WalletSession::new(&config(None)).unwrap();
        match session.connect().await {
            Err(AppError::Wallet(msg)) => assert!(msg.contains("WALLET_PRIVATE_KEY")),
            other => panic!("Expected Wallet error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_switch_to_unknown_chain_is_rejected() {
        let session = WalletSession::new(&config(None)).unwrap();
        match session.switch_chain(1).await {
            Err(AppError::ChainSwitchRejected { chain_id, .. }) => assert_eq!(chain_id, 1),
            other => panic!("Expected ChainSwitchRejected, got {:?}", other),
        }
        assert_eq!(session.chain_id().await, 7785);
    }

    #[tokio::test]
    async fn test_switch_to_current_chain_is_noop() {
        let session = WalletSession::new(&config(None)).unwrap();
        assert!(session.switch_chain(7785).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_without_connect_is_rejected() {
        let session = WalletSession::new(&config(None)).unwrap();
        let result = session.send_transaction(Address::repeat_byte(1), Bytes::new()).await;
        assert!(matches!(result, Err(AppError::WalletNotConnected)));
    }

    #[test]
    fn test_invalid_private_key_fails_fast() {
        assert!(WalletSession::new(&config(Some("0x1234"))).is_err());
    }
}
