//! Operator wallet.

use alloy::{network::EthereumWallet, primitives::Address, signers::local::PrivateKeySigner};

use crate::error::{AppError, Result};

/// Wallet manager holding the operator's signer.
#[derive(Clone)]
pub struct WalletManager {
    /// The local signer.
    signer: PrivateKeySigner,
    /// Wallet address.
    address: Address,
}

impl WalletManager {
    /// Create a wallet manager from a private key string.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let signer: PrivateKeySigner =
            key.parse().map_err(|e: alloy::signers::local::LocalSignerError| {
                AppError::Wallet(e.to_string())
            })?;

        let address = signer.address();

        tracing::info!(address = %address, "Wallet loaded");

        Ok(Self { signer, address })
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Network wallet used by signing providers.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager").field("address", &self.address).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known Hardhat/Foundry test key (DO NOT use in production!)
    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_from_private_key_with_and_without_prefix() {
        let with_prefix = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let without_prefix =
            WalletManager::from_private_key(TEST_PRIVATE_KEY.trim_start_matches("0x")).unwrap();

        let addr_str = format!("{:?}", with_prefix.address()).to_lowercase();
        assert_eq!(addr_str, "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        assert_eq!(with_prefix.address(), without_prefix.address());
    }

    #[test]
    fn test_wallet_invalid_private_key() {
        assert!(WalletManager::from_private_key("0x1234").is_err());
        assert!(WalletManager::from_private_key("0xZZZZ").is_err());
        assert!(WalletManager::from_private_key("").is_err());

        match WalletManager::from_private_key("invalid_key") {
            Err(AppError::Wallet(msg)) => assert!(!msg.is_empty()),
            other => panic!("Expected Wallet error, got {:?}", other),
        }
    }

    #[test]
    fn test_ethereum_wallet_default_signer_matches() {
        use alloy::network::NetworkWallet;

        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let eth_wallet = wallet.ethereum_wallet();
        assert_eq!(
            NetworkWallet::<alloy::network::Ethereum>::default_signer_address(&eth_wallet),
            wallet.address()
        );
    }

    #[test]
    fn test_wallet_debug_hides_key() {
        let wallet = WalletManager::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let debug_str = format!("{:?}", wallet);

        assert!(debug_str.contains("WalletManager"));
        assert!(
            !debug_str.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
        );
    }
}
