//! Configuration management module.
//!
//! Handles loading configuration from environment variables.

use std::env;
use std::time::Duration;

use alloy::primitives::Address;

use crate::error::AppError;
use crate::ethereum::{
    constants::{DEFAULT_QUERY_STALE_TIME, DEFAULT_RECEIPT_POLL_INTERVAL},
    Network,
};

/// Deployed contract addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractAddresses {
    /// Treasury contract.
    pub treasury: Address,
    /// Source token contract.
    pub source_token: Address,
    /// Target token contract, if deployed.
    pub target_token: Option<Address>,
    /// Registry on the dev network.
    pub registry_dev: Address,
    /// Registry on the prod network.
    pub registry_prod: Address,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Contract addresses.
    pub contracts: ContractAddresses,
    /// Private key for the operator wallet (hex string). `None` runs read-only.
    pub private_key: Option<String>,
    /// Network the wallet connects to at startup.
    pub default_network: Network,
    /// RPC override for the dev network.
    pub dev_rpc_url: Option<String>,
    /// RPC override for the prod network.
    pub prod_rpc_url: Option<String>,
    /// Interval between transaction receipt polls.
    pub receipt_poll_interval: Duration,
    /// How long a cached contract read is served before it is fetched again.
    pub query_stale_time: Duration,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `TREASURY_ADDRESS`, `SOURCE_TOKEN_ADDRESS`
    /// - `REGISTRY_DEV_ADDRESS`, `REGISTRY_PROD_ADDRESS`
    ///
    /// Optional environment variables:
    /// - `TARGET_TOKEN_ADDRESS`
    /// - `WALLET_PRIVATE_KEY`: operator key; without it the console is read-only
    /// - `DEFAULT_NETWORK`: `dev` or `prod` (default: dev)
    /// - `RCADE_TRIALS_RPC_URL`, `RCADE_MAINNET_RPC_URL`: RPC overrides
    /// - `RECEIPT_POLL_INTERVAL_MS`: receipt polling interval (default: 4000)
    /// - `QUERY_STALE_TIME_MS`: read cache lifetime (default: 0, always re-read)
    /// - `LOG_LEVEL`: Logging level (default: info)
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let contracts = ContractAddresses {
            treasury: required_address("TREASURY_ADDRESS")?,
            source_token: required_address("SOURCE_TOKEN_ADDRESS")?,
            target_token: optional_address("TARGET_TOKEN_ADDRESS")?,
            registry_dev: required_address("REGISTRY_DEV_ADDRESS")?,
            registry_prod: required_address("REGISTRY_PROD_ADDRESS")?,
        };

        let default_network = match non_empty_var("DEFAULT_NETWORK") {
            Some(raw) => raw.parse::<Network>().map_err(AppError::Config)?,
            None => Network::default(),
        };

        let receipt_poll_interval = match non_empty_var("RECEIPT_POLL_INTERVAL_MS") {
            Some(raw) => {
                let interval = parse_millis("RECEIPT_POLL_INTERVAL_MS", &raw)?;
                if interval.is_zero() {
                    return Err(AppError::Config(
                        "RECEIPT_POLL_INTERVAL_MS must be greater than zero".into(),
                    ));
                }
                interval
            }
            None => DEFAULT_RECEIPT_POLL_INTERVAL,
        };

        let query_stale_time = match non_empty_var("QUERY_STALE_TIME_MS") {
            Some(raw) => parse_millis("QUERY_STALE_TIME_MS", &raw)?,
            None => DEFAULT_QUERY_STALE_TIME,
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            contracts,
            private_key: non_empty_var("WALLET_PRIVATE_KEY"),
            default_network,
            dev_rpc_url: non_empty_var("RCADE_TRIALS_RPC_URL"),
            prod_rpc_url: non_empty_var("RCADE_MAINNET_RPC_URL"),
            receipt_poll_interval,
            query_stale_time,
            log_level,
        })
    }

    /// RPC endpoint for a network, honoring overrides.
    pub fn rpc_url(&self, network: Network) -> &str {
        let configured = match network {
            Network::Dev => self.dev_rpc_url.as_deref(),
            Network::Prod => self.prod_rpc_url.as_deref(),
        };
        configured.unwrap_or(network.descriptor().default_rpc_url)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse an address value read from `name`.
pub fn parse_config_address(name: &str, raw: &str) -> Result<Address, AppError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| AppError::Config(format!("Invalid address in {}: '{}' ({})", name, raw, e)))
}

/// Parse a millisecond duration read from `name`.
pub fn parse_millis(name: &str, raw: &str) -> Result<Duration, AppError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", name, raw, e)))
}

fn required_address(name: &str) -> Result<Address, AppError> {
    let raw = non_empty_var(name)
        .ok_or_else(|| AppError::Config(format!("{} environment variable not set", name)))?;
    parse_config_address(name, &raw)
}

fn optional_address(name: &str) -> Result<Option<Address>, AppError> {
    non_empty_var(name).map(|raw| parse_config_address(name, &raw)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            contracts: ContractAddresses {
                treasury: Address::repeat_byte(0x01),
                source_token: Address::repeat_byte(0x02),
                target_token: None,
                registry_dev: Address::repeat_byte(0x03),
                registry_prod: Address::repeat_byte(0x04),
            },
            private_key: None,
            default_network: Network::Dev,
            dev_rpc_url: None,
            prod_rpc_url: Some("http://localhost:8545".to_string()),
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
            query_stale_time: DEFAULT_QUERY_STALE_TIME,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_rpc_url_defaults_and_overrides() {
        let config = sample_config();
        assert_eq!(config.rpc_url(Network::Dev), "https://rcade-trials-v3.rpc.caldera.xyz/http");
        assert_eq!(config.rpc_url(Network::Prod), "http://localhost:8545");
    }

    #[test]
    fn test_parse_config_address_valid() {
        let addr =
            parse_config_address("TREASURY_ADDRESS", " 0x0000000000000000000000000000000000000001 ")
                .unwrap();
        assert_eq!(addr, Address::with_last_byte(1));
    }

    #[test]
    fn test_parse_config_address_invalid_names_variable() {
        let err = parse_config_address("REGISTRY_DEV_ADDRESS", "0x1234").unwrap_err();
        match err {
            AppError::Config(msg) => assert!(msg.contains("REGISTRY_DEV_ADDRESS")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(parse_millis("QUERY_STALE_TIME_MS", " 1500 ").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_millis("QUERY_STALE_TIME_MS", "0").unwrap(), Duration::ZERO);

        match parse_millis("QUERY_STALE_TIME_MS", "soon").unwrap_err() {
            AppError::Config(msg) => assert!(msg.contains("QUERY_STALE_TIME_MS")),
            _ => panic!("Expected Config error"),
        }
    }
}
