//! Chain descriptors for the two RCade networks.

use serde::{Deserialize, Serialize};

use super::constants::{
    NATIVE_SYMBOL, RCADE_MAINNET_CHAIN_ID, RCADE_MAINNET_EXPLORER_URL, RCADE_MAINNET_RPC_URL,
    RCADE_TRIALS_CHAIN_ID, RCADE_TRIALS_EXPLORER_URL, RCADE_TRIALS_RPC_URL,
};

/// Network a registry deployment (and the wallet) can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    /// RCade Trials testnet.
    #[default]
    Dev,
    /// RCade Mainnet.
    Prod,
}

impl Network {
    /// All known networks.
    pub const ALL: [Network; 2] = [Network::Dev, Network::Prod];

    /// Chain ID of the network.
    pub fn chain_id(self) -> u64 {
        match self {
            Network::Dev => RCADE_TRIALS_CHAIN_ID,
            Network::Prod => RCADE_MAINNET_CHAIN_ID,
        }
    }

    /// Look a network up by chain ID.
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }

    /// Static descriptor for the network.
    pub fn descriptor(self) -> NetworkDescriptor {
        match self {
            Network::Dev => NetworkDescriptor {
                chain_id: RCADE_TRIALS_CHAIN_ID,
                name: "RCade Trials",
                default_rpc_url: RCADE_TRIALS_RPC_URL,
                explorer_url: RCADE_TRIALS_EXPLORER_URL,
                native_symbol: NATIVE_SYMBOL,
                testnet: true,
            },
            Network::Prod => NetworkDescriptor {
                chain_id: RCADE_MAINNET_CHAIN_ID,
                name: "RCade Mainnet",
                default_rpc_url: RCADE_MAINNET_RPC_URL,
                explorer_url: RCADE_MAINNET_EXPLORER_URL,
                native_symbol: NATIVE_SYMBOL,
                testnet: false,
            },
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "trials" | "testnet" => Ok(Network::Dev),
            "prod" | "mainnet" => Ok(Network::Prod),
            _ => Err(format!("Invalid network: {} (expected 'dev' or 'prod')", s)),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Dev => write!(f, "dev"),
            Network::Prod => write!(f, "prod"),
        }
    }
}

/// Chain metadata used to configure providers and render explorer links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkDescriptor {
    /// EIP-155 chain ID.
    pub chain_id: u64,
    /// Human-readable chain name.
    pub name: &'static str,
    /// RPC endpoint used when no override is configured.
    pub default_rpc_url: &'static str,
    /// Block explorer base URL.
    pub explorer_url: &'static str,
    /// Native currency symbol.
    pub native_symbol: &'static str,
    /// Whether the chain is a testnet.
    pub testnet: bool,
}
