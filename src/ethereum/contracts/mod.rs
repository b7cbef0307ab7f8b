//! Smart contract bindings and the deployed-contract registry.

pub mod erc20;
pub mod registry;
pub mod treasury;

use std::collections::HashMap;

use alloy::primitives::Address;
use serde::Serialize;

use crate::{
    config::ContractAddresses,
    error::{AppError, Result},
    ethereum::Network,
};

/// Logical name of a deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractName {
    /// Treasury holding source tokens and unlock state.
    Treasury,
    /// Source token (mintable ERC20).
    SourceToken,
    /// Target token the unlocks convert into.
    TargetToken,
    /// Heartbeat registry on the dev network.
    RegistryDev,
    /// Heartbeat registry on the prod network.
    RegistryProd,
}

impl ContractName {
    /// Registry deployment for a network.
    pub fn registry(network: Network) -> Self {
        match network {
            Network::Dev => ContractName::RegistryDev,
            Network::Prod => ContractName::RegistryProd,
        }
    }

    /// Environment variable the address is read from.
    pub fn env_var(self) -> &'static str {
        match self {
            ContractName::Treasury => "TREASURY_ADDRESS",
            ContractName::SourceToken => "SOURCE_TOKEN_ADDRESS",
            ContractName::TargetToken => "TARGET_TOKEN_ADDRESS",
            ContractName::RegistryDev => "REGISTRY_DEV_ADDRESS",
            ContractName::RegistryProd => "REGISTRY_PROD_ADDRESS",
        }
    }

    /// ABI binding the contract is called through.
    pub fn abi(self) -> ContractAbi {
        match self {
            ContractName::Treasury => ContractAbi::Treasury,
            ContractName::SourceToken => ContractAbi::SourceToken,
            ContractName::TargetToken => ContractAbi::Erc20,
            ContractName::RegistryDev | ContractName::RegistryProd => ContractAbi::Registry,
        }
    }
}

/// ABI surface of a contract, one per `sol!` interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractAbi {
    /// `ITreasury`.
    Treasury,
    /// `ISourceToken`.
    SourceToken,
    /// `IRegistry`.
    Registry,
    /// `IERC20`.
    Erc20,
}

/// An immutable `{address, abi}` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContractEntry {
    /// Logical name.
    pub name: ContractName,
    /// Deployed address.
    pub address: Address,
    /// ABI binding.
    pub abi: ContractAbi,
}

/// Static mapping from logical contract names to deployments.
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    entries: HashMap<ContractName, ContractEntry>,
}

impl ContractRegistry {
    /// Build the registry from configured addresses.
    ///
    /// Required addresses are already validated by [`crate::Config::from_env`];
    /// the target token is optional and simply absent when not configured.
    pub fn new(addresses: &ContractAddresses) -> Self {
        let mut entries = HashMap::new();
        let mut insert = |name: ContractName, address: Address| {
            entries.insert(name, ContractEntry { name, address, abi: name.abi() });
        };

        insert(ContractName::Treasury, addresses.treasury);
        insert(ContractName::SourceToken, addresses.source_token);
        insert(ContractName::RegistryDev, addresses.registry_dev);
        insert(ContractName::RegistryProd, addresses.registry_prod);
        if let Some(target) = addresses.target_token {
            insert(ContractName::TargetToken, target);
        }

        tracing::debug!(contracts = entries.len(), "Contract registry initialized");

        Self { entries }
    }

    /// Resolve a contract by name.
    pub fn get(&self, name: ContractName) -> Result<ContractEntry> {
        self.entries.get(&name).copied().ok_or_else(|| {
            AppError::Config(format!("{} environment variable not set", name.env_var()))
        })
    }

    /// Resolve a contract that may be absent.
    pub fn try_get(&self, name: ContractName) -> Option<ContractEntry> {
        self.entries.get(&name).copied()
    }

    /// Treasury address.
    pub fn treasury(&self) -> Address {
        self.entries[&ContractName::Treasury].address
    }

    /// Source token address.
    pub fn source_token(&self) -> Address {
        self.entries[&ContractName::SourceToken].address
    }

    /// Registry address for a network.
    pub fn registry(&self, network: Network) -> Address {
        self.entries[&ContractName::registry(network)].address
    }
}
