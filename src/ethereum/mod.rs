//! Ethereum interaction module.
//!
//! Contains the RPC client, the wallet session, networks and contract bindings.

pub mod client;
pub mod constants;
pub mod contracts;
pub mod gateway;
pub mod network;
pub mod session;
pub mod wallet;

pub use client::EthereumClient;
pub use gateway::{ChainGateway, ReceiptOutcome};
pub use network::{Network, NetworkDescriptor};
pub use session::WalletSession;
pub use wallet::WalletManager;
