//! TGE Reward Console Library
//!
//! A Model Context Protocol server for administering the contracts of a
//! token-generation-event reward system on the RCade networks.
//!
//! # Features
//!
//! - **Treasury**: balances, unlock options, token transfers and minting
//! - **Unlocks**: the approve-then-unlock flow, fulfilling and cancelling unlocks
//! - **Registry**: heartbeat period and reward, authority and role checks on dev and prod
//!
//! # Example
//!
//! ```rust,ignore
//! use tge_reward_console::{Config, TgeConsoleServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let server = TgeConsoleServer::new(config)?;
//!     // Run server...
//!     Ok(())
//! }
//! ```

pub mod bindings;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod ethereum;
pub mod mcp;
pub mod screens;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result};
pub use ethereum::constants::*;
pub use mcp::TgeConsoleServer;
