//! MCP server module.
//!
//! Contains the MCP server and its tool inputs.

pub mod server;

pub use server::TgeConsoleServer;
pub use server::{
    AmountInput, ApproveInput, CheckRoleInput, HeartbeatPeriodInput, HeartbeatRewardInput,
    InitiateUnlockInput, RegistryInput, SelectTabInput, SendBatchInput, SendTokensInput,
    SetAuthorityInput, SetUnlockOptionInput, UnlockIdInput,
};
