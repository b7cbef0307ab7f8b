//! Registry projections.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{ethereum::constants::TOKEN_DECIMALS, types::format_units};

/// Heartbeat parameters of one registry deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// Heartbeat period in seconds, `None` when the registry reports zero.
    pub period_seconds: Option<String>,
    /// Reward per heartbeat in ether, `None` when zero.
    pub reward: Option<String>,
    /// Reward per heartbeat in wei.
    pub reward_wei: Option<String>,
}

impl HeartbeatConfig {
    /// Build from raw reads; zero values render as "not set".
    pub fn new(period: Option<U256>, reward_wei: Option<U256>) -> Self {
        let non_zero = |v: Option<U256>| v.filter(|v| !v.is_zero());
        Self {
            period_seconds: non_zero(period).map(|p| p.to_string()),
            reward: non_zero(reward_wei).map(|r| format_units(r, TOKEN_DECIMALS)),
            reward_wei: non_zero(reward_wei).map(|r| r.to_string()),
        }
    }
}

/// A `hasRole` query and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCheck {
    /// Role identifier (bytes32, hex).
    pub role: String,
    /// Account checked.
    pub address: String,
    /// Result, `None` until the read completes.
    pub has_role: Option<bool>,
}

impl RoleCheck {
    /// Build from parsed inputs.
    pub fn new(role: B256, address: Address, has_role: Option<bool>) -> Self {
        Self { role: role.to_string(), address: format!("{address:?}"), has_role }
    }
}
