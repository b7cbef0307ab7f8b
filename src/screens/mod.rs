//! Screens: form state and panels composed from read/write bindings.
//!
//! Each screen owns its form inputs, its read bindings and one
//! [`TrackedWrite`](crate::bindings::TrackedWrite) per button. Actions
//! validate the inputs, submit, and return immediately; [`sync`] style methods
//! on each screen apply receipt outcomes (clear inputs, set messages,
//! invalidate reads).
//!
//! [`sync`]: TreasuryScreen::sync

pub mod registry;
pub mod source_token;
pub mod treasury;

use std::{str::FromStr, sync::Arc, time::Duration};

use alloy::primitives::{Address, B256, U256};
use serde::Serialize;

use crate::{
    bindings::{QueryClient, TxTracker},
    error::{AppError, Result},
    ethereum::{contracts::ContractRegistry, ChainGateway},
    types::parse_ether,
};

pub use registry::{RegistryForm, RegistryScreen, RegistryView};
pub use source_token::{SourceTokenForm, SourceTokenScreen, SourceTokenView, UnlockStep};
pub use treasury::{TreasuryForm, TreasuryScreen, TreasuryView};

/// Dependencies shared by every screen.
#[derive(Clone)]
pub struct ScreenContext {
    /// Chain access.
    pub gateway: Arc<dyn ChainGateway>,
    /// Deployed contracts.
    pub contracts: Arc<ContractRegistry>,
    /// Read cache.
    pub queries: Arc<QueryClient>,
    /// Write submission and receipt tracking.
    pub tracker: TxTracker,
}

impl ScreenContext {
    /// Wire a context around a gateway.
    pub fn new(
        gateway: Arc<dyn ChainGateway>,
        contracts: Arc<ContractRegistry>,
        receipt_poll_interval: Duration,
    ) -> Self {
        let tracker = TxTracker::new(gateway.clone(), receipt_poll_interval);
        Self { gateway, contracts, queries: Arc::new(QueryClient::new()), tracker }
    }

    /// Serve cached reads younger than `stale_time` instead of re-reading.
    pub fn with_query_stale_time(mut self, stale_time: Duration) -> Self {
        self.queries = Arc::new(QueryClient::with_stale_time(stale_time));
        self
    }

    /// Connected account or the "connect your wallet" error.
    pub async fn require_account(&self) -> Result<Address> {
        self.gateway.account().await.ok_or(AppError::WalletNotConnected)
    }
}

/// Messages shown under a screen's forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Feedback {
    /// Last error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last success message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
}

impl Feedback {
    /// Clear both messages (start of every action).
    pub fn clear(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Show an error.
    pub fn fail(&mut self, error: impl ToString) {
        self.error = Some(error.to_string());
        self.success = None;
    }

    /// Show a success message.
    pub fn succeed(&mut self, message: &str) {
        self.error = None;
        self.success = Some(message.to_string());
    }

    /// Record an action's error, passing the result through.
    pub fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.fail(e);
        }
        result
    }
}

/// Trimmed input, or a validation error with `message` when blank.
pub fn require<'a>(value: &'a str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(trimmed)
}

/// Parse and validate an Ethereum address typed into a form.
pub fn parse_address_input(s: &str) -> Result<Address> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(AppError::InvalidAddress("Address cannot be empty".to_string()));
    }

    if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
        return Err(AppError::InvalidAddress(format!("Address must start with '0x': {}", s)));
    }

    // 0x + 40 hex chars
    if trimmed.len() != 42 {
        return Err(AppError::InvalidAddress(format!(
            "Address must be 42 characters (0x + 40 hex chars), got {}: {}",
            trimmed.len(),
            s
        )));
    }

    trimmed.parse::<Address>().map_err(|e| AppError::InvalidAddress(format!("'{}': {}", s, e)))
}

/// Parse an 18-decimal token amount typed into a form.
pub fn parse_amount_input(s: &str) -> Result<U256> {
    parse_ether(s).map_err(AppError::Validation)
}

/// Parse a bytes32 value (role or unlock ID) typed into a form.
pub fn parse_bytes32_input(s: &str, field: &str) -> Result<B256> {
    let trimmed = s.trim();
    let hex = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"));
    match hex {
        Some(h) if h.len() == 64 => trimmed
            .parse::<B256>()
            .map_err(|e| AppError::Validation(format!("{} is not valid hex: {}", field, e))),
        _ => Err(AppError::Validation(format!("{} must be a 0x-prefixed 32-byte hex value", field))),
    }
}

/// Parse an unsigned integer field.
pub fn parse_uint_input<T>(s: &str, field: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let trimmed = s.trim();
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(format!("{} must be a whole number", field)));
    }
    trimmed.parse::<T>().map_err(|e| AppError::Validation(format!("Invalid {}: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_trims_and_rejects_blank() {
        assert_eq!(require("  abc ", "x").unwrap(), "abc");
        match require("   ", "Please enter an amount") {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Please enter an amount"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_address_input() {
        assert!(parse_address_input("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").is_ok());
        assert!(parse_address_input("").is_err());
        assert!(parse_address_input("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045").is_err());
        assert!(parse_address_input("0x1234").is_err());
        assert!(parse_address_input("0xZZdA6BF26964aF9D7eEd9e03E53415D37aA96045").is_err());
    }

    #[test]
    fn test_parse_amount_input_maps_to_validation() {
        assert_eq!(parse_amount_input("1").unwrap(), U256::from(1_000_000_000_000_000_000u64));
        assert!(matches!(parse_amount_input("abc"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_bytes32_input() {
        let hex = format!("0x{}", "ab".repeat(32));
        assert_eq!(parse_bytes32_input(&hex, "Role").unwrap(), B256::repeat_byte(0xab));
        assert!(parse_bytes32_input("0xabcd", "Role").is_err());
        assert!(parse_bytes32_input(&"ab".repeat(32), "Role").is_err());
        assert!(parse_bytes32_input(&format!("0x{}", "zz".repeat(32)), "Role").is_err());
    }

    #[test]
    fn test_parse_uint_input() {
        assert_eq!(parse_uint_input::<u64>(" 3600 ", "period").unwrap(), 3600);
        assert!(parse_uint_input::<u8>("256", "rate").is_err());
        assert!(parse_uint_input::<u64>("-1", "period").is_err());
        assert!(parse_uint_input::<u64>("1.5", "period").is_err());
    }

    #[test]
    fn test_feedback_record() {
        let mut feedback = Feedback::default();
        let result: Result<()> = feedback.record(Err(AppError::WalletNotConnected));
        assert!(result.is_err());
        assert_eq!(feedback.error.as_deref(), Some("Please connect your wallet"));

        feedback.succeed("done");
        assert!(feedback.error.is_none());
        assert_eq!(feedback.success.as_deref(), Some("done"));
    }
}
