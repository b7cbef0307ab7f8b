//! Error types and handling module.
//!
//! Defines all application-specific error types and conversions.

use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ethereum RPC errors (including reverted calls).
    #[error("Ethereum RPC error: {0}")]
    Rpc(String),

    /// Transport errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid Ethereum address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Form input rejected before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// Wallet-related errors.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// An action needs a connected wallet.
    #[error("Please connect your wallet")]
    WalletNotConnected,

    /// The wallet refused to move to the requested chain.
    #[error("Chain switch to {chain_id} rejected: {reason}")]
    ChainSwitchRejected { chain_id: u64, reason: String },

    /// A mined transaction ended with a failed status.
    #[error("Transaction {0} reverted")]
    TransactionFailed(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl AppError {
    /// Whether the error was raised before any network or wallet call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::InvalidAddress(_) | AppError::WalletNotConnected
        )
    }
}

impl From<alloy::transports::TransportError> for AppError {
    fn from(err: alloy::transports::TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<alloy::contract::Error> for AppError {
    fn from(err: alloy::contract::Error) -> Self {
        AppError::Rpc(err.to_string())
    }
}

impl From<alloy::sol_types::Error> for AppError {
    fn from(err: alloy::sol_types::Error) -> Self {
        AppError::Rpc(format!("Failed to decode call result: {err}"))
    }
}

impl From<alloy::signers::local::LocalSignerError> for AppError {
    fn from(err: alloy::signers::local::LocalSignerError) -> Self {
        AppError::Wallet(err.to_string())
    }
}

impl From<alloy::hex::FromHexError> for AppError {
    fn from(err: alloy::hex::FromHexError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidAddress(_) | AppError::Validation(_) | AppError::Parse(_) => {
                McpError::invalid_params(err.to_string(), None)
            }
            AppError::Config(_) | AppError::WalletNotConnected => {
                McpError::invalid_request(err.to_string(), None)
            }
            _ => McpError::internal_error(err.to_string(), None),
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_app_error_config_display() {
        let err = AppError::Config("TREASURY_ADDRESS environment variable not set".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: TREASURY_ADDRESS environment variable not set"
        );
    }

    #[test]
    fn test_app_error_validation_display_is_bare() {
        let err = AppError::Validation("Please enter an amount".to_string());
        assert_eq!(err.to_string(), "Please enter an amount");
    }

    #[test]
    fn test_app_error_wallet_not_connected_display() {
        assert_eq!(AppError::WalletNotConnected.to_string(), "Please connect your wallet");
    }

    #[test]
    fn test_app_error_chain_switch_display() {
        let err =
            AppError::ChainSwitchRejected { chain_id: 101069, reason: "user denied".to_string() };
        assert!(err.to_string().contains("101069"));
        assert!(err.to_string().contains("user denied"));
    }

    #[test]
    fn test_app_error_transaction_failed_display() {
        let err = AppError::TransactionFailed("0xabc".to_string());
        assert_eq!(err.to_string(), "Transaction 0xabc reverted");
    }

    #[test]
    fn test_is_validation() {
        assert!(AppError::Validation("x".into()).is_validation());
        assert!(AppError::InvalidAddress("x".into()).is_validation());
        assert!(AppError::WalletNotConnected.is_validation());
        assert!(!AppError::Rpc("x".into()).is_validation());
        assert!(!AppError::Transport("x".into()).is_validation());
    }

    #[test]
    fn test_app_error_to_mcp_error_invalid_params() {
        let err = AppError::InvalidAddress("bad address".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_PARAMS);

        let err = AppError::Validation("Please fill in all fields".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn test_app_error_to_mcp_error_invalid_request() {
        let mcp_err: McpError = AppError::Config("config error".to_string()).into();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_REQUEST);

        let mcp_err: McpError = AppError::WalletNotConnected.into();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_REQUEST);
    }

    #[test]
    fn test_app_error_to_mcp_error_internal_error() {
        let mcp_err: McpError = AppError::Rpc("rpc failed".to_string()).into();
        assert_eq!(mcp_err.code, ErrorCode::INTERNAL_ERROR);

        let mcp_err: McpError = AppError::TransactionFailed("0x01".to_string()).into();
        assert_eq!(mcp_err.code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_from_hex_error_is_parse_error() {
        let app_err: AppError = alloy::hex::decode("0xzz").unwrap_err().into();

        match &app_err {
            AppError::Parse(_) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
        assert!(!app_err.is_validation());

        let mcp_err: McpError = app_err.into();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn test_mcp_error_message_preserved() {
        let mcp_err: McpError = AppError::Rpc("Connection refused".to_string()).into();
        assert!(mcp_err.message.contains("Connection refused"));
        assert!(mcp_err.data.is_none());
    }
}
