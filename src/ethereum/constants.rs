//! Network constants.
//!
//! Contains chain IDs, endpoints, and unit constants for the RCade chains.

use std::time::Duration;

// ============================================================================
// Chain IDs
// ============================================================================

/// RCade Trials (dev/testnet) chain ID.
pub const RCADE_TRIALS_CHAIN_ID: u64 = 7785;

/// RCade Mainnet (prod) chain ID.
pub const RCADE_MAINNET_CHAIN_ID: u64 = 101069;

// ============================================================================
// Endpoints
// ============================================================================

/// Default JSON-RPC endpoint for RCade Trials.
pub const RCADE_TRIALS_RPC_URL: &str = "https://rcade-trials-v3.rpc.caldera.xyz/http";

/// Block explorer for RCade Trials.
pub const RCADE_TRIALS_EXPLORER_URL: &str = "https://scan-test.rcade.network/";

/// Default JSON-RPC endpoint for RCade Mainnet.
pub const RCADE_MAINNET_RPC_URL: &str = "https://rcade.calderachain.xyz/http";

/// Block explorer for RCade Mainnet.
pub const RCADE_MAINNET_EXPLORER_URL: &str = "https://rcade.calderaexplorer.xyz";

// ============================================================================
// Units
// ============================================================================

/// Native currency symbol on both RCade chains.
pub const NATIVE_SYMBOL: &str = "RCADE";

/// Decimals used by the native currency and every token this console handles.
pub const TOKEN_DECIMALS: u8 = 18;

/// Default interval between transaction receipt polls.
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Default age after which a cached read is fetched again. Zero re-reads on every view.
pub const DEFAULT_QUERY_STALE_TIME: Duration = Duration::ZERO;
