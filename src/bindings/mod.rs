//! Read and write bindings between screens and contracts.

pub mod read;
pub mod write;

pub use read::{QueryClient, QueryKey, ReadBinding, ReadState};
pub use write::{settled, TrackedWrite, TxOutcome, TxStatus, TxSubscription, TxTracker};
