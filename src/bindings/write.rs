//! Contract writes and receipt tracking.
//!
//! [`TxTracker::submit`] hands a typed call to the wallet and spawns one task
//! per returned hash that polls for the receipt. The task publishes on a
//! `watch` channel; [`TxSubscription`] reads it and aborts the task on drop.
//! [`TrackedWrite`] is the per-button wrapper screens hold.

use std::{sync::Arc, time::Duration};

use alloy::{
    primitives::{Address, Bytes, TxHash},
    sol_types::SolCall,
};
use serde::Serialize;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    error::{AppError, Result},
    ethereum::{ChainGateway, ReceiptOutcome},
};

/// Lifecycle of one write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TxStatus {
    /// Nothing submitted.
    #[default]
    Idle,
    /// Handed to the wallet, no hash yet.
    Submitted,
    /// Broadcast, waiting for a receipt.
    Pending { hash: TxHash },
    /// Mined successfully.
    Confirmed { hash: TxHash },
    /// Rejected, failed to broadcast, or reverted.
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        hash: Option<TxHash>,
        error: String,
    },
}

impl TxStatus {
    /// Confirmed or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Confirmed { .. } | TxStatus::Failed { .. })
    }

    /// Submitted or pending.
    pub fn is_busy(&self) -> bool {
        matches!(self, TxStatus::Submitted | TxStatus::Pending { .. })
    }
}

/// How a tracked write ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    /// Receipt reported success.
    Confirmed(TxHash),
    /// Error message for the screen.
    Failed(String),
}

/// Submits calls and starts receipt tracking.
#[derive(Clone)]
pub struct TxTracker {
    gateway: Arc<dyn ChainGateway>,
    poll_interval: Duration,
}

impl TxTracker {
    /// Create a tracker polling receipts every `poll_interval`.
    pub fn new(gateway: Arc<dyn ChainGateway>, poll_interval: Duration) -> Self {
        Self { gateway, poll_interval }
    }

    /// Send `call` to `contract` and track its receipt.
    ///
    /// Errors here are wallet rejections or RPC failures before a hash exists.
    pub async fn submit<C>(&self, contract: Address, call: &C) -> Result<TxSubscription>
    where
        C: SolCall,
    {
        tracing::info!(contract = %contract, function = C::SIGNATURE, "Submitting transaction");

        let data = Bytes::from(call.abi_encode());
        let hash = self.gateway.send_transaction(contract, data).await.map_err(|e| {
            tracing::warn!(contract = %contract, function = C::SIGNATURE, error = %e, "Submission failed");
            e
        })?;

        Ok(self.track(hash))
    }

    /// Track an already broadcast transaction.
    pub fn track(&self, hash: TxHash) -> TxSubscription {
        let (tx, rx) = watch::channel(TxStatus::Pending { hash });
        let task = tokio::spawn(poll_receipt(self.gateway.clone(), hash, self.poll_interval, tx));
        TxSubscription { hash, rx, last_seen: None, task }
    }
}

async fn poll_receipt(
    gateway: Arc<dyn ChainGateway>,
    hash: TxHash,
    interval: Duration,
    status: watch::Sender<TxStatus>,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let terminal = match gateway.transaction_receipt(hash).await {
            Ok(Some(ReceiptOutcome::Success)) => TxStatus::Confirmed { hash },
            Ok(Some(ReceiptOutcome::Reverted)) => TxStatus::Failed {
                hash: Some(hash),
                error: AppError::TransactionFailed(hash.to_string()).to_string(),
            },
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(tx_hash = %hash, error = %e, "Receipt poll failed");
                continue;
            }
        };

        tracing::info!(tx_hash = %hash, status = ?terminal, "Transaction settled");
        let _ = status.send(terminal);
        return;
    }
}

/// Status stream of one transaction.
///
/// Dropping the subscription cancels the polling task.
pub struct TxSubscription {
    hash: TxHash,
    rx: watch::Receiver<TxStatus>,
    last_seen: Option<TxStatus>,
    task: JoinHandle<()>,
}

impl TxSubscription {
    /// Transaction hash.
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Latest published status.
    pub fn status(&self) -> TxStatus {
        self.rx.borrow().clone()
    }

    /// Next status transition, each yielded exactly once.
    ///
    /// Yields `Pending` first, then the terminal status, then `None`.
    pub async fn next(&mut self) -> Option<TxStatus> {
        loop {
            if self.last_seen.as_ref().is_some_and(TxStatus::is_terminal) {
                return None;
            }
            let current = self.rx.borrow_and_update().clone();
            if self.last_seen.as_ref() != Some(&current) {
                self.last_seen = Some(current.clone());
                return Some(current);
            }
            if self.rx.changed().await.is_err() {
                // Tracker gone without a terminal status.
                return None;
            }
        }
    }

    /// Wait for the terminal status.
    pub async fn wait(&mut self) -> TxOutcome {
        while let Some(status) = self.next().await {
            if let Some(outcome) = outcome_of(&status) {
                return outcome;
            }
        }
        TxOutcome::Failed(format!("Tracking of {} stopped before a receipt", self.hash))
    }

    /// Terminal outcome if already published, without waiting.
    pub fn try_outcome(&self) -> Option<TxOutcome> {
        outcome_of(&self.rx.borrow())
    }

    /// Independent receiver of the status channel.
    ///
    /// It observes the same transitions but does not keep the polling task alive.
    pub fn watch(&self) -> watch::Receiver<TxStatus> {
        self.rx.clone()
    }

    /// Stop tracking.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TxSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Wait until `status` reaches a terminal state or its tracker stops.
pub async fn settled(mut status: watch::Receiver<TxStatus>) {
    let _ = status.wait_for(TxStatus::is_terminal).await;
}

fn outcome_of(status: &TxStatus) -> Option<TxOutcome> {
    match status {
        TxStatus::Confirmed { hash } => Some(TxOutcome::Confirmed(*hash)),
        TxStatus::Failed { error, .. } => Some(TxOutcome::Failed(error.clone())),
        _ => None,
    }
}

/// One form button's write: submit, track, report the outcome once.
#[derive(Default)]
pub struct TrackedWrite {
    status: TxStatus,
    subscription: Option<TxSubscription>,
}

impl TrackedWrite {
    /// Current status.
    pub fn status(&self) -> &TxStatus {
        &self.status
    }

    /// Whether a write is in flight.
    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    /// Submit a call. On failure the status becomes `Failed` and the error is returned.
    ///
    /// A write still in flight is abandoned: its tracking stops and its receipt is never applied.
    pub async fn submit<C>(&mut self, tracker: &TxTracker, contract: Address, call: &C) -> Result<TxHash>
    where
        C: SolCall,
    {
        self.subscription = None;
        self.status = TxStatus::Submitted;
        match tracker.submit(contract, call).await {
            Ok(subscription) => {
                let hash = subscription.hash();
                self.status = TxStatus::Pending { hash };
                self.subscription = Some(subscription);
                Ok(hash)
            }
            Err(e) => {
                self.status = TxStatus::Failed { hash: None, error: e.to_string() };
                Err(e)
            }
        }
    }

    /// Status receiver of the in-flight write, if any.
    pub fn watch(&self) -> Option<watch::Receiver<TxStatus>> {
        self.subscription.as_ref().map(TxSubscription::watch)
    }

    /// Collect the outcome if the receipt has arrived.
    ///
    /// Returns each outcome once; later calls return `None`.
    pub fn poll(&mut self) -> Option<TxOutcome> {
        let outcome = self.subscription.as_ref()?.try_outcome()?;
        self.finish(outcome.clone());
        Some(outcome)
    }

    /// Wait for the in-flight write, if any.
    pub async fn wait(&mut self) -> Option<TxOutcome> {
        let outcome = self.subscription.as_mut()?.wait().await;
        self.finish(outcome.clone());
        Some(outcome)
    }

    fn finish(&mut self, outcome: TxOutcome) {
        let hash = self.subscription.take().map(|s| s.hash());
        self.status = match outcome {
            TxOutcome::Confirmed(hash) => TxStatus::Confirmed { hash },
            TxOutcome::Failed(error) => TxStatus::Failed { hash, error },
        };
    }
}
