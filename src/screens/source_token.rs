//! Source token screen ("User Actions"): the approve-then-unlock flow and
//! the connected account's unlock table.

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use tokio::sync::watch;

use crate::{
    bindings::{ReadBinding, TrackedWrite, TxOutcome, TxStatus},
    error::{AppError, Result},
    ethereum::contracts::{erc20::ISourceToken, treasury::ITreasury},
    screens::{
        parse_amount_input, parse_bytes32_input, parse_uint_input, require, Feedback,
        ScreenContext,
    },
    types::{merge_unlocks, UnlockView},
};

/// Progress of the two-transaction unlock flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockStep {
    #[default]
    Idle,
    /// Approval submitted, waiting for its receipt.
    Approving,
    /// Treasury may pull the approved amount.
    Approved,
    /// Unlock submitted, waiting for its receipt.
    Unlocking,
}

impl UnlockStep {
    /// Whether Initiate Unlock may be pressed.
    pub fn can_unlock(self) -> bool {
        matches!(self, UnlockStep::Approved | UnlockStep::Unlocking)
    }
}

/// Form inputs of the source token screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceTokenForm {
    /// Amount to approve and unlock.
    pub amount: String,
    /// Unlock option the lock is created under.
    pub unlock_option_id: String,
    /// Unlock ID to fulfill.
    pub fulfill_id: String,
    /// Unlock ID to cancel.
    pub cancel_id: String,
}

/// Rendered source token panel.
#[derive(Debug, Clone, Serialize)]
pub struct SourceTokenView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub step: UnlockStep,
    pub form: SourceTokenForm,
    /// Unfulfilled first, then fulfilled.
    pub unlocks: Vec<UnlockView>,
    pub unlocks_loading: bool,
    pub approve_status: TxStatus,
    pub unlock_status: TxStatus,
    pub fulfill_status: TxStatus,
    pub cancel_status: TxStatus,
    #[serde(flatten)]
    pub feedback: Feedback,
}

#[derive(Debug, Clone, Copy)]
enum SourceTokenWrite {
    Approve,
    Unlock,
    Fulfill,
    Cancel,
}

/// One partition (fulfilled or not) of the account's unlocks.
struct UnlockSet {
    count: ReadBinding<ITreasury::getUnlocksCountCall>,
    list: ReadBinding<ITreasury::getUnlocksCall>,
}

impl UnlockSet {
    fn new(treasury: Address) -> Self {
        Self { count: ReadBinding::disabled(treasury), list: ReadBinding::disabled(treasury) }
    }

    async fn refresh(&mut self, ctx: &ScreenContext, owner: Option<Address>, fulfilled: bool) {
        let gateway = ctx.gateway.as_ref();
        let queries = ctx.queries.as_ref();

        self.count.set_call(owner.map(|owner| ITreasury::getUnlocksCountCall { fulfilled, owner }));
        self.count.refresh(queries, gateway).await;

        let count = self.count.value().copied().unwrap_or(U256::ZERO);
        let call = owner.filter(|_| count > U256::ZERO).map(|owner| ITreasury::getUnlocksCall {
            fulfilled,
            owner,
            offset: U256::ZERO,
            limit: count,
        });
        self.list.set_call(call);
        self.list.refresh(queries, gateway).await;
    }

    fn unlocks(&self) -> Option<&[ITreasury::Unlock]> {
        self.list.value().map(Vec::as_slice)
    }

    fn is_loading(&self) -> bool {
        self.count.state().is_loading || self.list.state().is_loading
    }
}

/// Unlock flow and unlock table for the connected account.
pub struct SourceTokenScreen {
    ctx: ScreenContext,
    /// Current form inputs.
    pub form: SourceTokenForm,
    feedback: Feedback,
    step: UnlockStep,
    approved_amount: Option<U256>,
    account: Option<Address>,
    unfulfilled: UnlockSet,
    fulfilled: UnlockSet,
    approve_tx: TrackedWrite,
    unlock_tx: TrackedWrite,
    fulfill_tx: TrackedWrite,
    cancel_tx: TrackedWrite,
}

impl SourceTokenScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        let treasury = ctx.contracts.treasury();
        Self {
            form: SourceTokenForm::default(),
            feedback: Feedback::default(),
            step: UnlockStep::Idle,
            approved_amount: None,
            account: None,
            unfulfilled: UnlockSet::new(treasury),
            fulfilled: UnlockSet::new(treasury),
            approve_tx: TrackedWrite::default(),
            unlock_tx: TrackedWrite::default(),
            fulfill_tx: TrackedWrite::default(),
            cancel_tx: TrackedWrite::default(),
            ctx,
        }
    }

    /// Current unlock step.
    pub fn step(&self) -> UnlockStep {
        self.step
    }

    /// Fetch the account's unlock counts and, where non-zero, the unlocks.
    pub async fn refresh(&mut self) {
        self.account = self.ctx.gateway.account().await;
        self.unfulfilled.refresh(&self.ctx, self.account, false).await;
        self.fulfilled.refresh(&self.ctx, self.account, true).await;
    }

    pub fn view(&self) -> SourceTokenView {
        SourceTokenView {
            account: self.account.map(|a| format!("{a:?}")),
            step: self.step,
            form: self.form.clone(),
            unlocks: merge_unlocks(self.unfulfilled.unlocks(), self.fulfilled.unlocks()),
            unlocks_loading: self.unfulfilled.is_loading() || self.fulfilled.is_loading(),
            approve_status: self.approve_tx.status().clone(),
            unlock_status: self.unlock_tx.status().clone(),
            fulfill_status: self.fulfill_tx.status().clone(),
            cancel_status: self.cancel_tx.status().clone(),
            feedback: self.feedback.clone(),
        }
    }

    // ==================== Unlock flow ====================

    /// Approve the treasury to pull `amount` source tokens.
    pub async fn approve(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        if matches!(self.step, UnlockStep::Approving | UnlockStep::Unlocking) {
            let busy = AppError::Validation("A transaction is already in progress".to_string());
            return self.feedback.record(Err(busy));
        }

        let result = self.try_approve().await;
        if result.is_err() {
            self.step = UnlockStep::Idle;
            self.approved_amount = None;
        }
        self.feedback.record(result)
    }

    async fn try_approve(&mut self) -> Result<TxHash> {
        self.step = UnlockStep::Idle;
        self.approved_amount = None;

        let amount = parse_amount_input(require(&self.form.amount, "Please enter an amount")?)?;
        self.ctx.require_account().await?;

        self.step = UnlockStep::Approving;
        let call = ISourceToken::approveCall { spender: self.ctx.contracts.treasury(), amount };
        let source = self.ctx.contracts.source_token();
        let hash = self.approve_tx.submit(&self.ctx.tracker, source, &call).await?;
        self.approved_amount = Some(amount);
        Ok(hash)
    }

    /// Lock the approved amount under the selected unlock option.
    ///
    /// Only allowed once the approval has confirmed.
    pub async fn initiate_unlock(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_initiate_unlock().await;
        if result.is_err() && self.step == UnlockStep::Unlocking && !self.unlock_tx.is_busy() {
            self.step = UnlockStep::Idle;
            self.approved_amount = None;
        }
        self.feedback.record(result)
    }

    async fn try_initiate_unlock(&mut self) -> Result<TxHash> {
        if !self.step.can_unlock() {
            return Err(AppError::Validation(
                "Approve the amount before initiating the unlock".to_string(),
            ));
        }
        if self.unlock_tx.is_busy() {
            return Err(AppError::Validation("Unlock is already pending".to_string()));
        }
        let Some(amount) = self.approved_amount else {
            return Err(AppError::Validation("Please enter an amount".to_string()));
        };
        let option_id: u8 = parse_uint_input(
            require(&self.form.unlock_option_id, "Please enter an unlock option ID")?,
            "Unlock option ID",
        )?;
        self.ctx.require_account().await?;

        self.step = UnlockStep::Unlocking;
        let call = ITreasury::unlockCall { amount, unlockOptionId: option_id };
        let treasury = self.ctx.contracts.treasury();
        self.unlock_tx.submit(&self.ctx.tracker, treasury, &call).await
    }

    // ==================== Unlock management ====================

    /// Fulfill a matured unlock.
    pub async fn fulfill(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_fulfill().await;
        self.feedback.record(result)
    }

    async fn try_fulfill(&mut self) -> Result<TxHash> {
        let id = parse_bytes32_input(
            require(&self.form.fulfill_id, "Please enter the unlock hash")?,
            "Unlock ID",
        )?;
        self.ctx.require_account().await?;

        let call = ITreasury::fulfillCall { unlockId: id };
        let treasury = self.ctx.contracts.treasury();
        self.fulfill_tx.submit(&self.ctx.tracker, treasury, &call).await
    }

    /// Cancel a pending unlock.
    pub async fn cancel(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_cancel().await;
        self.feedback.record(result)
    }

    async fn try_cancel(&mut self) -> Result<TxHash> {
        let id = parse_bytes32_input(
            require(&self.form.cancel_id, "Please enter the unlock hash")?,
            "Unlock ID",
        )?;
        self.ctx.require_account().await?;

        let call = ITreasury::cancelUnlockCall { unlockId: id };
        let treasury = self.ctx.contracts.treasury();
        self.cancel_tx.submit(&self.ctx.tracker, treasury, &call).await
    }

    // ==================== Receipts ====================

    const WRITES: [SourceTokenWrite; 4] = [
        SourceTokenWrite::Approve,
        SourceTokenWrite::Unlock,
        SourceTokenWrite::Fulfill,
        SourceTokenWrite::Cancel,
    ];

    /// Apply any receipts that have already arrived.
    pub async fn sync(&mut self) {
        for write in Self::WRITES {
            if let Some(outcome) = self.write_mut(write).poll() {
                self.apply(write, outcome).await;
            }
        }
    }

    /// Wait for every in-flight write and apply the outcomes.
    pub async fn settle(&mut self) {
        for write in Self::WRITES {
            if let Some(outcome) = self.write_mut(write).wait().await {
                self.apply(write, outcome).await;
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        [&self.approve_tx, &self.unlock_tx, &self.fulfill_tx, &self.cancel_tx]
            .iter()
            .any(|w| w.is_busy())
    }

    /// Status receivers of the writes still waiting for a receipt.
    pub fn pending_writes(&self) -> Vec<watch::Receiver<TxStatus>> {
        [&self.approve_tx, &self.unlock_tx, &self.fulfill_tx, &self.cancel_tx].iter().filter_map(|w| w.watch()).collect()
    }

    fn write_mut(&mut self, write: SourceTokenWrite) -> &mut TrackedWrite {
        match write {
            SourceTokenWrite::Approve => &mut self.approve_tx,
            SourceTokenWrite::Unlock => &mut self.unlock_tx,
            SourceTokenWrite::Fulfill => &mut self.fulfill_tx,
            SourceTokenWrite::Cancel => &mut self.cancel_tx,
        }
    }

    async fn apply(&mut self, write: SourceTokenWrite, outcome: TxOutcome) {
        let confirmed = matches!(outcome, TxOutcome::Confirmed(_));
        if let TxOutcome::Failed(error) = &outcome {
            self.feedback.fail(error);
        }

        match write {
            SourceTokenWrite::Approve => {
                // A later approve or unlock may have moved the flow on.
                if self.step == UnlockStep::Approving {
                    self.step = if confirmed { UnlockStep::Approved } else { UnlockStep::Idle };
                }
                if confirmed {
                    self.feedback.succeed("Approval confirmed. You can now initiate the unlock.");
                    self.ctx.queries.invalidate(self.ctx.contracts.source_token()).await;
                } else {
                    self.approved_amount = None;
                }
            }
            SourceTokenWrite::Unlock => {
                self.step = UnlockStep::Idle;
                self.approved_amount = None;
                if confirmed {
                    self.form.amount.clear();
                    self.feedback.succeed("Unlock initiated successfully!");
                    self.invalidate_unlocks().await;
                }
            }
            SourceTokenWrite::Fulfill => {
                if confirmed {
                    self.form.fulfill_id.clear();
                    self.feedback.succeed("Unlock fulfilled successfully!");
                    self.invalidate_unlocks().await;
                }
            }
            SourceTokenWrite::Cancel => {
                if confirmed {
                    self.form.cancel_id.clear();
                    self.feedback.succeed("Unlock cancelled successfully!");
                    self.invalidate_unlocks().await;
                }
            }
        }
    }

    async fn invalidate_unlocks(&self) {
        self.ctx.queries.invalidate(self.ctx.contracts.treasury()).await;
        self.ctx.queries.invalidate(self.ctx.contracts.source_token()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_unlock_only_after_approval() {
        assert!(!UnlockStep::Idle.can_unlock());
        assert!(!UnlockStep::Approving.can_unlock());
        assert!(UnlockStep::Approved.can_unlock());
        assert!(UnlockStep::Unlocking.can_unlock());
    }

    #[test]
    fn test_step_serialization() {
        assert_eq!(serde_json::to_string(&UnlockStep::Approved).unwrap(), r#""approved""#);
        assert_eq!(UnlockStep::default(), UnlockStep::Idle);
    }
}
