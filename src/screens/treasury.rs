//! Treasury screen ("Admin Actions").

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use tokio::sync::watch;

use crate::{
    bindings::{ReadBinding, ReadState, TrackedWrite, TxOutcome, TxStatus},
    error::{AppError, Result},
    ethereum::{
        constants::NATIVE_SYMBOL,
        contracts::{
            erc20::{ISourceToken, IERC20},
            treasury::ITreasury,
            ContractName,
        },
    },
    screens::{
        parse_address_input, parse_amount_input, parse_uint_input, require, Feedback,
        ScreenContext,
    },
    types::{BalanceView, UnlockOptionView},
};

const SOURCE_SYMBOL: &str = "SOURCE";
const TARGET_SYMBOL: &str = "TARGET";

/// Form inputs of the treasury screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreasuryForm {
    pub recipient: String,
    pub amount: String,
    /// Comma-separated receiver addresses.
    pub batch_wallets: String,
    /// Comma-separated amounts, one per receiver.
    pub batch_amounts: String,
    pub mint_amount: String,
    pub option_id: String,
    pub option_name: String,
    pub option_description: String,
    pub option_cliff_seconds: String,
    pub option_rate: String,
}

impl Default for TreasuryForm {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            amount: String::new(),
            batch_wallets: String::new(),
            batch_amounts: String::new(),
            mint_amount: String::new(),
            option_id: "1".to_string(),
            option_name: "90 Day Lock".to_string(),
            option_description: "90 day lock period with 100% conversion".to_string(),
            option_cliff_seconds: "7776000".to_string(),
            option_rate: "100".to_string(),
        }
    }
}

/// Rendered treasury panel.
#[derive(Debug, Clone, Serialize)]
pub struct TreasuryView {
    pub treasury: String,
    pub source_balance: ReadState<BalanceView>,
    pub native_balance: ReadState<BalanceView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_balance: Option<ReadState<BalanceView>>,
    pub unlock_options: ReadState<Vec<UnlockOptionView>>,
    pub form: TreasuryForm,
    pub send_status: TxStatus,
    pub batch_status: TxStatus,
    pub mint_status: TxStatus,
    pub option_status: TxStatus,
    #[serde(flatten)]
    pub feedback: Feedback,
}

#[derive(Debug, Clone, Copy)]
enum TreasuryWrite {
    Send,
    Batch,
    Mint,
    SetOption,
}

/// Treasury balances, unlock options and admin writes.
pub struct TreasuryScreen {
    ctx: ScreenContext,
    /// Current form inputs.
    pub form: TreasuryForm,
    feedback: Feedback,
    source_balance: ReadBinding<ISourceToken::balanceOfCall>,
    native_balance: ReadState<U256>,
    target_balance: Option<ReadBinding<IERC20::balanceOfCall>>,
    target_symbol: Option<ReadBinding<IERC20::symbolCall>>,
    unlock_options: ReadBinding<ITreasury::unlockOptionsCall>,
    send_tx: TrackedWrite,
    batch_tx: TrackedWrite,
    mint_tx: TrackedWrite,
    option_tx: TrackedWrite,
}

impl TreasuryScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        let treasury = ctx.contracts.treasury();
        let source = ctx.contracts.source_token();
        let target = ctx.contracts.try_get(ContractName::TargetToken).map(|e| e.address);

        Self {
            source_balance: ReadBinding::new(
                source,
                ISourceToken::balanceOfCall { account: treasury },
            ),
            native_balance: ReadState::default(),
            target_balance: target
                .map(|t| ReadBinding::new(t, IERC20::balanceOfCall { account: treasury })),
            target_symbol: target.map(|t| ReadBinding::new(t, IERC20::symbolCall {})),
            unlock_options: ReadBinding::new(treasury, ITreasury::unlockOptionsCall {}),
            form: TreasuryForm::default(),
            feedback: Feedback::default(),
            send_tx: TrackedWrite::default(),
            batch_tx: TrackedWrite::default(),
            mint_tx: TrackedWrite::default(),
            option_tx: TrackedWrite::default(),
            ctx,
        }
    }

    fn treasury(&self) -> Address {
        self.ctx.contracts.treasury()
    }

    // ==================== Reads ====================

    /// Re-run every read. Fresh cached results are served from the query client.
    pub async fn refresh(&mut self) {
        let gateway = self.ctx.gateway.as_ref();
        let queries = self.ctx.queries.as_ref();

        self.source_balance.refresh(queries, gateway).await;
        self.unlock_options.refresh(queries, gateway).await;
        if let Some(binding) = self.target_balance.as_mut() {
            binding.refresh(queries, gateway).await;
        }
        if let Some(binding) = self.target_symbol.as_mut() {
            binding.refresh(queries, gateway).await;
        }

        self.native_balance.begin();
        let treasury = self.ctx.contracts.treasury();
        let result = self.ctx.gateway.native_balance(treasury).await;
        self.native_balance.finish(result);
    }

    /// Render the panel from the latest reads.
    pub fn view(&self) -> TreasuryView {
        let treasury = self.treasury();

        let target_balance = self.target_balance.as_ref().map(|binding| {
            let symbol = self
                .target_symbol
                .as_ref()
                .and_then(|s| s.value().cloned())
                .unwrap_or_else(|| TARGET_SYMBOL.to_string());
            binding.state().map(|raw| BalanceView::new(treasury, symbol, *raw, 2))
        });

        TreasuryView {
            treasury: format!("{treasury:?}"),
            source_balance: self
                .source_balance
                .state()
                .map(|raw| BalanceView::new(treasury, SOURCE_SYMBOL, *raw, 2)),
            native_balance: self
                .native_balance
                .map(|raw| BalanceView::new(treasury, NATIVE_SYMBOL, *raw, 4)),
            target_balance,
            unlock_options: self
                .unlock_options
                .state()
                .map(|options| options.iter().map(UnlockOptionView::from).collect()),
            form: self.form.clone(),
            send_status: self.send_tx.status().clone(),
            batch_status: self.batch_tx.status().clone(),
            mint_status: self.mint_tx.status().clone(),
            option_status: self.option_tx.status().clone(),
            feedback: self.feedback.clone(),
        }
    }

    // ==================== Writes ====================

    /// Send source tokens from the treasury to one recipient.
    pub async fn send_tokens(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_send_tokens().await;
        self.feedback.record(result)
    }

    async fn try_send_tokens(&mut self) -> Result<TxHash> {
        let recipient = self.form.recipient.trim();
        let amount = self.form.amount.trim();
        if recipient.is_empty() || amount.is_empty() {
            return Err(AppError::Validation("Please fill in all fields".to_string()));
        }
        let recipient = parse_address_input(recipient)?;
        let amount = parse_amount_input(amount)?;
        self.ctx.require_account().await?;

        let call = ITreasury::transferSourceTokensToCall { recipient, amount };
        let treasury = self.treasury();
        self.send_tx.submit(&self.ctx.tracker, treasury, &call).await
    }

    /// Send source tokens to several receivers in one transaction.
    pub async fn send_batch(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_send_batch().await;
        self.feedback.record(result)
    }

    async fn try_send_batch(&mut self) -> Result<TxHash> {
        let receivers = parse_batch(&self.form.batch_wallets, &self.form.batch_amounts)?;
        self.ctx.require_account().await?;

        let call = ITreasury::sendSourceTokensCall { receivers };
        let treasury = self.treasury();
        self.batch_tx.submit(&self.ctx.tracker, treasury, &call).await
    }

    /// Mint source tokens into the treasury.
    pub async fn mint(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_mint().await;
        self.feedback.record(result)
    }

    async fn try_mint(&mut self) -> Result<TxHash> {
        let amount = parse_amount_input(require(&self.form.mint_amount, "Please enter an amount")?)?;
        self.ctx.require_account().await?;

        let call = ISourceToken::mintCall { to: self.treasury(), amount };
        let source = self.ctx.contracts.source_token();
        self.mint_tx.submit(&self.ctx.tracker, source, &call).await
    }

    /// Create or replace an unlock option (always enabled).
    pub async fn set_unlock_option(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_set_unlock_option().await;
        self.feedback.record(result)
    }

    async fn try_set_unlock_option(&mut self) -> Result<TxHash> {
        let form = &self.form;
        let fields = [
            &form.option_id,
            &form.option_name,
            &form.option_description,
            &form.option_cliff_seconds,
            &form.option_rate,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::Validation("Please fill in all fields".to_string()));
        }

        let id: u8 = parse_uint_input(&form.option_id, "Option ID")?;
        let cliff_seconds: u64 = parse_uint_input(&form.option_cliff_seconds, "Cliff seconds")?;
        let rate: u8 = parse_uint_input(&form.option_rate, "Conversion rate")?;
        if rate > 100 {
            return Err(AppError::Validation(
                "Conversion rate must be between 0 and 100".to_string(),
            ));
        }
        let call = ITreasury::setUnlockOptionCall {
            id,
            name: form.option_name.trim().to_string(),
            description: form.option_description.trim().to_string(),
            cliffSeconds: cliff_seconds,
            conversionRatePercentage: rate,
            enabled: true,
        };
        self.ctx.require_account().await?;

        let treasury = self.treasury();
        self.option_tx.submit(&self.ctx.tracker, treasury, &call).await
    }

    // ==================== Receipts ====================

    /// Apply any receipts that have already arrived.
    pub async fn sync(&mut self) {
        for write in [
            TreasuryWrite::Send,
            TreasuryWrite::Batch,
            TreasuryWrite::Mint,
            TreasuryWrite::SetOption,
        ] {
            if let Some(outcome) = self.write_mut(write).poll() {
                self.apply(write, outcome).await;
            }
        }
    }

    /// Wait for every in-flight write and apply the outcomes.
    pub async fn settle(&mut self) {
        for write in [
            TreasuryWrite::Send,
            TreasuryWrite::Batch,
            TreasuryWrite::Mint,
            TreasuryWrite::SetOption,
        ] {
            if let Some(outcome) = self.write_mut(write).wait().await {
                self.apply(write, outcome).await;
            }
        }
    }

    /// Whether any write is in flight.
    pub fn is_busy(&self) -> bool {
        [&self.send_tx, &self.batch_tx, &self.mint_tx, &self.option_tx]
            .iter()
            .any(|w| w.is_busy())
    }

    /// Status receivers of the writes still waiting for a receipt.
    pub fn pending_writes(&self) -> Vec<watch::Receiver<TxStatus>> {
        [&self.send_tx, &self.batch_tx, &self.mint_tx, &self.option_tx].iter().filter_map(|w| w.watch()).collect()
    }

    fn write_mut(&mut self, write: TreasuryWrite) -> &mut TrackedWrite {
        match write {
            TreasuryWrite::Send => &mut self.send_tx,
            TreasuryWrite::Batch => &mut self.batch_tx,
            TreasuryWrite::Mint => &mut self.mint_tx,
            TreasuryWrite::SetOption => &mut self.option_tx,
        }
    }

    async fn apply(&mut self, write: TreasuryWrite, outcome: TxOutcome) {
        match outcome {
            TxOutcome::Failed(error) => self.feedback.fail(error),
            TxOutcome::Confirmed(hash) => {
                tracing::info!(tx_hash = %hash, write = ?write, "Treasury write confirmed");
                let invalidated = match write {
                    TreasuryWrite::Send => {
                        self.form.recipient.clear();
                        self.form.amount.clear();
                        self.feedback.succeed("Tokens sent successfully!");
                        self.ctx.contracts.source_token()
                    }
                    TreasuryWrite::Batch => {
                        self.form.batch_wallets.clear();
                        self.form.batch_amounts.clear();
                        self.feedback.succeed("Batch transfer sent successfully!");
                        self.ctx.contracts.source_token()
                    }
                    TreasuryWrite::Mint => {
                        self.form.mint_amount.clear();
                        self.feedback.succeed("Tokens minted successfully!");
                        self.ctx.contracts.source_token()
                    }
                    TreasuryWrite::SetOption => {
                        self.feedback.succeed("Unlock option saved successfully!");
                        self.treasury()
                    }
                };
                self.ctx.queries.invalidate(invalidated).await;
            }
        }
    }
}

/// Pair comma-separated wallets with comma-separated amounts.
fn parse_batch(wallets: &str, amounts: &str) -> Result<Vec<ITreasury::TokenReceiver>> {
    if wallets.trim().is_empty() || amounts.trim().is_empty() {
        return Err(AppError::Validation("Please fill in all fields".to_string()));
    }

    let wallets: Vec<&str> = wallets.split(',').map(str::trim).collect();
    let amounts: Vec<&str> = amounts.split(',').map(str::trim).collect();
    if wallets.len() != amounts.len() {
        return Err(AppError::Validation(
            "Number of wallets must match number of amounts".to_string(),
        ));
    }

    wallets
        .iter()
        .zip(&amounts)
        .map(|(wallet, amount)| {
            Ok(ITreasury::TokenReceiver {
                receiver: parse_address_input(wallet)?,
                amount: parse_amount_input(amount)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0x1111111111111111111111111111111111111111";
    const B: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_form_defaults() {
        let form = TreasuryForm::default();
        assert_eq!(form.option_id, "1");
        assert_eq!(form.option_name, "90 Day Lock");
        assert_eq!(form.option_cliff_seconds, "7776000");
        assert_eq!(form.option_rate, "100");
        assert!(form.recipient.is_empty());
    }

    #[test]
    fn test_parse_batch_pairs_receivers() {
        let receivers = parse_batch(&format!("{A}, {B}"), "1, 0.5").unwrap();
        assert_eq!(receivers.len(), 2);
        assert_eq!(receivers[0].receiver, Address::repeat_byte(0x11));
        assert_eq!(receivers[0].amount, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(receivers[1].amount, U256::from(500_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_batch_length_mismatch() {
        match parse_batch(&format!("{A},{B}"), "1") {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Number of wallets must match number of amounts")
            }
            other => panic!("Expected Validation error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_parse_batch_rejects_bad_entries() {
        assert!(parse_batch("0x1234", "1").is_err());
        assert!(parse_batch(A, "abc").is_err());
        assert!(parse_batch("", "").is_err());
    }
}
