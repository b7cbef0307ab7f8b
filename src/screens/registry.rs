//! Registry screen, one instance per network.

use alloy::primitives::{Address, TxHash, B256, U256};
use serde::Serialize;
use tokio::sync::watch;

use crate::{
    bindings::{ReadBinding, ReadState, TrackedWrite, TxOutcome, TxStatus},
    error::{AppError, Result},
    ethereum::{contracts::registry::IRegistry, Network},
    screens::{
        parse_address_input, parse_amount_input, parse_bytes32_input, parse_uint_input, require,
        Feedback, ScreenContext,
    },
    types::{HeartbeatConfig, RoleCheck},
};

/// Form inputs of a registry screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryForm {
    /// New heartbeat period in seconds.
    pub heartbeat_period: String,
    /// New heartbeat reward in ether.
    pub heartbeat_reward: String,
    pub new_authority: String,
    /// Role to check (bytes32 hex).
    pub role: String,
    /// Account to check the role for.
    pub role_account: String,
}

/// Rendered registry panel.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryView {
    pub network: Network,
    pub registry: String,
    /// The active chain is not this registry's network; writes will go elsewhere.
    pub chain_mismatch: bool,
    pub heartbeat: HeartbeatConfig,
    pub heartbeat_loading: bool,
    pub authority: ReadState<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_check: Option<RoleCheck>,
    pub form: RegistryForm,
    pub period_status: TxStatus,
    pub reward_status: TxStatus,
    pub reset_status: TxStatus,
    pub authority_status: TxStatus,
    #[serde(flatten)]
    pub feedback: Feedback,
}

#[derive(Debug, Clone, Copy)]
enum RegistryWrite {
    Period,
    Reward,
    ResetReward,
    Authority,
}

impl RegistryWrite {
    const ALL: [RegistryWrite; 4] = [
        RegistryWrite::Period,
        RegistryWrite::Reward,
        RegistryWrite::ResetReward,
        RegistryWrite::Authority,
    ];
}

/// Heartbeat parameters, authority and role checks of one registry.
pub struct RegistryScreen {
    ctx: ScreenContext,
    network: Network,
    registry: Address,
    /// Current form inputs.
    pub form: RegistryForm,
    feedback: Feedback,
    active_chain_id: Option<u64>,
    period: ReadBinding<IRegistry::heartbeatPeriodSecondsCall>,
    reward: ReadBinding<IRegistry::heartbeatRewardCall>,
    authority: ReadBinding<IRegistry::authorityCall>,
    role_check: ReadBinding<IRegistry::hasRoleCall>,
    checked_role: Option<(B256, Address)>,
    period_tx: TrackedWrite,
    reward_tx: TrackedWrite,
    reset_tx: TrackedWrite,
    authority_tx: TrackedWrite,
}

impl RegistryScreen {
    pub fn new(ctx: ScreenContext, network: Network) -> Self {
        let registry = ctx.contracts.registry(network);
        Self {
            network,
            registry,
            form: RegistryForm::default(),
            feedback: Feedback::default(),
            active_chain_id: None,
            period: ReadBinding::new(registry, IRegistry::heartbeatPeriodSecondsCall {}),
            reward: ReadBinding::new(registry, IRegistry::heartbeatRewardCall {}),
            authority: ReadBinding::new(registry, IRegistry::authorityCall {}),
            role_check: ReadBinding::disabled(registry),
            checked_role: None,
            period_tx: TrackedWrite::default(),
            reward_tx: TrackedWrite::default(),
            reset_tx: TrackedWrite::default(),
            authority_tx: TrackedWrite::default(),
            ctx,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub async fn refresh(&mut self) {
        let gateway = self.ctx.gateway.as_ref();
        let queries = self.ctx.queries.as_ref();

        self.active_chain_id = Some(gateway.chain_id().await);
        self.period.refresh(queries, gateway).await;
        self.reward.refresh(queries, gateway).await;
        self.authority.refresh(queries, gateway).await;
        self.role_check.refresh(queries, gateway).await;
    }

    pub fn view(&self) -> RegistryView {
        let chain_mismatch =
            self.active_chain_id.is_some_and(|id| id != self.network.chain_id());

        let role_check = self.checked_role.map(|(role, account)| {
            RoleCheck::new(role, account, self.role_check.value().copied())
        });

        RegistryView {
            network: self.network,
            registry: format!("{:?}", self.registry),
            chain_mismatch,
            heartbeat: HeartbeatConfig::new(
                self.period.value().copied(),
                self.reward.value().copied(),
            ),
            heartbeat_loading: self.period.state().is_loading || self.reward.state().is_loading,
            authority: self.authority.state().map(|a| format!("{a:?}")),
            role_check,
            form: self.form.clone(),
            period_status: self.period_tx.status().clone(),
            reward_status: self.reward_tx.status().clone(),
            reset_status: self.reset_tx.status().clone(),
            authority_status: self.authority_tx.status().clone(),
            feedback: self.feedback.clone(),
        }
    }

    // ==================== Writes ====================

    /// Set the heartbeat period. The input survives a failure.
    pub async fn set_heartbeat_period(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_set_heartbeat_period().await;
        self.feedback.record(result)
    }

    async fn try_set_heartbeat_period(&mut self) -> Result<TxHash> {
        let period: U256 = parse_uint_input(
            require(&self.form.heartbeat_period, "Please enter a heartbeat period")?,
            "Heartbeat period",
        )?;
        self.ctx.require_account().await?;

        let call = IRegistry::setHeartbeatPeriodSecondsCall { periodSeconds: period };
        self.period_tx.submit(&self.ctx.tracker, self.registry, &call).await
    }

    /// Set the heartbeat reward, entered in ether.
    pub async fn set_heartbeat_reward(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_set_heartbeat_reward().await;
        self.feedback.record(result)
    }

    async fn try_set_heartbeat_reward(&mut self) -> Result<TxHash> {
        let reward = parse_amount_input(require(
            &self.form.heartbeat_reward,
            "Please enter a heartbeat reward",
        )?)?;
        self.ctx.require_account().await?;

        let call = IRegistry::setHeartbeatRewardCall { rewardWei: reward };
        self.reward_tx.submit(&self.ctx.tracker, self.registry, &call).await
    }

    /// Set the heartbeat reward to zero.
    pub async fn reset_heartbeat_reward(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_reset_heartbeat_reward().await;
        self.feedback.record(result)
    }

    async fn try_reset_heartbeat_reward(&mut self) -> Result<TxHash> {
        self.ctx.require_account().await?;
        let call = IRegistry::setHeartbeatRewardCall { rewardWei: U256::ZERO };
        self.reset_tx.submit(&self.ctx.tracker, self.registry, &call).await
    }

    /// Hand the registry authority to a new address.
    pub async fn set_authority(&mut self) -> Result<TxHash> {
        self.feedback.clear();
        let result = self.try_set_authority().await;
        self.feedback.record(result)
    }

    async fn try_set_authority(&mut self) -> Result<TxHash> {
        let new_authority = parse_address_input(require(
            &self.form.new_authority,
            "Please enter a new authority address.",
        )?)?;
        self.ctx.require_account().await?;

        let call = IRegistry::setAuthorityCall { newAuthority: new_authority };
        self.authority_tx.submit(&self.ctx.tracker, self.registry, &call).await
    }

    // ==================== Role check ====================

    /// Query `hasRole(role, account)` from the form inputs.
    pub async fn check_role(&mut self) -> Result<RoleCheck> {
        self.feedback.clear();
        let result = self.try_check_role().await;
        self.feedback.record(result)
    }

    async fn try_check_role(&mut self) -> Result<RoleCheck> {
        if self.form.role.trim().is_empty() || self.form.role_account.trim().is_empty() {
            return Err(AppError::Validation("Please enter a role and an address".to_string()));
        }
        let role = parse_bytes32_input(&self.form.role, "Role")?;
        let account = parse_address_input(&self.form.role_account)?;

        self.role_check.set_call(Some(IRegistry::hasRoleCall { role, account }));
        self.checked_role = Some((role, account));
        self.role_check.refresh(&self.ctx.queries, self.ctx.gateway.as_ref()).await;

        if let Some(error) = &self.role_check.state().error {
            return Err(AppError::Rpc(error.clone()));
        }
        Ok(RoleCheck::new(role, account, self.role_check.value().copied()))
    }

    // ==================== Receipts ====================

    /// Apply any receipts that have already arrived.
    pub async fn sync(&mut self) {
        for write in RegistryWrite::ALL {
            if let Some(outcome) = self.write_mut(write).poll() {
                self.apply(write, outcome).await;
            }
        }
    }

    /// Wait for every in-flight write and apply the outcomes.
    pub async fn settle(&mut self) {
        for write in RegistryWrite::ALL {
            if let Some(outcome) = self.write_mut(write).wait().await {
                self.apply(write, outcome).await;
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        [&self.period_tx, &self.reward_tx, &self.reset_tx, &self.authority_tx]
            .iter()
            .any(|w| w.is_busy())
    }

    /// Status receivers of the writes still waiting for a receipt.
    pub fn pending_writes(&self) -> Vec<watch::Receiver<TxStatus>> {
        [&self.period_tx, &self.reward_tx, &self.reset_tx, &self.authority_tx].iter().filter_map(|w| w.watch()).collect()
    }

    fn write_mut(&mut self, write: RegistryWrite) -> &mut TrackedWrite {
        match write {
            RegistryWrite::Period => &mut self.period_tx,
            RegistryWrite::Reward => &mut self.reward_tx,
            RegistryWrite::ResetReward => &mut self.reset_tx,
            RegistryWrite::Authority => &mut self.authority_tx,
        }
    }

    async fn apply(&mut self, write: RegistryWrite, outcome: TxOutcome) {
        let hash = match outcome {
            TxOutcome::Confirmed(hash) => hash,
            TxOutcome::Failed(error) => {
                self.feedback.fail(error);
                return;
            }
        };
        tracing::info!(tx_hash = %hash, network = %self.network, write = ?write, "Registry write confirmed");

        match write {
            RegistryWrite::Period => {
                self.form.heartbeat_period.clear();
                self.feedback.succeed("Heartbeat period updated successfully!");
            }
            RegistryWrite::Reward => {
                self.form.heartbeat_reward.clear();
                self.feedback.succeed("Heartbeat reward updated successfully!");
            }
            RegistryWrite::ResetReward => {
                self.feedback.succeed("Rewards have been set to zero successfully!");
            }
            RegistryWrite::Authority => {
                self.form.new_authority.clear();
                self.feedback.succeed("Authority updated successfully!");
            }
        }
        self.ctx.queries.invalidate(self.registry).await;
    }
}
