//! MCP server implementation.
//!
//! Every tool is one operator interaction: it fills the relevant form, presses
//! the button, and returns the re-rendered panel as JSON. Validation, wallet
//! and revert errors are part of the panel (`error` field), not MCP errors.

use std::{sync::Arc, time::Duration};

use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    bindings::settled,
    config::Config,
    dashboard::{Dashboard, Tab},
    ethereum::{contracts::ContractRegistry, ChainGateway, Network, WalletSession},
    screens::ScreenContext,
};

/// TGE Reward Console MCP Server.
///
/// Holds one dashboard behind a mutex; tool calls are serialized against it.
#[derive(Clone)]
pub struct TgeConsoleServer {
    dashboard: Arc<Mutex<Dashboard>>,
    tool_router: ToolRouter<Self>,
}

impl TgeConsoleServer {
    /// Create the server from configuration.
    ///
    /// No network calls are made here; the wallet connects on request (or via
    /// [`connect_configured_wallet`](Self::connect_configured_wallet)).
    pub fn new(config: Config) -> crate::Result<Self> {
        tracing::info!(network = %config.default_network, "Initializing TGE Reward Console");

        let session = WalletSession::new(&config)?;
        let contracts = ContractRegistry::new(&config.contracts);
        let ctx = ScreenContext::new(
            Arc::new(session),
            Arc::new(contracts),
            config.receipt_poll_interval,
        )
        .with_query_stale_time(config.query_stale_time);

        Ok(Self::with_context(ctx))
    }

    /// Create the server around any gateway.
    pub fn with_gateway(
        gateway: Arc<dyn ChainGateway>,
        contracts: ContractRegistry,
        receipt_poll_interval: Duration,
    ) -> Self {
        Self::with_context(ScreenContext::new(gateway, Arc::new(contracts), receipt_poll_interval))
    }

    /// Create the server around a prepared screen context.
    pub fn with_context(ctx: ScreenContext) -> Self {
        Self {
            dashboard: Arc::new(Mutex::new(Dashboard::new(ctx))),
            tool_router: Self::tool_router(),
        }
    }

    /// Connect with the configured key, logging (not failing) on error.
    pub async fn connect_configured_wallet(&self) {
        match self.dashboard.lock().await.connect().await {
            Ok(account) => tracing::info!(account = %account, "Wallet connected"),
            Err(e) => tracing::warn!(error = %e, "Wallet connection failed, continuing read-only"),
        }
    }
}

// ==================== Tool inputs ====================

/// Input parameters for the select_tab tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct SelectTabInput {
    /// One of "treasury", "source_token", "registry_dev", "registry_prod".
    pub tab: String,
}

/// Input parameters for the treasury_send_tokens tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct SendTokensInput {
    /// Recipient address (0x...).
    pub recipient: String,
    /// Amount of source tokens (human-readable, e.g. "1.5").
    pub amount: String,
}

/// Input parameters for the treasury_send_batch tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct SendBatchInput {
    /// Comma-separated recipient addresses.
    pub wallets: String,
    /// Comma-separated amounts, one per recipient.
    pub amounts: String,
}

/// Input parameters for tools taking a single token amount.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct AmountInput {
    /// Amount (human-readable, up to 18 decimals).
    pub amount: String,
}

/// Input parameters for the treasury_set_unlock_option tool.
///
/// Omitted fields keep the form's current value (initially a 90 day lock at
/// 100% conversion with ID 1).
#[derive(Debug, Clone, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct SetUnlockOptionInput {
    /// Option ID (0-255).
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Cliff period in seconds.
    #[serde(default)]
    pub cliff_seconds: Option<String>,
    /// Conversion rate percentage (0-100).
    #[serde(default)]
    pub conversion_rate_percentage: Option<String>,
}

/// Input parameters for the source_token_approve tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct ApproveInput {
    /// Amount of source tokens to lock.
    pub amount: String,
    /// Unlock option the lock will use.
    pub unlock_option_id: String,
}

/// Input parameters for the source_token_initiate_unlock tool.
#[derive(Debug, Clone, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct InitiateUnlockInput {
    /// Unlock option ID. Defaults to the one given at approval.
    #[serde(default)]
    pub unlock_option_id: Option<String>,
}

/// Input parameters for the fulfill and cancel tools.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct UnlockIdInput {
    /// Unlock ID (0x-prefixed bytes32).
    pub unlock_id: String,
}

/// Input parameters for tools acting on one registry.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct RegistryInput {
    /// "dev" or "prod".
    pub network: String,
}

/// Input parameters for the registry_set_heartbeat_period tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct HeartbeatPeriodInput {
    /// "dev" or "prod".
    pub network: String,
    /// New heartbeat period in seconds.
    pub seconds: String,
}

/// Input parameters for the registry_set_heartbeat_reward tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct HeartbeatRewardInput {
    /// "dev" or "prod".
    pub network: String,
    /// Reward per heartbeat in RCADE (e.g. "0.25").
    pub amount: String,
}

/// Input parameters for the registry_set_authority tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct SetAuthorityInput {
    /// "dev" or "prod".
    pub network: String,
    /// New authority address (0x...).
    pub address: String,
}

/// Input parameters for the registry_check_role tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct CheckRoleInput {
    /// "dev" or "prod".
    pub network: String,
    /// Role identifier (0x-prefixed bytes32).
    pub role: String,
    /// Account to check (0x...).
    pub address: String,
}

fn parse_network(s: &str) -> std::result::Result<Network, McpError> {
    s.parse::<Network>().map_err(|e| McpError::invalid_params(e, None))
}

fn render<T: Serialize>(view: &T) -> std::result::Result<String, McpError> {
    serde_json::to_string_pretty(view).map_err(|e| McpError::internal_error(e.to_string(), None))
}

/// Screen errors are rendered in the panel; only log them here.
fn log_action<T: std::fmt::Debug>(action: &str, result: &crate::Result<T>) {
    match result {
        Ok(value) => tracing::info!(action, result = ?value, "Action submitted"),
        Err(e) if e.is_validation() => tracing::debug!(action, error = %e, "Action rejected"),
        Err(e) => tracing::warn!(action, error = %e, "Action failed"),
    }
}

#[tool_router]
impl TgeConsoleServer {
    // ==================== Dashboard ====================

    /// Wallet, chain and tab summary.
    #[tool(description = "Show the connected account, active chain, selected tab and pending transactions")]
    pub async fn dashboard_status(&self) -> std::result::Result<String, McpError> {
        tracing::info!("dashboard_status called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;
        render(&dashboard.status().await)
    }

    #[tool(
        description = "Select a tab (treasury, source_token, registry_dev, registry_prod). Registry tabs ask the wallet to switch to their chain."
    )]
    pub async fn select_tab(
        &self,
        Parameters(input): Parameters<SelectTabInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(tab = %input.tab, "select_tab called");
        let tab: Tab = input.tab.parse()?;

        let mut dashboard = self.dashboard.lock().await;
        dashboard.select_tab(tab).await;
        render(&dashboard.status().await)
    }

    #[tool(description = "Connect the configured wallet")]
    pub async fn connect_wallet(&self) -> std::result::Result<String, McpError> {
        tracing::info!("connect_wallet called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.connect().await?;
        render(&dashboard.status().await)
    }

    #[tool(description = "Disconnect the wallet. Reads keep working.")]
    pub async fn disconnect_wallet(&self) -> std::result::Result<String, McpError> {
        tracing::info!("disconnect_wallet called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.disconnect().await;
        render(&dashboard.status().await)
    }

    /// Block until every submitted transaction has a receipt.
    ///
    /// The dashboard is only locked to collect the pending writes and to apply
    /// their outcomes; other tools keep running while receipts are awaited.
    #[tool(description = "Wait until every pending transaction is confirmed or failed, then show the status")]
    pub async fn wait_for_transactions(&self) -> std::result::Result<String, McpError> {
        let pending = self.dashboard.lock().await.pending_writes();
        tracing::info!(pending = pending.len(), "wait_for_transactions called");
        for status in pending {
            settled(status).await;
        }

        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;
        render(&dashboard.status().await)
    }

    // ==================== Treasury ====================

    #[tool(description = "Show treasury balances and unlock options")]
    pub async fn treasury_view(&self) -> std::result::Result<String, McpError> {
        tracing::info!("treasury_view called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;
        dashboard.treasury.refresh().await;
        render(&dashboard.treasury.view())
    }

    #[tool(description = "Send source tokens from the treasury to a recipient")]
    pub async fn treasury_send_tokens(
        &self,
        Parameters(input): Parameters<SendTokensInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(recipient = %input.recipient, amount = %input.amount, "treasury_send_tokens called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = &mut dashboard.treasury;
        screen.form.recipient = input.recipient;
        screen.form.amount = input.amount;
        log_action("send_tokens", &screen.send_tokens().await);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(description = "Send source tokens from the treasury to several recipients in one transaction")]
    pub async fn treasury_send_batch(
        &self,
        Parameters(input): Parameters<SendBatchInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(wallets = %input.wallets, amounts = %input.amounts, "treasury_send_batch called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = &mut dashboard.treasury;
        screen.form.batch_wallets = input.wallets;
        screen.form.batch_amounts = input.amounts;
        log_action("send_batch", &screen.send_batch().await);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(description = "Mint source tokens into the treasury")]
    pub async fn treasury_mint(
        &self,
        Parameters(input): Parameters<AmountInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(amount = %input.amount, "treasury_mint called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = &mut dashboard.treasury;
        screen.form.mint_amount = input.amount;
        log_action("mint", &screen.mint().await);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(description = "Create or update an unlock option on the treasury")]
    pub async fn treasury_set_unlock_option(
        &self,
        Parameters(input): Parameters<SetUnlockOptionInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(id = ?input.id, name = ?input.name, "treasury_set_unlock_option called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = &mut dashboard.treasury;
        let form = &mut screen.form;
        if let Some(id) = input.id {
            form.option_id = id;
        }
        if let Some(name) = input.name {
            form.option_name = name;
        }
        if let Some(description) = input.description {
            form.option_description = description;
        }
        if let Some(cliff) = input.cliff_seconds {
            form.option_cliff_seconds = cliff;
        }
        if let Some(rate) = input.conversion_rate_percentage {
            form.option_rate = rate;
        }
        log_action("set_unlock_option", &screen.set_unlock_option().await);
        screen.refresh().await;
        render(&screen.view())
    }

    // ==================== Source token ====================

    #[tool(description = "Show the unlock flow state and the connected account's unlocks")]
    pub async fn source_token_view(&self) -> std::result::Result<String, McpError> {
        tracing::info!("source_token_view called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;
        dashboard.source_token.refresh().await;
        render(&dashboard.source_token.view())
    }

    #[tool(description = "Approve the treasury to lock an amount of source tokens (step 1 of an unlock)")]
    pub async fn source_token_approve(
        &self,
        Parameters(input): Parameters<ApproveInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(amount = %input.amount, option = %input.unlock_option_id, "source_token_approve called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = &mut dashboard.source_token;
        screen.form.amount = input.amount;
        screen.form.unlock_option_id = input.unlock_option_id;
        log_action("approve", &screen.approve().await);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(
        description = "Initiate the unlock of the approved amount (step 2, only after the approval confirmed)"
    )]
    pub async fn source_token_initiate_unlock(
        &self,
        Parameters(input): Parameters<InitiateUnlockInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(option = ?input.unlock_option_id, "source_token_initiate_unlock called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = &mut dashboard.source_token;
        if let Some(option) = input.unlock_option_id {
            screen.form.unlock_option_id = option;
        }
        log_action("initiate_unlock", &screen.initiate_unlock().await);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(description = "Fulfill a matured unlock")]
    pub async fn source_token_fulfill(
        &self,
        Parameters(input): Parameters<UnlockIdInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(unlock_id = %input.unlock_id, "source_token_fulfill called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = &mut dashboard.source_token;
        screen.form.fulfill_id = input.unlock_id;
        log_action("fulfill", &screen.fulfill().await);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(description = "Cancel a pending unlock")]
    pub async fn source_token_cancel(
        &self,
        Parameters(input): Parameters<UnlockIdInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(unlock_id = %input.unlock_id, "source_token_cancel called");
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = &mut dashboard.source_token;
        screen.form.cancel_id = input.unlock_id;
        log_action("cancel", &screen.cancel().await);
        screen.refresh().await;
        render(&screen.view())
    }

    // ==================== Registry ====================

    #[tool(description = "Show heartbeat period, heartbeat reward and authority of the dev or prod registry")]
    pub async fn registry_view(
        &self,
        Parameters(input): Parameters<RegistryInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(network = %input.network, "registry_view called");
        let network = parse_network(&input.network)?;
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = dashboard.registry(network);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(description = "Set the registry heartbeat period in seconds")]
    pub async fn registry_set_heartbeat_period(
        &self,
        Parameters(input): Parameters<HeartbeatPeriodInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(network = %input.network, seconds = %input.seconds, "registry_set_heartbeat_period called");
        let network = parse_network(&input.network)?;
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = dashboard.registry(network);
        screen.form.heartbeat_period = input.seconds;
        log_action("set_heartbeat_period", &screen.set_heartbeat_period().await);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(description = "Set the registry heartbeat reward (in RCADE)")]
    pub async fn registry_set_heartbeat_reward(
        &self,
        Parameters(input): Parameters<HeartbeatRewardInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(network = %input.network, amount = %input.amount, "registry_set_heartbeat_reward called");
        let network = parse_network(&input.network)?;
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = dashboard.registry(network);
        screen.form.heartbeat_reward = input.amount;
        log_action("set_heartbeat_reward", &screen.set_heartbeat_reward().await);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(description = "Set the registry heartbeat reward to zero")]
    pub async fn registry_reset_heartbeat_reward(
        &self,
        Parameters(input): Parameters<RegistryInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(network = %input.network, "registry_reset_heartbeat_reward called");
        let network = parse_network(&input.network)?;
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = dashboard.registry(network);
        log_action("reset_heartbeat_reward", &screen.reset_heartbeat_reward().await);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(description = "Transfer the registry authority to a new address")]
    pub async fn registry_set_authority(
        &self,
        Parameters(input): Parameters<SetAuthorityInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(network = %input.network, address = %input.address, "registry_set_authority called");
        let network = parse_network(&input.network)?;
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = dashboard.registry(network);
        screen.form.new_authority = input.address;
        log_action("set_authority", &screen.set_authority().await);
        screen.refresh().await;
        render(&screen.view())
    }

    #[tool(description = "Check whether an address holds a role on the registry")]
    pub async fn registry_check_role(
        &self,
        Parameters(input): Parameters<CheckRoleInput>,
    ) -> std::result::Result<String, McpError> {
        tracing::info!(network = %input.network, role = %input.role, address = %input.address, "registry_check_role called");
        let network = parse_network(&input.network)?;
        let mut dashboard = self.dashboard.lock().await;
        dashboard.sync().await;

        let screen = dashboard.registry(network);
        screen.form.role = input.role;
        screen.form.role_account = input.address;
        log_action("check_role", &screen.check_role().await);
        screen.refresh().await;
        render(&screen.view())
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for TgeConsoleServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tge-reward-console".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "TGE Reward Console. Administers the treasury, source token and registry \
                 contracts on RCade. Actions return the updated panel; transactions are \
                 tracked until their receipt arrives (see wait_for_transactions)."
                    .to_string(),
            ),
        }
    }
}
