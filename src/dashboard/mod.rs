//! Dashboard: tabs, wallet lifecycle and the chain switch tied to registry tabs.

use std::{fmt, str::FromStr};

use alloy::primitives::Address;
use serde::Serialize;
use tokio::sync::watch;

use crate::{
    bindings::TxStatus,
    error::{AppError, Result},
    ethereum::Network,
    screens::{RegistryScreen, ScreenContext, SourceTokenScreen, TreasuryScreen},
};

/// Visible tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Admin actions.
    #[default]
    Treasury,
    /// User actions.
    SourceToken,
    RegistryDev,
    RegistryProd,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Treasury, Tab::SourceToken, Tab::RegistryDev, Tab::RegistryProd];

    /// Network the tab is pinned to. Only registry tabs are.
    pub fn network(self) -> Option<Network> {
        match self {
            Tab::RegistryDev => Some(Network::Dev),
            Tab::RegistryProd => Some(Network::Prod),
            Tab::Treasury | Tab::SourceToken => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Treasury => "treasury",
            Tab::SourceToken => "source_token",
            Tab::RegistryDev => "registry_dev",
            Tab::RegistryProd => "registry_prod",
        }
    }
}

impl FromStr for Tab {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Tab::ALL.into_iter().find(|tab| tab.as_str() == normalized).ok_or_else(|| {
            AppError::Validation(format!(
                "Unknown tab '{}'. Expected one of: treasury, source_token, registry_dev, registry_prod",
                s
            ))
        })
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wallet and chain summary.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStatus {
    pub tab: Tab,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub connected: bool,
    pub chain_id: u64,
    /// Name of the active chain, `None` for an unknown chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,
    /// Block explorer of the active chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    /// Set when a chain switch was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// Whether any write on any screen is waiting for its receipt.
    pub pending_transactions: bool,
}

/// Owns the screens and the shared context.
pub struct Dashboard {
    ctx: ScreenContext,
    tab: Tab,
    notice: Option<String>,
    pub treasury: TreasuryScreen,
    pub source_token: SourceTokenScreen,
    pub registry_dev: RegistryScreen,
    pub registry_prod: RegistryScreen,
}

impl Dashboard {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            tab: Tab::default(),
            notice: None,
            treasury: TreasuryScreen::new(ctx.clone()),
            source_token: SourceTokenScreen::new(ctx.clone()),
            registry_dev: RegistryScreen::new(ctx.clone(), Network::Dev),
            registry_prod: RegistryScreen::new(ctx.clone(), Network::Prod),
            ctx,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Registry screen for a network.
    pub fn registry(&mut self, network: Network) -> &mut RegistryScreen {
        match network {
            Network::Dev => &mut self.registry_dev,
            Network::Prod => &mut self.registry_prod,
        }
    }

    /// Make `tab` visible.
    ///
    /// Moving to a registry tab while connected asks the wallet to switch to
    /// the tab's chain once, unless it is already there. A rejected switch is
    /// reported in the status notice and not retried.
    pub async fn select_tab(&mut self, tab: Tab) {
        if tab == self.tab {
            return;
        }
        tracing::info!(from = %self.tab, to = %tab, "Switching tab");
        self.tab = tab;
        self.notice = None;

        let Some(network) = tab.network() else {
            return;
        };
        if self.ctx.gateway.account().await.is_none() {
            return;
        }
        let target = network.chain_id();
        if self.ctx.gateway.chain_id().await == target {
            return;
        }

        if let Err(e) = self.ctx.gateway.switch_chain(target).await {
            tracing::warn!(chain_id = target, error = %e, "Chain switch rejected");
            self.notice = Some(e.to_string());
        }
    }

    /// Connect the wallet.
    pub async fn connect(&mut self) -> Result<Address> {
        self.notice = None;
        let account = self.ctx.gateway.connect().await?;
        // Cached reads were made without an account; account-scoped bindings re-enable on refresh.
        self.ctx.queries.invalidate_all().await;
        Ok(account)
    }

    /// Disconnect the wallet. Reads keep working.
    pub async fn disconnect(&mut self) {
        self.ctx.gateway.disconnect().await;
        self.notice = None;
    }

    pub async fn status(&self) -> DashboardStatus {
        let account = self.ctx.gateway.account().await;
        let chain_id = self.ctx.gateway.chain_id().await;
        let descriptor = Network::from_chain_id(chain_id).map(Network::descriptor);
        DashboardStatus {
            tab: self.tab,
            account: account.map(|a| format!("{a:?}")),
            connected: account.is_some(),
            chain_id,
            chain_name: descriptor.map(|d| d.name.to_string()),
            explorer_url: descriptor.map(|d| d.explorer_url.to_string()),
            notice: self.notice.clone(),
            pending_transactions: self.is_busy(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.treasury.is_busy()
            || self.source_token.is_busy()
            || self.registry_dev.is_busy()
            || self.registry_prod.is_busy()
    }

    /// Apply receipts that have arrived on every screen.
    pub async fn sync(&mut self) {
        self.treasury.sync().await;
        self.source_token.sync().await;
        self.registry_dev.sync().await;
        self.registry_prod.sync().await;
    }

    /// Status receivers of every in-flight write on every screen.
    ///
    /// They can be awaited with [`settled`](crate::bindings::settled) without
    /// holding the dashboard.
    pub fn pending_writes(&self) -> Vec<watch::Receiver<TxStatus>> {
        let mut pending = self.treasury.pending_writes();
        pending.extend(self.source_token.pending_writes());
        pending.extend(self.registry_dev.pending_writes());
        pending.extend(self.registry_prod.pending_writes());
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_network() {
        assert_eq!(Tab::Treasury.network(), None);
        assert_eq!(Tab::SourceToken.network(), None);
        assert_eq!(Tab::RegistryDev.network(), Some(Network::Dev));
        assert_eq!(Tab::RegistryProd.network(), Some(Network::Prod));
    }

    #[test]
    fn test_tab_from_str() {
        assert_eq!("treasury".parse::<Tab>().unwrap(), Tab::Treasury);
        assert_eq!("Source-Token".parse::<Tab>().unwrap(), Tab::SourceToken);
        assert_eq!(" registry_prod ".parse::<Tab>().unwrap(), Tab::RegistryProd);
        assert!("registry".parse::<Tab>().is_err());
    }

    #[test]
    fn test_tab_display_round_trips() {
        for tab in Tab::ALL {
            assert_eq!(tab.to_string().parse::<Tab>().unwrap(), tab);
        }
    }
}
