//! Integration tests for the MCP server surface.
//!
//! Run with: `cargo test --test test_server`

mod common;

use std::{sync::Arc, time::Duration};

use alloy::primitives::U256;
use common::{MockGateway, POLL_INTERVAL, REGISTRY_PROD};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::ServerInfo;
use rmcp::ServerHandler;
use tge_reward_console::{
    ethereum::{contracts::registry::IRegistry, ReceiptOutcome},
    mcp::{AmountInput, HeartbeatPeriodInput, RegistryInput, SelectTabInput},
    TgeConsoleServer,
};

fn server(gateway: &Arc<MockGateway>) -> TgeConsoleServer {
    TgeConsoleServer::with_gateway(gateway.clone(), common::contracts(), POLL_INTERVAL)
}

fn parse(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("tool output should be JSON")
}

/// Test server info.
#[test]
fn test_server_info() {
    let server = server(&Arc::new(MockGateway::new()));
    let info: ServerInfo = server.get_info();

    assert_eq!(info.server_info.name, "tge-reward-console");
    assert!(!info.server_info.version.is_empty());
    assert!(info.capabilities.tools.is_some());
}

#[tokio::test]
async fn test_validation_errors_are_rendered_in_panel() {
    let gateway = Arc::new(MockGateway::connected());
    let server = server(&gateway);

    let json = server
        .treasury_mint(Parameters(AmountInput { amount: "".to_string() }))
        .await
        .expect("panel is returned even when the action is rejected");
    let panel = parse(&json);

    assert_eq!(panel["error"], "Please enter an amount");
    assert!(gateway.sent().is_empty());
}

#[tokio::test]
async fn test_heartbeat_period_round_trip() {
    let gateway = Arc::new(MockGateway::connected());
    let server = server(&gateway);

    let json = server
        .registry_set_heartbeat_period(Parameters(HeartbeatPeriodInput {
            network: "prod".to_string(),
            seconds: "7200".to_string(),
        }))
        .await
        .expect("tool should succeed");
    assert_eq!(parse(&json)["period_status"]["state"], "pending");

    server.wait_for_transactions().await.expect("wait should succeed");

    gateway.respond(REGISTRY_PROD, &IRegistry::heartbeatPeriodSecondsCall {}, &U256::from(7200u64));
    let json = server
        .registry_view(Parameters(RegistryInput { network: "prod".to_string() }))
        .await
        .expect("view should succeed");
    let panel = parse(&json);

    assert_eq!(panel["success"], "Heartbeat period updated successfully!");
    assert_eq!(panel["form"]["heartbeat_period"], "");
    assert_eq!(panel["heartbeat"]["period_seconds"], "7200");
}

#[tokio::test]
async fn test_status_stays_available_while_waiting_for_receipts() {
    let gateway = Arc::new(MockGateway::connected());
    gateway.set_receipt(None);
    let server = server(&gateway);

    server
        .treasury_mint(Parameters(AmountInput { amount: "1".to_string() }))
        .await
        .expect("tool should succeed");

    let waiter = tokio::spawn({
        let server = server.clone();
        async move { server.wait_for_transactions().await }
    });

    let json = tokio::time::timeout(Duration::from_secs(2), server.dashboard_status())
        .await
        .expect("status must not wait for receipts")
        .expect("status should render");
    assert_eq!(parse(&json)["pending_transactions"], true);

    gateway.set_receipt(Some(ReceiptOutcome::Success));
    let json = tokio::time::timeout(Duration::from_secs(2), waiter)
        .await
        .expect("wait should finish once the receipt arrives")
        .expect("wait task should not panic")
        .expect("tool should succeed");
    assert_eq!(parse(&json)["pending_transactions"], false);
}

#[tokio::test]
async fn test_unknown_network_is_invalid_params() {
    let server = server(&Arc::new(MockGateway::connected()));

    let result = server
        .registry_view(Parameters(RegistryInput { network: "staging".to_string() }))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_select_tab_tool() {
    let gateway = Arc::new(MockGateway::connected());
    let server = server(&gateway);

    let json = server
        .select_tab(Parameters(SelectTabInput { tab: "registry_prod".to_string() }))
        .await
        .expect("tool should succeed");
    let status = parse(&json);

    assert_eq!(status["tab"], "registry_prod");
    assert_eq!(gateway.switch_requests().len(), 1);

    let result = server.select_tab(Parameters(SelectTabInput { tab: "nope".to_string() })).await;
    assert!(result.is_err());
}

/// Live read against the configured registry.
#[tokio::test]
#[ignore = "Requires network access and environment variables"]
async fn test_live_registry_view() {
    let server = skip_if_no_server!();

    let json = server
        .registry_view(Parameters(RegistryInput { network: "dev".to_string() }))
        .await
        .expect("registry_view should succeed");

    println!("Registry view: {}", json);
}
