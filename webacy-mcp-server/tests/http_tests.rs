//! End-to-end tests for the HTTP transport.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use webacy_mcp_core::test_utils::{MockAuthority, RecordingTool};
use webacy_mcp_core::{AuthorizationGateway, Mode, Tier, TierPolicy, ToolRegistry};
use webacy_mcp_server::{McpRouter, McpService};

struct Fixture {
    app: Router,
    authority: MockAuthority,
    gated: RecordingTool,
}

fn fixture(authority: MockAuthority, mode: Mode) -> Fixture {
    let free = RecordingTool::new("ping", "pong");
    let gated = RecordingTool::new("checkSanctionStatus", "not sanctioned");
    let policy = TierPolicy::from_table([
        ("ping", Tier::Free),
        ("checkSanctionStatus", Tier::Basic),
    ]);
    let registry = ToolRegistry::builder(policy)
        .add_tool(free.boxed())
        .add_tool(gated.boxed())
        .build()
        .unwrap();
    let gateway = AuthorizationGateway::new(authority.clone()).with_mode(mode);
    let app = McpRouter::new(McpService::new(registry, gateway))
        .with_mcp("/mcp")
        .with_health("/health")
        .build()
        .unwrap();

    Fixture {
        app,
        authority,
        gated,
    }
}

async fn post(app: &Router, body: impl Into<Body>, proof: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json");
    if let Some(proof) = proof {
        request = request.header("x-evmauth", proof);
    }
    let response = app
        .clone()
        .oneshot(request.body(body.into()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn rpc(app: &Router, message: Value, proof: Option<&str>) -> Value {
    let (status, body) = post(app, message.to_string(), proof).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

fn call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

#[tokio::test]
async fn test_tools_list_carries_proof_field_for_gated_tools() {
    let fx = fixture(MockAuthority::approving(), Mode::Normal);
    let reply = rpc(
        &fx.app,
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
        None,
    )
    .await;

    let tools = reply["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);

    let ping = tools.iter().find(|t| t["name"] == "ping").unwrap();
    assert!(ping["inputSchema"]["properties"].get("__evmauth").is_none());

    let gated = tools
        .iter()
        .find(|t| t["name"] == "checkSanctionStatus")
        .unwrap();
    assert!(gated["inputSchema"]["properties"].get("__evmauth").is_some());
    assert!(gated["description"]
        .as_str()
        .unwrap()
        .contains("Requires EVMAuth Token #1"));
}

#[tokio::test]
async fn test_free_call_skips_authority() {
    let fx = fixture(MockAuthority::approving(), Mode::Normal);
    let reply = rpc(&fx.app, call(2, "ping", json!({})), None).await;

    assert_eq!(reply["id"], 2);
    assert_eq!(reply["result"]["content"][0]["text"], "pong");
    assert_eq!(fx.authority.call_count(), 0);
}

#[tokio::test]
async fn test_denied_call_is_tool_error() {
    let fx = fixture(MockAuthority::denying("Token 1 required"), Mode::Normal);
    let reply = rpc(
        &fx.app,
        call(3, "checkSanctionStatus", json!({"walletAddress": "0xABC"})),
        None,
    )
    .await;

    assert_eq!(reply["result"]["isError"], true);
    let text = reply["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Token 1 required"));
    assert_eq!(fx.gated.call_count(), 0);
}

#[tokio::test]
async fn test_header_proof_reaches_authority() {
    let fx = fixture(MockAuthority::approving(), Mode::Normal);
    let reply = rpc(
        &fx.app,
        call(4, "checkSanctionStatus", json!({"walletAddress": "0xABC"})),
        Some(r#"{"signature":"0xfeed"}"#),
    )
    .await;

    assert_eq!(reply["result"]["content"][0]["text"], "not sanctioned");

    let requests = fx.authority.requests();
    assert_eq!(requests.len(), 1);
    let (tier, request) = &requests[0];
    assert_eq!(*tier, Tier::Basic);
    assert_eq!(
        request.arguments()["__evmauth"],
        json!(r#"{"signature":"0xfeed"}"#)
    );

    // the tool never sees the proof
    let seen = fx.gated.calls();
    assert!(seen[0].get("__evmauth").is_none());
    assert_eq!(seen[0]["walletAddress"], "0xABC");
}

#[tokio::test]
async fn test_envelope_proof_reaches_authority() {
    let fx = fixture(MockAuthority::approving(), Mode::Normal);
    let mut message = call(14, "checkSanctionStatus", json!({"walletAddress": "0xABC"}));
    message["__evmauth"] = json!({"signature": "0xbody"});

    let reply = rpc(&fx.app, message, Some(r#"{"signature":"0xheader"}"#)).await;
    assert_eq!(reply["result"]["content"][0]["text"], "not sanctioned");

    let (_, request) = fx.authority.requests().remove(0);
    assert_eq!(request.arguments()["__evmauth"], json!({"signature": "0xbody"}));
    assert_eq!(fx.gated.calls(), vec![json!({"walletAddress": "0xABC"})]);
}

#[tokio::test]
async fn test_demo_mode_marks_bypass() {
    let fx = fixture(MockAuthority::approving(), Mode::DemoBypass);
    let reply = rpc(
        &fx.app,
        call(5, "checkSanctionStatus", json!({"walletAddress": "0xABC"})),
        None,
    )
    .await;

    assert_eq!(reply["result"]["content"][0]["text"], "not sanctioned");
    assert_eq!(
        reply["result"]["_meta"]["evmauth"]["disposition"],
        "bypassed"
    );
    assert_eq!(fx.authority.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let fx = fixture(MockAuthority::approving(), Mode::Normal);
    let reply = rpc(&fx.app, call(6, "nope", json!({})), None).await;

    assert_eq!(reply["error"]["code"], -32602);
    assert_eq!(reply["error"]["message"], "Unknown tool: nope");
}

#[tokio::test]
async fn test_malformed_authority_reply_is_internal_error() {
    let fx = fixture(MockAuthority::replying(json!({"content": []})), Mode::Normal);
    let reply = rpc(
        &fx.app,
        call(7, "checkSanctionStatus", json!({"walletAddress": "0xABC"})),
        None,
    )
    .await;

    assert_eq!(reply["error"]["code"], -32603);
    assert_eq!(reply["error"]["data"], json!({"content": []}));
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let fx = fixture(MockAuthority::approving(), Mode::Normal);
    let (status, body) = post(&fx.app, "{oops", None).await;

    assert_eq!(status, StatusCode::OK);
    let reply: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply["error"]["code"], -32700);
    assert_eq!(reply["id"], Value::Null);
}

#[tokio::test]
async fn test_notification_is_accepted_without_body() {
    let fx = fixture(MockAuthority::approving(), Mode::Normal);
    let message = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    let (status, body) = post(&fx.app, message.to_string(), None).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_batch_is_rejected() {
    let fx = fixture(MockAuthority::approving(), Mode::Normal);
    let (status, body) = post(&fx.app, "[]", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let reply: Value = serde_json::from_slice(&body).unwrap();
    assert!(reply["error"]
        .as_str()
        .unwrap()
        .contains("batch requests are not supported"));
}

#[tokio::test]
async fn test_health_reports_mode_and_tool_count() {
    let fx = fixture(MockAuthority::approving(), Mode::DemoBypass);
    let response = fx
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["mode"], "demo");
    assert_eq!(health["tools"], 2);
}
