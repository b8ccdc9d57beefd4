//! Router builder for the HTTP transport.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use webacy_mcp_core::{Mode, SessionContext, PROOF_FIELD, PROOF_HEADER};

use crate::error::{BuildError, ServerError, ServerResult};
use crate::rpc::{JsonRpcResponse, McpService};
use crate::state::AppState;

/// Builder for the MCP HTTP endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use webacy_mcp_server::{McpRouter, McpService};
///
/// # async fn example(service: McpService) -> Result<(), Box<dyn std::error::Error>> {
/// let app = McpRouter::new(service)
///     .with_mcp("/mcp")
///     .with_health("/health")
///     .build()?;
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub struct McpRouter {
    service: Arc<McpService>,
    mcp_path: Option<String>,
    health_path: Option<String>,
}

impl McpRouter {
    pub fn new(service: McpService) -> Self {
        Self::from_arc(Arc::new(service))
    }

    /// Use this when the service is shared with another transport.
    pub fn from_arc(service: Arc<McpService>) -> Self {
        Self {
            service,
            mcp_path: None,
            health_path: None,
        }
    }

    /// Serve JSON-RPC at `path`.
    pub fn with_mcp(mut self, path: impl Into<String>) -> Self {
        self.mcp_path = Some(path.into());
        self
    }

    /// Serve a liveness probe at `path`.
    pub fn with_health(mut self, path: impl Into<String>) -> Self {
        self.health_path = Some(path.into());
        self
    }

    /// Build the router with all configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoEndpoints`] if `.with_mcp()` was never called,
    /// or [`BuildError::InvalidPath`] for a path without a leading `/`.
    pub fn build(self) -> Result<Router, BuildError> {
        let mcp_path = self.mcp_path.ok_or(BuildError::NoEndpoints)?;
        for path in std::iter::once(&mcp_path).chain(self.health_path.iter()) {
            if !path.starts_with('/') {
                return Err(BuildError::InvalidPath(path.clone()));
            }
        }

        let state = AppState::from_arc(self.service);
        let mut router = Router::new().route(&mcp_path, post(mcp_handler));

        if let Some(health_path) = self.health_path {
            router = router.route(&health_path, get(health_handler));
        }

        Ok(router.layer(TraceLayer::new_for_http()).with_state(state))
    }
}

fn session_from_headers(headers: &HeaderMap) -> ServerResult<SessionContext> {
    match headers.get(PROOF_HEADER) {
        None => Ok(SessionContext::new()),
        Some(value) => {
            let raw = value.to_str().map_err(|_| {
                ServerError::InvalidRequest(format!("{} header is not valid UTF-8", PROOF_HEADER))
            })?;
            Ok(SessionContext::from_header(Some(raw)))
        }
    }
}

/// Session proof for one HTTP request. A `__evmauth` member on the JSON-RPC
/// envelope takes precedence over the `x-evmauth` header.
fn session_for_request(headers: &HeaderMap, message: &Value) -> ServerResult<SessionContext> {
    match message.get(PROOF_FIELD) {
        Some(proof) if !proof.is_null() => Ok(SessionContext::new().with_proof(proof.clone())),
        _ => session_from_headers(headers),
    }
}

async fn mcp_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let message: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => return Ok(Json(JsonRpcResponse::parse_error(e)).into_response()),
    };
    if message.is_array() {
        return Err(ServerError::InvalidRequest(
            "batch requests are not supported".to_string(),
        ));
    }

    let session = session_for_request(&headers, &message)?;
    match state.service.handle_value(message, Some(&session)).await {
        Some(response) => Ok(Json(response).into_response()),
        None => Ok(StatusCode::ACCEPTED.into_response()),
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let mode = match state.service.mode() {
        Mode::Normal => "normal",
        Mode::DemoBypass => "demo",
    };
    Json(json!({
        "status": "ok",
        "mode": mode,
        "tools": state.service.registry().len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
