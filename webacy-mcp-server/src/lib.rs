//! # webacy-mcp-server
//!
//! MCP server exposing Webacy risk-analysis tools, gated per tool by
//! EVMAuth token ownership.
//!
//! The same [`McpService`] backs both transports: newline-delimited
//! JSON-RPC on stdio, or an axum router over HTTP.
//!
//! ```rust,no_run
//! use clap::Parser;
//! use webacy_mcp_server::{run, ServerConfig};
//!
//! # async fn example() -> Result<(), webacy_mcp_server::StartupError> {
//! let config = ServerConfig::parse().validate()?;
//! run(config).await?;
//! # Ok(())
//! # }
//! ```

pub mod authority;
pub mod config;
pub mod error;
pub mod logging;
pub mod router;
pub mod rpc;
pub mod state;
pub mod stdio;

use std::sync::Arc;

pub use authority::HttpAuthority;
pub use config::{AuthoritySettings, ServerConfig, TransportKind, ValidatedConfig};
pub use error::{BuildError, ServerError, ServerResult, StartupError};
pub use router::McpRouter;
pub use rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpService, ServerInfo};
pub use state::AppState;

use webacy_mcp_core::{AuthorizationGateway, Mode, NoAuthority, TierPolicy, ToolRegistry};
use webacy_mcp_tools::{all_tools, tier_policy, WebacyClient};

/// Path of the liveness probe on the HTTP transport.
pub const HEALTH_PATH: &str = "/health";

/// Wire the registry, authority and gateway for `config`.
pub fn build_service(config: &ValidatedConfig) -> Result<McpService, StartupError> {
    let client = WebacyClient::new(config.webacy.clone())?;
    let registry = ToolRegistry::builder(tier_policy())
        .add_tools(all_tools(&client))
        .build()?;

    let gateway = match &config.authority {
        Some(settings) => AuthorizationGateway::new(HttpAuthority::new(settings.clone())?),
        None => AuthorizationGateway::new(NoAuthority),
    }
    .with_mode(config.mode);

    Ok(McpService::new(registry, gateway))
}

/// Human-readable startup summary, one entry per line.
pub fn banner(policy: &TierPolicy, mode: Mode, contract_address: &str) -> Vec<String> {
    let mut lines = vec!["Webacy MCP server with EVMAuth protection".to_string()];
    for (tier, tools) in policy.summary() {
        let tools = if tools.is_empty() {
            "-".to_string()
        } else {
            tools.join(", ")
        };
        lines.push(format!("{} (Token {}): {}", tier.label(), tier.token_id(), tools));
    }
    lines.push(match mode {
        Mode::Normal => "Mode: normal (authorization enforced)".to_string(),
        Mode::DemoBypass => "Mode: DEMO (authorization bypassed)".to_string(),
    });
    lines.push(format!("Contract: {}", contract_address));
    lines
}

/// Build the service and serve it on the configured transport until shutdown.
pub async fn run(config: ValidatedConfig) -> Result<(), StartupError> {
    let service = Arc::new(build_service(&config)?);

    for line in banner(&tier_policy(), config.mode, &config.contract_address) {
        tracing::info!("{}", line);
    }
    if config.mode == Mode::DemoBypass {
        tracing::warn!("DEMO_MODE is enabled; gated tools run without token checks");
    }

    match config.transport {
        TransportKind::Stdio => {
            tracing::info!("serving MCP on stdio");
            stdio::serve_stdio(service).await?;
        }
        TransportKind::Http => {
            let app = McpRouter::from_arc(service)
                .with_mcp(config.endpoint.clone())
                .with_health(HEALTH_PATH)
                .build()?;
            let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
            tracing::info!(
                "serving MCP on http://{}:{}{}",
                config.host,
                config.port,
                config.endpoint
            );
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
