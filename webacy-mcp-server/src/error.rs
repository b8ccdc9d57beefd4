//! Error types for the webacy MCP server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use webacy_mcp_core::RegistryError;
use webacy_mcp_tools::WebacyError;

/// Errors that can occur when building a router.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No endpoints were configured.
    #[error("No endpoints configured. Call .with_mcp() before .build()")]
    NoEndpoints,

    /// Route paths must be absolute.
    #[error("Invalid route path '{0}': must start with '/'")]
    InvalidPath(String),
}

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid contract address '{0}': expected 0x followed by 40 hex characters")]
    InvalidContractAddress(String),

    #[error("no authority URL configured; set RADIUS_AUTHORITY_URL or enable DEMO_MODE")]
    MissingAuthorityUrl,

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid MCP endpoint '{0}': must start with '/'")]
    InvalidEndpoint(String),

    #[error("tool registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Webacy client error: {0}")]
    Webacy(#[from] WebacyError),

    #[error("authority client error: {0}")]
    Authority(String),

    #[error("router error: {0}")]
    Build(#[from] BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StartupError {
    /// Returns true if this is a configuration problem the operator can fix
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidContractAddress(_)
                | Self::MissingAuthorityUrl
                | Self::InvalidUrl { .. }
                | Self::InvalidEndpoint(_)
        )
    }
}

/// Errors surfaced by HTTP handlers outside the JSON-RPC envelope.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request from client.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::InvalidRequest(e) => (StatusCode::BAD_REQUEST, e.clone()),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
