//! Application state for the HTTP transport.

use std::sync::Arc;

use crate::rpc::McpService;

/// Shared application state containing the MCP service.
///
/// Cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<McpService>,
}

impl AppState {
    pub fn from_arc(service: Arc<McpService>) -> Self {
        Self { service }
    }
}
