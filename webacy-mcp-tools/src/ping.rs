use crate::prelude::*;
use chrono::{SecondsFormat, Utc};

/// Service name reported by [`PingTool`].
pub const SERVICE_NAME: &str = "Webacy Risk Analysis MCP Server";

/// Input for the health check (takes no arguments)
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct PingInput {}

/// Free health check reporting server status.
#[derive(Debug, Clone)]
pub struct PingTool {
    service: String,
}

impl PingTool {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Report a different service name (e.g. to mark demo mode).
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }
}

impl Default for PingTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for PingTool {
    type Input = PingInput;

    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Server health check and information"
    }

    async fn execute(&self, _input: Self::Input) -> Result<ToolResult, ToolError> {
        let status = serde_json::json!({
            "status": "OK",
            "service": self.service,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "message": "Server is running and ready to analyze blockchain security risks",
        });
        Ok(ToolResult::text(serde_json::to_string_pretty(&status)?))
    }
}
