//! MCP JSON-RPC method handling, shared by every transport.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use webacy_mcp_core::{
    AuthorizationGateway, Disposition, GatewayError, Mode, SessionContext, ToolRegistry,
};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// An incoming JSON-RPC message. A missing `id` marks a notification; an
/// explicit `"id": null` is still a request and gets a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Keeps `null` distinct from an absent field.
fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Reply to input that was not valid JSON.
    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::failure(
            Value::Null,
            JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", detail)),
        )
    }
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Name and version reported by `initialize`.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "webacy-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Transport-independent MCP server.
pub struct McpService {
    registry: ToolRegistry,
    gateway: AuthorizationGateway,
    info: ServerInfo,
}

impl McpService {
    pub fn new(registry: ToolRegistry, gateway: AuthorizationGateway) -> Self {
        Self {
            registry,
            gateway,
            info: ServerInfo::default(),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn mode(&self) -> Mode {
        self.gateway.mode()
    }

    /// Handle a raw JSON message. Returns `None` for notifications.
    pub async fn handle_value(
        &self,
        raw: Value,
        session: Option<&SessionContext>,
    ) -> Option<JsonRpcResponse> {
        let id = raw.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(raw) {
            Ok(request) => self.handle(request, session).await,
            Err(e) => Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
            )),
        }
    }

    /// Handle one request. Returns `None` for notifications.
    pub async fn handle(
        &self,
        request: JsonRpcRequest,
        session: Option<&SessionContext>,
    ) -> Option<JsonRpcResponse> {
        let notification = request.is_notification();
        let id = request.id.clone().unwrap_or(Value::Null);
        tracing::debug!(method = %request.method, notification, "rpc request");

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "notifications/initialized" | "initialized" => return None,
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params, session).await,
            other => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        };

        if notification {
            return None;
        }

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.info.name,
                "version": self.info.version,
            }
        })
    }

    fn list_tools(&self) -> Value {
        json!({ "tools": self.registry.descriptors() })
    }

    async fn call_tool(
        &self,
        params: Option<Value>,
        session: Option<&SessionContext>,
    ) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))?;

        let arguments = match params.arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(JsonRpcError::new(
                    INVALID_PARAMS,
                    "Invalid params: arguments must be an object",
                ))
            }
        };

        let entry = self
            .registry
            .lookup(&params.name)
            .map_err(|e| JsonRpcError::new(INVALID_PARAMS, e.to_string()))?;

        match self
            .gateway
            .dispatch(entry.tool(), entry.tier(), arguments, session)
            .await
        {
            Ok(dispatch) => {
                tracing::info!(tool = %params.name, disposition = %dispatch.disposition, "tool call completed");
                let mut result = dispatch.response.to_value();
                if dispatch.disposition == Disposition::Bypassed {
                    result["_meta"] = json!({ "evmauth": { "disposition": "bypassed" } });
                }
                Ok(result)
            }
            Err(GatewayError::UnexpectedAuthorityResponse { tool, raw }) => Err(JsonRpcError::new(
                INTERNAL_ERROR,
                format!("Unexpected response from authorization authority for {}", tool),
            )
            .with_data(raw)),
            Err(GatewayError::Unauthorized(denial)) => {
                let text = serde_json::to_string_pretty(&denial.body)
                    .unwrap_or_else(|_| denial.message.clone());
                Ok(tool_error(text))
            }
            Err(err) => {
                tracing::warn!(tool = %params.name, error = %err, "tool call failed");
                Ok(tool_error(err.to_string()))
            }
        }
    }
}

/// A tool result flagged as an error.
fn tool_error(text: String) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": true
    })
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
