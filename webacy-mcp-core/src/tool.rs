use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::InputSchema;

/// Result types that tools can return.
///
/// Risk tools usually hand back pre-formatted JSON text; anything structured
/// goes through [`ToolResult::Json`] and is pretty-printed by the
/// response normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolResult {
    /// Plain text response, forwarded verbatim
    Text(String),

    /// Structured JSON data
    Json(Value),
}

impl ToolResult {
    /// Create a JSON result from any serializable type
    pub fn json<T: Serialize>(value: T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Create a text result from a string
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Get the text content, serializing JSON compactly
    pub fn as_text(&self) -> String {
        match self {
            ToolResult::Text(s) => s.clone(),
            ToolResult::Json(v) => v.to_string(),
        }
    }

    /// Get a reference to the text content if this is a Text variant
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ToolResult::Text(s) => Some(s),
            ToolResult::Json(_) => None,
        }
    }
}

impl From<String> for ToolResult {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ToolResult {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Value> for ToolResult {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

/// Errors that can occur during tool execution
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The upstream risk API rejected or failed the request
    #[error("{0}")]
    Upstream(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Custom(String),
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        Self::Custom(s)
    }
}

impl From<&str> for ToolError {
    fn from(s: &str) -> Self {
        Self::Custom(s.to_string())
    }
}

/// Trait for implementing tools served over MCP.
///
/// Tools define an input type with `#[derive(Deserialize, JsonSchema)]` so the
/// advertised schema is generated from the Rust type.
///
/// ```rust
/// use webacy_mcp_core::{Tool, ToolResult, ToolError};
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct LookupInput {
///     /// The address to look up
///     address: String,
/// }
///
/// struct LookupTool;
///
/// impl Tool for LookupTool {
///     type Input = LookupInput;
///
///     fn name(&self) -> &str { "lookup" }
///     fn description(&self) -> &str { "Look up an address" }
///
///     fn execute(&self, input: Self::Input) -> impl std::future::Future<Output = Result<ToolResult, ToolError>> + Send {
///         async move { Ok(format!("looked up {}", input.address).into()) }
///     }
/// }
/// ```
pub trait Tool: Send + Sync {
    /// The input type for this tool. Must implement `Deserialize` and `JsonSchema`.
    type Input: DeserializeOwned + JsonSchema;

    /// The name of the tool (e.g., "checkSanctionStatus")
    fn name(&self) -> &str;

    /// A description of what the tool does
    fn description(&self) -> &str;

    /// Execute the tool with typed input
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl std::future::Future<Output = Result<ToolResult, ToolError>> + Send;

    /// Get the JSON schema for this tool's input.
    ///
    /// Generated from the `JsonSchema` derive on `Input`.
    fn input_schema(&self) -> InputSchema {
        let schema = schemars::schema_for!(Self::Input);
        let value = serde_json::to_value(schema)
            .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}));
        InputSchema::new(value)
    }
}

/// Object-safe trait for dynamic tool dispatch (used by the registry and gateway).
///
/// Implement `Tool` instead and use `box_tool()` to convert.
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> InputSchema;
    fn execute_raw(
        &self,
        input: Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<ToolResult, ToolError>> + Send + '_>,
    >;
}

/// Convert a `Tool` into a type-erased `Box<dyn DynTool>` for storage in collections.
pub fn box_tool<T: Tool + 'static>(tool: T) -> Box<dyn DynTool> {
    Box::new(ToolWrapper(tool))
}

/// Create a `Vec<Box<dyn DynTool>>` from heterogeneous tool types.
///
/// ```ignore
/// use webacy_mcp_core::box_tools;
///
/// let tools = box_tools![PingTool::new(), CheckSanctionStatusTool::new(client)];
/// ```
#[macro_export]
macro_rules! box_tools {
    ($($tool:expr),* $(,)?) => {
        vec![$($crate::tool::box_tool($tool)),*]
    };
}

/// Internal wrapper that implements DynTool for any Tool
struct ToolWrapper<T>(T);

impl<T: Tool + 'static> DynTool for ToolWrapper<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    fn input_schema(&self) -> InputSchema {
        self.0.input_schema()
    }

    fn execute_raw(
        &self,
        input: Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<ToolResult, ToolError>> + Send + '_>,
    > {
        Box::pin(async move {
            let typed_input: T::Input = serde_json::from_value(input)
                .map_err(|e| ToolError::InvalidInput(format!("Failed to deserialize input: {}", e)))?;

            self.0.execute(typed_input).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, JsonSchema)]
    struct AddressInput {
        /// The address to inspect
        address: String,
        /// Optional chain
        chain: Option<String>,
    }

    struct AddressTool;

    impl Tool for AddressTool {
        type Input = AddressInput;

        fn name(&self) -> &str {
            "address"
        }

        fn description(&self) -> &str {
            "Inspect an address"
        }

        async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
            let chain = input.chain.unwrap_or_else(|| "eth".to_string());
            Ok(format!("{}@{}", input.address, chain).into())
        }
    }

    #[test]
    fn test_generated_schema_lists_properties() {
        let schema = AddressTool.input_schema();
        assert!(schema.has_property("address"));
        assert!(schema.has_property("chain"));
        assert!(!schema.has_property("__evmauth"));
    }

    #[tokio::test]
    async fn test_execute_raw_deserializes_input() {
        let tool = box_tool(AddressTool);
        let result = tool
            .execute_raw(serde_json::json!({"address": "0xABC", "chain": "base"}))
            .await
            .unwrap();
        assert_eq!(result.as_str(), Some("0xABC@base"));
    }

    #[tokio::test]
    async fn test_execute_raw_ignores_unknown_fields() {
        let tool = box_tool(AddressTool);
        let result = tool
            .execute_raw(serde_json::json!({"address": "0xABC", "extra": 1}))
            .await
            .unwrap();
        assert_eq!(result.as_str(), Some("0xABC@eth"));
    }

    #[tokio::test]
    async fn test_execute_raw_rejects_bad_input() {
        let tool = box_tool(AddressTool);
        let err = tool
            .execute_raw(serde_json::json!({"chain": "eth"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert!(err.to_string().contains("address"));
    }

    #[test]
    fn test_box_tools_macro() {
        let tools: Vec<Box<dyn DynTool>> = crate::box_tools![AddressTool, AddressTool];
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name(), "address");
    }

    #[test]
    fn test_tool_result_from_value() {
        let result: ToolResult = serde_json::json!({"a": 1}).into();
        assert_eq!(result, ToolResult::Json(serde_json::json!({"a": 1})));
        assert_eq!(result.as_str(), None);
    }
}
