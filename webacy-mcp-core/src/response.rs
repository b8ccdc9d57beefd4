//! MCP tool response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tool::ToolResult;

/// One content item of a tool response. Only text is produced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text { text: String },
}

/// The `{content: [{type: "text", text}]}` envelope every tool call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ContentItem>,
}

impl ToolResponse {
    /// A response with a single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::Text { text: text.into() }],
        }
    }

    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|item| match item {
            ContentItem::Text { text } => text.as_str(),
        })
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "content": self.content.iter().map(|item| match item {
                ContentItem::Text { text } => serde_json::json!({"type": "text", "text": text}),
            }).collect::<Vec<_>>()
        })
    }
}

/// Wrap a tool's output in the response envelope.
///
/// Text passes through untouched; structured data is pretty-printed.
pub fn normalize(result: ToolResult) -> ToolResponse {
    match result {
        ToolResult::Text(text) => ToolResponse::text(text),
        ToolResult::Json(value) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            ToolResponse::text(text)
        }
    }
}

impl From<ToolResult> for ToolResponse {
    fn from(result: ToolResult) -> Self {
        normalize(result)
    }
}
