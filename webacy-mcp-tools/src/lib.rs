//! Webacy risk-analysis tools.
//!
//! Each tool wraps one Webacy API endpoint and returns the API document
//! as JSON. Required access tiers live in [`TIER_REQUIREMENTS`].
//!
//! ```ignore
//! use webacy_mcp_tools::{all_tools, tier_policy, WebacyClient, WebacyConfig};
//! use webacy_mcp_core::ToolRegistry;
//!
//! let client = WebacyClient::new(WebacyConfig::new(api_key))?;
//! let registry = ToolRegistry::builder(tier_policy())
//!     .add_tools(all_tools(&client))
//!     .build()?;
//! ```

pub mod address;
pub mod client;
pub mod contract;
pub mod ping;
pub mod transaction;
pub mod url_risk;

pub use address::{CheckAddressThreatTool, CheckSanctionStatusTool};
pub use client::{RequestOptions, WebacyClient, WebacyConfig, WebacyError};
pub use contract::AnalyzeContractTool;
pub use ping::PingTool;
pub use transaction::AnalyzeTransactionTool;
pub use url_risk::AnalyzeUrlTool;

use webacy_mcp_core::{box_tool, DynTool, Tier, TierPolicy};

/// Required tier for every tool in this crate.
pub const TIER_REQUIREMENTS: &[(&str, Tier)] = &[
    ("ping", Tier::Free),
    ("checkAddressThreat", Tier::Basic),
    ("checkSanctionStatus", Tier::Basic),
    ("analyzeContract", Tier::Premium),
    ("analyzeTransaction", Tier::Premium),
    ("analyzeUrl", Tier::Pro),
];

/// Policy built from [`TIER_REQUIREMENTS`].
pub fn tier_policy() -> TierPolicy {
    TierPolicy::from_table(TIER_REQUIREMENTS.iter().copied())
}

/// Every tool, lowest tier first.
pub fn all_tools(client: &WebacyClient) -> Vec<Box<dyn DynTool>> {
    let mut tools = vec![box_tool(PingTool::new())];
    tools.extend(address::all_tools(client));
    tools.push(box_tool(AnalyzeContractTool::new(client.clone())));
    tools.push(box_tool(AnalyzeTransactionTool::new(client.clone())));
    tools.push(box_tool(AnalyzeUrlTool::new(client.clone())));
    tools
}

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use schemars::JsonSchema;
    pub use serde::Deserialize;
    pub use webacy_mcp_core::{Tool, ToolError, ToolResult};
}
