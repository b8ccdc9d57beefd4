use crate::client::{RequestOptions, WebacyClient};
use crate::prelude::*;

/// Input for smart contract analysis
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeContractInput {
    /// The smart contract address to analyze
    pub contract_address: String,

    /// Set to true for bytecode scanning of unverified contracts (slower but more thorough)
    #[serde(default)]
    pub from_bytecode: Option<bool>,

    /// Set to true to re-run analysis, false to retrieve cached results
    #[serde(default)]
    pub refresh_cache: Option<bool>,

    /// Callback URL to retrieve delayed data from bytecode analysis
    #[serde(default)]
    pub callback: Option<String>,
}

/// Real-time contract risk analysis.
pub struct AnalyzeContractTool {
    client: WebacyClient,
}

impl AnalyzeContractTool {
    pub fn new(client: WebacyClient) -> Self {
        Self { client }
    }
}

impl Tool for AnalyzeContractTool {
    type Input = AnalyzeContractInput;

    fn name(&self) -> &str {
        "analyzeContract"
    }

    fn description(&self) -> &str {
        "Real-time smart contract risk analysis through fuzzing, static analysis, and dynamic analysis"
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let options = RequestOptions::get()
            .query_opt("fromBytecode", input.from_bytecode)
            .query_opt("refreshCache", input.refresh_cache)
            .query_opt("callback", input.callback.filter(|c| !c.is_empty()));

        let endpoint = format!("/contracts/{}", input.contract_address);
        let data = self.client.request(&endpoint, options).await?;
        Ok(ToolResult::Json(data))
    }
}
