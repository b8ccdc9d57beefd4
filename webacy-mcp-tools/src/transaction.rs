use crate::client::{RequestOptions, WebacyClient};
use crate::prelude::*;

/// Input for transaction analysis
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTransactionInput {
    /// The transaction hash to analyze
    pub tx_hash: String,
}

/// Risk analysis for a single transaction.
pub struct AnalyzeTransactionTool {
    client: WebacyClient,
}

impl AnalyzeTransactionTool {
    pub fn new(client: WebacyClient) -> Self {
        Self { client }
    }
}

impl Tool for AnalyzeTransactionTool {
    type Input = AnalyzeTransactionInput;

    fn name(&self) -> &str {
        "analyzeTransaction"
    }

    fn description(&self) -> &str {
        "Get risk analysis for a specific transaction hash including counterparty risks and asset risks"
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let endpoint = format!("/transactions/{}", input.tx_hash);
        let data = self.client.request(&endpoint, RequestOptions::get()).await?;
        Ok(ToolResult::Json(data))
    }
}
