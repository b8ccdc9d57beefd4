use crate::client::{RequestOptions, WebacyClient};
use crate::prelude::*;

/// Input for a sanctions lookup
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckSanctionStatusInput {
    /// The wallet address to check for sanctions
    pub wallet_address: String,
}

/// Check a wallet against sanctioned address databases.
pub struct CheckSanctionStatusTool {
    client: WebacyClient,
}

impl CheckSanctionStatusTool {
    pub fn new(client: WebacyClient) -> Self {
        Self { client }
    }
}

impl Tool for CheckSanctionStatusTool {
    type Input = CheckSanctionStatusInput;

    fn name(&self) -> &str {
        "checkSanctionStatus"
    }

    fn description(&self) -> &str {
        "Check if a wallet address is sanctioned or included in any sanctioned address databases"
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let endpoint = format!("/addresses/sanctioned/{}", input.wallet_address);
        let data = self.client.request(&endpoint, RequestOptions::get()).await?;
        Ok(ToolResult::Json(data))
    }
}
