use crate::client::{RequestOptions, WebacyClient};
use crate::prelude::*;

/// Input for checking an address's threat profile
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckAddressThreatInput {
    /// The blockchain address to analyze for threat risks
    pub address: String,

    /// Chain to query (eth, arb, base, bsc, pol, opt, sol, sei, sui, ton). Defaults to eth
    #[serde(default)]
    pub chain: Option<String>,

    /// Return details on low risk issues found with the address
    #[serde(default)]
    pub show_low_risk: Option<bool>,
}

/// Analyze whether an address poses risk to others.
pub struct CheckAddressThreatTool {
    client: WebacyClient,
}

impl CheckAddressThreatTool {
    pub fn new(client: WebacyClient) -> Self {
        Self { client }
    }
}

impl Tool for CheckAddressThreatTool {
    type Input = CheckAddressThreatInput;

    fn name(&self) -> &str {
        "checkAddressThreat"
    }

    fn description(&self) -> &str {
        "Analyze threat considerations for an address - checks if address poses risk to others"
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let options = RequestOptions::get()
            .query_opt("chain", input.chain.filter(|c| !c.is_empty()))
            .query_opt("show_low_risk", input.show_low_risk);

        let data = self
            .client
            .request(&format!("/addresses/{}", input.address), options)
            .await?;
        Ok(ToolResult::Json(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WebacyConfig;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param, query_param_is_missing},
        Mock, MockServer, ResponseTemplate,
    };

    fn tool_for(server: &MockServer) -> CheckAddressThreatTool {
        let client =
            WebacyClient::new(WebacyConfig::new("k").with_api_url(server.uri())).unwrap();
        CheckAddressThreatTool::new(client)
    }

    #[tokio::test]
    async fn test_sends_optional_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/addresses/0xABC"))
            .and(query_param("chain", "base"))
            .and(query_param("show_low_risk", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"overallRisk": 3})))
            .expect(1)
            .mount(&server)
            .await;

        let result = tool_for(&server)
            .execute(CheckAddressThreatInput {
                address: "0xABC".to_string(),
                chain: Some("base".to_string()),
                show_low_risk: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(result, ToolResult::Json(json!({"overallRisk": 3})));
    }

    #[tokio::test]
    async fn test_omits_absent_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/addresses/0xABC"))
            .and(query_param_is_missing("chain"))
            .and(query_param_is_missing("show_low_risk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"overallRisk": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let result = tool_for(&server)
            .execute(CheckAddressThreatInput {
                address: "0xABC".to_string(),
                chain: None,
                show_low_risk: None,
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_false_flag_is_still_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("show_low_risk", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let result = tool_for(&server)
            .execute(CheckAddressThreatInput {
                address: "0x1".to_string(),
                chain: None,
                show_low_risk: Some(false),
            })
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_requires_only_address() {
        let client = WebacyClient::new(WebacyConfig::default()).unwrap();
        let schema = CheckAddressThreatTool::new(client).input_schema();
        assert!(schema.is_required("address"));
        assert!(!schema.is_required("chain"));
        assert!(schema.has_property("show_low_risk"));
    }
}
