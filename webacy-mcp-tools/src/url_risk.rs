use crate::client::{RequestOptions, WebacyClient};
use crate::prelude::*;

/// Input for URL risk prediction
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeUrlInput {
    /// The URL to analyze for risks
    pub url: String,
}

/// ML-based phishing and scam prediction for a URL.
pub struct AnalyzeUrlTool {
    client: WebacyClient,
}

impl AnalyzeUrlTool {
    pub fn new(client: WebacyClient) -> Self {
        Self { client }
    }
}

impl Tool for AnalyzeUrlTool {
    type Input = AnalyzeUrlInput;

    fn name(&self) -> &str {
        "analyzeUrl"
    }

    fn description(&self) -> &str {
        "Predict maliciousness of a URL using ML models trained on web3 data - detect phishing and scam sites"
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let body = serde_json::json!({ "url": input.url });
        let data = self.client.request("/url", RequestOptions::post(body)).await?;
        Ok(ToolResult::Json(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WebacyConfig;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_posts_url_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/url"))
            .and(body_json(json!({"url": "https://phish.example"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prediction": "malicious"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = WebacyClient::new(WebacyConfig::new("k").with_api_url(server.uri())).unwrap();
        let result = AnalyzeUrlTool::new(client)
            .execute(AnalyzeUrlInput {
                url: "https://phish.example".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(result, ToolResult::Json(json!({"prediction": "malicious"})));
    }
}
