//! Authority client that verifies proofs against a remote EVMAuth service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use webacy_mcp_core::{
    AuthorityClient, AuthorityError, AuthorityRequest, ProtectedHandler, Tier,
};

use crate::config::AuthoritySettings;
use crate::error::StartupError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    token_id: u64,
    contract_address: &'a str,
    chain_id: u64,
    rpc_url: &'a str,
    request: &'a AuthorityRequest,
}

#[derive(Debug, Deserialize)]
struct VerifyReply {
    allowed: bool,
    #[serde(default)]
    error: Option<Value>,
}

/// Asks a remote verifier whether the caller holds the tier's token.
///
/// The verifier receives the token id, contract, chain and the full call
/// (proof included) and answers `{allowed, error?}`. An approved call runs
/// the handler locally; a refusal is relayed as a denial envelope.
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: reqwest::Client,
    settings: AuthoritySettings,
}

impl HttpAuthority {
    pub fn new(settings: AuthoritySettings) -> Result<Self, StartupError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| StartupError::Authority(e.to_string()))?;
        Ok(Self { client, settings })
    }

    async fn verify(&self, tier: Tier, request: &AuthorityRequest) -> Result<VerifyReply, AuthorityError> {
        let body = VerifyRequest {
            token_id: tier.token_id(),
            contract_address: &self.settings.contract_address,
            chain_id: self.settings.chain_id,
            rpc_url: &self.settings.rpc_url,
            request,
        };

        let response = self
            .client
            .post(&self.settings.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthorityError::Transport(format!(
                "authority returned {}",
                status
            )));
        }

        response
            .json::<VerifyReply>()
            .await
            .map_err(|e| AuthorityError::Transport(format!("invalid authority reply: {}", e)))
    }
}

#[async_trait]
impl AuthorityClient for HttpAuthority {
    async fn protect(
        &self,
        tier: Tier,
        request: AuthorityRequest,
        handler: ProtectedHandler,
    ) -> Result<Value, AuthorityError> {
        let reply = self.verify(tier, &request).await?;

        if reply.allowed {
            let response = handler(request).await?;
            return Ok(response.to_value());
        }

        let error = reply
            .error
            .unwrap_or_else(|| json!({ "message": "Access denied" }));
        tracing::debug!(token_id = tier.token_id(), %error, "authority refused call");
        let text = json!({ "error": error }).to_string();
        Ok(json!({ "content": [{ "type": "text", "text": text }] }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use webacy_mcp_core::{protected_handler, ToolResponse};
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn authority_for(server: &MockServer) -> HttpAuthority {
        HttpAuthority::new(AuthoritySettings {
            url: format!("{}/verify", server.uri()),
            contract_address: "0x9f2B42FB651b75CC3db4ef9FEd913A22BA4629Cf".to_string(),
            chain_id: 1223953,
            rpc_url: "https://rpc.example".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn handler(text: &'static str) -> ProtectedHandler {
        protected_handler(move |_req| async move { Ok(ToolResponse::text(text)) })
    }

    fn call() -> AuthorityRequest {
        let arguments = json!({"walletAddress": "0xABC", "__evmauth": {"signature": "0x1"}});
        AuthorityRequest::tool_call("checkSanctionStatus", arguments.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn test_allowed_runs_handler() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .and(body_partial_json(json!({
                "tokenId": 3,
                "chainId": 1223953,
                "request": {"method": "tools/call", "params": {"name": "checkSanctionStatus"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"allowed": true})))
            .expect(1)
            .mount(&server)
            .await;

        let reply = authority_for(&server)
            .protect(Tier::Premium, call(), handler("risk report"))
            .await
            .unwrap();
        assert_eq!(reply, json!({"content": [{"type": "text", "text": "risk report"}]}));
    }

    #[tokio::test]
    async fn test_refusal_becomes_denial_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "allowed": false,
                "error": {"code": "PAYMENT_REQUIRED", "message": "Token 1 required"}
            })))
            .mount(&server)
            .await;

        let reply = authority_for(&server)
            .protect(Tier::Basic, call(), handler("unused"))
            .await
            .unwrap();

        let text = reply["content"][0]["text"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed["error"]["message"], "Token 1 required");
    }

    #[tokio::test]
    async fn test_refusal_without_error_uses_default_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"allowed": false})))
            .mount(&server)
            .await;

        let reply = authority_for(&server)
            .protect(Tier::Basic, call(), handler("unused"))
            .await
            .unwrap();
        let parsed: Value =
            serde_json::from_str(reply["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(parsed["error"]["message"], "Access denied");
    }

    #[tokio::test]
    async fn test_error_status_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = authority_for(&server)
            .protect(Tier::Pro, call(), handler("unused"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthorityError::Transport(msg) if msg.contains("503")));
    }
}
