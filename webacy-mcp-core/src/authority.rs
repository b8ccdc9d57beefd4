//! The authorization authority seam.
//!
//! An authority receives a tier, the call to protect, and a handler that
//! performs the actual work. It decides whether to invoke the handler and
//! replies with a value the gateway classifies via
//! [`classify_authority_response`].

use std::future::Future;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::proof::Arguments;
use crate::response::ToolResponse;
use crate::tier::Tier;
use crate::tool::ToolError;

/// The call as handed to the authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityRequest {
    pub method: String,
    pub params: AuthorityRequestParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityRequestParams {
    pub name: String,
    pub arguments: Arguments,
}

impl AuthorityRequest {
    /// A `tools/call` request for `name` with `arguments`.
    pub fn tool_call(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            method: "tools/call".to_string(),
            params: AuthorityRequestParams {
                name: name.into(),
                arguments,
            },
        }
    }

    pub fn tool_name(&self) -> &str {
        &self.params.name
    }

    pub fn arguments(&self) -> &Arguments {
        &self.params.arguments
    }
}

/// Work the authority runs once it approves a call.
pub type ProtectedHandler = Box<
    dyn FnOnce(AuthorityRequest) -> BoxFuture<'static, Result<ToolResponse, ToolError>> + Send,
>;

/// Box a closure as a [`ProtectedHandler`].
pub fn protected_handler<F, Fut>(f: F) -> ProtectedHandler
where
    F: FnOnce(AuthorityRequest) -> Fut + Send + 'static,
    Fut: Future<Output = Result<ToolResponse, ToolError>> + Send + 'static,
{
    Box::new(move |request: AuthorityRequest| f(request).boxed())
}

/// Failures that prevent the authority from producing any reply.
#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    /// The protected handler ran and failed.
    #[error(transparent)]
    Handler(#[from] ToolError),

    /// The authority could not be reached or could not answer.
    #[error("authority unavailable: {0}")]
    Transport(String),
}

/// A token-gated authorization authority.
#[async_trait]
pub trait AuthorityClient: Send + Sync {
    /// Decide on `request` at `tier`, running `handler` when allowed.
    ///
    /// The reply is either the handler's response envelope, a denial
    /// envelope, or a top-level `{error}` object.
    async fn protect(
        &self,
        tier: Tier,
        request: AuthorityRequest,
        handler: ProtectedHandler,
    ) -> Result<Value, AuthorityError>;
}

/// Authority used when none is configured. Refuses every gated call.
#[derive(Debug, Clone, Default)]
pub struct NoAuthority;

#[async_trait]
impl AuthorityClient for NoAuthority {
    async fn protect(
        &self,
        _tier: Tier,
        _request: AuthorityRequest,
        _handler: ProtectedHandler,
    ) -> Result<Value, AuthorityError> {
        Err(AuthorityError::Transport(
            "no authorization authority configured".to_string(),
        ))
    }
}

/// A denial carried back from the authority.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationDenial {
    /// Human-readable reason.
    pub message: String,
    /// The authority's structured denial payload.
    pub body: Value,
}

/// Classification of an authority reply.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorityResult {
    /// The handler ran; this is the first content text.
    Approved(String),
    Denied(AuthorizationDenial),
    /// Neither content nor a recognizable error.
    Malformed(Value),
}

impl AuthorityResult {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }
}

fn has_error(value: &Value) -> bool {
    value.get("error").is_some_and(|e| !e.is_null())
}

fn error_message(error: &Value) -> Option<String> {
    match error {
        Value::String(s) => Some(s.clone()),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Classify an authority reply.
///
/// Rules apply in order:
/// 1. `content[0].text` that parses as JSON with an `error` key is a denial.
/// 2. Any other `content[0].text` is an approval carrying that text.
/// 3. A top-level `error` is a denial (`error.message`, the string itself,
///    or "Authentication failed").
/// 4. Everything else is malformed.
pub fn classify_authority_response(raw: Value) -> AuthorityResult {
    if let Some(content) = raw.get("content").and_then(Value::as_array) {
        let text = content
            .first()
            .and_then(|item| item.get("text"))
            .and_then(Value::as_str);
        let Some(text) = text else {
            return AuthorityResult::Malformed(raw);
        };

        return match serde_json::from_str::<Value>(text) {
            Ok(parsed) if has_error(&parsed) => {
                let message = error_message(&parsed["error"]).unwrap_or_else(|| text.to_string());
                AuthorityResult::Denied(AuthorizationDenial {
                    message,
                    body: parsed,
                })
            }
            _ => AuthorityResult::Approved(text.to_string()),
        };
    }

    if has_error(&raw) {
        let message =
            error_message(&raw["error"]).unwrap_or_else(|| "Authentication failed".to_string());
        return AuthorityResult::Denied(AuthorizationDenial {
            message,
            body: raw,
        });
    }

    AuthorityResult::Malformed(raw)
}
