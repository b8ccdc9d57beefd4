//! Tier-aware dispatch of tool calls.
//!
//! Every call ends in exactly one of four outcomes: bypassed (demo mode),
//! free (tier 0), approved by the authority, or denied by it. Nothing is
//! carried from one call to the next.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use crate::authority::{
    classify_authority_response, protected_handler, AuthorityClient, AuthorityError,
    AuthorityRequest, AuthorityResult, AuthorizationDenial, ProtectedHandler,
};
use crate::proof::{
    attach_proof, extract_proof, strip_proof, Arguments, AuthorizationProof, SessionContext,
};
use crate::response::{normalize, ToolResponse};
use crate::tier::Tier;
use crate::tool::{DynTool, ToolError};

/// Gateway operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Gated tools go through the authority.
    #[default]
    Normal,

    /// Every tool runs without authorization. For offline demos only.
    DemoBypass,
}

/// How a completed call was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Demo mode skipped authorization.
    Bypassed,
    /// Tier 0; the authority was never consulted.
    Free,
    /// The authority approved the call.
    Approved,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Bypassed => write!(f, "bypassed"),
            Disposition::Free => write!(f, "free"),
            Disposition::Approved => write!(f, "approved"),
        }
    }
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub disposition: Disposition,
    pub response: ToolResponse,
}

/// A gated call as received by the gateway, before it is handed to the authority.
#[derive(Debug, Clone)]
pub struct CallEnvelope {
    pub name: String,
    pub arguments: Arguments,
    pub session: Option<SessionContext>,
}

impl CallEnvelope {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
            session: None,
        }
    }

    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    /// The proof this call carries, argument field first.
    pub fn proof(&self) -> Option<AuthorizationProof> {
        extract_proof(&self.arguments, self.session.as_ref())
    }

    /// The request the authority sees.
    ///
    /// A session proof is copied into the arguments when they carry none, so
    /// the authority always finds the proof under the reserved field.
    pub fn into_authority_request(self) -> AuthorityRequest {
        let session_proof = self.session.as_ref().and_then(SessionContext::proof).cloned();
        let arguments = match (self.proof(), session_proof) {
            (Some(_), Some(proof)) => attach_proof(self.arguments, proof),
            _ => self.arguments,
        };
        AuthorityRequest::tool_call(self.name, arguments)
    }
}

/// Errors produced by the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The authority refused the call.
    #[error("{}", .0.message)]
    Unauthorized(AuthorizationDenial),

    /// The authority answered with a shape that is neither content nor an error.
    #[error("unexpected response from authorization authority")]
    UnexpectedAuthorityResponse { tool: String, raw: Value },

    /// The authority could not be reached.
    #[error("authorization authority error: {0}")]
    Authority(String),

    /// The tool itself failed.
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl GatewayError {
    /// Returns true if the authority denied the call
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Returns true if the authority replied with an unrecognized shape
    pub fn is_unexpected_response(&self) -> bool {
        matches!(self, Self::UnexpectedAuthorityResponse { .. })
    }

    /// Returns true if this is a tool failure
    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Tool(_))
    }

    /// Denials are final; a caller must acquire the token before retrying.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Routes tool calls through the authority according to their tier.
#[derive(Clone)]
pub struct AuthorizationGateway {
    authority: Arc<dyn AuthorityClient>,
    mode: Mode,
}

impl AuthorizationGateway {
    pub fn new(authority: impl AuthorityClient + 'static) -> Self {
        Self::from_arc(Arc::new(authority))
    }

    pub fn from_arc(authority: Arc<dyn AuthorityClient>) -> Self {
        Self {
            authority,
            mode: Mode::default(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Run `tool` at `tier` with `arguments`.
    pub async fn dispatch(
        &self,
        tool: Arc<dyn DynTool>,
        tier: Tier,
        arguments: Arguments,
        session: Option<&SessionContext>,
    ) -> Result<Dispatch, GatewayError> {
        let span = tracing::info_span!("dispatch", tool = tool.name(), tier = tier.token_id());
        self.dispatch_inner(tool, tier, arguments, session)
            .instrument(span)
            .await
    }

    async fn dispatch_inner(
        &self,
        tool: Arc<dyn DynTool>,
        tier: Tier,
        arguments: Arguments,
        session: Option<&SessionContext>,
    ) -> Result<Dispatch, GatewayError> {
        if self.mode == Mode::DemoBypass {
            tracing::warn!(bypass = true, "demo mode: skipping authorization");
            let result = tool.execute_raw(Value::Object(strip_proof(&arguments))).await?;
            return Ok(Dispatch {
                disposition: Disposition::Bypassed,
                response: normalize(result),
            });
        }

        if !tier.is_gated() {
            tracing::debug!("free tool, invoking directly");
            let result = tool.execute_raw(Value::Object(arguments)).await?;
            return Ok(Dispatch {
                disposition: Disposition::Free,
                response: normalize(result),
            });
        }

        let mut envelope = CallEnvelope::new(tool.name(), arguments);
        if let Some(session) = session {
            envelope = envelope.with_session(session.clone());
        }

        let name = envelope.name.clone();
        let request = envelope.into_authority_request();
        let handler = tool_handler(Arc::clone(&tool));

        let raw = self
            .authority
            .protect(tier, request, handler)
            .await
            .map_err(|e| match e {
                AuthorityError::Handler(tool_err) => GatewayError::Tool(tool_err),
                AuthorityError::Transport(msg) => {
                    tracing::error!(error = %msg, "authorization authority unavailable");
                    GatewayError::Authority(msg)
                }
            })?;

        match classify_authority_response(raw) {
            AuthorityResult::Approved(text) => {
                tracing::info!("authorized");
                Ok(Dispatch {
                    disposition: Disposition::Approved,
                    response: ToolResponse::text(text),
                })
            }
            AuthorityResult::Denied(denial) => {
                tracing::info!(reason = %denial.message, "authorization denied");
                Err(GatewayError::Unauthorized(denial))
            }
            AuthorityResult::Malformed(raw) => {
                tracing::error!(response = %raw, "unexpected authority response");
                Err(GatewayError::UnexpectedAuthorityResponse { tool: name, raw })
            }
        }
    }
}

/// Adapter the authority runs on approval. The tool never sees the proof.
fn tool_handler(tool: Arc<dyn DynTool>) -> ProtectedHandler {
    protected_handler(move |request: AuthorityRequest| async move {
        let clean = strip_proof(request.arguments());
        let result = tool.execute_raw(Value::Object(clean)).await?;
        Ok::<_, ToolError>(normalize(result))
    })
}
