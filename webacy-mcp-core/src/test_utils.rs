//! Test utilities for webacy-mcp-core.
//!
//! Mock collaborators for exercising the gateway without a real
//! authorization authority or upstream API.
//!
//! Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! webacy-mcp-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use webacy_mcp_core::test_utils::{MockAuthority, RecordingTool};
//! use webacy_mcp_core::{Arguments, AuthorizationGateway, Tier};
//!
//! # tokio_test::block_on(async {
//! let authority = MockAuthority::approving();
//! let gateway = AuthorizationGateway::new(authority.clone());
//! let tool = RecordingTool::new("checkSanctionStatus", "clean");
//!
//! let dispatch = gateway
//!     .dispatch(tool.as_dyn(), Tier::Basic, Arguments::new(), None)
//!     .await
//!     .unwrap();
//! assert_eq!(dispatch.response.first_text(), Some("clean"));
//! assert_eq!(authority.call_count(), 1);
//! # });
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::authority::{AuthorityClient, AuthorityError, AuthorityRequest, ProtectedHandler};
use crate::schema::InputSchema;
use crate::tier::Tier;
use crate::tool::{DynTool, ToolError, ToolResult};

/// What a [`MockAuthority`] does with each call.
#[derive(Debug, Clone)]
pub enum MockDecision {
    /// Run the handler and return its envelope.
    Approve,
    /// Reply with a denial envelope carrying this `error` value.
    Deny(Value),
    /// Reply with this raw value, handler not run.
    Reply(Value),
    /// Fail as if the authority were unreachable.
    Unavailable(String),
}

/// A scripted authorization authority that records every request.
#[derive(Clone)]
pub struct MockAuthority {
    decision: MockDecision,
    requests: Arc<Mutex<Vec<(Tier, AuthorityRequest)>>>,
}

impl MockAuthority {
    pub fn new(decision: MockDecision) -> Self {
        Self {
            decision,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Approve every call.
    pub fn approving() -> Self {
        Self::new(MockDecision::Approve)
    }

    /// Deny every call with `message`.
    pub fn denying(message: impl Into<String>) -> Self {
        Self::new(MockDecision::Deny(Value::String(message.into())))
    }

    /// Answer every call with `reply` verbatim.
    pub fn replying(reply: Value) -> Self {
        Self::new(MockDecision::Reply(reply))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(MockDecision::Unavailable(reason.into()))
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every `(tier, request)` received, oldest first.
    pub fn requests(&self) -> Vec<(Tier, AuthorityRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthorityClient for MockAuthority {
    async fn protect(
        &self,
        tier: Tier,
        request: AuthorityRequest,
        handler: ProtectedHandler,
    ) -> Result<Value, AuthorityError> {
        self.requests.lock().unwrap().push((tier, request.clone()));

        match &self.decision {
            MockDecision::Approve => {
                let response = handler(request).await?;
                Ok(response.to_value())
            }
            MockDecision::Deny(error) => {
                let text = json!({ "error": error }).to_string();
                Ok(json!({"content": [{"type": "text", "text": text}]}))
            }
            MockDecision::Reply(raw) => Ok(raw.clone()),
            MockDecision::Unavailable(reason) => Err(AuthorityError::Transport(reason.clone())),
        }
    }
}

/// A tool that returns a canned reply and records the arguments it saw.
#[derive(Clone)]
pub struct RecordingTool {
    name: String,
    reply: Result<String, String>,
    calls: Arc<Mutex<Vec<Value>>>,
}

impl RecordingTool {
    pub fn new(name: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reply: Ok(reply.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A tool that always fails with an upstream error.
    pub fn failing(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reply: Err(error.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A shared handle that records into this tool.
    pub fn as_dyn(&self) -> Arc<dyn DynTool> {
        Arc::new(self.clone())
    }

    pub fn boxed(&self) -> Box<dyn DynTool> {
        Box::new(self.clone())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Arguments of every invocation, oldest first.
    pub fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }
}

impl DynTool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Recording test tool"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::empty_object()
    }

    fn execute_raw(
        &self,
        input: Value,
    ) -> Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + '_>> {
        self.calls.lock().unwrap().push(input);
        let reply = self.reply.clone();
        Box::pin(async move {
            reply
                .map(ToolResult::Text)
                .map_err(ToolError::Upstream)
        })
    }
}
