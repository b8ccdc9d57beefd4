//! # webacy-mcp-core
//!
//! Tier-gated tool dispatch for Model Context Protocol servers.
//!
//! Each tool is registered with an access [`Tier`]. Free tools run directly;
//! every other call is handed to an [`AuthorityClient`] together with the
//! caller's EVMAuth proof, and the authority decides whether the tool runs.
//!
//! ## Defining Tools
//!
//! Implement the [`Tool`] trait with a typed input:
//!
//! ```rust
//! use webacy_mcp_core::{Tool, ToolError, ToolResult};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct SanctionInput {
//!     /// Wallet address to check
//!     #[serde(rename = "walletAddress")]
//!     wallet_address: String,
//! }
//!
//! struct SanctionCheck;
//!
//! impl Tool for SanctionCheck {
//!     type Input = SanctionInput;
//!
//!     fn name(&self) -> &str { "checkSanctionStatus" }
//!     fn description(&self) -> &str { "Check whether a wallet is sanctioned" }
//!
//!     async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
//!         Ok(ToolResult::text(format!("{} is clean", input.wallet_address)))
//!     }
//! }
//! ```
//!
//! ## Registering and Dispatching
//!
//! ```ignore
//! use webacy_mcp_core::{box_tools, AuthorizationGateway, Tier, TierPolicy, ToolRegistry};
//!
//! let policy = TierPolicy::from_table([("checkSanctionStatus", Tier::Basic)]);
//! let registry = ToolRegistry::builder(policy)
//!     .add_tools(box_tools![SanctionCheck])
//!     .build()?;
//!
//! let gateway = AuthorizationGateway::new(my_authority);
//! let entry = registry.lookup("checkSanctionStatus")?;
//! let dispatch = gateway
//!     .dispatch(entry.tool(), entry.tier(), arguments, None)
//!     .await?;
//! ```
//!
//! ## Feature Flags
//!
//! - `test-utils` - Mock authority and recording tool for tests

pub mod authority;
pub mod gateway;
pub mod proof;
pub mod registry;
pub mod response;
pub mod schema;
pub mod tier;
pub mod tool;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use authority::{
    classify_authority_response, protected_handler, AuthorityClient, AuthorityError,
    AuthorityRequest, AuthorityRequestParams, AuthorityResult, AuthorizationDenial, NoAuthority,
    ProtectedHandler,
};
pub use gateway::{AuthorizationGateway, CallEnvelope, Disposition, Dispatch, GatewayError, Mode};
pub use proof::{
    attach_proof, extract_proof, strip_proof, Arguments, AuthorizationProof, SessionContext,
    PROOF_FIELD, PROOF_HEADER,
};
pub use registry::{RegistryError, ToolDescriptor, ToolEntry, ToolRegistry, ToolRegistryBuilder};
pub use response::{normalize, ContentItem, ToolResponse};
pub use schema::{augment_description, augment_schema, InputSchema, PROOF_FIELD_DESCRIPTION};
pub use tier::{Tier, TierPolicy, UnknownTier};
pub use tool::{box_tool, DynTool, Tool, ToolError, ToolResult};
