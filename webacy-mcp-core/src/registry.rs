//! Tool registry: the tools a server exposes, each paired with its tier.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::schema::{augment_description, augment_schema, InputSchema};
use crate::tier::{Tier, TierPolicy};
use crate::tool::DynTool;

/// Errors raised while assembling or querying the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("tool '{0}' is registered more than once")]
    DuplicateTool(String),

    /// Every registered tool must have an entry in the tier table.
    #[error("tool '{0}' has no tier assigned")]
    MissingTier(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl RegistryError {
    pub fn is_unknown_tool(&self) -> bool {
        matches!(self, Self::UnknownTool(_))
    }
}

/// What `tools/list` reports for one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

/// A registered tool and its required tier.
#[derive(Clone)]
pub struct ToolEntry {
    tool: Arc<dyn DynTool>,
    tier: Tier,
}

impl std::fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.tool.name())
            .field("tier", &self.tier)
            .finish()
    }
}

impl ToolEntry {
    pub fn new(tool: Arc<dyn DynTool>, tier: Tier) -> Self {
        Self { tool, tier }
    }

    pub fn name(&self) -> &str {
        self.tool.name()
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn tool(&self) -> Arc<dyn DynTool> {
        Arc::clone(&self.tool)
    }

    /// The tool's own description, without tier remediation text.
    pub fn base_description(&self) -> &str {
        self.tool.description()
    }

    /// The advertised description.
    pub fn description(&self) -> String {
        augment_description(self.tool.description(), self.tier)
    }

    /// The advertised input schema, including the proof field when gated.
    pub fn input_schema(&self) -> InputSchema {
        augment_schema(&self.tool.input_schema(), self.tier)
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

/// Immutable set of tools, in registration order.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
    index: HashMap<String, usize>,
    policy: TierPolicy,
}

impl ToolRegistry {
    pub fn builder(policy: TierPolicy) -> ToolRegistryBuilder {
        ToolRegistryBuilder {
            policy,
            tools: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Look up a tool, failing with [`RegistryError::UnknownTool`].
    pub fn lookup(&self, name: &str) -> Result<&ToolEntry, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    /// Tier of a registered tool. Policy entries without a tool don't count.
    pub fn required_tier(&self, name: &str) -> Result<Tier, RegistryError> {
        self.lookup(name).map(ToolEntry::tier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolEntry> {
        self.entries.iter()
    }

    /// Descriptors for every tool, in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(ToolEntry::descriptor).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }
}

/// Builder for [`ToolRegistry`].
pub struct ToolRegistryBuilder {
    policy: TierPolicy,
    tools: Vec<Arc<dyn DynTool>>,
}

impl ToolRegistryBuilder {
    pub fn add_tool(mut self, tool: Box<dyn DynTool>) -> Self {
        self.tools.push(Arc::from(tool));
        self
    }

    pub fn add_tools(mut self, tools: Vec<Box<dyn DynTool>>) -> Self {
        self.tools.extend(tools.into_iter().map(Arc::from));
        self
    }

    /// Finalize the registry.
    ///
    /// Fails when a name is registered twice or a tool has no tier.
    pub fn build(self) -> Result<ToolRegistry, RegistryError> {
        let mut entries = Vec::with_capacity(self.tools.len());
        let mut index = HashMap::with_capacity(self.tools.len());

        for tool in self.tools {
            let name = tool.name().to_string();
            if index.contains_key(&name) {
                return Err(RegistryError::DuplicateTool(name));
            }
            let tier = self
                .policy
                .get(&name)
                .ok_or_else(|| RegistryError::MissingTier(name.clone()))?;
            index.insert(name, entries.len());
            entries.push(ToolEntry::new(tool, tier));
        }

        Ok(ToolRegistry {
            entries,
            index,
            policy: self.policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::PROOF_FIELD;
    use crate::tool::{box_tool, Tool, ToolError, ToolResult};
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct WalletInput {
        /// The wallet address
        #[serde(rename = "walletAddress")]
        wallet_address: String,
    }

    struct Named(&'static str);

    impl Tool for Named {
        type Input = WalletInput;

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Check a wallet"
        }

        async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
            Ok(input.wallet_address.into())
        }
    }

    fn policy() -> TierPolicy {
        TierPolicy::from_table([("free", Tier::Free), ("basic", Tier::Basic)])
    }

    #[test]
    fn test_build_preserves_order() {
        let registry = ToolRegistry::builder(policy())
            .add_tool(box_tool(Named("basic")))
            .add_tool(box_tool(Named("free")))
            .build()
            .unwrap();

        let names: Vec<&str> = registry.iter().map(ToolEntry::name).collect();
        assert_eq!(names, vec!["basic", "free"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = ToolRegistry::builder(policy())
            .add_tools(vec![box_tool(Named("free")), box_tool(Named("free"))])
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("free".to_string()));
    }

    #[test]
    fn test_missing_tier_rejected() {
        let err = ToolRegistry::builder(policy())
            .add_tool(box_tool(Named("mystery")))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::MissingTier("mystery".to_string()));
    }

    #[test]
    fn test_descriptors_are_augmented_for_gated_tools() {
        let registry = ToolRegistry::builder(policy())
            .add_tool(box_tool(Named("free")))
            .add_tool(box_tool(Named("basic")))
            .build()
            .unwrap();

        let free = registry.get("free").unwrap().descriptor();
        assert_eq!(free.description, "Check a wallet");
        assert!(!free.input_schema.has_property(PROOF_FIELD));

        let basic = registry.get("basic").unwrap().descriptor();
        assert!(basic.description.contains("Requires EVMAuth Token #1"));
        assert!(basic.input_schema.has_property(PROOF_FIELD));
        assert!(basic.input_schema.has_property("walletAddress"));
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let registry = ToolRegistry::builder(policy())
            .add_tool(box_tool(Named("free")))
            .build()
            .unwrap();
        let value = serde_json::to_value(registry.descriptors()).unwrap();
        assert_eq!(value[0]["name"], "free");
        assert!(value[0]["inputSchema"].is_object());
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = ToolRegistry::builder(policy()).build().unwrap();
        assert!(registry.is_empty());
        assert!(registry.lookup("nope").unwrap_err().is_unknown_tool());
        assert!(registry.required_tier("nope").is_err());
    }

    #[test]
    fn test_required_tier_needs_registered_tool() {
        let registry = ToolRegistry::builder(policy().with_tier("ghost", Tier::Pro))
            .add_tool(box_tool(Named("basic")))
            .build()
            .unwrap();

        assert_eq!(registry.required_tier("basic").unwrap(), Tier::Basic);
        let err = registry.required_tier("ghost").unwrap_err();
        assert_eq!(err, RegistryError::UnknownTool("ghost".to_string()));
    }
}
