//! Access tiers and the static tool → tier table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::RegistryError;

/// Access tier required to call a tool.
///
/// The numeric value doubles as the EVMAuth token id a caller must hold.
/// Only the four listed values exist; [`Tier::Free`] disables gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum Tier {
    Free,
    Basic,
    Premium,
    Pro,
}

/// Error returned when an integer is not one of the known tier ids.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier id {0} (expected one of 0, 1, 3, 5)")]
pub struct UnknownTier(pub u64);

impl Tier {
    /// Every tier, lowest first.
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Basic, Tier::Premium, Tier::Pro];

    /// The EVMAuth token id for this tier.
    pub fn token_id(self) -> u64 {
        match self {
            Tier::Free => 0,
            Tier::Basic => 1,
            Tier::Premium => 3,
            Tier::Pro => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::Basic => "Basic",
            Tier::Premium => "Premium",
            Tier::Pro => "Pro",
        }
    }

    /// Whether calls at this tier go through the authority.
    pub fn is_gated(self) -> bool {
        self != Tier::Free
    }
}

impl TryFrom<u64> for Tier {
    type Error = UnknownTier;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Tier::Free),
            1 => Ok(Tier::Basic),
            3 => Ok(Tier::Premium),
            5 => Ok(Tier::Pro),
            other => Err(UnknownTier(other)),
        }
    }
}

impl From<Tier> for u64 {
    fn from(tier: Tier) -> Self {
        tier.token_id()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Token {})", self.label(), self.token_id())
    }
}

/// Mapping from tool name to its required tier.
///
/// Built once at startup from a static table and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TierPolicy {
    tiers: HashMap<String, Tier>,
}

impl TierPolicy {
    /// Create an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a policy from `(tool name, tier)` pairs.
    ///
    /// ```
    /// use webacy_mcp_core::{Tier, TierPolicy};
    ///
    /// let policy = TierPolicy::from_table([("ping", Tier::Free), ("analyzeUrl", Tier::Pro)]);
    /// assert_eq!(policy.required_tier("analyzeUrl").unwrap(), Tier::Pro);
    /// assert!(policy.required_tier("unknown").is_err());
    /// ```
    pub fn from_table<I, S>(table: I) -> Self
    where
        I: IntoIterator<Item = (S, Tier)>,
        S: Into<String>,
    {
        Self {
            tiers: table.into_iter().map(|(name, tier)| (name.into(), tier)).collect(),
        }
    }

    /// Add or replace the tier for a tool.
    pub fn with_tier(mut self, tool: impl Into<String>, tier: Tier) -> Self {
        self.tiers.insert(tool.into(), tier);
        self
    }

    /// Required tier for a tool, failing for names the policy doesn't know.
    pub fn required_tier(&self, tool: &str) -> Result<Tier, RegistryError> {
        self.get(tool)
            .ok_or_else(|| RegistryError::UnknownTool(tool.to_string()))
    }

    pub fn get(&self, tool: &str) -> Option<Tier> {
        self.tiers.get(tool).copied()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Tools grouped by tier, lowest tier first, names sorted.
    ///
    /// Tiers with no tools are included with an empty list so the startup
    /// banner always shows the full ladder.
    pub fn summary(&self) -> Vec<(Tier, Vec<String>)> {
        let mut grouped: BTreeMap<Tier, Vec<String>> =
            Tier::ALL.iter().map(|tier| (*tier, Vec::new())).collect();
        for (name, tier) in &self.tiers {
            grouped.entry(*tier).or_default().push(name.clone());
        }
        grouped
            .into_iter()
            .map(|(tier, mut names)| {
                names.sort();
                (tier, names)
            })
            .collect()
    }
}
