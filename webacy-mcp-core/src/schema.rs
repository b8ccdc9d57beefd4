//! Advertised input schemas and the proof-field augmentation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::proof::PROOF_FIELD;
use crate::tier::Tier;

/// Description attached to the proof field in augmented schemas.
pub const PROOF_FIELD_DESCRIPTION: &str = "Authentication proof (automatically provided)";

/// A JSON schema describing a tool's accepted arguments.
///
/// Values are immutable: every builder method returns a new schema and
/// leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputSchema(Value);

impl InputSchema {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// An object schema with no properties.
    pub fn empty_object() -> Self {
        Self(serde_json::json!({"type": "object", "properties": {}}))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn properties(&self) -> Option<&Map<String, Value>> {
        self.0.get("properties").and_then(Value::as_object)
    }

    /// Get a declared property by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties().and_then(|props| props.get(name))
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Whether `name` appears in the schema's `required` list.
    pub fn is_required(&self, name: &str) -> bool {
        self.0
            .get("required")
            .and_then(Value::as_array)
            .is_some_and(|required| required.iter().any(|r| r.as_str() == Some(name)))
    }

    /// Return a copy of this schema with one extra optional property.
    ///
    /// `field_schema` is the property's own schema (`{}` accepts any value);
    /// `description` is merged into it. If the property already exists the
    /// schema is returned unchanged. A non-object base is replaced by an
    /// object schema holding just the new property.
    pub fn with_optional_field(
        &self,
        name: &str,
        field_schema: Value,
        description: &str,
    ) -> InputSchema {
        if self.has_property(name) {
            return self.clone();
        }

        let mut field = match field_schema {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        field.insert(
            "description".to_string(),
            Value::String(description.to_string()),
        );

        let mut root = match &self.0 {
            Value::Object(map) => map.clone(),
            _ => {
                let mut map = Map::new();
                map.insert("type".to_string(), Value::String("object".to_string()));
                map
            }
        };

        let properties = root
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        if !properties.is_object() {
            *properties = Value::Object(Map::new());
        }
        if let Value::Object(props) = properties {
            props.insert(name.to_string(), Value::Object(field));
        }

        InputSchema(Value::Object(root))
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl From<Value> for InputSchema {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The schema a caller should see for a tool at `tier`.
///
/// Free tools keep their declared schema; every gated tool gains the
/// optional `__evmauth` proof field.
pub fn augment_schema(base: &InputSchema, tier: Tier) -> InputSchema {
    if !tier.is_gated() {
        return base.clone();
    }
    base.with_optional_field(
        PROOF_FIELD,
        Value::Object(Map::new()),
        PROOF_FIELD_DESCRIPTION,
    )
}

/// The description a caller should see for a tool at `tier`.
///
/// Gated tools spell out the remediation flow so clients call the tool
/// first and acquire the token only after a denial.
pub fn augment_description(description: &str, tier: Tier) -> String {
    if !tier.is_gated() {
        return description.to_string();
    }
    format!(
        "{} Requires EVMAuth Token #{}. IMPORTANT: Call this tool directly without checking wallet first! \
         If you lack authentication, you'll receive clear error instructions. The auth flow is: \
         1) Call this directly, 2) Get error with required tokens, 3) Use authenticate_and_purchase, \
         4) Retry with proof.",
        description,
        tier.token_id()
    )
}
