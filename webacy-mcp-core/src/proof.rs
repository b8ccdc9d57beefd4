//! Authorization proof extraction.
//!
//! A caller proves token ownership by attaching a proof to the call, either
//! inside the tool arguments under [`PROOF_FIELD`] or once per session via
//! the [`PROOF_HEADER`] HTTP header. The gateway never verifies a proof; it
//! only locates it and forwards it to the authority.

use serde_json::{Map, Value};

/// Reserved argument key carrying the proof.
pub const PROOF_FIELD: &str = "__evmauth";

/// HTTP header carrying a session-level proof.
pub const PROOF_HEADER: &str = "x-evmauth";

/// Tool arguments as received from the client.
pub type Arguments = Map<String, Value>;

/// An opaque authorization proof.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorizationProof {
    /// Structured proof (object, or a string that parsed as JSON).
    Structured(Value),

    /// A string that wasn't valid JSON, forwarded as-is.
    Unparsed(String),
}

impl AuthorizationProof {
    /// Interpret a raw proof value.
    ///
    /// `null` means no proof. Strings are parsed as JSON when possible;
    /// a string that fails to parse is kept verbatim and the authority
    /// decides what to do with it.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(parsed) => Some(Self::Structured(parsed)),
                Err(e) => {
                    tracing::warn!(error = %e, "proof string is not valid JSON, forwarding as-is");
                    Some(Self::Unparsed(raw.clone()))
                }
            },
            other => Some(Self::Structured(other.clone())),
        }
    }

    /// The proof's `signature` field, when present.
    pub fn signature(&self) -> Option<&str> {
        match self {
            Self::Structured(value) => value.get("signature").and_then(Value::as_str),
            Self::Unparsed(_) => None,
        }
    }

    /// Length of the signature, for logging without leaking the value.
    pub fn signature_len(&self) -> usize {
        self.signature().map(str::len).unwrap_or(0)
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// The proof as it should be forwarded.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Structured(value) => value.clone(),
            Self::Unparsed(raw) => Value::String(raw.clone()),
        }
    }
}

/// Per-connection context supplied by the transport.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    proof: Option<Value>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proof(mut self, proof: Value) -> Self {
        self.proof = Some(proof);
        self
    }

    pub fn proof(&self) -> Option<&Value> {
        self.proof.as_ref()
    }

    /// Build a context from a raw header value. Empty headers carry no proof.
    pub fn from_header(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => Self::new().with_proof(Value::String(raw.to_string())),
            _ => Self::new(),
        }
    }
}

/// Locate the proof for a call.
///
/// The argument field wins over the session proof. Never fails: malformed
/// input yields either `None` or an [`AuthorizationProof::Unparsed`].
pub fn extract_proof(
    arguments: &Arguments,
    session: Option<&SessionContext>,
) -> Option<AuthorizationProof> {
    let from_args = arguments.get(PROOF_FIELD).and_then(AuthorizationProof::from_value);
    let (proof, source) = match from_args {
        Some(proof) => (Some(proof), "arguments"),
        None => (
            session
                .and_then(SessionContext::proof)
                .and_then(AuthorizationProof::from_value),
            "session",
        ),
    };

    match &proof {
        Some(p) => tracing::debug!(
            source,
            parsed = p.is_parsed(),
            signature_len = p.signature_len(),
            "authorization proof present"
        ),
        None => tracing::debug!("no authorization proof supplied"),
    }

    proof
}

/// Copy of `arguments` without the proof field.
pub fn strip_proof(arguments: &Arguments) -> Arguments {
    let mut stripped = arguments.clone();
    stripped.remove(PROOF_FIELD);
    stripped
}

/// Insert `proof` under the proof field unless the arguments already carry one.
pub fn attach_proof(mut arguments: Arguments, proof: Value) -> Arguments {
    if !arguments.contains_key(PROOF_FIELD) || arguments[PROOF_FIELD].is_null() {
        arguments.insert(PROOF_FIELD.to_string(), proof);
    }
    arguments
}
