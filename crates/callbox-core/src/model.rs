//! Callback payload validation and the persisted record type.
//!
//! Two payload shapes are accepted, behind one small strategy trait:
//!
//! - [`StrictModel`] requires the structured shape the producer sends
//!   (`agent_answer` plus optional session/turn/metadata fields, extra
//!   fields preserved verbatim);
//! - [`PermissiveModel`] accepts any syntactically valid JSON document.
//!
//! Both yield the `serde_json::Value` that gets persisted; neither touches
//! the store or the sink, so a validation failure persists nothing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Snapshot of request headers captured by the permissive variant.
///
/// Names are lowercased (the HTTP layer normalizes them); a `BTreeMap`
/// keeps the serialized form deterministic.
pub type HeaderSnapshot = BTreeMap<String, String>;

// ============================================================================
// Persisted Record
// ============================================================================

/// The unit of persisted state: one received callback.
///
/// Created exclusively by [`CallbackStore::append`](crate::store::CallbackStore::append),
/// immutable afterwards. The same serialized form is returned by the read
/// endpoints and written as one line of the durable log, so the log file
/// mirrors the in-memory store field-for-field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackRecord {
    /// 1-based position in the store; gapless and strictly increasing.
    /// Client-visible as `callback_id`.
    pub sequence_id: u64,
    /// Receive timestamp, captured once at append time and never recomputed.
    pub received_at: DateTime<Utc>,
    /// Whether the request supplied an `X-API-Key` header.
    pub api_key_provided: bool,
    /// The accepted payload (validated object or arbitrary JSON).
    pub payload: Value,
    /// Request headers, captured only by the permissive ingestion variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderSnapshot>,
}

/// Fields of a record supplied by the ingestion handler; the store fills in
/// `sequence_id` and `received_at` at append time.
#[derive(Debug, Clone)]
pub struct CallbackDraft {
    /// Whether the request supplied an `X-API-Key` header.
    pub api_key_provided: bool,
    /// The validated payload to persist.
    pub payload: Value,
    /// Header snapshot, if the accepting variant captures one.
    pub headers: Option<HeaderSnapshot>,
}

// ============================================================================
// Strict Payload
// ============================================================================

/// The structured callback shape accepted by the strict ingestion route.
///
/// Serializing always emits every declared field (`null` for absent
/// optionals) followed by any unrecognized fields verbatim, matching what
/// the read endpoints and log file expose for strict callbacks.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackPayload {
    /// Agent reply text. Required; an empty string is accepted.
    pub agent_answer: String,
    /// Opaque session correlation id.
    pub session_id: Option<String>,
    /// Opaque turn tag within the session.
    pub turn_id: Option<String>,
    /// Free-form string-keyed metadata.
    pub metadata: Option<Map<String, Value>>,
    /// Unrecognized fields, preserved verbatim (open schema).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CallbackPayload {
    /// Validates a parsed JSON document against the strict shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaViolation`] naming the offending field when
    /// the document is not an object, `agent_answer` is missing or not a
    /// string, an optional string field holds a non-string, or `metadata`
    /// holds a non-object. `null` is accepted for every optional field.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            return Err(Error::schema_violation("body", "expected a JSON object"));
        };

        let agent_answer = match fields.remove("agent_answer") {
            Some(Value::String(text)) => text,
            Some(other) => {
                return Err(Error::schema_violation(
                    "agent_answer",
                    format!("expected a string, got {}", json_type_name(&other)),
                ));
            }
            None => {
                return Err(Error::schema_violation("agent_answer", "field is required"));
            }
        };

        let session_id = optional_string(&mut fields, "session_id")?;
        let turn_id = optional_string(&mut fields, "turn_id")?;

        let metadata = match fields.remove("metadata") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(other) => {
                return Err(Error::schema_violation(
                    "metadata",
                    format!("expected an object, got {}", json_type_name(&other)),
                ));
            }
        };

        Ok(Self {
            agent_answer,
            session_id,
            turn_id,
            metadata,
            extra: fields,
        })
    }

    /// Serializes the payload into the `Value` that gets persisted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if JSON conversion fails (should not
    /// happen for this shape).
    pub fn into_value(self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn optional_string(
    fields: &mut Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>> {
    match fields.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(other) => Err(Error::schema_violation(
            name,
            format!("expected a string, got {}", json_type_name(&other)),
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// Validation Strategy
// ============================================================================

/// Validation strategy for inbound callback bodies.
///
/// Both ingestion routes share one handler pipeline parameterized by this
/// trait, so auth, append, sink, and logging logic exist exactly once.
pub trait PayloadModel: Send + Sync {
    /// Short name used in logs and spans (`"strict"` / `"permissive"`).
    fn name(&self) -> &'static str;

    /// Parses and validates a raw request body, returning the payload
    /// `Value` to persist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedJson`] when the body is not valid JSON and
    /// [`Error::SchemaViolation`] when it is valid JSON of the wrong shape.
    fn validate(&self, raw: &[u8]) -> Result<Value>;

    /// Whether the accepting route should capture a request-header snapshot
    /// onto the record.
    fn capture_headers(&self) -> bool {
        false
    }
}

/// Strict validation: the body must be a JSON object with a string
/// `agent_answer`; see [`CallbackPayload`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictModel;

impl PayloadModel for StrictModel {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn validate(&self, raw: &[u8]) -> Result<Value> {
        let value = parse_json(raw)?;
        CallbackPayload::from_value(value)?.into_value()
    }
}

/// Permissive validation: any syntactically valid JSON document is accepted
/// verbatim, and the accepting route captures the request headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveModel;

impl PayloadModel for PermissiveModel {
    fn name(&self) -> &'static str {
        "permissive"
    }

    fn validate(&self, raw: &[u8]) -> Result<Value> {
        parse_json(raw)
    }

    fn capture_headers(&self) -> bool {
        true
    }
}

fn parse_json(raw: &[u8]) -> Result<Value> {
    serde_json::from_slice(raw).map_err(|e| Error::MalformedJson {
        message: e.to_string(),
    })
}
