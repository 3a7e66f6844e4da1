//! Schema normalizer: reshape a reasoning-service payload into flat records.
//!
//! Services return authors in several envelopes. The payload is classified
//! into a `ResponseShape` and each shape has one extraction rule:
//!
//! ```text
//! [ {...}, ... ]                 → List                  → as-is
//! { "authors": [...] , ... }     → MappingWithAuthorsKey → value of "authors"
//! { "data": [...] , ... }        → MappingWithDataKey    → value of "data"
//! { "<anything>": [...] , ... }  → MappingOther          → first value
//! ```
//!
//! `MappingOther` depends on key order (document order, via serde_json's
//! `preserve_order`). It can pick the wrong key if a future response puts a
//! non-author list first. This is accepted and not hardened further.

use serde_json::{Map, Value};

use super::StructuringError;

/// A record as emitted by the service: field name → JSON value.
pub type RecordMapping = Map<String, Value>;

/// Recognized top-level payload shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    List(Vec<Value>),
    MappingWithAuthorsKey(Value),
    MappingWithDataKey(Value),
    MappingOther(Option<Value>),
}

impl ResponseShape {
    /// Classify a parsed payload. Scalars are not a recognized shape.
    pub fn classify(value: Value) -> Result<Self, StructuringError> {
        match value {
            Value::Array(items) => Ok(Self::List(items)),
            Value::Object(mut map) => {
                if let Some(authors) = map.remove("authors") {
                    Ok(Self::MappingWithAuthorsKey(authors))
                } else if let Some(data) = map.remove("data") {
                    Ok(Self::MappingWithDataKey(data))
                } else {
                    Ok(Self::MappingOther(map.into_iter().next().map(|(_, v)| v)))
                }
            }
            other => Err(StructuringError::UnrecognizedShape(format!(
                "top-level {} is neither a list nor a mapping",
                json_kind(&other)
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::MappingWithAuthorsKey(_) => "mapping_with_authors_key",
            Self::MappingWithDataKey(_) => "mapping_with_data_key",
            Self::MappingOther(_) => "mapping_other",
        }
    }

    /// Apply the shape's extraction rule. The resolved value must be a list.
    pub fn into_items(self) -> Result<Vec<Value>, StructuringError> {
        let shape = self.name();
        let resolved = match self {
            Self::List(items) => return Ok(items),
            Self::MappingWithAuthorsKey(v) | Self::MappingWithDataKey(v) => v,
            Self::MappingOther(Some(v)) => v,
            Self::MappingOther(None) => {
                return Err(StructuringError::UnrecognizedShape(
                    "empty mapping has no value to use".into(),
                ))
            }
        };

        match resolved {
            Value::Array(items) => Ok(items),
            other => Err(StructuringError::UnrecognizedShape(format!(
                "{shape} resolved to {} instead of a list",
                json_kind(&other)
            ))),
        }
    }
}

/// Parse and normalize a raw JSON payload into ordered record mappings.
///
/// Elements that are not objects are skipped. Missing fields are fine; the
/// sink treats them as null.
pub fn normalize(raw_json: &str) -> Result<Vec<RecordMapping>, StructuringError> {
    let value: Value = serde_json::from_str(raw_json)
        .map_err(|e| StructuringError::JsonParsing(e.to_string()))?;
    normalize_value(value)
}

/// Same as `normalize`, for an already-parsed value.
pub fn normalize_value(value: Value) -> Result<Vec<RecordMapping>, StructuringError> {
    let shape = ResponseShape::classify(value)?;
    tracing::debug!(shape = shape.name(), "Normalizing response payload");

    let records = shape
        .into_items()?
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            other => {
                tracing::debug!(kind = json_kind(&other), "Skipping non-object list element");
                None
            }
        })
        .collect();

    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
