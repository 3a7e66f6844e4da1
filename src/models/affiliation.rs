use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::pipeline_config::{AUTHOR_NAME, COUNTRY, DEPARTMENT, EMAIL, INSTITUTION, PAPER_NAME};

/// One author/affiliation row extracted from a paper.
///
/// Keeps track of which fields the reasoning service actually emitted: a
/// field sent as `null` is present-but-empty, a field never sent is absent.
/// The tabular sink relies on that distinction when choosing columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffiliationRecord {
    #[serde(flatten)]
    fields: BTreeMap<String, Option<String>>,
    pub paper_name: String,
}

impl AffiliationRecord {
    /// Build a record from a normalized mapping, keeping only `allowed` keys.
    ///
    /// `paper_name` is always taken from the argument; a `paper_name` key
    /// coming from the service is ignored.
    pub fn from_mapping<S: AsRef<str>>(
        mapping: &Map<String, Value>,
        allowed: &[S],
        paper_name: &str,
    ) -> Self {
        let fields = allowed
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| *name != PAPER_NAME)
            .filter_map(|name| {
                mapping
                    .get(name)
                    .map(|value| (name.to_string(), cell_text(value)))
            })
            .collect();

        Self {
            fields,
            paper_name: paper_name.to_string(),
        }
    }

    /// Whether the service emitted `name` for this record (even as null).
    pub fn has_field(&self, name: &str) -> bool {
        name == PAPER_NAME || self.fields.contains_key(name)
    }

    /// Value of `name`, or `None` when absent or null.
    pub fn field(&self, name: &str) -> Option<&str> {
        if name == PAPER_NAME {
            return Some(&self.paper_name);
        }
        self.fields.get(name).and_then(|v| v.as_deref())
    }

    pub fn author_name(&self) -> Option<&str> {
        self.field(AUTHOR_NAME)
    }

    pub fn email(&self) -> Option<&str> {
        self.field(EMAIL)
    }

    pub fn department(&self) -> Option<&str> {
        self.field(DEPARTMENT)
    }

    pub fn institution(&self) -> Option<&str> {
        self.field(INSTITUTION)
    }

    pub fn country(&self) -> Option<&str> {
        self.field(COUNTRY)
    }
}

/// Render a JSON value as a table cell. Null and blank strings become `None`.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
