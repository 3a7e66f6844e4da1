use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A researcher found by discovery. Only enrichment sets `email`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub affiliation: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub scholar_id: Option<String>,
    pub email: Option<String>,
}

const NAME_KEYS: &[&str] = &["name", "author", "full_name", "author_name"];
const AFFILIATION_KEYS: &[&str] = &["affiliation", "institution", "affiliations"];
const INTEREST_KEYS: &[&str] = &["interests", "research_interests", "topics"];
const ID_KEYS: &[&str] = &["scholar_id", "author_id", "id"];

impl Candidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Lenient decode of one tool-provider entry.
    ///
    /// Tool-providers disagree on key names, so each field accepts a few
    /// aliases. Entries without a usable name yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let pick = |keys: &[&str]| keys.iter().find_map(|k| obj.get(*k));

        let name = entry_name(obj)?.to_string();

        let affiliation = pick(AFFILIATION_KEYS).and_then(text_of);
        let scholar_id = pick(ID_KEYS).and_then(text_of);
        let email = obj.get("email").and_then(text_of);

        let interests = match pick(INTEREST_KEYS) {
            Some(Value::Array(items)) => items.iter().filter_map(text_of).collect(),
            Some(Value::String(s)) => s
                .split([',', ';'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        };

        Some(Self {
            name,
            affiliation,
            interests,
            scholar_id,
            email,
        })
    }

    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// Whitespace- and case-insensitive name comparison.
    pub fn is_named(&self, other: &str) -> bool {
        fold_name(&self.name) == fold_name(other)
    }
}

/// Trimmed, non-empty name of a provider entry, under any accepted key.
pub fn entry_name(obj: &Map<String, Value>) -> Option<&str> {
    NAME_KEYS
        .iter()
        .find_map(|k| obj.get(*k))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
}

fn fold_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(text_of).collect();
            (!joined.is_empty()).then(|| joined.join("; "))
        }
        _ => None,
    }
}
