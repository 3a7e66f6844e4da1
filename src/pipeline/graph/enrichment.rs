use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};

use super::stage::{Stage, ENRICHMENT};
use super::state::PipelineState;
use super::GraphError;
use crate::mcp::{match_by_hints, resolve_argument_name, McpError, ToolProvider, ToolResponse};
use crate::models::candidate::entry_name;
use crate::models::Candidate;
use crate::pipeline::batch::CancelFlag;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});

/// Tool-name hints for the contact lookup tool, tried in order. A provider
/// matching none of them gets no lookup.
pub const LOOKUP_TOOL_HINTS: [&str; 3] = ["email", "profile", "author"];
const NAME_ARGUMENT_PREFERENCE: [&str; 4] = ["name", "author_name", "author", "query"];
const ID_ARGUMENT_PREFERENCE: [&str; 2] = ["author_id", "scholar_id"];

/// Finds a contact email for one candidate.
#[async_trait]
pub trait ContactLookup: Send + Sync {
    /// `Ok(None)` when the lookup worked but found no email.
    async fn lookup_email(&self, candidate: &Candidate) -> Result<Option<String>, McpError>;
}

/// Contact lookup backed by a tool of the search provider.
pub struct McpContactLookup {
    provider: Arc<dyn ToolProvider>,
}

impl McpContactLookup {
    pub fn new(provider: Arc<dyn ToolProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ContactLookup for McpContactLookup {
    async fn lookup_email(&self, candidate: &Candidate) -> Result<Option<String>, McpError> {
        let tools = self.provider.list_tools().await?;
        let Some(tool) = match_by_hints(&tools, &LOOKUP_TOOL_HINTS) else {
            tracing::debug!(candidate = %candidate.name, "No contact lookup tool advertised");
            return Ok(None);
        };

        let mut arguments = Map::new();
        let id_argument = ID_ARGUMENT_PREFERENCE.iter().find(|a| tool.has_parameter(a));
        match (id_argument, &candidate.scholar_id) {
            (Some(arg), Some(id)) => {
                arguments.insert(arg.to_string(), Value::String(id.clone()));
            }
            _ => {
                let arg = resolve_argument_name(tool, &NAME_ARGUMENT_PREFERENCE, "name");
                arguments.insert(arg.to_string(), Value::String(candidate.name.clone()));
            }
        }

        let response = self
            .provider
            .call_tool(&tool.name, arguments)
            .await?
            .into_result(&tool.name)?;

        Ok(extract_email(&response, candidate))
    }
}

/// Email belonging to `candidate` in a lookup response.
///
/// JSON payloads: the top-level `email` of an unnamed object, or the `email`
/// of an entry named like the candidate. Entries named for someone else are
/// not searched. Plain text: the address only when exactly one appears.
pub fn extract_email(response: &ToolResponse, candidate: &Candidate) -> Option<String> {
    let payloads = response.json_payloads();
    if !payloads.is_empty() {
        return payloads.iter().find_map(|p| email_in_payload(p, candidate));
    }
    sole_email_in_text(response)
}

fn email_in_payload(value: &Value, candidate: &Candidate) -> Option<String> {
    match value {
        Value::Object(map) if entry_name(map).is_none() => email_field(map)
            .or_else(|| map.values().find_map(|v| email_of_named_entry(v, candidate))),
        other => email_of_named_entry(other, candidate),
    }
}

fn email_of_named_entry(value: &Value, candidate: &Candidate) -> Option<String> {
    match value {
        Value::Object(map) => match entry_name(map) {
            Some(name) if candidate.is_named(name) => email_field(map),
            Some(_) => None,
            None => map.values().find_map(|v| email_of_named_entry(v, candidate)),
        },
        Value::Array(items) => items.iter().find_map(|v| email_of_named_entry(v, candidate)),
        _ => None,
    }
}

fn email_field(map: &Map<String, Value>) -> Option<String> {
    map.get("email")
        .and_then(Value::as_str)
        .and_then(|e| EMAIL_RE.find(e))
        .map(|m| m.as_str().to_string())
}

fn sole_email_in_text(response: &ToolResponse) -> Option<String> {
    let mut found: Vec<&str> = response
        .texts()
        .flat_map(|t| EMAIL_RE.find_iter(t).map(|m| m.as_str()))
        .collect();
    found.sort_unstable();
    found.dedup();
    match found.as_slice() {
        [only] => Some(only.to_string()),
        _ => None,
    }
}

/// Fills in missing emails. A failed lookup leaves the email null.
pub struct EnrichmentStage {
    lookup: Arc<dyn ContactLookup>,
    pacing_delay: Duration,
    cancel: CancelFlag,
}

impl EnrichmentStage {
    pub fn new(lookup: Arc<dyn ContactLookup>) -> Self {
        Self {
            lookup,
            pacing_delay: Duration::ZERO,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }
}

#[async_trait]
impl Stage for EnrichmentStage {
    fn name(&self) -> &'static str {
        ENRICHMENT
    }

    async fn run(&self, state: &mut PipelineState) -> Result<(), GraphError> {
        let mut looked_up = 0usize;
        let mut found = 0usize;

        for candidate in state.candidates.iter_mut().filter(|c| !c.has_email()) {
            if self.cancel.is_cancelled() {
                tracing::info!(looked_up, "Enrichment cancelled");
                break;
            }
            if looked_up > 0 && !self.pacing_delay.is_zero() {
                tokio::time::sleep(self.pacing_delay).await;
            }
            looked_up += 1;

            match self.lookup.lookup_email(candidate).await {
                Ok(Some(email)) => {
                    tracing::debug!(candidate = %candidate.name, "Email found");
                    candidate.email = Some(email);
                    found += 1;
                }
                Ok(None) => {
                    tracing::debug!(candidate = %candidate.name, "No email found");
                }
                Err(e) => {
                    tracing::warn!(candidate = %candidate.name, error = %e, "Contact lookup failed");
                }
            }
        }

        tracing::info!(looked_up, found, "Enrichment finished");
        Ok(())
    }
}
