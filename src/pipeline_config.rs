//! Pipeline configuration for extraction runs.
//!
//! Collects the knobs that shape a batch: how much document text reaches the
//! reasoning service, how long to wait between documents, which columns make
//! up a record, and how many pages the text source reads.

use std::time::Duration;

use serde::Serialize;

// ═══════════════════════════════════════════════════════════
// Canonical fields
// ═══════════════════════════════════════════════════════════

pub const AUTHOR_NAME: &str = "author_name";
pub const EMAIL: &str = "email";
pub const DEPARTMENT: &str = "department";
pub const INSTITUTION: &str = "institution";
pub const COUNTRY: &str = "country";
pub const PAPER_NAME: &str = "paper_name";

/// Fields the reasoning service is asked to fill, in output order.
pub const SERVICE_FIELDS: [&str; 5] = [AUTHOR_NAME, EMAIL, DEPARTMENT, INSTITUTION, COUNTRY];

/// Full column order of the affiliation table.
pub const CANONICAL_COLUMNS: [&str; 6] =
    [AUTHOR_NAME, EMAIL, DEPARTMENT, INSTITUTION, COUNTRY, PAPER_NAME];

pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 8000;
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_PAGE_BUDGET: usize = 2;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Knobs passed to the extractor and batch runner at construction.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Document text beyond this many characters is cut before prompting.
    pub max_context_chars: usize,
    /// Fixed wait after every document, success or failure.
    #[serde(serialize_with = "serialize_millis")]
    pub pacing_delay: Duration,
    /// Ordered column list for the output table.
    pub canonical_fields: Vec<String>,
    /// Maximum pages read from each document, starting at the first.
    pub page_budget: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            pacing_delay: DEFAULT_PACING_DELAY,
            canonical_fields: CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            page_budget: DEFAULT_PAGE_BUDGET,
        }
    }
}

impl PipelineConfig {
    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn with_page_budget(mut self, pages: usize) -> Self {
        self.page_budget = pages;
        self
    }

    pub fn with_max_context_chars(mut self, chars: usize) -> Self {
        self.max_context_chars = chars;
        self
    }

    /// Column names as borrowed strings, for the tabular sink.
    pub fn columns(&self) -> Vec<&str> {
        self.canonical_fields.iter().map(String::as_str).collect()
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_context_chars, 8000);
        assert_eq!(config.pacing_delay, Duration::from_secs(2));
        assert_eq!(config.page_budget, 2);
        assert_eq!(config.columns(), CANONICAL_COLUMNS.to_vec());
    }

    #[test]
    fn paper_name_is_last_column() {
        assert_eq!(CANONICAL_COLUMNS.last(), Some(&PAPER_NAME));
        assert!(!SERVICE_FIELDS.contains(&PAPER_NAME));
    }

    #[test]
    fn builders_override_fields() {
        let config = PipelineConfig::default()
            .with_pacing_delay(Duration::ZERO)
            .with_page_budget(5)
            .with_max_context_chars(100);
        assert_eq!(config.pacing_delay, Duration::ZERO);
        assert_eq!(config.page_budget, 5);
        assert_eq!(config.max_context_chars, 100);
    }

    #[test]
    fn pipeline_config_serializes() {
        let json = serde_json::to_string(&PipelineConfig::default()).unwrap();
        assert!(json.contains("\"max_context_chars\":8000"));
        assert!(json.contains("\"pacing_delay\":2000"));
        assert!(json.contains("\"paper_name\""));
    }
}
