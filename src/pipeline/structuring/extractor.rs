use super::normalizer::normalize;
use super::prompt::{build_affiliation_prompt, truncate_chars, AFFILIATION_SYSTEM_PROMPT};
use super::sanitize::sanitize_json_payload;
use super::types::{ChatMessage, CompletionRequest, LlmClient};
use super::StructuringError;
use crate::models::AffiliationRecord;
use crate::pipeline_config::{PipelineConfig, SERVICE_FIELDS};

/// Turns document text into affiliation records:
/// truncate → prompt → LLM → sanitize → normalize → stamp paper_name
pub struct RecordExtractor {
    llm: Box<dyn LlmClient + Send + Sync>,
    model_name: String,
    config: PipelineConfig,
}

impl RecordExtractor {
    pub fn new(llm: Box<dyn LlmClient + Send + Sync>, model_name: &str, config: PipelineConfig) -> Self {
        Self {
            llm,
            model_name: model_name.to_string(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract records, logging and swallowing any failure.
    ///
    /// An empty result means either the service failed or the paper lists no
    /// authors; the caller treats both as a failed document.
    pub fn extract_records(&self, text: &str, document_name: &str) -> Vec<AffiliationRecord> {
        match self.try_extract_records(text, document_name) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(document = %document_name, error = %e, "Record extraction failed");
                Vec::new()
            }
        }
    }

    pub fn try_extract_records(
        &self,
        text: &str,
        document_name: &str,
    ) -> Result<Vec<AffiliationRecord>, StructuringError> {
        if text.trim().is_empty() {
            return Err(StructuringError::EmptyInput);
        }

        let truncated = truncate_chars(text, self.config.max_context_chars);
        let request = CompletionRequest {
            model: self.model_name.clone(),
            messages: vec![
                ChatMessage::system(AFFILIATION_SYSTEM_PROMPT),
                ChatMessage::user(build_affiliation_prompt(truncated, &SERVICE_FIELDS)),
            ],
            temperature: 0.0,
            json_mode: true,
        };

        let raw = self.llm.complete(&request)?;
        let payload = sanitize_json_payload(&raw);
        let mappings = normalize(&payload)?;

        let records: Vec<AffiliationRecord> = mappings
            .iter()
            .map(|m| AffiliationRecord::from_mapping(m, &self.config.canonical_fields, document_name))
            .collect();

        tracing::debug!(
            document = %document_name,
            input_chars = truncated.chars().count(),
            records = records.len(),
            "Extracted affiliation records"
        );

        Ok(records)
    }
}
