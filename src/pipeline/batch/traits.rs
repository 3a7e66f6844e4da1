use crate::models::AffiliationRecord;
use crate::pipeline::structuring::RecordExtractor;

/// Text → records step of a batch (allows mocking).
pub trait AffiliationExtractor {
    /// Never fails: any error yields an empty vec.
    fn extract_records(&self, text: &str, document_name: &str) -> Vec<AffiliationRecord>;
}

impl AffiliationExtractor for RecordExtractor {
    fn extract_records(&self, text: &str, document_name: &str) -> Vec<AffiliationRecord> {
        RecordExtractor::extract_records(self, text, document_name)
    }
}
