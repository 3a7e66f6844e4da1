use serde::{Deserialize, Serialize};

use super::ExtractionError;
use crate::models::Document;

/// Per-page extraction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageExtraction {
    pub page_number: usize,
    pub text: String,
}

/// PDF text extraction abstraction
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError>;
}

/// Pulls raw text out of a corpus document.
///
/// Never fails: any extraction error yields an empty string, which the batch
/// runner records as a failed document.
pub trait TextSource {
    fn extract(&self, document: &Document, max_pages: usize) -> String;
}
