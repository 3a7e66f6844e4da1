//! Text Source Adapter: corpus document → page-budgeted raw text.

use super::pdf::PdfTextExtractor;
use super::sanitize::sanitize_extracted_text;
use super::types::{PageExtraction, PdfExtractor, TextSource};
use super::ExtractionError;
use crate::models::{Document, DocumentFormat};

/// Page separator for plain-text documents.
const FORM_FEED: char = '\x0c';

/// Reads PDFs through a `PdfExtractor` and plain text directly.
pub struct DocumentTextSource {
    pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
}

impl DocumentTextSource {
    pub fn new(pdf_extractor: Box<dyn PdfExtractor + Send + Sync>) -> Self {
        Self { pdf_extractor }
    }

    /// Extract pages, surfacing the error (used by `extract` and diagnostics).
    pub fn extract_pages(
        &self,
        document: &Document,
        max_pages: usize,
    ) -> Result<Vec<PageExtraction>, ExtractionError> {
        let bytes = std::fs::read(&document.path)?;

        let pages = match document.format {
            DocumentFormat::Pdf => self.pdf_extractor.extract_text(&bytes)?,
            DocumentFormat::PlainText => {
                let text = String::from_utf8(bytes)
                    .map_err(|e| ExtractionError::EncodingError(e.to_string()))?;
                text.split(FORM_FEED)
                    .enumerate()
                    .map(|(i, page)| PageExtraction {
                        page_number: i + 1,
                        text: page.to_string(),
                    })
                    .collect()
            }
        };

        Ok(pages.into_iter().take(max_pages).collect())
    }
}

impl Default for DocumentTextSource {
    fn default() -> Self {
        Self::new(Box::new(PdfTextExtractor))
    }
}

impl TextSource for DocumentTextSource {
    fn extract(&self, document: &Document, max_pages: usize) -> String {
        match self.extract_pages(document, max_pages) {
            Ok(pages) => pages
                .iter()
                .map(|p| sanitize_extracted_text(&p.text))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => {
                tracing::warn!(
                    document = %document.id,
                    error = %e,
                    "Text extraction failed, treating document as empty"
                );
                String::new()
            }
        }
    }
}
