//! BatchRunner: text source → record extractor over a whole corpus.
//!
//! Runs sequentially (one service call at a time). A document that yields no
//! text or no records is recorded as failed and the batch moves on.

use std::path::Path;
use std::time::{Duration, Instant};

use super::error::BatchError;
use super::traits::AffiliationExtractor;
use super::types::*;
use crate::models::Document;
use crate::pipeline::extraction::TextSource;
use crate::pipeline_config::PipelineConfig;

/// Pacing sleeps in slices of this size so cancellation stays responsive.
const SLEEP_GRANULARITY: Duration = Duration::from_millis(100);

pub struct BatchRunner {
    source: Box<dyn TextSource + Send + Sync>,
    extractor: Box<dyn AffiliationExtractor + Send + Sync>,
    config: PipelineConfig,
    cancel: CancelFlag,
}

impl BatchRunner {
    pub fn new(
        source: Box<dyn TextSource + Send + Sync>,
        extractor: Box<dyn AffiliationExtractor + Send + Sync>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            extractor,
            config,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that stops the run before the next document when cancelled.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run one document: text source, then extractor unless the text is empty.
    pub fn process_document(&self, document: &Document) -> ExtractionOutcome {
        let text = self.source.extract(document, self.config.page_budget);
        if text.trim().is_empty() {
            return ExtractionOutcome::Failed {
                document_id: document.id.clone(),
                reason: FailureReason::EmptyText,
            };
        }

        let records = self.extractor.extract_records(&text, &document.id);
        if records.is_empty() {
            ExtractionOutcome::Failed {
                document_id: document.id.clone(),
                reason: FailureReason::NoRecords,
            }
        } else {
            ExtractionOutcome::Extracted(records)
        }
    }

    /// Process `documents` in order, pacing after each one.
    pub fn process(
        &self,
        documents: &[Document],
        progress_fn: Option<&dyn Fn(BatchStatusEvent)>,
    ) -> BatchOutcome {
        let start = Instant::now();
        let total = documents.len();
        let mut result = BatchOutcome::empty();

        if let Some(progress) = progress_fn {
            progress(BatchStatusEvent::Started {
                document_count: total,
            });
        }

        for (i, document) in documents.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(completed = i, total, "Batch cancelled");
                result.cancelled = true;
                if let Some(progress) = progress_fn {
                    progress(BatchStatusEvent::Cancelled { completed: i, total });
                }
                break;
            }

            if let Some(progress) = progress_fn {
                progress(BatchStatusEvent::Progress {
                    completed: i,
                    total,
                    current_document: document.id.clone(),
                });
            }

            let outcome = self.process_document(document);
            match &outcome {
                ExtractionOutcome::Extracted(records) => {
                    tracing::info!(
                        document = %document.id,
                        records = records.len(),
                        "Document processed"
                    );
                }
                ExtractionOutcome::Failed {
                    document_id,
                    reason,
                } => {
                    tracing::warn!(document = %document_id, reason = %reason, "Document failed");
                    if let Some(progress) = progress_fn {
                        progress(BatchStatusEvent::DocumentFailed {
                            document_id: document_id.clone(),
                            reason: *reason,
                        });
                    }
                }
            }
            result.absorb(outcome);

            self.pace();
        }

        result.duration_ms = start.elapsed().as_millis() as u64;

        if !result.cancelled {
            if let Some(progress) = progress_fn {
                progress(BatchStatusEvent::Completed {
                    records_found: result.records.len(),
                    failed: result.failed.len(),
                    duration_ms: result.duration_ms,
                });
            }
        }

        result
    }

    fn pace(&self) {
        let mut remaining = self.config.pacing_delay;
        while !remaining.is_zero() && !self.cancel.is_cancelled() {
            let step = remaining.min(SLEEP_GRANULARITY);
            std::thread::sleep(step);
            remaining -= step;
        }
    }
}

/// List the `.pdf` and `.txt` files directly inside `dir`, sorted by file name.
pub fn list_corpus(dir: &Path) -> Result<Vec<Document>, BatchError> {
    if !dir.exists() {
        return Err(BatchError::CorpusNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(BatchError::NotADirectory(dir.to_path_buf()));
    }

    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match Document::from_path(&path) {
            Some(doc) => documents.push(doc),
            None => tracing::debug!(path = %path.display(), "Skipping unsupported file"),
        }
    }

    documents.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::models::AffiliationRecord;
    use crate::pipeline_config::SERVICE_FIELDS;

    /// Text source backed by a map of document id → text.
    struct MapSource(HashMap<String, String>);

    impl TextSource for MapSource {
        fn extract(&self, document: &Document, _max_pages: usize) -> String {
            self.0.get(&document.id).cloned().unwrap_or_default()
        }
    }

    /// Extractor returning one record per line of text, recording every call.
    #[derive(Default)]
    struct LineExtractor {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl AffiliationExtractor for LineExtractor {
        fn extract_records(&self, text: &str, document_name: &str) -> Vec<AffiliationRecord> {
            self.calls.lock().unwrap().push(document_name.to_string());
            text.lines()
                .filter(|l| !l.trim().is_empty() && *l != "NOTHING")
                .map(|name| {
                    let m = serde_json::json!({ "author_name": name });
                    AffiliationRecord::from_mapping(m.as_object().unwrap(), &SERVICE_FIELDS, document_name)
                })
                .collect()
        }
    }

    fn doc(id: &str) -> Document {
        Document::from_path(Path::new(id)).unwrap()
    }

    fn runner(texts: &[(&str, &str)], calls: Arc<Mutex<Vec<String>>>) -> BatchRunner {
        let map = texts.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        BatchRunner::new(
            Box::new(MapSource(map)),
            Box::new(LineExtractor { calls }),
            PipelineConfig::default().with_pacing_delay(Duration::ZERO),
        )
    }

    #[test]
    fn failed_document_does_not_stop_the_batch() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = runner(
            &[("a.pdf", "Jane Doe\nJohn Roe"), ("b.pdf", ""), ("c.pdf", "Ana Lima")],
            calls.clone(),
        );

        let outcome = runner.process(&[doc("a.pdf"), doc("b.pdf"), doc("c.pdf")], None);

        assert_eq!(outcome.processed, 3);
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.failed, vec!["b.pdf".to_string()]);
        assert!(!outcome.cancelled);

        let papers: Vec<&str> = outcome.records.iter().map(|r| r.paper_name.as_str()).collect();
        assert_eq!(papers, vec!["a.pdf", "a.pdf", "c.pdf"]);
        assert_eq!(outcome.records[0].author_name(), Some("Jane Doe"));
        assert_eq!(outcome.records[1].author_name(), Some("John Roe"));
    }

    #[test]
    fn empty_text_skips_the_extractor() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = runner(&[("a.pdf", "Jane Doe"), ("b.pdf", "  \n ")], calls.clone());

        let outcome = runner.process(&[doc("a.pdf"), doc("b.pdf")], None);

        assert_eq!(*calls.lock().unwrap(), vec!["a.pdf".to_string()]);
        assert_eq!(outcome.failed, vec!["b.pdf".to_string()]);
    }

    #[test]
    fn zero_records_is_a_failure() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = runner(&[("a.pdf", "NOTHING")], calls.clone());

        match runner.process_document(&doc("a.pdf")) {
            ExtractionOutcome::Failed { document_id, reason } => {
                assert_eq!(document_id, "a.pdf");
                assert_eq!(reason, FailureReason::NoRecords);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_corpus_yields_empty_outcome() {
        let runner = runner(&[], Arc::default());
        let outcome = runner.process(&[], None);
        assert_eq!(outcome.processed, 0);
        assert!(outcome.records.is_empty());
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn pacing_applies_after_every_document() {
        let map = [("a.pdf", "A"), ("b.pdf", "")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let runner = BatchRunner::new(
            Box::new(MapSource(map)),
            Box::new(LineExtractor::default()),
            PipelineConfig::default().with_pacing_delay(Duration::from_millis(30)),
        );

        let start = Instant::now();
        runner.process(&[doc("a.pdf"), doc("b.pdf")], None);
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn cancelled_before_start_processes_nothing() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = runner(&[("a.pdf", "A")], calls.clone());
        runner.cancel_flag().cancel();

        let outcome = runner.process(&[doc("a.pdf")], None);
        assert!(outcome.cancelled);
        assert_eq!(outcome.processed, 0);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn cancel_mid_run_keeps_partial_results() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = runner(&[("a.pdf", "A"), ("b.pdf", "B")], calls);
        let flag = runner.cancel_flag();

        let cancel_after_first = |event: BatchStatusEvent| {
            if let BatchStatusEvent::Progress { completed: 1, .. } = event {
                flag.cancel();
            }
        };

        // Cancelling during b's progress event still lets b finish; nothing follows it.
        let outcome = runner.process(&[doc("a.pdf"), doc("b.pdf"), doc("c.pdf")], Some(&cancel_after_first));
        assert!(outcome.cancelled);
        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn progress_events_in_order() {
        let runner = runner(&[("a.pdf", "A")], Arc::default());
        let events = Mutex::new(Vec::new());
        let record = |e: BatchStatusEvent| events.lock().unwrap().push(e);

        runner.process(&[doc("a.pdf"), doc("b.pdf")], Some(&record));

        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 5);
        assert!(matches!(events[0], BatchStatusEvent::Started { document_count: 2 }));
        assert!(matches!(events[1], BatchStatusEvent::Progress { completed: 0, .. }));
        assert!(matches!(events[2], BatchStatusEvent::Progress { completed: 1, .. }));
        assert!(matches!(
            events[3],
            BatchStatusEvent::DocumentFailed { reason: FailureReason::EmptyText, .. }
        ));
        assert!(matches!(
            events[4],
            BatchStatusEvent::Completed { records_found: 1, failed: 1, .. }
        ));
    }

    #[test]
    fn list_corpus_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.txt", "notes.docx", "C.PDF"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let docs = list_corpus(dir.path()).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["C.PDF", "a.txt", "b.pdf"]);
    }

    #[test]
    fn list_corpus_missing_dir_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(list_corpus(&missing), Err(BatchError::CorpusNotFound(_))));

        let file = dir.path().join("file.pdf");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(list_corpus(&file), Err(BatchError::NotADirectory(_))));
    }
}
