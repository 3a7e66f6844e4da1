use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::AffiliationRecord;

// ═══════════════════════════════════════════
// Per-document outcome
// ═══════════════════════════════════════════

/// Why a document produced no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The text source returned nothing; the extractor was not called.
    EmptyText,
    /// The extractor returned zero records (service or parse failure, or no authors).
    NoRecords,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyText => "empty_text",
            Self::NoRecords => "no_records",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one document's extraction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Always non-empty.
    Extracted(Vec<AffiliationRecord>),
    Failed {
        document_id: String,
        reason: FailureReason,
    },
}

// ═══════════════════════════════════════════
// Batch result
// ═══════════════════════════════════════════

/// Aggregate of a batch run. Records keep document order, then per-document order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub records: Vec<AffiliationRecord>,
    /// Ids of failed documents, in corpus order.
    pub failed: Vec<String>,
    /// Documents attempted (succeeded + failed).
    pub processed: usize,
    /// Set when the run stopped on the cancel flag before the corpus ended.
    pub cancelled: bool,
    pub duration_ms: u64,
}

impl BatchOutcome {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            failed: Vec::new(),
            processed: 0,
            cancelled: false,
            duration_ms: 0,
        }
    }

    pub(crate) fn absorb(&mut self, outcome: ExtractionOutcome) {
        self.processed += 1;
        match outcome {
            ExtractionOutcome::Extracted(records) => self.records.extend(records),
            ExtractionOutcome::Failed { document_id, .. } => self.failed.push(document_id),
        }
    }
}

// ═══════════════════════════════════════════
// Status events
// ═══════════════════════════════════════════

/// Event emitted during a batch for progress reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchStatusEvent {
    Started {
        document_count: usize,
    },
    Progress {
        completed: usize,
        total: usize,
        current_document: String,
    },
    DocumentFailed {
        document_id: String,
        reason: FailureReason,
    },
    Completed {
        records_found: usize,
        failed: usize,
        duration_ms: u64,
    },
    Cancelled {
        completed: usize,
        total: usize,
    },
}

// ═══════════════════════════════════════════
// Cancellation
// ═══════════════════════════════════════════

/// Shared cooperative cancel flag. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
