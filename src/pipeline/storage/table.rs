use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use super::SinkError;
use crate::models::{AffiliationRecord, Candidate};

/// Column order for saved candidates.
pub const CANDIDATE_COLUMNS: [&str; 5] = ["name", "affiliation", "email", "interests", "scholar_id"];

/// A row the sink can project onto named columns.
pub trait TableRow {
    /// `None` when the row does not carry `column` at all, `Some(None)` when
    /// it carries it as null.
    fn cell(&self, column: &str) -> Option<Option<String>>;
}

impl TableRow for AffiliationRecord {
    fn cell(&self, column: &str) -> Option<Option<String>> {
        self.has_field(column)
            .then(|| self.field(column).map(String::from))
    }
}

impl TableRow for Candidate {
    fn cell(&self, column: &str) -> Option<Option<String>> {
        let value = match column {
            "name" => Some(self.name.clone()),
            "affiliation" => self.affiliation.clone(),
            "email" => self.email.clone(),
            "interests" => (!self.interests.is_empty()).then(|| self.interests.join("; ")),
            "scholar_id" => self.scholar_id.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// Columns of `columns` that at least one row carries, in `columns` order.
pub fn project_columns<'a, R: TableRow>(rows: &[R], columns: &[&'a str]) -> Vec<&'a str> {
    columns
        .iter()
        .copied()
        .filter(|c| rows.iter().any(|r| r.cell(c).is_some()))
        .collect()
}

/// Write `rows` to `path` as CSV and return the number of data rows.
///
/// Zero rows produce an empty file (no header). Null cells are written as
/// empty strings. The parent directory is created if missing.
pub fn save<R: TableRow>(rows: &[R], columns: &[&str], path: &Path) -> Result<usize, SinkError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    if rows.is_empty() {
        std::fs::File::create(path)?;
        tracing::info!(path = %path.display(), "No rows to save, wrote empty file");
        return Ok(0);
    }

    let header = project_columns(rows, columns);
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&header)?;

    for row in rows {
        let cells = header
            .iter()
            .map(|c| row.cell(c).flatten().unwrap_or_default());
        writer.write_record(cells)?;
    }
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        rows = rows.len(),
        columns = header.len(),
        "Saved table"
    );
    Ok(rows.len())
}

/// Counts reported after an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub total_records: usize,
    pub with_email: usize,
    pub distinct_papers: usize,
}

pub fn summarize(records: &[AffiliationRecord]) -> ExtractionSummary {
    let papers: BTreeSet<&str> = records.iter().map(|r| r.paper_name.as_str()).collect();
    ExtractionSummary {
        total_records: records.len(),
        with_email: records.iter().filter(|r| r.email().is_some()).count(),
        distinct_papers: papers.len(),
    }
}
