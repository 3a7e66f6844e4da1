//! Operator-facing summaries printed at the end of a run.

use std::path::Path;

use crate::pipeline::batch::BatchOutcome;
use crate::pipeline::graph::PipelineState;
use crate::pipeline::storage::ExtractionSummary;

/// Failed ids listed before collapsing the rest into a count.
pub const FAILED_LIST_CAP: usize = 10;

pub fn render_extraction_report(
    outcome: &BatchOutcome,
    summary: &ExtractionSummary,
    output: &Path,
    rows_written: usize,
) -> String {
    let mut lines = vec![format!("Processed {} papers", outcome.processed)];
    if outcome.cancelled {
        lines.push("Run cancelled before the corpus was finished".to_string());
    }
    lines.push(format!("Extracted {} author records", summary.total_records));
    lines.push(format!("Records with email: {}", summary.with_email));
    lines.push(format!("Distinct papers: {}", summary.distinct_papers));
    lines.push(format!("Saved {} rows to {}", rows_written, output.display()));
    lines.extend(failed_lines(&outcome.failed));
    lines.join("\n")
}

/// "Failed to process K papers" followed by up to ten ids and an overflow count.
pub fn failed_lines(failed: &[String]) -> Vec<String> {
    if failed.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![format!("Failed to process {} papers:", failed.len())];
    lines.extend(failed.iter().take(FAILED_LIST_CAP).map(|id| format!("  - {id}")));
    if failed.len() > FAILED_LIST_CAP {
        lines.push(format!("  ... and {} more", failed.len() - FAILED_LIST_CAP));
    }
    lines
}

pub fn render_scout_report(state: &PipelineState) -> String {
    let with_email = state.candidates.iter().filter(|c| c.has_email()).count();
    let mut lines = vec![
        format!("Topic: {}", state.topic),
        format!("Candidates found: {}", state.candidates.len()),
        format!("Candidates with email: {with_email}"),
    ];
    if let Some(report) = &state.output {
        lines.push(format!(
            "Saved {} rows to {}",
            report.rows_written,
            report.path.display()
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candidate;
    use crate::pipeline::graph::SaveReport;

    #[test]
    fn no_failures_prints_nothing() {
        assert!(failed_lines(&[]).is_empty());
    }

    #[test]
    fn failures_are_capped_at_ten() {
        let failed: Vec<String> = (0..13).map(|i| format!("paper_{i}.pdf")).collect();
        let lines = failed_lines(&failed);
        assert_eq!(lines[0], "Failed to process 13 papers:");
        assert_eq!(lines.len(), 1 + 10 + 1);
        assert_eq!(lines[10], "  - paper_9.pdf");
        assert_eq!(lines[11], "  ... and 3 more");
    }

    #[test]
    fn exactly_ten_failures_has_no_overflow_line() {
        let failed: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(failed_lines(&failed).len(), 11);
    }

    #[test]
    fn extraction_report_names_failed_paper() {
        let mut outcome = BatchOutcome::empty();
        outcome.processed = 3;
        outcome.failed = vec!["b.pdf".into()];
        let summary = ExtractionSummary {
            total_records: 3,
            with_email: 1,
            distinct_papers: 2,
        };

        let text = render_extraction_report(&outcome, &summary, Path::new("out.csv"), 3);
        assert!(text.contains("Processed 3 papers"));
        assert!(text.contains("Extracted 3 author records"));
        assert!(text.contains("Failed to process 1 papers"));
        assert!(text.contains("  - b.pdf"));
    }

    #[test]
    fn scout_report_counts_emails() {
        let mut state = PipelineState::new("robotics");
        let mut alice = Candidate::new("Alice");
        alice.email = Some("a@x.edu".into());
        state.candidates = vec![alice, Candidate::new("Bob")];
        state.output = Some(SaveReport {
            path: "c.csv".into(),
            rows_written: 2,
        });

        let text = render_scout_report(&state);
        assert!(text.contains("Candidates found: 2"));
        assert!(text.contains("Candidates with email: 1"));
        assert!(text.contains("Saved 2 rows to c.csv"));
    }
}
