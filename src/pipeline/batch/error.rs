//! Setup-level errors for batch runs.
//!
//! Per-document failures never surface here; they end up in
//! `BatchOutcome::failed`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Corpus directory not found: {}", .0.display())]
    CorpusNotFound(PathBuf),

    #[error("Corpus path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O error while listing corpus: {0}")]
    Io(#[from] std::io::Error),
}
