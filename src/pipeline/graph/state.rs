use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

use crate::models::Candidate;

/// Where the save stage wrote its table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub path: PathBuf,
    pub rows_written: usize,
}

/// Shared state threaded through every stage.
///
/// `candidates` keeps discovery order. Stages may append to it or fill in
/// fields but never remove entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineState {
    pub run_id: Uuid,
    pub topic: String,
    pub candidates: Vec<Candidate>,
    pub output: Option<SaveReport>,
}

impl PipelineState {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            topic: topic.into(),
            candidates: Vec::new(),
            output: None,
        }
    }
}
