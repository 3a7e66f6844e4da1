use std::path::PathBuf;

use async_trait::async_trait;

use super::stage::{Stage, SAVE};
use super::state::{PipelineState, SaveReport};
use super::GraphError;
use crate::pipeline::storage::{save, SinkError, CANDIDATE_COLUMNS};

/// Writes the candidate table and records where it went.
pub struct SaveStage {
    path: PathBuf,
}

impl SaveStage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write `state.candidates` and record the report in the state.
    pub fn write(&self, state: &mut PipelineState) -> Result<(), SinkError> {
        let rows_written = save(&state.candidates, &CANDIDATE_COLUMNS, &self.path)?;
        state.output = Some(SaveReport {
            path: self.path.clone(),
            rows_written,
        });
        Ok(())
    }

    /// Save what a cancelled run gathered. Does nothing when there are no
    /// candidates or the table was already written.
    pub fn write_partial(&self, state: &mut PipelineState) -> Result<bool, SinkError> {
        if state.candidates.is_empty() || state.output.is_some() {
            return Ok(false);
        }
        tracing::info!(
            path = %self.path.display(),
            candidates = state.candidates.len(),
            "Saving candidates gathered before cancellation"
        );
        self.write(state)?;
        Ok(true)
    }
}

#[async_trait]
impl Stage for SaveStage {
    fn name(&self) -> &'static str {
        SAVE
    }

    async fn run(&self, state: &mut PipelineState) -> Result<(), GraphError> {
        Ok(self.write(state)?)
    }
}
