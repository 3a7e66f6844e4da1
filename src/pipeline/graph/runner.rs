use chrono::Utc;

use super::discovery::DiscoveryStage;
use super::enrichment::EnrichmentStage;
use super::save::SaveStage;
use super::stage::{Stage, StageEvent};
use super::state::PipelineState;
use super::GraphError;
use crate::pipeline::batch::CancelFlag;

/// Runs discovery → enrichment → save in sequence.
pub struct PipelineGraph {
    stages: Vec<Box<dyn Stage>>,
    cancel: CancelFlag,
}

impl PipelineGraph {
    pub fn new(discovery: DiscoveryStage, enrichment: EnrichmentStage, save: SaveStage) -> Self {
        Self::from_stages(vec![Box::new(discovery), Box::new(enrichment), Box::new(save)])
    }

    pub(crate) fn from_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            cancel: CancelFlag::new(),
        }
    }

    /// Checked before each stage. Share it with the enrichment stage to stop
    /// between candidates too.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn run(
        &self,
        mut state: PipelineState,
        observer: Option<&(dyn Fn(&StageEvent) + Sync)>,
    ) -> Result<PipelineState, GraphError> {
        tracing::info!(run_id = %state.run_id, topic = %state.topic, "Pipeline started");

        for stage in &self.stages {
            let name = stage.name();
            if self.cancel.is_cancelled() {
                tracing::info!(run_id = %state.run_id, stage = name, "Pipeline cancelled");
                return Err(GraphError::Cancelled {
                    stage: name,
                    state: Box::new(state),
                });
            }

            let before: Vec<String> = state.candidates.iter().map(|c| c.name.clone()).collect();
            stage.run(&mut state).await?;
            check_candidates_kept(name, &before, &state)?;

            tracing::info!(
                run_id = %state.run_id,
                stage = name,
                candidates = state.candidates.len(),
                "Stage completed"
            );

            if let Some(observe) = observer {
                observe(&StageEvent {
                    stage: name,
                    completed_at: Utc::now(),
                    snapshot: state.clone(),
                });
            }
        }

        Ok(state)
    }
}

/// The candidates present before a stage must still be there, in order.
fn check_candidates_kept(
    stage: &'static str,
    before: &[String],
    state: &PipelineState,
) -> Result<(), GraphError> {
    let after = state.candidates.len();
    let kept = after >= before.len()
        && before
            .iter()
            .zip(&state.candidates)
            .all(|(name, c)| *name == c.name);

    if kept {
        Ok(())
    } else {
        Err(GraphError::CandidatesRemoved {
            stage,
            before: before.len(),
            after,
        })
    }
}
