use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::PipelineState;
use super::GraphError;

pub const DISCOVERY: &str = "discovery";
pub const ENRICHMENT: &str = "enrichment";
pub const SAVE: &str = "save";

/// One named transition over the shared state.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, state: &mut PipelineState) -> Result<(), GraphError>;
}

/// Emitted after each stage completes. Diagnostic only.
#[derive(Debug, Clone, Serialize)]
pub struct StageEvent {
    pub stage: &'static str,
    pub completed_at: DateTime<Utc>,
    pub snapshot: PipelineState,
}
