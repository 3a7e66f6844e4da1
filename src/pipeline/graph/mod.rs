//! Discover → enrich → save over the academic search tool-provider.
//!
//! A fixed linear sequence of named stages sharing one mutable
//! `PipelineState`. No branches, retries or cycles.

pub mod discovery;
pub mod enrichment;
pub mod runner;
pub mod save;
pub mod stage;
pub mod state;

pub use discovery::DiscoveryStage;
pub use enrichment::{ContactLookup, EnrichmentStage, McpContactLookup};
pub use runner::PipelineGraph;
pub use save::SaveStage;
pub use stage::{Stage, StageEvent};
pub use state::{PipelineState, SaveReport};

use thiserror::Error;

use crate::mcp::McpError;
use crate::pipeline::storage::SinkError;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Tool-provider error: {0}")]
    Mcp(#[from] McpError),

    #[error("Save failed: {0}")]
    Sink(#[from] SinkError),

    #[error("Stage `{stage}` removed candidates ({before} before, {after} after)")]
    CandidatesRemoved {
        stage: &'static str,
        before: usize,
        after: usize,
    },

    /// Carries the state reached so far.
    #[error("Pipeline cancelled before stage `{stage}`")]
    Cancelled {
        stage: &'static str,
        state: Box<PipelineState>,
    },
}
