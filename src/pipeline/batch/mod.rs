//! Batch orchestration over a paper corpus.
//!
//! Lists the corpus, then for each document runs text source → record
//! extractor, isolating failures and pacing calls to the reasoning service.
//! Sequential by construction: one document, one service call at a time.

pub mod error;
pub mod runner;
pub mod traits;
pub mod types;

pub use error::BatchError;
pub use runner::{list_corpus, BatchRunner};
pub use traits::AffiliationExtractor;
pub use types::*;
