pub mod batch;
pub mod extraction;
pub mod graph;
pub mod storage;
pub mod structuring;
