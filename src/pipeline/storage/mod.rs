//! Tabular sink: project rows onto a fixed column order and write CSV.

pub mod table;

pub use table::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
