pub mod types;
pub mod sanitize;
pub mod pdf;
pub mod source;

pub use types::*;
pub use sanitize::*;
pub use pdf::*;
pub use source::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Text encoding error: {0}")]
    EncodingError(String),
}
