pub mod types;
pub mod prompt;
pub mod sanitize;
pub mod normalizer;
pub mod openai;
pub mod extractor;

pub use types::*;
pub use prompt::*;
pub use sanitize::*;
pub use normalizer::*;
pub use openai::*;
pub use extractor::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Missing credential: set the {0} environment variable")]
    MissingCredential(&'static str),

    #[error("Reasoning service is not reachable at {0}")]
    Connection(String),

    #[error("Reasoning service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Reasoning service returned an empty payload")]
    EmptyPayload,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Unrecognized response shape: {0}")]
    UnrecognizedShape(String),

    #[error("Input text is empty")]
    EmptyInput,
}
