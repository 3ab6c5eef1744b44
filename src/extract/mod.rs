pub mod fallback;
pub mod llm;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod sanitize;

pub use fallback::*;
pub use llm::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use sanitize::*;

use thiserror::Error;

/// Failure modes of the LLM extraction path. None of these reach callers of
/// the orchestrator — they are logged and converted into a fallback result.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Extraction service credentials not configured")]
    Unconfigured,

    #[error("Cannot reach completion service at {0}")]
    Connection(String),

    #[error("Completion request timed out after {0}s")]
    Timeout(u64),

    #[error("Completion service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Empty completion body")]
    EmptyResponse,

    #[error("Completion body is not valid JSON: {0}")]
    JsonParsing(String),

    #[error("Malformed extraction payload: {0}")]
    MalformedResponse(String),
}
