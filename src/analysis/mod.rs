pub mod defaults;
pub mod gemini;
pub mod heuristic;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;
pub mod validate;

pub use defaults::*;
pub use gemini::*;
pub use heuristic::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;
pub use validate::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Completion service unreachable at {0}")]
    Connection(String),

    #[error("Completion service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Empty completion response")]
    EmptyResponse,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Missing API key: set {0}")]
    MissingApiKey(String),
}
