pub mod google;
pub mod search;

pub use google::*;
pub use search::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Places service unreachable at {0}")]
    Connection(String),

    #[error("Places service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Places response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Places service rejected the request: {0}")]
    Rejected(String),

    #[error("Missing API key: set {0}")]
    MissingApiKey(String),

    #[error("No healthcare facilities found near the given location")]
    NoFacilitiesFound,
}
