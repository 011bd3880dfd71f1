use serde::{Deserialize, Serialize};

use super::AnalysisError;
use crate::models::AnalysisResult;

/// Which fallback tier produced the final result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisTier {
    /// The completion reply contained a parseable JSON object.
    DirectJson,
    /// Structured fields were recovered from the prose reply.
    HeuristicText,
    /// The completion call failed; a synthetic default was generated.
    SyntheticDefault,
}

/// Completion service abstraction (allows mocking).
pub trait CompletionClient {
    fn complete(&self, prompt: &str) -> Result<String, AnalysisError>;
}

/// Outcome of one analysis run: the normalized result plus its provenance,
/// everything the persistence layer needs to record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub tier: AnalysisTier,
    pub prompt: String,
    pub raw_response: Option<String>,
}
