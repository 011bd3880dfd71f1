use serde::{Deserialize, Serialize};

use super::types::CompletionClient;
use super::AnalysisError;
use crate::config;

/// Gemini HTTP client for the completion boundary.
///
/// Issues one blocking `generateContent` call per analysis and extracts the
/// single nested text string from the candidates/content/parts envelope.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Create a client against an explicit endpoint (tests point this at a stub).
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Create the production client from configuration and environment.
    pub fn from_env() -> Result<Self, AnalysisError> {
        let api_key = config::gemini_api_key()
            .ok_or_else(|| AnalysisError::MissingApiKey(config::GEMINI_API_KEY_ENV.into()))?;
        Ok(Self::new(
            config::GEMINI_BASE_URL,
            config::GEMINI_MODEL,
            &api_key,
            config::COMPLETION_TIMEOUT_SECS,
        ))
    }
}

/// Request body for generateContent
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response envelope from generateContent; every level is optional because
/// safety-filtered replies can come back with candidates but no parts.
#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl CompletionClient for GeminiClient {
    fn complete(&self, prompt: &str) -> Result<String, AnalysisError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AnalysisError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    AnalysisError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    AnalysisError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

        extract_candidate_text(parsed)
    }
}

/// Walk the candidates[0].content.parts[0].text path.
fn extract_candidate_text(response: GenerateContentResponse) -> Result<String, AnalysisError> {
    let text = response
        .candidates
        .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .and_then(|mut p| if p.is_empty() { None } else { Some(p.remove(0)) })
        .and_then(|p| p.text);

    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(AnalysisError::EmptyResponse),
    }
}

/// Mock completion client for testing — returns a configurable response.
pub struct MockCompletionClient {
    response: Result<String, AnalysisError>,
}

impl MockCompletionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
        }
    }

    /// A client that always fails, simulating a transport/API error.
    pub fn failing() -> Self {
        Self {
            response: Err(AnalysisError::Api {
                status: 503,
                body: "service unavailable".into(),
            }),
        }
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete(&self, _prompt: &str) -> Result<String, AnalysisError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(AnalysisError::Api { status, body }) => Err(AnalysisError::Api {
                status: *status,
                body: body.clone(),
            }),
            Err(e) => Err(AnalysisError::HttpClient(e.to_string())),
        }
    }
}
