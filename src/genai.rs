use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Default endpoint of the hosted Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const MODELS_PATH: &str = "/v1beta/models";

/// Failure modes of an upstream generation call.
///
/// `Api` is the service-level kind (authentication, quota, malformed
/// request); `NoText` means the call succeeded but produced nothing usable;
/// the remaining variants are transport/decoding failures.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    NoText { raw: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// An interface for sending a prompt to a generative model and receiving the
/// response text.
///
/// Implementors encapsulate transport, serialization, and vendor-specific
/// API details. Handlers depend on `Arc<dyn ChatModel>` so tests can swap in
/// a scripted stand-in.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `prompt` as the full user message and return the generated text.
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError>;
}

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    contents: Vec<ApiContent<'a>>,
}

#[derive(serde::Serialize)]
struct ApiContent<'a> {
    role: &'a str,
    parts: Vec<ApiPart<'a>>,
}

#[derive(serde::Serialize)]
struct ApiPart<'a> {
    text: &'a str,
}

/// Minimal subset of the `generateContent` response we care about.
#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    // Parts carrying non-text payloads (function calls etc.) have no `text`.
    text: Option<String>,
}

/// Structured error body the API returns alongside non-success statuses.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// HTTP client for the Generative Language `generateContent` API.
///
/// The model identifier is baked into the endpoint URL at construction time;
/// one call maps to exactly one upstream request, with no retries and no
/// timeout beyond reqwest's defaults.
///
/// The base URL is overridable (via `GEMINI_BASE_URL` in [`crate::config`])
/// so the client can target a compatible server or a local mock in tests.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl GeminiClient {
    /// Create a new client for `model` served at `base_url`.
    pub fn new(api_key: impl Into<String>, model: &str, base_url: &str) -> Self {
        let url = format!(
            "{}{}/{}:generateContent",
            base_url.trim_end_matches('/'),
            MODELS_PATH,
            model
        );
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            url,
        }
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        let request = ApiRequest {
            contents: vec![ApiContent {
                role: "user",
                parts: vec![ApiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GeminiClient: API returned {status}: {body}");
            let message = parse_api_error(&body).unwrap_or(body);
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Keep the raw body around: callers surface it verbatim when the
        // response carries no text.
        let body = response.text().await?;
        debug!("GeminiClient: response body: {body}");
        let api_response: ApiResponse = serde_json::from_str(&body)?;

        match extract_text(&api_response) {
            Some(text) => Ok(text),
            None => Err(UpstreamError::NoText { raw: body }),
        }
    }
}

/// Concatenate the text parts of the first candidate, if any.
fn extract_text(response: &ApiResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

/// Pull the human-readable message out of a structured API error body.
fn parse_api_error(body: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    match parsed.error.status {
        Some(status) => Some(format!("{status}: {}", parsed.error.message)),
        None => Some(parsed.error.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ApiResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let response = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hi "},{"text":"there!"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_text(&response).as_deref(), Some("Hi there!"));
    }

    #[test]
    fn test_extract_text_empty_when_no_candidates() {
        assert!(extract_text(&parse(r#"{"candidates":[]}"#)).is_none());
        assert!(extract_text(&parse("{}")).is_none());
    }

    #[test]
    fn test_extract_text_empty_when_candidate_has_no_content() {
        let response = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(extract_text(&response).is_none());
    }

    #[test]
    fn test_extract_text_skips_non_text_parts() {
        let response = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"functionCall":{"name":"lookup"}}]}}]}"#,
        );
        assert!(extract_text(&response).is_none());
    }

    #[test]
    fn test_parse_api_error_includes_status_and_message() {
        let message = parse_api_error(
            r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#,
        )
        .unwrap();
        assert!(message.contains("RESOURCE_EXHAUSTED"));
        assert!(message.contains("Quota exceeded"));
    }

    #[test]
    fn test_parse_api_error_without_status_field() {
        let message = parse_api_error(r#"{"error":{"message":"bad key"}}"#).unwrap();
        assert_eq!(message, "bad key");
    }

    #[test]
    fn test_parse_api_error_rejects_non_json() {
        assert!(parse_api_error("<html>502 Bad Gateway</html>").is_none());
    }

    #[test]
    fn test_endpoint_url_strips_trailing_slash() {
        let client = GeminiClient::new("key", "gemini-2.5-flash", "http://localhost:9000/");
        assert_eq!(
            client.url,
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
