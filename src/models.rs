use serde::{Deserialize, Deserializer, Serialize};

/// Request payload for the chat endpoint.
///
/// `message` may be absent from the incoming JSON or set to `null`; both
/// deserialize to the empty string, which the handler rejects the same way.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "empty_when_null")]
    pub message: String,
}

fn empty_when_null<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let message: Option<String> = Deserialize::deserialize(d)?;
    Ok(message.unwrap_or_default())
}

/// Response payload for the chat endpoint
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl ChatRequest {
    /// A request is valid when `message` is present and non-empty.
    /// Whitespace-only messages count as valid and are forwarded as-is.
    pub fn is_valid(&self) -> bool {
        !self.message.is_empty()
    }
}

impl ChatResponse {
    pub fn new(reply: String) -> Self {
        Self { reply }
    }
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}
