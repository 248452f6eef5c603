use std::sync::Arc;

use axum::{Extension, extract::Json, response::Json as ResponseJson};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::genai::ChatModel;
use crate::models::{ChatRequest, ChatResponse, HealthResponse};

/// Health check handler
/// Returns the service status and health information
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");

    Ok(ResponseJson(HealthResponse::ok()))
}

/// Chat relay handler
/// Accepts a JSON payload with a message, forwards it to the upstream model
/// and returns the generated reply
pub async fn chat_handler(
    Extension(model): Extension<Arc<dyn ChatModel>>,
    Json(payload): Json<ChatRequest>,
) -> AppResult<ResponseJson<ChatResponse>> {
    info!("Chat endpoint called with message: {}", payload.message);

    // Validate the request
    if !payload.is_valid() {
        return Err(AppError::BadRequest("Empty message".to_string()));
    }

    // Single synchronous upstream call; errors surface directly to the caller
    let reply = model.generate(&payload.message).await?;

    info!("Successfully generated reply ({} chars)", reply.len());
    Ok(ResponseJson(ChatResponse::new(reply)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::UpstreamError;
    use async_trait::async_trait;

    enum Script {
        Reply(&'static str),
        NoText(&'static str),
        ApiError(u16, &'static str),
    }

    struct ScriptedModel(Script);

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, UpstreamError> {
            match &self.0 {
                Script::Reply(text) => Ok((*text).to_string()),
                Script::NoText(raw) => Err(UpstreamError::NoText {
                    raw: (*raw).to_string(),
                }),
                Script::ApiError(status, message) => Err(UpstreamError::Api {
                    status: *status,
                    message: (*message).to_string(),
                }),
            }
        }
    }

    fn model(script: Script) -> Extension<Arc<dyn ChatModel>> {
        Extension(Arc::new(ScriptedModel(script)) as Arc<dyn ChatModel>)
    }

    fn request(message: &str) -> Json<ChatRequest> {
        Json(ChatRequest {
            message: message.to_string(),
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let result = health_check().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_chat_handler_returns_reply() {
        let result = chat_handler(model(Script::Reply("Hi there!")), request("hello")).await;
        let response = result.unwrap();
        assert_eq!(response.0.reply, "Hi there!");
    }

    #[tokio::test]
    async fn test_chat_handler_rejects_empty_message() {
        let result = chat_handler(model(Script::Reply("unused")), request("")).await;
        assert!(matches!(result, Err(AppError::BadRequest(message)) if message == "Empty message"));
    }

    #[tokio::test]
    async fn test_chat_handler_surfaces_missing_text() {
        let raw = r#"{"candidates":[]}"#;
        let result = chat_handler(model(Script::NoText(raw)), request("hello")).await;
        assert!(matches!(result, Err(AppError::UpstreamEmpty(details)) if details == raw));
    }

    #[tokio::test]
    async fn test_chat_handler_surfaces_api_error() {
        let result = chat_handler(
            model(Script::ApiError(401, "API key not valid")),
            request("hello"),
        )
        .await;
        match result {
            Err(AppError::UpstreamApi(details)) => {
                assert!(details.contains("401"));
                assert!(details.contains("API key not valid"));
            }
            other => panic!("expected upstream API error, got {other:?}"),
        }
    }
}
