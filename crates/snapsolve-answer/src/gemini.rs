use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use snapsolve_config::service::ServiceConfig;

use crate::prompt::PROMPT;
use crate::retry::RetryPolicy;
use crate::{AnswerError, AnswerService};

/// Client for the Gemini `generateContent` REST endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, config: &ServiceConfig) -> Result<Self, AnswerError> {
        Self::with_settings(
            api_key,
            &config.model,
            &config.api_url,
            config.timeout(),
            RetryPolicy::new(config.max_retries(), config.retry_backoff()),
        )
    }

    pub fn with_settings(
        api_key: impl Into<String>,
        model: &str,
        api_url: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, AnswerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.to_string(),
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                api_url.trim_end_matches('/'),
                model
            ),
            retry,
        })
    }

    async fn generate_once(&self, request: &GenerateContentRequest) -> Result<String, AnswerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        extract_reply(&body)
    }
}

#[async_trait]
impl AnswerService for GeminiClient {
    async fn answer(&self, png: &[u8]) -> Result<String, AnswerError> {
        let request = GenerateContentRequest::for_screenshot(png);
        let request = &request;

        tracing::info!("Sending {} byte screenshot to {}", png.len(), self.model);
        self.retry.run(move || self.generate_once(request)).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

impl GenerateContentRequest {
    /// Fixed prompt followed by the PNG payload
    fn for_screenshot(png: &[u8]) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text(PROMPT),
                    RequestPart::InlineData(Blob {
                        mime_type: "image/png",
                        data: STANDARD.encode(png),
                    }),
                ],
            }],
        }
    }
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum RequestPart {
    Text(&'static str),
    InlineData(Blob),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: &'static str,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

/// Pull the reply text out of a successful response body
fn extract_reply(body: &str) -> Result<String, AnswerError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| AnswerError::MalformedResponse(e.to_string()))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked ({r})"))
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(AnswerError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text)
        .collect();

    let text = text.trim();
    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!("no text in reply (finish reason {r})"))
            .unwrap_or_else(|| "no text in reply".to_string());
        return Err(AnswerError::EmptyResponse(reason));
    }

    Ok(text.to_string())
}

/// Map a non-success HTTP status to an error kind
fn classify_status(status: StatusCode, body: &str) -> AnswerError {
    let error = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = error
        .as_ref()
        .map(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().chars().take(200).collect());

    let invalid_key = body.contains("API_KEY_INVALID")
        || error
            .as_ref()
            .and_then(|e| e.status.as_deref())
            .is_some_and(|s| s == "UNAUTHENTICATED" || s == "PERMISSION_DENIED");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AnswerError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => AnswerError::RateLimitExceeded,
        _ if invalid_key => AnswerError::Authentication(message),
        _ => AnswerError::Api {
            status: status.as_u16(),
            message,
        },
    }
}
