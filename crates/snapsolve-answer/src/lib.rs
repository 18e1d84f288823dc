mod gemini;
mod prompt;
mod retry;

pub use gemini::GeminiClient;
pub use prompt::{PROMPT, follows_answer_format};
pub use retry::RetryPolicy;

/// A remote model that can answer the question shown in a screenshot
#[async_trait::async_trait]
pub trait AnswerService: Send + Sync {
    /// Send the screenshot with the fixed prompt and return the trimmed reply
    async fn answer(&self, png: &[u8]) -> Result<String, AnswerError>;

    /// Model identifier, for display
    fn model(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

impl AnswerError {
    /// Failures worth another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            AnswerError::Timeout | AnswerError::Network(_) | AnswerError::RateLimitExceeded => true,
            AnswerError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AnswerError::Timeout)
    }
}

impl From<reqwest::Error> for AnswerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnswerError::Timeout
        } else {
            AnswerError::Network(e)
        }
    }
}
