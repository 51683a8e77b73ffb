// ABOUTME: Error types for research task operations
// ABOUTME: Separates local validation, auth, provider, transient network, and cancellation failures

use thiserror::Error;

pub type ResearchResult<T> = Result<T, ResearchError>;

#[derive(Debug, Error)]
pub enum ResearchError {
    /// Bad local input; no network call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Hosted mode without a credential, or the provider demanded sign-in
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// Malformed or unexpected provider response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Network failure or 5xx; the poll loop retries on its next tick
    #[error("Network error: {0}")]
    TransientNetwork(String),

    /// Provider refused a cancel for a reason other than the task already being finished
    #[error("Cancellation failed: {0}")]
    Cancellation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ResearchError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn auth_required() -> Self {
        Self::AuthRequired("Sign in to continue.".to_string())
    }

    /// Check if this error should be retried by the next poll
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork(_))
    }

    /// Check if the caller must (re-)authenticate
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired(_))
    }
}

impl From<reqwest::Error> for ResearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Provider(format!("Invalid provider response: {}", err))
        } else if err.is_builder() {
            Self::Configuration(err.to_string())
        } else {
            // Timeouts, connection failures and interrupted bodies
            Self::TransientNetwork(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ResearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Provider(format!("Invalid provider response: {}", err))
    }
}
