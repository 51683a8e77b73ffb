// ABOUTME: Error types for authentication and OAuth operations
// ABOUTME: Classifies callback validation failures separately from token exchange and storage errors

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization denied by identity provider: {0}")]
    OAuthDenied(String),

    #[error("Missing callback parameters: {0}")]
    MissingParameters(String),

    #[error("State mismatch: CSRF protection failed")]
    StateMismatch,

    #[error("Code verifier not found: no sign-in attempt in progress")]
    MissingVerifier,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to open browser: {0}")]
    Navigation(String),

    #[error("Callback server error: {0}")]
    CallbackServer(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthError {
    /// Short message suitable for showing to the person signing in
    pub fn user_message(&self) -> String {
        match self {
            Self::OAuthDenied(_) => "Authorization failed. Please try again.".to_string(),
            Self::MissingParameters(_) => "Invalid callback parameters.".to_string(),
            Self::StateMismatch => "Invalid state parameter. Possible CSRF attack.".to_string(),
            Self::MissingVerifier => "Code verifier not found. Please try again.".to_string(),
            Self::TokenExchange(msg) => msg.clone(),
            _ => "Authentication failed".to_string(),
        }
    }
}
