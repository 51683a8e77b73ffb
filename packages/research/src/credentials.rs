// ABOUTME: Bearer credentials attached to provider calls in hosted mode
// ABOUTME: CredentialSource resolves them from the signed-in session or from nowhere

use async_trait::async_trait;
use scout_auth::AuthSessionManager;
use std::fmt;

/// Optional bearer token for one provider call. Debug output never shows the token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    bearer: Option<String>,
}

impl Credential {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.bearer.is_some()
    }
}

impl From<Option<String>> for Credential {
    fn from(bearer: Option<String>) -> Self {
        Self {
            bearer: bearer.filter(|token| !token.is_empty()),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.is_present() { "Bearer <redacted>" } else { "None" };
        f.debug_tuple("Credential").field(&shown).finish()
    }
}

#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn credential(&self) -> Credential;
}

/// Source for self-hosted deployments, where provider calls carry no bearer token
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

#[async_trait]
impl CredentialSource for NoCredentials {
    async fn credential(&self) -> Credential {
        Credential::none()
    }
}

#[async_trait]
impl CredentialSource for AuthSessionManager {
    async fn credential(&self) -> Credential {
        self.access_token().await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::bearer("secret-token");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let credential: Credential = Some(String::new()).into();
        assert!(!credential.is_present());
    }

    #[tokio::test]
    async fn test_no_credentials() {
        assert_eq!(NoCredentials.credential().await, Credential::none());
    }
}
