// ABOUTME: Auth session manager orchestrating the hosted-mode sign-in flow
// ABOUTME: Handles sign-in initiation, callback validation, token exchange, session reads, and sign-out

use std::sync::Arc;

use reqwest::Client;
use scout_config::{AppMode, OAuthSettings};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    error::{AuthError, AuthResult},
    oauth::{
        navigator::Navigator,
        pkce::{generate_pkce_challenge, generate_state},
        storage::{keys, KeyValueStore},
        types::{
            AuthSession, CallbackParams, PkceChallenge, TokenErrorResponse, TokenExchangeRequest,
            TokenResponse, UserInfo,
        },
    },
};

/// Authorization endpoint path, resolved against the configured identity-provider base
const AUTHORIZE_PATH: &str = "/auth/v1/oauth/authorize";

/// Scopes requested on every sign-in
const SCOPES: &str = "openid profile email";

/// Manages the OAuth 2.0 Authorization Code + PKCE flow and the resulting session
pub struct AuthSessionManager {
    settings: OAuthSettings,
    mode: AppMode,
    ephemeral: Arc<dyn KeyValueStore>,
    durable: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    client: Client,
}

impl AuthSessionManager {
    /// Create a new manager.
    ///
    /// `ephemeral` holds the in-flight verifier and state (tab-scoped);
    /// `durable` holds the access token and user record until sign-out.
    pub fn new(
        settings: OAuthSettings,
        mode: AppMode,
        ephemeral: Arc<dyn KeyValueStore>,
        durable: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            settings,
            mode,
            ephemeral,
            durable,
            navigator,
            client: Client::new(),
        }
    }

    /// Use a preconfigured HTTP client for the token exchange
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Start a sign-in attempt.
    ///
    /// Generates a fresh verifier and state, stores both in ephemeral storage,
    /// and navigates to the authorization URL, which is also returned. When
    /// client id, authorize base or redirect URI is missing this only logs a
    /// warning and returns `Ok(None)`.
    pub async fn begin_sign_in(&self) -> AuthResult<Option<String>> {
        let (Some(client_id), Some(auth_url), Some(redirect_uri)) = (
            self.settings.client_id.as_deref(),
            self.settings.auth_url.as_deref(),
            self.settings.redirect_uri.as_deref(),
        ) else {
            warn!(
                "OAuth is not configured. Set SCOUT_OAUTH_CLIENT_ID, SCOUT_OAUTH_AUTH_URL, and SCOUT_OAUTH_REDIRECT_URI."
            );
            return Ok(None);
        };

        info!("Starting OAuth sign-in");

        let pkce = generate_pkce_challenge();
        let state = generate_state();
        debug!("Generated PKCE challenge and state parameter");

        let authorize_url = build_authorize_url(auth_url, client_id, redirect_uri, &pkce, &state)?;

        self.ephemeral
            .set(keys::CODE_VERIFIER, &pkce.code_verifier)
            .await?;
        self.ephemeral.set(keys::STATE, &state).await?;

        self.navigator.navigate(&authorize_url)?;

        Ok(Some(authorize_url))
    }

    /// Finish a sign-in attempt from the redirect callback.
    ///
    /// Validates, in order: no `error` parameter, code and state present,
    /// state matches the stored attempt, stored verifier exists. Only then is
    /// the code exchanged. Verifier and state are single-use: they are removed
    /// once the exchange has been attempted, whatever its outcome.
    pub async fn complete_sign_in(&self, params: &CallbackParams) -> AuthResult<AuthSession> {
        if let Some(err) = &params.error {
            warn!("Identity provider returned error: {}", err);
            let detail = match &params.error_description {
                Some(description) => format!("{} ({})", err, description),
                None => err.clone(),
            };
            return Err(AuthError::OAuthDenied(detail));
        }

        let code = non_empty(params.code.as_deref())
            .ok_or_else(|| AuthError::MissingParameters("code".to_string()))?;
        let received_state = non_empty(params.state.as_deref())
            .ok_or_else(|| AuthError::MissingParameters("state".to_string()))?;

        // No stored state means no attempt is in flight (never started, or
        // already consumed), which is the same condition as a missing verifier.
        let stored_state = self
            .ephemeral
            .get(keys::STATE)
            .await?
            .ok_or(AuthError::MissingVerifier)?;
        if received_state != stored_state {
            error!("State mismatch on OAuth callback");
            return Err(AuthError::StateMismatch);
        }

        let code_verifier = self
            .ephemeral
            .get(keys::CODE_VERIFIER)
            .await?
            .ok_or(AuthError::MissingVerifier)?;

        info!("✅ State validated, exchanging authorization code");

        let exchanged = self.exchange_code_for_token(code, &code_verifier).await;
        self.clear_pending_attempt().await;
        let token_response = exchanged?;

        let user_json = serde_json::to_string(&token_response.user)?;
        self.durable
            .set(keys::ACCESS_TOKEN, &token_response.access_token)
            .await?;
        self.durable.set(keys::USER, &user_json).await?;

        info!("✅ Signed in as {}", token_response.user.email);

        Ok(AuthSession {
            access_token: token_response.access_token,
            user: token_response.user,
        })
    }

    /// Clear the persisted session. Storage failures are logged, never returned.
    pub async fn sign_out(&self) {
        info!("Signing out");
        for key in [keys::USER, keys::ACCESS_TOKEN] {
            if let Err(e) = self.durable.remove(key).await {
                error!("Failed to remove {} during sign-out: {}", key, e);
            }
        }
    }

    /// Read the persisted session.
    ///
    /// A user record that fails to parse is removed and treated as absent.
    pub async fn current_session(&self) -> Option<AuthSession> {
        let user_json = self.read_durable(keys::USER).await?;

        let user: UserInfo = match serde_json::from_str(&user_json) {
            Ok(user) => user,
            Err(e) => {
                error!("Failed to parse stored user data: {}", e);
                if let Err(e) = self.durable.remove(keys::USER).await {
                    error!("Failed to remove corrupt user data: {}", e);
                }
                return None;
            }
        };

        let access_token = self.read_durable(keys::ACCESS_TOKEN).await?;
        Some(AuthSession { access_token, user })
    }

    /// Bearer token to attach to provider calls; always `None` in self-hosted mode
    pub async fn access_token(&self) -> Option<String> {
        if !self.mode.requires_auth() {
            return None;
        }
        self.read_durable(keys::ACCESS_TOKEN).await
    }

    async fn read_durable(&self, key: &str) -> Option<String> {
        match self.durable.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                error!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    async fn clear_pending_attempt(&self) {
        for key in [keys::CODE_VERIFIER, keys::STATE] {
            if let Err(e) = self.ephemeral.remove(key).await {
                error!("Failed to clear {}: {}", key, e);
            }
        }
    }

    /// Exchange authorization code and verifier for an access token and user profile
    async fn exchange_code_for_token(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> AuthResult<TokenResponse> {
        let request = TokenExchangeRequest {
            code: code.to_string(),
            code_verifier: code_verifier.to_string(),
        };

        let response = self
            .client
            .post(&self.settings.token_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AuthError::TokenExchange(format!("Failed to exchange code: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            // Only the status is logged; the body may echo credentials
            error!("Token exchange failed with status {}", status);
            let body: TokenErrorResponse = response.json().await.unwrap_or_default();
            let message = body
                .error
                .or(body.error_description)
                .unwrap_or_else(|| format!("Token exchange failed with status {}", status));
            return Err(AuthError::TokenExchange(message));
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            AuthError::TokenExchange(format!("Failed to parse token response: {}", e))
        })
    }
}

/// Build the authorization URL with PKCE challenge and state parameter
pub fn build_authorize_url(
    auth_base: &str,
    client_id: &str,
    redirect_uri: &str,
    pkce: &PkceChallenge,
    state: &str,
) -> AuthResult<String> {
    let mut url = Url::parse(auth_base)
        .and_then(|base| base.join(AUTHORIZE_PATH))
        .map_err(|e| AuthError::Configuration(format!("Invalid auth URL: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", SCOPES)
        .append_pair("code_challenge", &pkce.code_challenge)
        .append_pair("code_challenge_method", &pkce.code_challenge_method)
        .append_pair("state", state);

    Ok(url.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
