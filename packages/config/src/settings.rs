// ABOUTME: Typed Scout settings loaded from environment variables
// ABOUTME: Groups research provider, platform, OAuth, polling, and local data settings

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::{
    constants::*,
    env::{non_blank, parse_or_default, url_or_default},
    error::ConfigResult,
    mode::AppMode,
};

/// Research provider settings used in self-hosted mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

/// OAuth client settings for hosted mode.
///
/// Client id, authorize base and redirect URI are optional: when any is
/// missing, sign-in is a logged no-op rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    pub client_id: Option<String>,
    pub auth_url: Option<String>,
    pub redirect_uri: Option<String>,
    pub token_url: String,
}

impl OAuthSettings {
    /// Check if client id, authorize base and redirect URI are all present
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.auth_url.is_some() && self.redirect_uri.is_some()
    }
}

/// Complete Scout configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoutConfig {
    pub mode: AppMode,
    pub research: ResearchSettings,
    pub platform_url: String,
    pub oauth: OAuthSettings,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    pub data_dir: PathBuf,
}

impl ScoutConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = AppMode::from_toggle(non_blank(&lookup, SCOUT_APP_MODE).as_deref());

        let research = ResearchSettings {
            api_url: url_or_default(&lookup, SCOUT_RESEARCH_API_URL, DEFAULT_RESEARCH_API_URL)?,
            api_key: non_blank(&lookup, SCOUT_RESEARCH_API_KEY),
            model: non_blank(&lookup, SCOUT_RESEARCH_MODEL)
                .unwrap_or_else(|| DEFAULT_RESEARCH_MODEL.to_string()),
        };

        let platform_url = url_or_default(&lookup, SCOUT_PLATFORM_URL, DEFAULT_PLATFORM_URL)?;
        let default_token_url = format!("{}{}", platform_url, PLATFORM_TOKEN_PATH);

        let oauth = OAuthSettings {
            client_id: non_blank(&lookup, SCOUT_OAUTH_CLIENT_ID),
            auth_url: non_blank(&lookup, SCOUT_OAUTH_AUTH_URL),
            redirect_uri: non_blank(&lookup, SCOUT_OAUTH_REDIRECT_URI),
            token_url: url_or_default(&lookup, SCOUT_OAUTH_TOKEN_URL, &default_token_url)?,
        };

        let poll_secs = parse_or_default(
            &lookup,
            SCOUT_POLL_INTERVAL_SECS,
            DEFAULT_POLL_INTERVAL_SECS,
            |v| (1..=MAX_POLL_INTERVAL_SECS).contains(v),
        )?;
        let timeout_secs =
            parse_or_default(&lookup, SCOUT_HTTP_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS, |v| {
                *v > 0
            })?;

        let data_dir = non_blank(&lookup, SCOUT_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        debug!("Loaded configuration (mode: {})", mode);

        Ok(Self {
            mode,
            research,
            platform_url,
            oauth,
            poll_interval: Duration::from_secs(poll_secs),
            http_timeout: Duration::from_secs(timeout_secs),
            data_dir,
        })
    }

    /// URL of the platform API gateway used in hosted mode
    pub fn proxy_url(&self) -> String {
        format!("{}{}", self.platform_url, PLATFORM_PROXY_PATH)
    }

    /// Path of the durable session database
    pub fn session_db_path(&self) -> PathBuf {
        self.data_dir.join("scout.db")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scout")
}
