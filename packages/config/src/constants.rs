// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Scout

// Deployment Mode
pub const SCOUT_APP_MODE: &str = "SCOUT_APP_MODE";

// Research Provider (self-hosted mode)
pub const SCOUT_RESEARCH_API_URL: &str = "SCOUT_RESEARCH_API_URL";
pub const SCOUT_RESEARCH_API_KEY: &str = "SCOUT_RESEARCH_API_KEY";
pub const SCOUT_RESEARCH_MODEL: &str = "SCOUT_RESEARCH_MODEL";

// Platform (hosted mode)
pub const SCOUT_PLATFORM_URL: &str = "SCOUT_PLATFORM_URL";

// OAuth Configuration
pub const SCOUT_OAUTH_CLIENT_ID: &str = "SCOUT_OAUTH_CLIENT_ID";
pub const SCOUT_OAUTH_AUTH_URL: &str = "SCOUT_OAUTH_AUTH_URL";
pub const SCOUT_OAUTH_REDIRECT_URI: &str = "SCOUT_OAUTH_REDIRECT_URI";
pub const SCOUT_OAUTH_TOKEN_URL: &str = "SCOUT_OAUTH_TOKEN_URL";

// Polling & HTTP
pub const SCOUT_POLL_INTERVAL_SECS: &str = "SCOUT_POLL_INTERVAL_SECS";
pub const SCOUT_HTTP_TIMEOUT_SECS: &str = "SCOUT_HTTP_TIMEOUT_SECS";

// Local Data
pub const SCOUT_DATA_DIR: &str = "SCOUT_DATA_DIR";

// Defaults
pub const DEFAULT_RESEARCH_API_URL: &str = "https://api.valyu.ai";
pub const DEFAULT_PLATFORM_URL: &str = "https://platform.valyu.ai";
pub const DEFAULT_RESEARCH_MODEL: &str = "fast";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const MAX_POLL_INTERVAL_SECS: u64 = 300;
/// Heaviest call (task creation) may take up to ~13 minutes
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 800;

/// Path of the platform's API gateway, relative to the platform URL
pub const PLATFORM_PROXY_PATH: &str = "/api/oauth/proxy";
/// Path of the platform's token endpoint, relative to the platform URL
pub const PLATFORM_TOKEN_PATH: &str = "/api/oauth/token";
