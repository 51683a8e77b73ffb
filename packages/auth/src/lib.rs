// ABOUTME: Scout authentication library providing the hosted-mode sign-in flow
// ABOUTME: OAuth 2.0 Authorization Code with PKCE, CSRF state validation, and session persistence

pub mod error;
pub mod oauth;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use oauth::{
    AuthSession, AuthSessionManager, BrowserNavigator, CallbackListener, CallbackParams,
    CallbackServer, KeyValueStore, MemoryStore, Navigator, PkceChallenge, SqliteStore, UserInfo,
};
