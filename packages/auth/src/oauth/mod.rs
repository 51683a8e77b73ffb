// ABOUTME: OAuth module providing the hosted-mode sign-in flow
// ABOUTME: Includes PKCE, callback server, key-value session storage, and browser navigation

pub mod manager;
pub mod navigator;
pub mod pkce;
pub mod server;
pub mod storage;
pub mod types;

pub use manager::AuthSessionManager;
pub use navigator::{BrowserNavigator, Navigator};
pub use server::{CallbackListener, CallbackServer};
pub use storage::{keys, KeyValueStore, MemoryStore, SqliteStore};
pub use types::{AuthSession, CallbackParams, PkceChallenge, UserInfo};
