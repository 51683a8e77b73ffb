// ABOUTME: Navigation seam for the sign-in redirect
// ABOUTME: Opens the authorization URL in the system browser; tests substitute a recorder

use tracing::error;

use crate::error::{AuthError, AuthResult};

/// Performs the full navigation to the identity provider's authorization URL
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str) -> AuthResult<()>;
}

/// Opens URLs in the user's default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) -> AuthResult<()> {
        open::that(url).map_err(|e| {
            error!("Failed to open browser: {}", e);
            AuthError::Navigation(format!(
                "Failed to open browser. Please manually visit: {}",
                url
            ))
        })
    }
}
