// ABOUTME: CLI commands for hosted-mode sign-in
// ABOUTME: Login via browser and local callback server, logout, and session display

use anyhow::{anyhow, bail, Result};
use colored::*;
use std::time::Duration;
use tracing::debug;

use scout_auth::{AuthError, CallbackServer};
use scout_cli::AppContext;

/// How long to wait for the browser to hit the redirect URI
const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

pub async fn login(ctx: &AppContext) -> Result<()> {
    if !ctx.config.mode.requires_auth() {
        println!(
            "{} Running in {} mode, sign-in is not needed.",
            "ℹ".cyan(),
            ctx.config.mode
        );
        return Ok(());
    }

    if !ctx.config.oauth.is_configured() {
        // Logs which settings are missing
        ctx.auth.begin_sign_in().await?;
        bail!("OAuth is not configured");
    }

    let Some(redirect_uri) = ctx.config.oauth.redirect_uri.as_deref() else {
        bail!("SCOUT_OAUTH_REDIRECT_URI is not set");
    };

    // Bind before the browser can redirect back
    let listener = CallbackServer::from_redirect_uri(redirect_uri)?.listen().await?;
    debug!("Waiting for OAuth callback on {}", redirect_uri);

    match ctx.auth.begin_sign_in().await {
        Ok(Some(url)) => {
            println!("{}", "Opening your browser to sign in...".bold().cyan());
            println!("If it does not open, visit:\n  {}", url);
        }
        Ok(None) => bail!("OAuth is not configured"),
        Err(AuthError::Navigation(msg)) => println!("{} {}", "⚠".yellow(), msg),
        Err(e) => return Err(e.into()),
    }

    let params = tokio::time::timeout(LOGIN_TIMEOUT, listener.accept_callback())
        .await
        .map_err(|_| anyhow!("Timed out waiting for the sign-in callback"))??;

    let session = ctx.auth.complete_sign_in(&params).await.map_err(|e| {
        debug!("Sign-in failed: {}", e);
        anyhow!(e.user_message())
    })?;

    println!(
        "{} Signed in as {} ({})",
        "✓".green().bold(),
        session.user.display_name().bold(),
        session.user.email
    );
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.auth.sign_out().await;
    println!("{} Signed out", "✓".green().bold());
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.auth.current_session().await {
        Some(session) => {
            println!("{} {}", "User:".bold(), session.user.display_name());
            println!("{} {}", "Email:".bold(), session.user.email);
            if let Some(verified) = session.user.email_verified {
                println!("{} {}", "Verified:".bold(), verified);
            }
        }
        None => println!("Not signed in"),
    }
    println!("{} {}", "Mode:".bold(), ctx.config.mode);
    Ok(())
}
