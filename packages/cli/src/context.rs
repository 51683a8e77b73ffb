// ABOUTME: Builds the auth session manager and research controller from configuration
// ABOUTME: Durable session storage lives in SQLite under the data directory

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

use scout_auth::{AuthSessionManager, BrowserNavigator, MemoryStore, SqliteStore};
use scout_config::ScoutConfig;
use scout_research::{
    CredentialSource, HttpResearchProvider, NoCredentials, TaskLifecycleController,
};

pub struct AppContext {
    pub config: ScoutConfig,
    pub auth: Arc<AuthSessionManager>,
}

/// Components needed by the research commands
pub struct ResearchContext {
    pub controller: TaskLifecycleController,
    pub provider: Arc<HttpResearchProvider>,
    pub credentials: Arc<dyn CredentialSource>,
}

impl AppContext {
    pub async fn new(config: ScoutConfig) -> Result<Self> {
        let db_path = config.session_db_path();
        debug!("Opening session store at {}", db_path.display());

        let durable = SqliteStore::open(&db_path)
            .await
            .with_context(|| format!("Failed to open session store at {}", db_path.display()))?;

        // Verifier and state only need to outlive a single login command
        let auth = AuthSessionManager::new(
            config.oauth.clone(),
            config.mode,
            Arc::new(MemoryStore::new()),
            Arc::new(durable),
            Arc::new(BrowserNavigator),
        );

        Ok(Self {
            config,
            auth: Arc::new(auth),
        })
    }

    pub fn research(&self) -> Result<ResearchContext> {
        let provider = Arc::new(
            HttpResearchProvider::from_config(&self.config)
                .context("Failed to configure the research provider")?,
        );

        let credentials: Arc<dyn CredentialSource> = if self.config.mode.requires_auth() {
            self.auth.clone() as Arc<dyn CredentialSource>
        } else {
            Arc::new(NoCredentials)
        };

        let controller =
            TaskLifecycleController::from_config(&self.config, provider.clone(), credentials.clone());

        Ok(ResearchContext {
            controller,
            provider,
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn config(vars: &[(&str, &str)], data_dir: &TempDir) -> ScoutConfig {
        let mut map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.insert(
            "SCOUT_DATA_DIR".to_string(),
            data_dir.path().to_string_lossy().to_string(),
        );
        ScoutConfig::from_lookup(move |key: &str| map.get(key).cloned()).unwrap()
    }

    #[tokio::test]
    async fn test_self_hosted_research_needs_api_key() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::new(config(&[], &dir)).await.unwrap();

        assert!(ctx.research().is_err());
        assert!(dir.path().join("scout.db").exists());
    }

    #[tokio::test]
    async fn test_hosted_research_uses_session_credentials() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::new(config(&[("SCOUT_APP_MODE", "hosted")], &dir))
            .await
            .unwrap();

        let research = ctx.research().unwrap();
        // Not signed in yet
        assert!(!research.credentials.credential().await.is_present());
    }
}
