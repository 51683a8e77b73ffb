// ABOUTME: Task lifecycle controller for deep research tasks
// ABOUTME: Validates input, enforces the hosted-mode credential guard, and starts cancellable poll loops

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use scout_config::constants::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_RESEARCH_MODEL};
use scout_config::{AppMode, ScoutConfig};

use crate::brief::CompetitorBrief;
use crate::credentials::{Credential, CredentialSource};
use crate::error::{ResearchError, ResearchResult};
use crate::provider::{require_task_id, CancelOutcome, CreateTaskRequest, ResearchProvider};
use crate::tracker::TaskHandle;
use crate::types::{ResearchTask, TaskStatus};

/// Acknowledgement of a cancel request. Always reports `cancelled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelAck {
    pub task_id: String,
    pub status: TaskStatus,
    /// The provider reported the task had already finished
    pub already_terminal: bool,
}

#[derive(Clone)]
pub struct TaskLifecycleController {
    provider: Arc<dyn ResearchProvider>,
    credentials: Arc<dyn CredentialSource>,
    mode: AppMode,
    poll_interval: Duration,
    model: String,
}

impl TaskLifecycleController {
    pub fn new(
        provider: Arc<dyn ResearchProvider>,
        credentials: Arc<dyn CredentialSource>,
        mode: AppMode,
    ) -> Self {
        Self {
            provider,
            credentials,
            mode,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            model: DEFAULT_RESEARCH_MODEL.to_string(),
        }
    }

    /// Build a controller using the configured mode, cadence and model
    pub fn from_config(
        config: &ScoutConfig,
        provider: Arc<dyn ResearchProvider>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self::new(provider, credentials, config.mode)
            .with_poll_interval(config.poll_interval)
            .with_model(config.research.model.clone())
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Resolve the credential the provider call should carry. Hosted mode
    /// without one fails before anything reaches the network; self-hosted
    /// mode never attaches one.
    fn guard_credential(&self, credential: &Credential) -> ResearchResult<Credential> {
        match self.mode {
            AppMode::Hosted if !credential.is_present() => Err(ResearchError::auth_required()),
            AppMode::Hosted => Ok(credential.clone()),
            AppMode::SelfHosted => Ok(Credential::none()),
        }
    }

    /// Submit a research task and return its id
    pub async fn submit(
        &self,
        query: &str,
        urls: &[String],
        credential: &Credential,
    ) -> ResearchResult<String> {
        if query.trim().is_empty() {
            return Err(ResearchError::validation("Research query is required"));
        }
        if urls.is_empty() {
            return Err(ResearchError::validation("At least one URL is required"));
        }
        if urls.iter().any(|url| url.trim().is_empty()) {
            return Err(ResearchError::validation("URLs must not be blank"));
        }

        let credential = self.guard_credential(credential)?;
        let request = CreateTaskRequest::new(query, urls.to_vec(), self.model.clone());

        let task_id = self.provider.create_task(&request, &credential).await?;
        info!("Research task created: {}", task_id);
        Ok(task_id)
    }

    /// Fetch one status snapshot. No retry; safe to call after a terminal status.
    pub async fn poll(&self, task_id: &str, credential: &Credential) -> ResearchResult<ResearchTask> {
        let task_id = require_task_id(task_id)?;
        let credential = self.guard_credential(credential)?;

        let task = self.provider.get_status(task_id, &credential).await?;
        if let Some(progress) = task.progress {
            debug!(
                "Task {} progress: {}/{}",
                task_id, progress.current_step, progress.total_steps
            );
        }
        Ok(task)
    }

    /// Cancel a task. A task that already finished still acknowledges as cancelled.
    pub async fn cancel(&self, task_id: &str, credential: &Credential) -> ResearchResult<CancelAck> {
        let task_id = require_task_id(task_id)?;
        let credential = self.guard_credential(credential)?;

        let outcome = match self.provider.cancel_task(task_id, &credential).await {
            Ok(outcome) => outcome,
            Err(ResearchError::AuthRequired(msg)) => return Err(ResearchError::AuthRequired(msg)),
            Err(ResearchError::Cancellation(msg)) => return Err(ResearchError::Cancellation(msg)),
            Err(e) => {
                warn!("Failed to cancel task {}: {}", task_id, e);
                return Err(ResearchError::Cancellation(e.to_string()));
            }
        };

        let already_terminal = outcome == CancelOutcome::AlreadyTerminal;
        if already_terminal {
            info!("Task {} was already finished when cancelled", task_id);
        } else {
            info!("Task {} cancelled", task_id);
        }

        Ok(CancelAck {
            task_id: task_id.to_string(),
            status: TaskStatus::Cancelled,
            already_terminal,
        })
    }

    /// Submit with the current session's credential and start polling in the background
    pub async fn start(&self, query: &str, urls: &[String]) -> ResearchResult<TaskHandle> {
        let credential = self.credentials.credential().await;
        let task_id = self.submit(query, urls, &credential).await?;
        Ok(TaskHandle::spawn(self.clone(), task_id, credential))
    }

    pub async fn start_brief(&self, brief: &CompetitorBrief) -> ResearchResult<TaskHandle> {
        self.start(&brief.research_query(), &brief.seed_urls()).await
    }

    /// Re-attach a poll loop to a task submitted earlier
    pub async fn resume(&self, task_id: &str) -> ResearchResult<TaskHandle> {
        let task_id = require_task_id(task_id)?;
        let credential = self.credentials.credential().await;
        self.guard_credential(&credential)?;
        Ok(TaskHandle::spawn(self.clone(), task_id.to_string(), credential))
    }
}
