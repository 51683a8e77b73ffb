// ABOUTME: Research task snapshot types shared by the provider client and the controller
// ABOUTME: Status lifecycle, progress, sources, and usage costs with provider wire names

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Provider-side lifecycle of a research task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Human readable status line
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Queued => "Task queued, waiting to start...",
            Self::Running => "Research in progress...",
            Self::Completed => "Research completed",
            Self::Failed => "Research failed",
            Self::Cancelled => "Research cancelled",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current_step: u32,
    pub total_steps: u32,
}

impl Progress {
    pub fn is_valid(&self) -> bool {
        self.current_step <= self.total_steps
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: String,
    pub url: String,
}

/// Cost breakdown reported by the provider, in dollars
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub search_cost: f64,
    #[serde(default)]
    pub ai_cost: f64,
    #[serde(default)]
    pub compute_cost: f64,
    #[serde(default)]
    pub total_cost: f64,
}

impl Usage {
    fn is_valid(&self) -> bool {
        [self.search_cost, self.ai_cost, self.compute_cost, self.total_cost]
            .iter()
            .all(|cost| cost.is_finite() && *cost >= 0.0)
    }
}

/// Point-in-time snapshot of a research task as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchTask {
    #[serde(rename = "deepresearch_id", default)]
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl ResearchTask {
    pub fn new(task_id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            progress: None,
            output: None,
            sources: Vec::new(),
            usage: None,
            pdf_url: None,
        }
    }

    /// Pin the snapshot to the id it was requested under and drop values
    /// that break the snapshot invariants.
    pub fn normalized(mut self, task_id: &str) -> Self {
        if self.task_id != task_id {
            if !self.task_id.is_empty() {
                warn!(
                    "Provider returned task id {} for {}, keeping the requested id",
                    self.task_id, task_id
                );
            }
            self.task_id = task_id.to_string();
        }

        if let Some(progress) = self.progress {
            if !progress.is_valid() {
                warn!(
                    "Dropping invalid progress {}/{} for task {}",
                    progress.current_step, progress.total_steps, task_id
                );
                self.progress = None;
            }
        }

        if let Some(usage) = self.usage {
            if !usage.is_valid() {
                warn!("Dropping invalid usage report for task {}", task_id);
                self.usage = None;
            }
        }

        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn pdf_file_name(&self) -> String {
        format!("competitor-analysis-{}.pdf", self.task_id)
    }
}
