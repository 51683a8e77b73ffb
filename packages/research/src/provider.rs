// ABOUTME: Transport-agnostic contract for the deep research provider
// ABOUTME: Create, status, and cancel operations plus the task creation request shape

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::credentials::Credential;
use crate::error::{ResearchError, ResearchResult};
use crate::types::ResearchTask;

/// Trim a task id and reject anything that cannot sit in a single URL path segment
pub(crate) fn require_task_id(task_id: &str) -> ResearchResult<&str> {
    let trimmed = task_id.trim();
    if trimmed.is_empty() {
        return Err(ResearchError::validation("Task ID is required"));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(ResearchError::validation("Task ID is invalid"));
    }
    let unsafe_char =
        |c: char| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control();
    if trimmed.chars().any(unsafe_char) {
        return Err(ResearchError::validation("Task ID is invalid"));
    }
    Ok(trimmed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Pdf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTaskRequest {
    pub input: String,
    pub model: String,
    pub urls: Vec<String>,
    pub output_formats: Vec<OutputFormat>,
}

impl CreateTaskRequest {
    /// Request a markdown report with a PDF rendition
    pub fn new(input: impl Into<String>, urls: Vec<String>, model: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            model: model.into(),
            urls,
            output_formats: vec![OutputFormat::Markdown, OutputFormat::Pdf],
        }
    }
}

/// Result of a successful cancel call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The provider stopped the task
    Cancelled,
    /// The task had already completed, failed, or been cancelled
    AlreadyTerminal,
}

#[async_trait]
pub trait ResearchProvider: Send + Sync {
    /// Start a task and return the provider's task id
    async fn create_task(
        &self,
        request: &CreateTaskRequest,
        credential: &Credential,
    ) -> ResearchResult<String>;

    /// Fetch one status snapshot
    async fn get_status(&self, task_id: &str, credential: &Credential)
        -> ResearchResult<ResearchTask>;

    async fn cancel_task(&self, task_id: &str, credential: &Credential)
        -> ResearchResult<CancelOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_require_task_id_trims() {
        assert_eq!(require_task_id("  dr_123 ").unwrap(), "dr_123");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case(".")]
    #[case("..")]
    #[case("../admin")]
    #[case("a/b")]
    #[case("a\\b")]
    #[case("a?x=1")]
    #[case("a#frag")]
    #[case("a%2Fb")]
    #[case("a b")]
    fn test_require_task_id_rejects_unsafe(#[case] task_id: &str) {
        assert!(matches!(
            require_task_id(task_id),
            Err(ResearchError::Validation(_))
        ));
    }

    #[test]
    fn test_create_request_wire_shape() {
        let request = CreateTaskRequest::new(
            "Analyze the competitor",
            vec!["https://acme.example".to_string()],
            "fast",
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "input": "Analyze the competitor",
                "model": "fast",
                "urls": ["https://acme.example"],
                "output_formats": ["markdown", "pdf"]
            })
        );
    }
}
