// ABOUTME: HTTP implementation of the research provider over reqwest
// ABOUTME: Direct API-key transport for self-hosted mode and bearer-token proxy transport for hosted mode

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use scout_config::{AppMode, ScoutConfig};

use crate::credentials::Credential;
use crate::error::{ResearchError, ResearchResult};
use crate::provider::{require_task_id, CancelOutcome, CreateTaskRequest, ResearchProvider};
use crate::types::ResearchTask;

const TASKS_PATH: &str = "/v1/deepresearch";
const API_KEY_HEADER: &str = "x-api-key";

/// Provider error codes meaning the task already reached a terminal status
const ALREADY_TERMINAL_CODES: &[&str] = &["task_already_completed", "task_already_cancelled"];

/// How provider calls leave the process
#[derive(Clone)]
pub enum Transport {
    /// Straight to the research API with a server-held key
    Direct { base_url: String, api_key: String },
    /// Through the platform proxy, authorized by the user's bearer token
    Proxy { proxy_url: String },
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct { base_url, .. } => f
                .debug_struct("Direct")
                .field("base_url", base_url)
                .finish_non_exhaustive(),
            Self::Proxy { proxy_url } => f
                .debug_struct("Proxy")
                .field("proxy_url", proxy_url)
                .finish(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateTaskResponse {
    deepresearch_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CancelResponse {
    #[serde(default)]
    success: bool,
    error: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpResearchProvider {
    http_client: Client,
    transport: Transport,
}

impl HttpResearchProvider {
    pub fn new(transport: Transport, timeout: Duration) -> ResearchResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResearchError::Configuration(e.to_string()))?;

        Ok(Self {
            http_client,
            transport,
        })
    }

    /// Pick the transport for the configured mode
    pub fn from_config(config: &ScoutConfig) -> ResearchResult<Self> {
        let transport = match config.mode {
            AppMode::Hosted => Transport::Proxy {
                proxy_url: config.proxy_url(),
            },
            AppMode::SelfHosted => {
                let api_key = config.research.api_key.clone().ok_or_else(|| {
                    ResearchError::Configuration(
                        "SCOUT_RESEARCH_API_KEY is required in self-hosted mode".to_string(),
                    )
                })?;
                Transport::Direct {
                    base_url: config.research.api_url.clone(),
                    api_key,
                }
            }
        };

        Self::new(transport, config.http_timeout)
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        credential: &Credential,
    ) -> ResearchResult<Response> {
        let request = match &self.transport {
            Transport::Direct { base_url, api_key } => {
                let url = format!("{}{}", base_url, path);
                let mut request = self
                    .http_client
                    .request(method.clone(), &url)
                    .header(API_KEY_HEADER, api_key);
                if let Some(body) = body {
                    request = request.json(&body);
                }
                request
            }
            Transport::Proxy { proxy_url } => {
                let token = credential.token().ok_or_else(ResearchError::auth_required)?;
                self.http_client
                    .post(proxy_url)
                    .bearer_auth(token)
                    .json(&json!({
                        "path": path,
                        "method": method.as_str(),
                        "body": body.unwrap_or_else(|| json!({})),
                    }))
            }
        };

        debug!("Research provider call: {} {}", method, path);
        Ok(request.send().await?)
    }

    /// Download the rendered report PDF
    pub async fn fetch_pdf(&self, pdf_url: &str) -> ResearchResult<Vec<u8>> {
        let response = self.http_client.get(pdf_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_failure(status, ErrorBody::default()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ResearchResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        return Err(classify_failure(status, body));
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

fn classify_failure(status: StatusCode, body: ErrorBody) -> ResearchError {
    if status == StatusCode::UNAUTHORIZED || body.error.as_deref() == Some("AUTH_REQUIRED") {
        return ResearchError::AuthRequired(
            body.message
                .unwrap_or_else(|| "Sign in to continue.".to_string()),
        );
    }

    if status.is_server_error() {
        return ResearchError::TransientNetwork(format!("Provider returned {}", status));
    }

    ResearchError::Provider(
        body.error
            .or(body.message)
            .unwrap_or_else(|| format!("Request failed with status {}", status)),
    )
}

fn is_already_terminal_code(code: Option<&str>) -> bool {
    code.is_some_and(|code| ALREADY_TERMINAL_CODES.contains(&code))
}

#[async_trait]
impl ResearchProvider for HttpResearchProvider {
    async fn create_task(
        &self,
        request: &CreateTaskRequest,
        credential: &Credential,
    ) -> ResearchResult<String> {
        let body = serde_json::to_value(request)?;
        let response = self
            .call(Method::POST, TASKS_PATH, Some(body), credential)
            .await?;

        let created: CreateTaskResponse = read_json(response).await?;
        created
            .deepresearch_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ResearchError::provider("Missing deepresearch_id in response"))
    }

    async fn get_status(
        &self,
        task_id: &str,
        credential: &Credential,
    ) -> ResearchResult<ResearchTask> {
        let task_id = require_task_id(task_id)?;
        let path = format!("{}/{}", TASKS_PATH, task_id);
        let response = self.call(Method::GET, &path, None, credential).await?;

        let task: ResearchTask = read_json(response).await?;
        Ok(task.normalized(task_id))
    }

    async fn cancel_task(
        &self,
        task_id: &str,
        credential: &Credential,
    ) -> ResearchResult<CancelOutcome> {
        let task_id = require_task_id(task_id)?;
        let path = format!("{}/{}/cancel", TASKS_PATH, task_id);
        let response = self
            .call(Method::POST, &path, Some(json!({})), credential)
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            debug!("Cancel for {} answered 409, task already terminal", task_id);
            return Ok(CancelOutcome::AlreadyTerminal);
        }

        if !status.is_success() {
            let body = response.json::<ErrorBody>().await.unwrap_or_default();
            if is_already_terminal_code(body.code.as_deref()) {
                return Ok(CancelOutcome::AlreadyTerminal);
            }
            return Err(classify_failure(status, body));
        }

        let text = response.text().await?;
        let result: CancelResponse = serde_json::from_str(&text)?;

        if result.success {
            Ok(CancelOutcome::Cancelled)
        } else if is_already_terminal_code(result.code.as_deref()) {
            Ok(CancelOutcome::AlreadyTerminal)
        } else {
            let message = result
                .error
                .unwrap_or_else(|| "Provider rejected the cancellation".to_string());
            warn!("Cancel for {} rejected: {}", task_id, message);
            Err(ResearchError::Cancellation(message))
        }
    }
}
