// ABOUTME: Scout research library driving deep research tasks against the research provider
// ABOUTME: Provider contract, HTTP transports, lifecycle controller, and cancellable poll loop

pub mod brief;
pub mod client;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod tracker;
pub mod types;

pub use brief::CompetitorBrief;
pub use client::{HttpResearchProvider, Transport};
pub use controller::{CancelAck, TaskLifecycleController};
pub use credentials::{Credential, CredentialSource, NoCredentials};
pub use error::{ResearchError, ResearchResult};
pub use provider::{CancelOutcome, CreateTaskRequest, OutputFormat, ResearchProvider};
pub use tracker::{TaskHandle, TrackerState};
pub use types::{Progress, ResearchTask, Source, TaskStatus, Usage};
