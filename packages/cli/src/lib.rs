// ABOUTME: Scout CLI support library
// ABOUTME: Wires configuration into the auth and research components and formats research reports

pub mod context;
pub mod report;

pub use context::{AppContext, ResearchContext};
