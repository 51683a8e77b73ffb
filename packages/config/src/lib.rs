// ABOUTME: Scout configuration library
// ABOUTME: Environment variable names, deployment mode, and typed settings loaded from the environment

pub mod constants;
pub mod env;
pub mod error;
pub mod mode;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use mode::AppMode;
pub use settings::{OAuthSettings, ResearchSettings, ScoutConfig};
