// ABOUTME: Deployment mode selection
// ABOUTME: Self-hosted mode calls the research API directly; hosted mode requires sign-in and proxies calls

use serde::{Deserialize, Serialize};
use std::fmt;

/// Deployment mode, injected into the auth and research components at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppMode {
    /// Server-held API key, no sign-in (default)
    #[default]
    SelfHosted,
    /// OAuth sign-in, calls go through the platform proxy with a bearer token
    Hosted,
}

impl AppMode {
    /// Interpret the raw mode toggle. Only an explicit hosted value selects
    /// hosted mode; anything else, including unset, is self-hosted.
    pub fn from_toggle(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "hosted" || v == "platform" || v == "valyu" => Self::Hosted,
            _ => Self::SelfHosted,
        }
    }

    /// Whether provider calls need a bearer credential
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Hosted)
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfHosted => write!(f, "self-hosted"),
            Self::Hosted => write!(f, "hosted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, AppMode::SelfHosted)]
    #[case(Some(""), AppMode::SelfHosted)]
    #[case(Some("self-hosted"), AppMode::SelfHosted)]
    #[case(Some("anything"), AppMode::SelfHosted)]
    #[case(Some("hosted"), AppMode::Hosted)]
    #[case(Some("HOSTED"), AppMode::Hosted)]
    #[case(Some(" platform "), AppMode::Hosted)]
    #[case(Some("valyu"), AppMode::Hosted)]
    fn test_from_toggle(#[case] raw: Option<&str>, #[case] expected: AppMode) {
        assert_eq!(AppMode::from_toggle(raw), expected);
    }

    #[test]
    fn test_requires_auth() {
        assert!(AppMode::Hosted.requires_auth());
        assert!(!AppMode::SelfHosted.requires_auth());
    }

    #[test]
    fn test_display() {
        assert_eq!(AppMode::SelfHosted.to_string(), "self-hosted");
        assert_eq!(AppMode::Hosted.to_string(), "hosted");
    }
}
