// ABOUTME: Competitor brief entered by the user
// ABOUTME: Validates the website URL and summary and renders the research query

use url::Url;

use crate::error::{ResearchError, ResearchResult};

const ANALYSIS_CHECKLIST: &str = "Provide a comprehensive analysis including:
    - Company overview and what they do
    - Key products and services
    - Target market and customer base
    - Competitive advantages and unique value propositions
    - Recent developments and news
    - Market positioning and strategy
    - Find other companies or products doing something similar to the competitor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitorBrief {
    website_url: String,
    summary: String,
}

impl CompetitorBrief {
    pub fn new(website_url: &str, summary: &str) -> ResearchResult<Self> {
        let website_url = website_url.trim();
        let summary = summary.trim();

        if website_url.is_empty() {
            return Err(ResearchError::validation("Website URL is required"));
        }
        if summary.is_empty() {
            return Err(ResearchError::validation("Summary is required"));
        }

        let parsed = Url::parse(website_url)
            .map_err(|e| ResearchError::validation(format!("Invalid website URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ResearchError::validation(
                "Website URL must be an absolute http(s) URL",
            ));
        }

        Ok(Self {
            website_url: website_url.to_string(),
            summary: summary.to_string(),
        })
    }

    pub fn website_url(&self) -> &str {
        &self.website_url
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn research_query(&self) -> String {
        format!(
            "Analyze the competitor: {}. {}.\n    {}",
            self.website_url,
            self.summary.trim_end_matches('.'),
            ANALYSIS_CHECKLIST
        )
    }

    /// URLs the research starts from
    pub fn seed_urls(&self) -> Vec<String> {
        vec![self.website_url.clone()]
    }
}
