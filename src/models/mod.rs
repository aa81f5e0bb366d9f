//! Core data models for the health checker

use serde::{Deserialize, Serialize};

pub mod category;
pub mod results;

pub use category::*;
pub use results::*;

/// A single problem detected in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Severity of the issue
    pub severity: Severity,

    /// Short human-readable title
    pub title: String,

    /// Longer explanation, may be empty
    #[serde(default)]
    pub detail: String,

    /// Verbatim evidence excerpt from the source report
    #[serde(default)]
    pub raw: String,

    /// Suggested user action
    #[serde(default)]
    pub recommendation: String,

    /// Category, attached when the issue is flattened by the scoring engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Name of the parser that produced the issue, attached with the category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser_name: Option<String>,
}

impl Issue {
    pub fn new(severity: Severity, title: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            detail: String::new(),
            raw: String::new(),
            recommendation: String::new(),
            category: None,
            parser_name: None,
        }
    }

    pub fn critical(title: impl Into<String>) -> Self {
        Self::new(Severity::Critical, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(Severity::Info, title)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = raw.into();
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }

    /// Stamp the issue with the parser that reported it and that parser's category
    pub fn attributed(mut self, parser: &ParserIdentity) -> Self {
        self.category = Some(parser.category);
        self.parser_name = Some(parser.name.clone());
        self
    }
}

/// Score a list of issues: 100 minus the severity penalties, clamped to 0..=100
pub fn score_issues<'a, I>(issues: I) -> u8
where
    I: IntoIterator<Item = &'a Issue>,
{
    let penalty = issues
        .into_iter()
        .fold(0u32, |total, issue| total.saturating_add(issue.severity.penalty()));
    // Never above 100 since penalties only subtract
    100u32.saturating_sub(penalty) as u8
}
