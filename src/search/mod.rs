//! Filtering the flattened issue list

use std::collections::HashSet;

use crate::models::Issue;

/// Criteria for [`filter_issues`]; an empty axis does not filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    /// Category names to keep, case-insensitive
    pub categories: Vec<String>,

    /// Severity names to keep, case-insensitive
    pub severities: Vec<String>,

    /// Whitespace separated terms that must all appear in an issue
    pub query: Option<String>,
}

impl IssueFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_severities<I, S>(mut self, severities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.severities = severities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// True when no axis filters anything
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.severities.is_empty()
            && self.query.as_deref().map_or(true, |q| q.trim().is_empty())
    }
}

fn lowercase_set(values: &[String]) -> HashSet<String> {
    values.iter().map(|value| value.to_lowercase()).collect()
}

/// The text a query is matched against, lowercased
fn searchable(issue: &Issue) -> String {
    let category = issue.category.map(|c| c.to_string()).unwrap_or_default();
    [
        issue.title.as_str(),
        issue.detail.as_str(),
        issue.raw.as_str(),
        issue.recommendation.as_str(),
        category.as_str(),
        issue.parser_name.as_deref().unwrap_or(""),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Issues matching every axis of `filter`, in input order
///
/// Query terms are plain substrings, not words: `"disk space"` keeps an issue
/// only if both `disk` and `space` occur somewhere in it.
pub fn filter_issues<'a>(issues: &'a [Issue], filter: &IssueFilter) -> Vec<&'a Issue> {
    let categories = lowercase_set(&filter.categories);
    let severities = lowercase_set(&filter.severities);
    let query = filter
        .query
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .unwrap_or_default();
    let terms: Vec<&str> = query.split_whitespace().collect();

    issues
        .iter()
        .filter(|issue| {
            categories.is_empty()
                || issue
                    .category
                    .map_or(false, |c| categories.contains(&c.to_string()))
        })
        .filter(|issue| severities.is_empty() || severities.contains(&issue.severity.to_string()))
        .filter(|issue| {
            if terms.is_empty() {
                return true;
            }
            let text = searchable(issue);
            terms.iter().all(|term| text.contains(term))
        })
        .collect()
}
