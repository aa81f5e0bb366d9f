use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{score_issues, Category, Issue};

/// Parser-specific facts extracted from a report
///
/// There is no shared schema: each parser documents its own keys and
/// consumers that need a particular fact look it up by parser name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary(Map<String, Value>);

impl Summary {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set a fact, replacing any previous value
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Builder form of [`Summary::insert`]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Output of one parser applied to one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Normalized facts
    pub summary: Summary,

    /// Local score, informational only
    pub score: u8,

    /// Issues in the order the parser found them
    pub issues: Vec<Issue>,
}

impl ParseResult {
    /// Build a result scored from its issues
    pub fn new(summary: Summary, issues: Vec<Issue>) -> Self {
        let score = score_issues(&issues);
        Self {
            summary,
            score,
            issues,
        }
    }

    /// Build a result with a fixed score
    pub fn with_score(summary: Summary, score: u8, issues: Vec<Issue>) -> Self {
        Self {
            summary,
            score: score.min(100),
            issues,
        }
    }

    /// Append `issue` when nothing was found, leaving the score untouched
    pub fn or_fallback(mut self, issue: Issue) -> Self {
        if self.issues.is_empty() {
            self.issues.push(issue);
        }
        self
    }
}

/// Identity of a parser: its unique name and the category it reports into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParserIdentity {
    pub name: String,
    pub category: Category,
}

/// The winning parser for a report together with what it extracted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionOutcome {
    pub parser: ParserIdentity,
    pub result: ParseResult,
}
