//! Category and global health scores over a set of parsed reports

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::models::{score_issues, Category, DetectionOutcome, Issue, Severity};

/// Word describing a score: Excellent, Good, Fair, Poor or Critical, "No Data" without one
pub fn score_label(score: Option<u8>) -> &'static str {
    match score {
        None => "No Data",
        Some(s) if s >= 90 => "Excellent",
        Some(s) if s >= 80 => "Good",
        Some(s) if s >= 60 => "Fair",
        Some(s) if s >= 40 => "Poor",
        Some(_) => "Critical",
    }
}

/// Colour band a score is displayed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreBand::Good,
            50..=79 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }

    /// Color name for terminal output
    pub fn color_name(&self) -> &'static str {
        match self {
            ScoreBand::Good => "green",
            ScoreBand::Fair => "yellow",
            ScoreBand::Poor => "red",
        }
    }
}

/// Number of issues per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeverityCounts {
    /// Count the severities of `issues`
    pub fn of<'a, I>(issues: I) -> Self
    where
        I: IntoIterator<Item = &'a Issue>,
    {
        let mut counts = Self::default();
        for issue in issues {
            counts.add(issue.severity);
        }
        counts
    }

    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

/// Score of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: Category,

    /// `None` when no parser contributed to the category
    pub score: Option<u8>,

    /// Whether at least one parsed report fed this category
    pub has_data: bool,

    /// Issue counts for the category
    pub counts: SeverityCounts,

    /// Names of the contributing parsers, in encounter order, without repeats
    pub parsers: Vec<String>,
}

impl CategoryScore {
    fn empty(category: Category) -> Self {
        Self {
            category,
            score: None,
            has_data: false,
            counts: SeverityCounts::default(),
            parsers: Vec::new(),
        }
    }
}

/// Aggregate view of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    /// Weighted average over the categories with data, `None` when there are none
    pub global_score: Option<u8>,

    /// One entry per category, in category order
    pub categories: Vec<CategoryScore>,

    /// Every issue, attributed to its parser, sorted by severity
    pub issues: Vec<Issue>,

    /// Totals over `issues`
    pub counts: SeverityCounts,
}

impl Default for ScoringResult {
    fn default() -> Self {
        Self {
            global_score: None,
            categories: Category::iter().map(CategoryScore::empty).collect(),
            issues: Vec::new(),
            counts: SeverityCounts::default(),
        }
    }
}

impl ScoringResult {
    /// Score entry for `category`
    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.categories.iter().find(|entry| entry.category == category)
    }

    /// Flattened issues belonging to `category`
    pub fn issues_in(&self, category: Category) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.category == Some(category))
    }

    /// True when nothing was parsed
    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|entry| !entry.has_data)
    }
}

/// Compute category scores, the global score and the flattened issue list
///
/// Everything is recomputed from `outcomes`; nothing is carried over between
/// calls. Issue order within a severity follows the order of `outcomes` and
/// then the order each parser reported them in.
pub fn calculate_scores<'a, I>(outcomes: I) -> ScoringResult
where
    I: IntoIterator<Item = &'a DetectionOutcome>,
{
    let mut result = ScoringResult::default();
    let outcomes: Vec<&DetectionOutcome> = outcomes.into_iter().collect();

    for outcome in &outcomes {
        let identity = &outcome.parser;
        if let Some(entry) = result
            .categories
            .iter_mut()
            .find(|entry| entry.category == identity.category)
        {
            entry.has_data = true;
            if !entry.parsers.contains(&identity.name) {
                entry.parsers.push(identity.name.clone());
            }
        }
        result.issues.extend(
            outcome
                .result
                .issues
                .iter()
                .cloned()
                .map(|issue| issue.attributed(identity)),
        );
    }

    let mut weighted = 0.0;
    let mut weights = 0.0;
    for entry in result.categories.iter_mut().filter(|entry| entry.has_data) {
        let category = entry.category;
        // An issue counts towards the category of the parser that reported it
        let in_category = || {
            outcomes
                .iter()
                .filter(move |outcome| outcome.parser.category == category)
                .flat_map(|outcome| outcome.result.issues.iter())
        };
        let score = score_issues(in_category());
        entry.counts = SeverityCounts::of(in_category());
        entry.score = Some(score);

        weighted += f64::from(score) * category.weight();
        weights += category.weight();
    }

    if weights > 0.0 {
        result.global_score = Some((weighted / weights).round().clamp(0.0, 100.0) as u8);
    }

    // sort_by_key is stable, so ties keep encounter order
    result.issues.sort_by_key(|issue| issue.severity);
    result.counts = SeverityCounts::of(&result.issues);

    result
}
