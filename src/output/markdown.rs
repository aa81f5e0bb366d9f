use chrono::{NaiveDate, NaiveDateTime};
use strum::IntoEnumIterator;

use crate::models::Severity;
use crate::scoring::{score_label, ScoringResult};

/// Renders a scoring result as a markdown report
pub struct MarkdownExporter;

impl MarkdownExporter {
    /// Markdown document for `scoring`, stamped with `generated_at`
    pub fn render(scoring: &ScoringResult, generated_at: NaiveDateTime) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push("# PC Health Check Report".to_string());
        lines.push(format!(
            "*Generated: {}*",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        lines.push(String::new());

        match scoring.global_score {
            Some(score) => lines.push(format!(
                "## Global Health Score: {}/100 ({})",
                score,
                score_label(Some(score))
            )),
            None => lines.push("## Global Health Score: No Data".to_string()),
        }
        lines.push(String::new());

        lines.push("## Category Breakdown".to_string());
        lines.push(String::new());
        lines.push("| Category | Score | Critical | Warning | Info |".to_string());
        lines.push("|----------|-------|----------|---------|------|".to_string());
        for entry in &scoring.categories {
            let name = format!("{} {}", entry.category.icon(), entry.category.label());
            match entry.score {
                Some(score) if entry.has_data => lines.push(format!(
                    "| {} | {}/100 | {} | {} | {} |",
                    name, score, entry.counts.critical, entry.counts.warning, entry.counts.info
                )),
                _ => lines.push(format!("| {} | No data | - | - | - |", name)),
            }
        }
        lines.push(String::new());

        lines.push("## Issues Found".to_string());
        lines.push(String::new());
        for severity in Severity::iter() {
            let group: Vec<_> = scoring
                .issues
                .iter()
                .filter(|issue| issue.severity == severity)
                .collect();
            if group.is_empty() {
                continue;
            }

            lines.push(format!(
                "### {} {} ({})",
                severity.emoji(),
                severity.label(),
                group.len()
            ));
            lines.push(String::new());
            for issue in group {
                let icon = issue.category.map(|c| c.icon()).unwrap_or("");
                lines.push(format!("#### {} {}", icon, issue.title));
                lines.push(format!("- **Detail:** {}", issue.detail));
                if !issue.recommendation.is_empty() {
                    lines.push(format!("- **Recommendation:** {}", issue.recommendation));
                }
                lines.push(String::new());
            }
        }

        lines.join("\n")
    }

    /// `pc-health-report-YYYY-MM-DD.md`
    pub fn default_file_name(date: NaiveDate) -> String {
        format!("pc-health-report-{}.md", date.format("%Y-%m-%d"))
    }
}
