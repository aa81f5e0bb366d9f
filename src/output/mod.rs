//! Output formatting for the health checker

use colored::Colorize;
use strum::IntoEnumIterator;

use crate::app::{Analysis, CategorySummary, FileReport, IssueView};
use crate::config::OutputConfig;
use crate::errors::HealthError;
use crate::models::{Category, Severity};
use crate::parsers::ParserInfo;
use crate::scoring::ScoreBand;

mod markdown;

pub use markdown::MarkdownExporter;

/// Trait for formatting output
pub trait OutputFormatter {
    /// Format files, scores and issues of an analysed session
    fn format_analysis(
        &self,
        analysis: &Analysis,
        config: &OutputConfig,
    ) -> Result<String, HealthError>;

    /// Format the parser catalogue, grouped by category
    fn format_parsers(
        &self,
        groups: &[(Category, Vec<ParserInfo>)],
        disabled: &[String],
    ) -> Result<String, HealthError>;
}

/// Default implementation that uses pretty formatting with colors
#[derive(Clone)]
pub struct PrettyFormatter {
    /// Whether to use emojis
    use_emoji: bool,
}

impl Default for PrettyFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl PrettyFormatter {
    /// Create a new PrettyFormatter
    pub fn new() -> Self {
        Self { use_emoji: true }
    }

    pub fn with_emoji(mut self, use_emoji: bool) -> Self {
        self.use_emoji = use_emoji;
        self
    }

    /// `icon` followed by a space, or nothing without emoji
    fn icon(&self, icon: &str) -> String {
        if self.use_emoji {
            format!("{} ", icon)
        } else {
            String::new()
        }
    }

    fn separator(&self) -> String {
        "━".repeat(60).dimmed().to_string()
    }

    fn format_files(&self, files: &[FileReport], config: &OutputConfig) -> String {
        let mut output = format!("{}{}\n", self.icon("📂"), "Reports".bold());

        if files.is_empty() {
            output.push_str(&format!("  {}\n", "No report files found".dimmed()));
            return output;
        }

        for file in files {
            if let Some(err) = &file.read_error {
                output.push_str(&format!(
                    "  {} {} {}\n",
                    "✗".red(),
                    file.file,
                    format!("could not be read: {}", err).red()
                ));
                continue;
            }
            match &file.parser {
                Some(parser) => {
                    output.push_str(&format!(
                        "  {} {} {} {}\n",
                        "✓".green(),
                        file.file,
                        "→".dimmed(),
                        parser.cyan()
                    ));
                    if config.show_raw {
                        if let Some(summary) = &file.summary {
                            for key in summary.keys() {
                                if let Some(value) = summary.get(key) {
                                    output.push_str(&format!(
                                        "      {} {}\n",
                                        format!("{}:", key).dimmed(),
                                        value
                                    ));
                                }
                            }
                        }
                    }
                }
                None => output.push_str(&format!(
                    "  {} {} {}\n",
                    "✗".yellow(),
                    file.file,
                    "could not identify report type".yellow()
                )),
            }
        }

        output
    }

    fn format_scores(&self, analysis: &Analysis) -> String {
        let headline = match analysis.global_score {
            Some(score) => format!("{}/100 ({})", score, analysis.global_label)
                .color(ScoreBand::of(score).color_name())
                .bold()
                .to_string(),
            None => "No Data".dimmed().to_string(),
        };

        let mut output = format!(
            "\n{}{} {}\n\n",
            self.icon("🩺"),
            "Global Health Score:".bold(),
            headline
        );

        for summary in &analysis.categories {
            output.push_str(&self.format_category(summary));
        }

        output
    }

    fn format_category(&self, summary: &CategorySummary) -> String {
        let label = format!("{:<18}", summary.label);
        match (summary.score, summary.band) {
            (Some(score), Some(band)) => format!(
                "  {}{} {} {}\n",
                self.icon(summary.category.icon()),
                label.bold(),
                format!("{:>3}/100", score).color(band.color_name()),
                summary.message
            ),
            _ => format!(
                "  {}{} {} {}\n",
                self.icon(summary.category.icon()),
                label.dimmed(),
                "  -    ".dimmed(),
                summary.message.dimmed()
            ),
        }
    }

    fn format_issue(&self, view: &IssueView, config: &OutputConfig) -> String {
        let issue = &view.issue;
        let category_icon = issue
            .category
            .map(|category| self.icon(category.icon()))
            .unwrap_or_default();
        let source = issue
            .parser_name
            .as_deref()
            .map(|name| format!(" [{}]", name).dimmed().to_string())
            .unwrap_or_default();

        let mut output = format!(
            "  {}{}{}\n",
            category_icon,
            issue.title.color(issue.severity.color_name()).bold(),
            source
        );

        if !issue.detail.is_empty() {
            output.push_str(&format!("     {}\n", issue.detail));
        }
        if !issue.recommendation.is_empty() {
            output.push_str(&format!("     {} {}\n", "→".cyan(), issue.recommendation));
        }
        if config.show_raw && !issue.raw.is_empty() {
            for line in issue.raw.lines() {
                output.push_str(&format!("     {} {}\n", "│".dimmed(), line.dimmed()));
            }
        }
        if let Some(fix) = &view.remediation {
            output.push_str(&format!(
                "     {}{} {}\n",
                self.icon(fix.fix_kind.emoji()),
                format!("{}:", fix.fix_kind.label()).magenta(),
                fix.guide
            ));
            if let Some(command) = fix.command {
                output.push_str(&format!("       {} {}\n", "$".dimmed(), command.bold()));
            }
        }

        output
    }

    fn format_issues(&self, analysis: &Analysis, config: &OutputConfig) -> String {
        let mut output = String::new();

        if analysis.issues.is_empty() {
            if analysis.files.iter().any(|file| file.parser.is_some()) {
                let done = "No matching issues".green();
                output.push_str(&format!("\n  {}{}\n", self.icon("✨"), done));
            }
            return output;
        }

        for severity in Severity::iter() {
            let group: Vec<&IssueView> = analysis
                .issues
                .iter()
                .filter(|view| view.issue.severity == severity)
                .collect();
            if group.is_empty() {
                continue;
            }

            output.push_str(&format!(
                "\n{}\n\n{}{}\n\n",
                self.separator(),
                self.icon(severity.emoji()),
                format!("{} ({})", severity.label(), group.len())
                    .color(severity.color_name())
                    .bold()
            ));
            for view in group {
                output.push_str(&self.format_issue(view, config));
                output.push('\n');
            }
        }

        if analysis.matched > analysis.issues.len() {
            output.push_str(&format!(
                "  {}\n",
                format!(
                    "… {} more issue(s) not shown",
                    analysis.matched - analysis.issues.len()
                )
                .dimmed()
            ));
        }

        output
    }

    fn format_totals(&self, analysis: &Analysis) -> String {
        let counts = &analysis.counts;
        let mut parts = Vec::new();
        if counts.critical > 0 {
            parts.push(format!("{} {}", counts.critical, "critical".red().bold()));
        }
        if counts.warning > 0 {
            parts.push(format!("{} {}", counts.warning, "warning".yellow().bold()));
        }
        if counts.info > 0 {
            parts.push(format!("{} {}", counts.info, "info".blue().bold()));
        }

        let mut output = format!("\n{}\n", self.separator());
        if parts.is_empty() {
            output.push_str(&format!("  {}Nothing to report\n", self.icon("📊")));
        } else {
            output.push_str(&format!("  {}Found: {}\n", self.icon("📊"), parts.join(", ")));
        }
        if analysis.matched != counts.total() {
            output.push_str(&format!(
                "  {}{} of {} issue(s) match the filter\n",
                self.icon("🔍"),
                analysis.matched,
                counts.total()
            ));
        }
        output
    }
}

impl OutputFormatter for PrettyFormatter {
    fn format_analysis(
        &self,
        analysis: &Analysis,
        config: &OutputConfig,
    ) -> Result<String, HealthError> {
        let mut output = self.format_files(&analysis.files, config);
        output.push_str(&self.format_scores(analysis));
        output.push_str(&self.format_issues(analysis, config));
        output.push_str(&self.format_totals(analysis));
        Ok(output)
    }

    fn format_parsers(
        &self,
        groups: &[(Category, Vec<ParserInfo>)],
        disabled: &[String],
    ) -> Result<String, HealthError> {
        let mut output = String::new();

        for (category, parsers) in groups {
            output.push_str(&format!(
                "\n{}{}\n",
                self.icon(category.icon()),
                category.label().bold()
            ));
            for parser in parsers {
                let name = format!("{:<20}", parser.name);
                let name = if disabled.contains(&parser.name) {
                    format!("{} {}", name.dimmed(), "(disabled)".yellow())
                } else {
                    name.cyan().to_string()
                };
                output.push_str(&format!("  {} {}\n", name, parser.description.dimmed()));
            }
        }

        Ok(output)
    }
}

/// JSON formatter for machine-readable output
#[derive(Clone, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_analysis(
        &self,
        analysis: &Analysis,
        _config: &OutputConfig,
    ) -> Result<String, HealthError> {
        Ok(serde_json::to_string_pretty(analysis)?)
    }

    fn format_parsers(
        &self,
        groups: &[(Category, Vec<ParserInfo>)],
        disabled: &[String],
    ) -> Result<String, HealthError> {
        let listing: Vec<serde_json::Value> = groups
            .iter()
            .flat_map(|(_, parsers)| parsers)
            .map(|parser| {
                serde_json::json!({
                    "name": parser.name,
                    "category": parser.category,
                    "description": parser.description,
                    "enabled": !disabled.contains(&parser.name),
                })
            })
            .collect();
        Ok(serde_json::to_string_pretty(&listing)?)
    }
}
