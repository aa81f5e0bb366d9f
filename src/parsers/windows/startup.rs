//! `wmic startup get caption,command /format:csv`

use serde_json::Value;

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{
    column, csv_rows, field, filename_has, has_extension, min_row_len, take_chars,
};
use crate::parsers::{ParserBase, ReportParser};

/// Apps known to weigh on boot, matched against caption and command line
static HEAVY_APPS: &[(&str, &str)] = &[
    (r"(?i)discord", "Discord"),
    (r"(?i)spotify", "Spotify"),
    (r"(?i)steam", "Steam"),
    (r"(?i)teams", "Microsoft Teams"),
    (r"(?i)skype", "Skype"),
    (r"(?i)itunes", "iTunes Helper"),
    (r"(?i)adobe.*(?:updater|cc|creative)", "Adobe Creative Cloud"),
    (r"(?i)onedrive", "OneDrive"),
    (r"(?i)dropbox", "Dropbox"),
    (r"(?i)cortana", "Cortana"),
];

fn heavy_app_patterns() -> &'static [(regex::Regex, &'static str)] {
    static PATTERNS: once_cell::sync::Lazy<Vec<(regex::Regex, &'static str)>> =
        once_cell::sync::Lazy::new(|| {
            HEAVY_APPS
                .iter()
                .filter_map(|(pattern, name)| regex::Regex::new(pattern).ok().map(|re| (re, *name)))
                .collect()
        });
    &PATTERNS
}

struct StartupEntry<'a> {
    caption: &'a str,
    command: &'a str,
}

impl StartupEntry<'_> {
    /// Caption, or the command line when there is none
    fn label(&self) -> &str {
        if self.caption.is_empty() {
            self.command
        } else {
            self.caption
        }
    }

    /// Caption, or the executable name from the command line
    fn program_name(&self) -> &str {
        if !self.caption.is_empty() {
            return self.caption;
        }
        regex!(r"(?i)([^\\/]+)\.(?:exe|bat|cmd|vbs|js)")
            .captures(self.command)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or_else(|| take_chars(self.command, 50))
    }
}

/// Programs launched at boot and how many of them are heavyweight
pub struct StartupPrograms {
    base: ParserBase,
}

impl Default for StartupPrograms {
    fn default() -> Self {
        Self::new()
    }
}

impl StartupPrograms {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "Startup Programs",
                Category::Performance,
                "Programs that launch at boot",
            ),
        }
    }
}

impl ReportParser for StartupPrograms {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["startup"]) && has_extension(filename, &[".csv"]) {
            return true;
        }
        regex!(r"(?i)Caption").is_match(content)
            && regex!(r"(?i)Command").is_match(content)
            && (regex!(r"(?i)startup").is_match(content) || regex!(r"(?i)Node").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let rows = csv_rows(content);
        if rows.len() < 2 {
            return Ok(ParseResult::with_score(
                Summary::new().with("startup_count", 0),
                100,
                vec![Issue::info("No startup data found")
                    .with_detail("Could not parse startup programs output.")
                    .with_recommendation("Ensure the file was generated with: wmic startup get caption,command /format:csv")],
            ));
        }

        let (headers, body) = (&rows[0], &rows[1..]);
        let caption_col = column(headers, "caption");
        let command_col = column(headers, "command");
        let needed = min_row_len(&[caption_col, command_col]);

        let programs: Vec<StartupEntry> = body
            .iter()
            .filter(|row| row.len() >= needed)
            .map(|row| StartupEntry {
                caption: field(row, caption_col),
                command: field(row, command_col),
            })
            .filter(|p| !p.caption.is_empty() || !p.command.is_empty())
            .collect();

        let mut summary = Summary::new().with("startup_count", programs.len());
        summary.insert(
            "programs",
            Value::from(programs.iter().map(StartupEntry::program_name).collect::<Vec<_>>()),
        );

        let count = programs.len();
        let listing = |limit: usize| {
            programs
                .iter()
                .take(limit)
                .map(StartupEntry::label)
                .collect::<Vec<_>>()
                .join("\n")
        };

        let mut issues = Vec::new();
        if count > 25 {
            issues.push(
                Issue::critical(format!(
                    "{} startup programs — severely impacting boot time",
                    count
                ))
                    .with_detail(format!(
                        "Having {} programs starting at boot significantly slows down system startup and consumes memory.",
                        count
                    ))
                    .with_raw(listing(10))
                    .with_recommendation("Disable unnecessary startup programs in Task Manager > Startup tab. Keep only essential programs like antivirus."),
            );
        } else if count > 15 {
            issues.push(
                Issue::warning(format!("{} startup programs — may slow boot time", count))
                    .with_detail(format!(
                        "{} programs launch at startup. Typical recommendation is under 10.",
                        count
                    ))
                    .with_raw(listing(10))
                    .with_recommendation("Review startup programs in Task Manager. Disable programs you don't need immediately at boot."),
            );
        } else if count > 10 {
            issues.push(
                Issue::info(format!("{} startup programs", count))
                    .with_detail("Slightly above the recommended count of ~10 startup programs.")
                    .with_raw(listing(count))
                    .with_recommendation("Consider disabling a few non-essential startup programs for faster boot times."),
            );
        } else {
            issues.push(
                Issue::info(format!("{} startup programs — good", count))
                    .with_detail("Startup program count is within a healthy range.")
                    .with_raw(listing(count))
                    .with_recommendation("Startup configuration looks fine."),
            );
        }

        let mut heavy: Vec<&str> = Vec::new();
        for program in &programs {
            let text = format!("{} {}", program.caption, program.command);
            for (pattern, name) in heavy_app_patterns() {
                if pattern.is_match(&text) && !heavy.contains(name) {
                    heavy.push(*name);
                }
            }
        }
        if heavy.len() > 3 {
            issues.push(
                Issue::info(format!("{} resource-heavy apps in startup", heavy.len()))
                    .with_detail(format!(
                        "These apps consume significant resources at boot: {}",
                        heavy.join(", ")
                    ))
                    .with_raw(heavy.join("\n"))
                    .with_recommendation("Consider disabling these from startup if you don't need them immediately. You can still launch them manually."),
            );
        }

        Ok(ParseResult::new(summary, issues))
    }
}
