//! `wevtutil qe System /f:xml` event dumps

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{capture, filename_has, has_extension, plural, take_chars};
use crate::parsers::{ParserBase, ReportParser};

const LEVEL_CRITICAL: u32 = 1;
const LEVEL_ERROR: u32 = 2;
const LEVEL_WARNING: u32 = 3;
const LEVEL_INFORMATION: u32 = 4;

struct Event<'a> {
    level: u32,
    event_id: u32,
    source: &'a str,
    time_created: &'a str,
    message: &'a str,
}

impl<'a> Event<'a> {
    fn from_xml(xml: &'a str) -> Self {
        let source = capture(regex!(r"(?i)<Provider\s+Name='([^']+)'"), xml)
            .or_else(|| capture(regex!(r#"(?i)<Provider\s+Name="([^"]+)""#), xml))
            .unwrap_or("Unknown");
        let time_created = capture(regex!(r"(?i)<TimeCreated\s+SystemTime='([^']+)'"), xml)
            .or_else(|| capture(regex!(r#"(?i)<TimeCreated\s+SystemTime="([^"]+)""#), xml))
            .unwrap_or("");
        Self {
            level: capture(regex!(r"(?i)<Level>(\d+)</Level>"), xml)
                .and_then(|level| level.parse().ok())
                .unwrap_or(LEVEL_INFORMATION),
            event_id: capture(regex!(r"(?i)<EventID[^>]*>(\d+)</EventID>"), xml)
                .and_then(|id| id.parse().ok())
                .unwrap_or(0),
            source,
            time_created,
            message: capture(regex!(r"(?i)<Data[^>]*>([^<]*)</Data>"), xml).unwrap_or(""),
        }
    }

    fn is_crash(&self) -> bool {
        regex!(r"(?i)bugcheck").is_match(self.source)
            || (self.event_id == 41 && regex!(r"(?i)kernel-power").is_match(self.source))
    }

    fn headline(&self) -> String {
        format!(
            "Event {} from {} at {}",
            self.event_id, self.source, self.time_created
        )
    }
}

/// Distinct sources in first-seen order
fn distinct_sources<'a>(events: &[&Event<'a>]) -> Vec<&'a str> {
    let mut sources: Vec<&str> = Vec::new();
    for event in events {
        if !sources.contains(&event.source) {
            sources.push(event.source);
        }
    }
    sources
}

/// The `n` most frequent sources as `"Source (count)"`, ties in first-seen order
fn top_sources(events: &[&Event], n: usize) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for event in events {
        match counts.iter_mut().find(|(source, _)| *source == event.source) {
            Some((_, count)) => *count += 1,
            None => counts.push((event.source, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(n)
        .map(|(source, count)| format!("{} ({})", source, count))
        .collect()
}

fn at_level<'e, 'a>(events: &'e [Event<'a>], level: u32) -> Vec<&'e Event<'a>> {
    events.iter().filter(|e| e.level == level).collect()
}

fn headlines(events: &[&Event]) -> String {
    events
        .iter()
        .take(3)
        .map(|event| event.headline())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Crashes, unexpected shutdowns, disk errors and error volume from the System log
pub struct SystemEvents {
    base: ParserBase,
}

impl Default for SystemEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemEvents {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "System Events",
                Category::Security,
                "Recent system event log entries, errors, warnings, BSODs",
            ),
        }
    }
}

impl ReportParser for SystemEvents {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["event", "system"])
            && has_extension(filename, &[".xml", ".evtx"])
        {
            return true;
        }
        regex!(r"(?i)<Event\s").is_match(content)
            && regex!(r"(?i)<System>").is_match(content)
            && regex!(r"(?i)<Provider").is_match(content)
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let events: Vec<Event> = regex!(r"(?is)<Event.*?</Event>")
            .find_iter(content)
            .map(|block| Event::from_xml(block.as_str()))
            .collect();

        if events.is_empty() {
            return Ok(ParseResult::with_score(
                Summary::new().with("total_events", 0),
                100,
                vec![Issue::info("No system events found")
                    .with_detail("Could not parse event log data.")
                    .with_recommendation("Ensure the file was generated with: wevtutil qe System /c:100 /f:xml /rd:true")],
            ));
        }

        let critical = at_level(&events, LEVEL_CRITICAL);
        let errors = at_level(&events, LEVEL_ERROR);
        let warnings = at_level(&events, LEVEL_WARNING);
        let informational = events
            .iter()
            .filter(|e| e.level == LEVEL_INFORMATION || e.level == 0)
            .count();

        let summary = Summary::new()
            .with("total_events", events.len())
            .with("critical", critical.len())
            .with("errors", errors.len())
            .with("warnings", warnings.len())
            .with("informational", informational);

        let mut issues = Vec::new();

        let crashes: Vec<&Event> = events.iter().filter(|e| e.is_crash()).collect();
        if !crashes.is_empty() {
            issues.push(
                Issue::critical(format!(
                    "{} BSOD/crash event{} detected",
                    crashes.len(),
                    plural(crashes.len())
                ))
                .with_detail(format!(
                    "Blue screen or unexpected shutdown events found. Sources: {}",
                    distinct_sources(&crashes).join(", ")
                ))
                .with_raw(headlines(&crashes))
                .with_recommendation("BSODs indicate serious system instability. Check for driver issues, hardware problems, or overheating. Run \"sfc /scannow\" and check memory with Windows Memory Diagnostic."),
            );
        }

        let shutdowns: Vec<&Event> = events.iter().filter(|e| e.event_id == 6008).collect();
        if !shutdowns.is_empty() {
            issues.push(
                Issue::warning(format!(
                    "{} unexpected shutdown{} detected",
                    shutdowns.len(),
                    plural(shutdowns.len())
                ))
                .with_detail("The system shut down unexpectedly (power loss, crash, or forced shutdown).")
                .with_raw(
                    shutdowns
                        .iter()
                        .take(3)
                        .map(|e| format!("Event 6008 at {}", e.time_created))
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
                .with_recommendation("Check power supply and UPS. If recurring, investigate hardware or driver issues."),
            );
        }

        let disk_errors: Vec<&Event> = events
            .iter()
            .filter(|e| {
                regex!(r"(?i)disk").is_match(e.source)
                    && (e.level == LEVEL_CRITICAL || e.level == LEVEL_ERROR)
            })
            .collect();
        if !disk_errors.is_empty() {
            issues.push(
                Issue::critical(format!(
                    "{} disk error{} in event log",
                    disk_errors.len(),
                    plural(disk_errors.len())
                ))
                .with_detail("Disk errors can indicate drive failure. Data loss may occur.")
                .with_raw(
                    disk_errors
                        .iter()
                        .take(3)
                        .map(|e| {
                            format!(
                                "Event {} from {}: {}",
                                e.event_id,
                                e.source,
                                take_chars(e.message, 100)
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
                .with_recommendation("BACK UP DATA IMMEDIATELY. Run chkdsk /f and check SMART status. Consider replacing the drive."),
            );
        }

        if !critical.is_empty() && crashes.is_empty() && disk_errors.is_empty() {
            issues.push(
                Issue::critical(format!(
                    "{} critical event{} in system log",
                    critical.len(),
                    plural(critical.len())
                ))
                .with_detail(format!(
                    "Critical events from: {}",
                    distinct_sources(&critical)
                        .into_iter()
                        .take(5)
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
                .with_raw(headlines(&critical))
                .with_recommendation("Investigate critical events in Event Viewer for more details."),
            );
        }

        if errors.len() > 20 {
            issues.push(
                Issue::warning(format!("{} error events in system log", errors.len()))
                    .with_detail(format!(
                        "High number of error events. Top sources: {}",
                        top_sources(&errors, 3).join(", ")
                    ))
                    .with_raw(format!("Error events: {}", errors.len()))
                    .with_recommendation("Review error events in Event Viewer. Frequent errors from the same source may indicate a specific problem."),
            );
        } else if errors.len() > 5 {
            issues.push(
                Issue::info(format!("{} error events in system log", errors.len()))
                    .with_detail(format!("Sources: {}", top_sources(&errors, 3).join(", ")))
                    .with_raw(format!("Error events: {}", errors.len()))
                    .with_recommendation("Some errors are normal. Review if any are recurring from the same source."),
            );
        }

        if warnings.len() > 30 {
            issues.push(
                Issue::info(format!("{} warning events in system log", warnings.len()))
                    .with_detail(format!(
                        "High number of warnings. Top sources: {}",
                        top_sources(&warnings, 3).join(", ")
                    ))
                    .with_raw(format!("Warning events: {}", warnings.len()))
                    .with_recommendation("Review recurring warnings for potential issues that haven't become errors yet."),
            );
        }

        if issues.is_empty() {
            issues.push(
                Issue::info(format!(
                    "{} system events analyzed — no major issues",
                    events.len()
                ))
                .with_detail(format!(
                    "Critical: {}, Errors: {}, Warnings: {}",
                    critical.len(),
                    errors.len(),
                    warnings.len()
                ))
                .with_recommendation("Event log looks clean."),
            );
        }

        Ok(ParseResult::new(summary, issues))
    }
}
