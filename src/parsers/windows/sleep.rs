//! `powercfg /sleepstudy` HTML

use serde_json::Value;

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{filename_has, has_extension, parse_float, plural, round_to};
use crate::parsers::{ParserBase, ReportParser};

struct SleepSession<'a> {
    duration: &'a str,
    drain_percent: f64,
}

/// Standby sessions, battery drain during sleep, and wake sources
pub struct SleepStudy {
    base: ParserBase,
}

impl Default for SleepStudy {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepStudy {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "Sleep Study",
                Category::Power,
                "Sleep/standby sessions, battery drain during sleep, wake sources",
            ),
        }
    }

    fn sessions(content: &str) -> Vec<SleepSession<'_>> {
        let pattern = regex!(
            r"(?i)(?:AC|DC|Battery|Connected Standby|Modern Standby|Sleep)[^<]*?(\d+:\d+:\d+)[^<]*?(\d+(?:\.\d+)?)\s*%"
        );
        pattern
            .captures_iter(content)
            .filter_map(|caps| {
                let duration = caps.get(1)?.as_str();
                let drain_percent = parse_float(caps.get(2)?.as_str())?;
                Some(SleepSession {
                    duration,
                    drain_percent,
                })
            })
            .collect()
    }

    /// Devices and processes named as active while the machine slept
    fn offenders(content: &str) -> Vec<String> {
        let mut offenders: Vec<String> = Vec::new();

        for caps in regex!(r"(?i)(?:Top\s*Offender|Active\s*Device|Offender)[^<]*?<[^>]*>([^<]+)")
            .captures_iter(content)
        {
            let name = caps[1].trim();
            let len = name.chars().count();
            if len > 2 && len < 100 {
                offenders.push(name.to_string());
            }
        }

        let culprits = regex!(r"(?i)(?:Device|Driver|Module)[^<:]*?[>:]\s*([^<\n]+)");
        for caps in culprits.captures_iter(content) {
            let name = caps[1].trim();
            let len = name.chars().count();
            let numeric = name.chars().all(|c| c.is_ascii_digit());
            if len > 3 && len < 80 && !numeric && !offenders.iter().any(|o| o == name) {
                offenders.push(name.to_string());
            }
        }

        offenders
    }
}

impl ReportParser for SleepStudy {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["sleep"]) && has_extension(filename, &[".html", ".htm"]) {
            return true;
        }
        regex!(r"(?i)Sleep\s*Study").is_match(content)
            || regex!(r"(?i)sleepstudy").is_match(content)
            || (regex!(r"(?i)Connected\s*Standby").is_match(content)
                && regex!(r"(?i)Drain\s*Rate").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut summary = Summary::new();

        let sessions = Self::sessions(content);
        summary.insert("session_count", sessions.len());

        let drain_rates: Vec<f64> =
            regex!(r"(?i)(?:drain|rate)[^<\d]*?(\d+(?:\.\d+)?)\s*(?:mW|%/hr|%\s*per\s*hour)")
                .captures_iter(content)
                .filter_map(|caps| parse_float(&caps[1]))
                .collect();
        if !drain_rates.is_empty() {
            let average = drain_rates.iter().sum::<f64>() / drain_rates.len() as f64;
            summary.insert("avg_drain_rate", round_to(average, 2));
        }

        let offenders = Self::offenders(content);
        summary.insert(
            "top_offenders",
            Value::from(offenders.iter().take(10).cloned().collect::<Vec<_>>()),
        );

        if !sessions.is_empty() {
            let high = sessions.iter().filter(|s| s.drain_percent > 5.0).count();
            if high as f64 > sessions.len() as f64 * 0.5 {
                issues.push(
                    Issue::warning(format!(
                        "High sleep drain detected in {} of {} sessions",
                        high,
                        sessions.len()
                    ))
                    .with_detail("More than half of sleep sessions show drain above 5%. Something is preventing efficient sleep.")
                    .with_raw(format!("High drain sessions: {}/{}", high, sessions.len()))
                    .with_recommendation("Check for devices or apps keeping the system active during sleep. Review top offenders list."),
                );
            }

            let excessive: Vec<&SleepSession> =
                sessions.iter().filter(|s| s.drain_percent > 20.0).collect();
            if !excessive.is_empty() {
                let raw = excessive
                    .iter()
                    .map(|s| format!("Duration: {}, Drain: {}%", s.duration, s.drain_percent))
                    .collect::<Vec<_>>()
                    .join("; ");
                issues.push(
                    Issue::critical(format!(
                        "{} sleep session{} with excessive drain (>20%)",
                        excessive.len(),
                        plural(excessive.len())
                    ))
                    .with_detail("One or more sleep sessions drained over 20% battery. The system may not be sleeping properly.")
                    .with_raw(raw)
                    .with_recommendation("Check wake timers, background apps, and connected standby settings. Run \"powercfg /requests\" to see active power requests."),
                );
            }
        }

        if offenders.len() > 5 {
            issues.push(
                Issue::warning(format!(
                    "{} active devices/processes during sleep",
                    offenders.len()
                ))
                .with_detail(format!(
                    "Multiple devices or processes are active during sleep: {}...",
                    offenders[..5].join(", ")
                ))
                .with_raw(offenders.join(", "))
                .with_recommendation("Review which devices need to remain active during sleep. Disable wake-on-LAN for unused network adapters."),
            );
        } else if !offenders.is_empty() {
            issues.push(
                Issue::info(format!(
                    "{} device{} active during sleep",
                    offenders.len(),
                    plural(offenders.len())
                ))
                .with_detail(format!("Active during sleep: {}", offenders.join(", ")))
                .with_raw(offenders.join(", "))
                .with_recommendation("These devices may be normal (e.g., network adapter for wake-on-LAN). Review if any are unexpected."),
            );
        }

        if issues.is_empty() {
            issues.push(
                Issue::info("Sleep study shows no major issues")
                    .with_detail(if sessions.is_empty() {
                        "No detailed sleep session data could be extracted.".to_string()
                    } else {
                        format!("Analyzed {} sleep sessions.", sessions.len())
                    })
                    .with_recommendation("Sleep behavior appears normal."),
            );
        }

        Ok(ParseResult::new(summary, issues))
    }
}
