//! `systemd-analyze` and `systemd-analyze blame`

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Severity, Summary};
use crate::parsers::text::{filename_has, parse_float, round_to};
use crate::parsers::{ParserBase, ReportParser};

/// Boot duration and slow units from systemd-analyze
pub struct SystemdAnalyze {
    base: ParserBase,
}

impl Default for SystemdAnalyze {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemdAnalyze {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "systemd-analyze",
                Category::Performance,
                "Boot time split into kernel and userspace, plus the slowest units",
            ),
        }
    }
}

/// `value` expressed in `unit` (`min`, `s` or `ms`) as seconds
fn seconds(value: &str, unit: &str) -> Option<f64> {
    let value = parse_float(value)?;
    Some(match unit {
        "min" => value * 60.0,
        "ms" => value / 1000.0,
        _ => value,
    })
}

/// `(name, seconds)` for blame lines like `1min 2.345s snapd.service`
fn blame(content: &str) -> Vec<(&str, f64)> {
    let section = content
        .find("---BLAME---")
        .map_or(content, |start| &content[start..]);

    section
        .split('\n')
        .filter_map(|line| {
            let caps = regex!(r"^(?:(\d+)min\s+)?([\d.]+)(ms|s)\s+(.+)").captures(line.trim())?;
            let minutes: f64 = caps.get(1).map_or(Some(0.0), |m| m.as_str().parse().ok())?;
            let secs = seconds(caps.get(2)?.as_str(), caps.get(3)?.as_str())?;
            Some((caps.get(4)?.as_str().trim(), secs + minutes * 60.0))
        })
        .collect()
}

impl ReportParser for SystemdAnalyze {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["systemd-analyze", "systemd_analyze"]) {
            return true;
        }
        regex!(r"(?i)Startup\s+finished\s+in").is_match(content)
            || regex!(r"(?m)^\s*\d+[\d.]*m?s\s+\S+\.service").is_match(content)
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut summary = Summary::new();

        let mut total_boot = None;
        let mut split: Option<(String, String)> = None;
        if let Some(caps) =
            regex!(r"(?i)Startup\s+finished\s+in\s+(.+?)\s*=\s*([\d.]+)(min|s|ms)")
                .captures(content)
        {
            if let Some(total) = seconds(&caps[2], &caps[3]) {
                let shown = format!("{:.1}s", total);
                summary.insert("total_boot_time", shown.as_str());
                summary.insert("total_boot_seconds", round_to(total, 3));
                total_boot = Some((total, shown));
            }

            if let Some(parts) = regex!(
                r"(?i)Startup\s+finished\s+in\s+([\d.]+)(min|s|ms)\s*\(kernel\)\s*\+\s*([\d.]+)(min|s|ms)\s*\(userspace\)"
            )
            .captures(content)
            {
                if let (Some(kernel), Some(userspace)) =
                    (seconds(&parts[1], &parts[2]), seconds(&parts[3], &parts[4]))
                {
                    let kernel = format!("{:.1}s", kernel);
                    let userspace = format!("{:.1}s", userspace);
                    summary.insert("kernel_time", kernel.as_str());
                    summary.insert("userspace_time", userspace.as_str());
                    split = Some((kernel, userspace));
                }
            }
        }

        let services = blame(content);
        let slow: Vec<&(&str, f64)> = services.iter().filter(|(_, secs)| *secs > 10.0).collect();
        summary.insert("total_services", services.len());
        summary.insert("slow_services", slow.len());

        if let Some((total, shown)) = &total_boot {
            if *total > 120.0 {
                let raw = match &split {
                    Some((kernel, userspace)) => format!(
                        "Total: {} | Kernel: {} | Userspace: {}",
                        shown, kernel, userspace
                    ),
                    None => format!("Total: {}", shown),
                };
                issues.push(
                    Issue::warning(format!("Slow boot time: {}", shown))
                        .with_detail("Total boot time exceeds 2 minutes.")
                        .with_raw(raw)
                        .with_recommendation("Disable unnecessary services. Run: systemd-analyze blame to see the slowest services."),
                );
            } else if *total > 60.0 {
                issues.push(
                    Issue::info(format!("Boot time: {}", shown))
                        .with_detail("Boot time is over a minute, which may be improvable.")
                        .with_raw(format!("Total: {}", shown))
                        .with_recommendation("Review slow services and consider disabling unused ones."),
                );
            }
        }

        if !slow.is_empty() {
            let severity = if slow.len() > 3 {
                Severity::Warning
            } else {
                Severity::Info
            };
            issues.push(
                Issue::new(severity, format!("{} slow boot service(s) (>10s)", slow.len()))
                    .with_detail("These services took the longest to start during boot.")
                    .with_raw(
                        slow.iter()
                            .take(5)
                            .map(|(name, secs)| format!("{:.1}s — {}", secs, name))
                            .collect::<Vec<_>>()
                            .join("\n"),
                    )
                    .with_recommendation("Consider disabling or optimizing slow services: sudo systemctl disable <service-name>"),
            );
        }

        Ok(ParseResult::new(summary, issues).or_fallback(
            Issue::info("Boot performance is good")
                .with_detail(match &total_boot {
                    Some((_, shown)) => format!("Total boot time: {}", shown),
                    None => "No slow services detected.".to_string(),
                })
                .with_recommendation("No action needed."),
        ))
    }
}
