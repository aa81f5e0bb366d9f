//! `systeminfo` text output

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{
    capture, filename_has, has_extension, parse_float, parse_int, round, Clock,
};
use crate::parsers::{ParserBase, ReportParser};

/// OS version, uptime, memory and hotfixes from `systeminfo`
pub struct SystemInfo {
    base: ParserBase,
    clock: Clock,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemInfo {
    pub fn new() -> Self {
        Self::with_clock(Clock::System)
    }

    /// Use `clock` when computing uptime
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            base: ParserBase::new(
                "System Info",
                Category::System,
                "OS version, boot time, uptime, RAM, network configuration, hotfixes",
            ),
            clock,
        }
    }
}

/// Value of the first `label: value` line, empty when missing
fn labelled(content: &str, label: &str) -> String {
    regex!(r"(?m)^[ \t]*([^:\r\n]+?)[ \t]*:[ \t]*([^\r\n]*)")
        .captures_iter(content)
        .find(|caps| caps[1].eq_ignore_ascii_case(label))
        .map(|caps| caps[2].trim().to_string())
        .unwrap_or_default()
}

/// Boot times like `2/15/2026, 10:30:00 AM`, or ISO `2026-02-15 10:30:00`
fn parse_boot_time(text: &str) -> Option<NaiveDateTime> {
    if let Some(caps) =
        regex!(r"(?i)(\d{1,2})/(\d{1,2})/(\d{4}),?\s*(\d{1,2}):(\d{2}):(\d{2})\s*(AM|PM)?")
            .captures(text)
    {
        let mut hour: u32 = caps[4].parse().ok()?;
        if let Some(meridiem) = caps.get(7) {
            let pm = meridiem.as_str().eq_ignore_ascii_case("PM");
            if pm && hour < 12 {
                hour += 12;
            } else if !pm && hour == 12 {
                hour = 0;
            }
        }
        let date = NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
        )?;
        return date.and_hms_opt(hour, caps[5].parse().ok()?, caps[6].parse().ok()?);
    }

    NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Memory strings like `16,234 MB` or `7.5 GB` in megabytes, 0 when unreadable
fn to_megabytes(text: &str) -> f64 {
    if let Some(mb) = capture(regex!(r"(?i)([\d,.]+)\s*MB"), text) {
        return parse_float(&mb.replace(',', "")).unwrap_or(0.0);
    }
    if let Some(gb) = capture(regex!(r"(?i)([\d,.]+)\s*GB"), text) {
        return parse_float(&gb.replace(',', "")).unwrap_or(0.0) * 1024.0;
    }
    0.0
}

impl ReportParser for SystemInfo {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["sysinfo", "systeminfo"])
            && has_extension(filename, &[".txt"])
        {
            return true;
        }
        regex!(r"(?i)Host Name:").is_match(content)
            && regex!(r"(?i)OS Name:").is_match(content)
            && regex!(r"(?i)System Boot Time:").is_match(content)
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut summary = Summary::new();

        let os_name = labelled(content, "OS Name");
        let os_version = labelled(content, "OS Version");
        let manufacturer = labelled(content, "System Manufacturer");
        let model = labelled(content, "System Model");
        let boot_time = labelled(content, "System Boot Time");
        let total_memory = labelled(content, "Total Physical Memory");
        let available_memory = labelled(content, "Available Physical Memory");

        summary.insert("host_name", labelled(content, "Host Name"));
        summary.insert("os_name", os_name.clone());
        summary.insert("os_version", os_version.clone());
        summary.insert("manufacturer", manufacturer.clone());
        summary.insert("model", model.clone());
        summary.insert("system_type", labelled(content, "System Type"));
        summary.insert("boot_time", boot_time.clone());
        summary.insert("original_install", labelled(content, "Original Install Date"));
        summary.insert("total_physical_memory", total_memory.clone());
        summary.insert("available_physical_memory", available_memory.clone());

        if let Some(booted) = parse_boot_time(&boot_time) {
            let uptime = self.clock.now() - booted;
            let days = uptime.num_days();
            let hours = uptime.num_hours() % 24;
            summary.insert("uptime_days", days);
            summary.insert("uptime_hours", hours);

            if days > 30 {
                issues.push(
                    Issue::warning(format!("System hasn't been rebooted in {} days", days))
                        .with_detail(format!(
                            "Last boot: {}. Uptime: {} days, {} hours.",
                            boot_time, days, hours
                        ))
                        .with_raw(format!("System Boot Time: {}", boot_time))
                        .with_recommendation("Restart your computer regularly (at least weekly) to apply updates and clear memory leaks."),
                );
            } else if days > 14 {
                issues.push(
                    Issue::info(format!("System uptime: {} days", days))
                        .with_detail(format!("Last boot: {}.", boot_time))
                        .with_raw(format!("System Boot Time: {}", boot_time))
                        .with_recommendation("Consider restarting soon to apply any pending updates."),
                );
            }
        }

        if !total_memory.is_empty() && !available_memory.is_empty() {
            let total_mb = to_megabytes(&total_memory);
            let available_mb = to_megabytes(&available_memory);
            if total_mb > 0.0 && available_mb >= 0.0 {
                let used = round((total_mb - available_mb) / total_mb * 100.0);
                summary.insert("ram_used_percent", used);
                let raw = format!("Total: {}, Available: {}", total_memory, available_memory);

                if total_mb < 4096.0 {
                    issues.push(
                        Issue::warning(format!("Low total RAM: {}", total_memory))
                            .with_detail("Less than 4 GB of RAM may cause performance issues with modern applications.")
                            .with_raw(format!("Total Physical Memory: {}", total_memory))
                            .with_recommendation("Consider upgrading RAM to at least 8 GB for better performance."),
                    );
                }

                if used > 90 {
                    issues.push(
                        Issue::critical(format!("RAM usage critically high: {}%", used))
                            .with_detail(format!(
                                "Only {} free of {} total.",
                                available_memory, total_memory
                            ))
                            .with_raw(raw)
                            .with_recommendation("Close unnecessary applications immediately. Consider upgrading RAM."),
                    );
                } else if used > 80 {
                    issues.push(
                        Issue::warning(format!("RAM usage high: {}%", used))
                            .with_detail(format!(
                                "{} free of {} total.",
                                available_memory, total_memory
                            ))
                            .with_raw(raw)
                            .with_recommendation("Monitor memory usage. Close memory-heavy applications when not needed."),
                    );
                }
            }
        }

        let hotfix_count = capture(regex!(r"(?i)Hotfix\(s\):\s*(\d+)\s*Hotfix"), content);
        if let Some(count) = hotfix_count.and_then(parse_int) {
            summary.insert("hotfix_count", count);
        }

        let mut hotfixes: Vec<String> = Vec::new();
        for kb in regex!(r"(?i)KB\d+").find_iter(content) {
            let kb = kb.as_str().to_uppercase();
            if !hotfixes.contains(&kb) {
                hotfixes.push(kb);
            }
        }
        summary.insert("hotfixes", Value::from(hotfixes));

        if let Some(hyper_v) = capture(regex!(r"(?i)Hyper-V Requirements:\s*(.+)"), content) {
            summary.insert("hyper_v", hyper_v.trim());
        }
        let nic_count = capture(regex!(r"(?i)Network Card\(s\):\s*(\d+)"), content);
        if let Some(nics) = nic_count.and_then(parse_int) {
            summary.insert("network_adapters", nics);
        }

        if issues.is_empty() {
            issues.push(
                Issue::info("System info looks healthy")
                    .with_detail(format!(
                        "{} {} — {} {}",
                        os_name, os_version, manufacturer, model
                    ))
                    .with_recommendation("No issues detected from system info."),
            );
        }

        Ok(ParseResult::new(summary, issues))
    }
}
