//! `msinfo32 /report` text export

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{
    capture, capture_trimmed, filename_has, has_extension, parse_float, plural, round,
};
use crate::parsers::{ParserBase, ReportParser};

/// System inventory: CPU, RAM, GPU, drivers and problem devices
pub struct MsInfo {
    base: ParserBase,
}

impl Default for MsInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl MsInfo {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "MSInfo32 Report",
                Category::System,
                "Complete system hardware/software inventory: CPU, RAM, GPU, drivers, devices",
            ),
        }
    }
}

/// Size strings like `16,384 MB` or `7.8 GB` in gigabytes, 0 when unreadable
fn ram_to_gb(text: &str) -> f64 {
    let Some(caps) = regex!(r"(?i)([\d,.]+)\s*(GB|MB|TB|KB)").captures(text) else {
        return 0.0;
    };
    let value = parse_float(&caps[1].replace(',', "")).unwrap_or(0.0);
    match caps[2].to_uppercase().as_str() {
        "TB" => value * 1024.0,
        "GB" => value,
        "MB" => value / 1024.0,
        "KB" => value / (1024.0 * 1024.0),
        _ => 0.0,
    }
}

impl ReportParser for MsInfo {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["msinfo"]) && has_extension(filename, &[".txt"]) {
            return true;
        }
        regex!(r"(?mi)^\[System Summary\]").is_match(content)
            || (regex!(r"(?i)OS Name\s").is_match(content)
                && regex!(r"(?i)System Manufacturer").is_match(content)
                && regex!(r"(?i)System Model").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut summary = Summary::new();

        let os_name = capture_trimmed(regex!(r"(?i)OS Name\s+(.+)"), content)
            .unwrap_or_else(|| "Unknown".to_string());
        let cpu = capture_trimmed(regex!(r"(?i)Processor\s+(.+)"), content)
            .unwrap_or_else(|| "Unknown".to_string());
        let total_ram = capture_trimmed(
            regex!(r"(?i)(?:Total Physical Memory|Installed Physical Memory)\s+([\d,.]+ [GMTK]B)"),
            content,
        );
        let available_ram = capture_trimmed(
            regex!(r"(?i)Available Physical Memory\s+([\d,.]+ [GMTK]B)"),
            content,
        );
        let manufacturer =
            capture_trimmed(regex!(r"(?i)System Manufacturer\s+(.+)"), content).unwrap_or_default();
        let model =
            capture_trimmed(regex!(r"(?i)System Model\s+(.+)"), content).unwrap_or_default();

        summary.insert("os_name", os_name);
        summary.insert(
            "os_version",
            capture_trimmed(regex!(r"(?i)Version\s+([\d.]+)"), content),
        );
        summary.insert("cpu", cpu.clone());
        summary.insert("total_ram", total_ram.clone());
        summary.insert("available_ram", available_ram.clone());
        summary.insert("manufacturer", manufacturer.clone());
        summary.insert("model", model.clone());
        summary.insert(
            "bios",
            capture_trimmed(regex!(r"(?i)BIOS Version/Date\s+(.+)"), content),
        );
        summary.insert(
            "gpu",
            capture_trimmed(
                regex!(
                    r"(?i)(?:Name|Adapter Description)\s+(.*?(?:NVIDIA|AMD|Radeon|GeForce|Intel|Graphics|GPU)[^\r\n]*)"
                ),
                content,
            ),
        );

        if let Some(section) =
            capture(regex!(r"(?i)\[Problem Devices\]([\s\S]*?)(?:\[|$)"), content)
        {
            let devices: Vec<&str> = section
                .trim()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with("Item"))
                .collect();
            if !devices.is_empty() {
                issues.push(
                    Issue::warning(format!(
                        "{} problem device{} detected",
                        devices.len(),
                        plural(devices.len())
                    ))
                    .with_detail(format!(
                        "Devices with issues: {}",
                        devices.iter().take(5).copied().collect::<Vec<_>>().join("; ")
                    ))
                    .with_raw(devices.iter().take(10).copied().collect::<Vec<_>>().join("\n"))
                    .with_recommendation("Update or reinstall drivers for problem devices. Check Device Manager for yellow exclamation marks."),
                );
            }
        }

        if let Some(section) = capture(
            regex!(r"(?i)\[(?:IRQ |I/O |Memory |DMA )?Conflicts[^\[\]]*\]([\s\S]*?)(?:\[|$)"),
            content,
        ) {
            let text = section.trim();
            if text.chars().count() > 10 && !regex!(r"(?i)no conflicts").is_match(text) {
                let lines: Vec<&str> =
                    text.lines().filter(|l| !l.trim().is_empty()).take(5).collect();
                issues.push(
                    Issue::warning("Device conflicts detected")
                        .with_detail("Hardware resource conflicts found that may cause instability.")
                        .with_raw(lines.join("\n"))
                        .with_recommendation("Check Device Manager for conflicting devices. May need to update BIOS or drivers."),
                );
            }
        }

        if let Some(section) =
            capture(regex!(r"(?i)\[(?:Loaded |Signed )?Drivers?\]([\s\S]*?)(?:\[|$)"), content)
        {
            let unsigned: Vec<&str> = section
                .lines()
                .filter(|line| regex!(r"(?i)not signed|no\s*$").is_match(line))
                .map(str::trim)
                .filter(|line| line.chars().count() > 5)
                .collect();
            if !unsigned.is_empty() {
                issues.push(
                    Issue::warning(format!(
                        "{} unsigned driver{} found",
                        unsigned.len(),
                        plural(unsigned.len())
                    ))
                    .with_detail("Unsigned drivers may pose security risks or cause stability issues.")
                    .with_raw(unsigned.iter().take(5).copied().collect::<Vec<_>>().join("\n"))
                    .with_recommendation("Update unsigned drivers to signed versions from the manufacturer."),
                );
            }
        }

        if let (Some(total), Some(available)) = (&total_ram, &available_ram) {
            let total_gb = ram_to_gb(total);
            let available_gb = ram_to_gb(available);
            if total_gb > 0.0 && available_gb >= 0.0 {
                let used = round((total_gb - available_gb) / total_gb * 100.0);
                summary.insert("ram_used_percent", used);
                let detail = format!("{:.1} GB free of {:.1} GB total.", available_gb, total_gb);
                let raw = format!("Total: {}, Available: {}", total, available);
                if used > 90 {
                    issues.push(
                        Issue::critical(format!("RAM usage critically high: {}%", used))
                            .with_detail(detail)
                            .with_raw(raw)
                            .with_recommendation("Close unnecessary applications. Consider upgrading RAM if this is a persistent issue."),
                    );
                } else if used > 80 {
                    issues.push(
                        Issue::warning(format!("RAM usage high: {}%", used))
                            .with_detail(detail)
                            .with_raw(raw)
                            .with_recommendation("Monitor memory usage. Close memory-heavy applications when not needed."),
                    );
                }
            }
        }

        if issues.is_empty() {
            issues.push(
                Issue::info("System hardware appears healthy")
                    .with_detail(format!("{} {} — {}", manufacturer, model, cpu))
                    .with_recommendation("No hardware issues detected."),
            );
        }

        Ok(ParseResult::new(summary, issues))
    }
}
