//! `free -h` and `/proc/meminfo`

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{capture, filename_has, parse_int, round};
use crate::parsers::{ParserBase, ReportParser};

const KB_PER_GB: f64 = 1_048_576.0;

/// RAM and swap pressure on Linux
pub struct LinuxMemory {
    base: ParserBase,
}

impl Default for LinuxMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxMemory {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "Memory (Linux)",
                Category::Performance,
                "RAM and swap usage from free -h and /proc/meminfo",
            ),
        }
    }
}

fn kilobytes(re: &regex::Regex, content: &str) -> Option<i64> {
    capture(re, content).and_then(parse_int)
}

impl ReportParser for LinuxMemory {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["memory-linux", "meminfo"])
            || filename.eq_ignore_ascii_case("free.txt")
        {
            return true;
        }
        (regex!(r"Mem:\s").is_match(content) && regex!(r"Swap:\s").is_match(content))
            || (regex!(r"(?i)MemTotal:").is_match(content)
                && regex!(r"(?i)MemFree:").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut summary = Summary::new();

        if let Some(caps) =
            regex!(r"(?i)Mem:\s+([\d.]+\S+)\s+([\d.]+\S+)\s+([\d.]+\S+)").captures(content)
        {
            summary.insert("total_ram", &caps[1]);
            summary.insert("used_ram", &caps[2]);
            summary.insert("free_ram", &caps[3]);
        }
        if let Some(caps) =
            regex!(r"(?i)Swap:\s+([\d.]+\S+)\s+([\d.]+\S+)\s+([\d.]+\S+)").captures(content)
        {
            summary.insert("total_swap", &caps[1]);
            summary.insert("used_swap", &caps[2]);
            summary.insert("free_swap", &caps[3]);
        }

        let mem_total =
            kilobytes(regex!(r"(?i)MemTotal:\s+(\d+)\s*kB"), content).filter(|kb| *kb > 0);
        let mem_available =
            kilobytes(regex!(r"(?i)MemAvailable:\s+(\d+)\s*kB"), content).filter(|kb| *kb > 0);
        let swap_total = kilobytes(regex!(r"(?i)SwapTotal:\s+(\d+)\s*kB"), content);
        let swap_free = kilobytes(regex!(r"(?i)SwapFree:\s+(\d+)\s*kB"), content);

        let total_gb = mem_total.map(|kb| format!("{:.1} GB", kb as f64 / KB_PER_GB));
        if let (Some(kb), Some(gb)) = (mem_total, &total_gb) {
            summary.insert("total_ram_mb", round(kb as f64 / 1024.0));
            summary.insert("total_ram_gb", gb.as_str());
        }
        if let Some(kb) = mem_available {
            summary.insert("available_ram_mb", round(kb as f64 / 1024.0));
        }

        if let (Some(total), Some(available)) = (mem_total, mem_available) {
            let used = round((total - available) as f64 / total as f64 * 100.0);
            summary.insert("ram_used_percent", used);

            let available_mb = round(available as f64 / 1024.0);
            let total_mb = round(total as f64 / 1024.0);
            let raw = format!("MemTotal: {} kB | MemAvailable: {} kB", total, available);
            if used > 95 {
                issues.push(
                    Issue::critical(format!("RAM usage critically high at {}%", used))
                        .with_detail(format!(
                            "Only {} MB available out of {} MB total.",
                            available_mb, total_mb
                        ))
                        .with_raw(raw)
                        .with_recommendation("Close unused applications. Consider adding more RAM if this is a recurring issue."),
                );
            } else if used > 85 {
                issues.push(
                    Issue::warning(format!("High memory usage: {}%", used))
                        .with_detail(format!(
                            "{} MB available out of {} MB total.",
                            available_mb, total_mb
                        ))
                        .with_raw(raw)
                        .with_recommendation("Monitor memory usage. Close memory-intensive applications if not needed."),
                );
            }
        }

        match (swap_total, swap_free) {
            (Some(total), Some(free)) if total > 0 => {
                let percent = round((total - free) as f64 / total as f64 * 100.0);
                summary.insert("swap_used_percent", percent);
                let raw = format!("SwapTotal: {} kB | SwapFree: {} kB", total, free);
                if percent > 80 {
                    issues.push(
                        Issue::warning(format!("High swap usage: {}%", percent))
                            .with_detail("System is heavily using swap space, which degrades performance.")
                            .with_raw(raw)
                            .with_recommendation("Add more RAM or increase swap size. Check for memory leaks with: top or htop."),
                    );
                } else if percent > 50 {
                    issues.push(
                        Issue::info(format!("Moderate swap usage: {}%", percent))
                            .with_detail("Some swap is being used, which is normal under heavy load.")
                            .with_raw(raw)
                            .with_recommendation("Normal if the system is under load. Monitor for increasing usage."),
                    );
                }
            }
            (Some(0), _) => {
                issues.push(
                    Issue::info("No swap space configured")
                        .with_detail("The system has no swap partition or file.")
                        .with_raw("SwapTotal: 0 kB")
                        .with_recommendation("Consider adding a swap file for systems with limited RAM: sudo fallocate -l 4G /swapfile"),
                );
            }
            _ => {}
        }

        if let Some(total) = mem_total.filter(|kb| (*kb as f64) < 2.0 * KB_PER_GB) {
            issues.push(
                Issue::warning(format!("Low total RAM: {:.1} GB", total as f64 / KB_PER_GB))
                    .with_detail("System has less than 2 GB of RAM.")
                    .with_raw(format!("MemTotal: {} kB", total))
                    .with_recommendation("Consider upgrading RAM for better performance."),
            );
        }

        Ok(ParseResult::new(summary, issues).or_fallback(
            Issue::info("Memory usage is healthy")
                .with_detail(match &total_gb {
                    Some(gb) => format!("Total RAM: {}, usage is normal.", gb),
                    None => "Memory usage is within normal ranges.".to_string(),
                })
                .with_recommendation("No action needed."),
        ))
    }
}
