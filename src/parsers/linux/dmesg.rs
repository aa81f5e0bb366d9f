//! Kernel ring buffer (`dmesg`)

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{filename_has, take_chars};
use crate::parsers::{ParserBase, ReportParser};

/// Running count of matching lines plus the first few of them as evidence
#[derive(Default)]
struct Tally<'a> {
    count: usize,
    samples: Vec<&'a str>,
}

impl<'a> Tally<'a> {
    fn record(&mut self, line: &'a str, keep: usize) {
        self.count += 1;
        if self.samples.len() < keep {
            self.samples.push(line.trim());
        }
    }

    fn raw(&self) -> String {
        self.samples.join("\n")
    }
}

/// Hardware faults, crashes, OOM kills and USB trouble from the kernel log
pub struct Dmesg {
    base: ParserBase,
}

impl Default for Dmesg {
    fn default() -> Self {
        Self::new()
    }
}

impl Dmesg {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "dmesg",
                Category::System,
                "Kernel messages: hardware errors, crashes, OOM kills, USB faults",
            ),
        }
    }
}

impl ReportParser for Dmesg {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["dmesg"]) {
            return true;
        }
        regex!(r"\[\s*\d+\.\d+\]\s").is_match(take_chars(content, 2000))
            && regex!(r"(?i)Linux\s+version|kernel:|DMI:").is_match(take_chars(content, 5000))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut errors = Tally::default();
        let mut warnings = Tally::default();
        let mut hardware = Tally::default();
        let mut usb = Tally::default();
        let mut crashes = Tally::default();
        let mut oom = Tally::default();

        for line in content.split('\n') {
            if regex!(r"(?i)\berror\b").is_match(line)
                && !regex!(r"(?i)Corrected error").is_match(line)
            {
                errors.record(line, 10);
            }
            if regex!(r"(?i)\bwarn(?:ing)?\b").is_match(line) {
                warnings.record(line, 10);
            }
            if regex!(r"(?i)hardware\s*error|mce|machine\s*check|pcie.*error|AER|GHES")
                .is_match(line)
            {
                hardware.record(line, 5);
            }
            if regex!(r"(?i)usb.*(?:error|fail|disconnect|device\s*descriptor\s*read)")
                .is_match(line)
            {
                usb.record(line, 5);
            }
            // evidence lines keep their original indentation here
            if regex!(r"(?i)segfault|oops|panic|BUG:").is_match(line) {
                crashes.count += 1;
                if crashes.samples.len() < 5 {
                    crashes.samples.push(line);
                }
            }
            if regex!(r"(?i)Out of memory|oom-killer|invoked oom").is_match(line) {
                oom.count += 1;
                if oom.samples.len() < 3 {
                    oom.samples.push(line);
                }
            }
        }

        let summary = Summary::new()
            .with("errors", errors.count)
            .with("warnings", warnings.count)
            .with("hardware_errors", hardware.count)
            .with("usb_errors", usb.count)
            .with("segfaults", crashes.count)
            .with("oom_events", oom.count);

        let mut issues = Vec::new();

        if hardware.count > 0 {
            issues.push(
                Issue::critical(format!(
                    "{} hardware error(s) detected in kernel log",
                    hardware.count
                ))
                    .with_detail("Machine Check Exceptions, PCIe errors, or other hardware faults were logged.")
                    .with_raw(hardware.raw())
                    .with_recommendation("Run hardware diagnostics. Check for overheating, loose components, or failing hardware. Review: dmesg | grep -i \"error\\|mce\\|hardware\""),
            );
        }

        if crashes.count > 0 {
            issues.push(
                Issue::critical(format!("{} segfault(s) or kernel oops detected", crashes.count))
                    .with_detail("Segmentation faults or kernel oops indicate software bugs or memory issues.")
                    .with_raw(crashes.raw())
                    .with_recommendation("Test RAM with memtest86+. Update the kernel and affected software. Check for corrupted files."),
            );
        }

        if oom.count > 0 {
            issues.push(
                Issue::critical(format!("OOM killer invoked {} time(s)", oom.count))
                    .with_detail("The system ran out of memory and had to kill processes.")
                    .with_raw(oom.raw())
                    .with_recommendation("Add more RAM or increase swap. Identify memory-hungry processes with: top or htop."),
            );
        }

        if usb.count > 5 {
            issues.push(
                Issue::warning(format!("{} USB error(s) detected", usb.count))
                    .with_detail("Multiple USB device errors may indicate faulty cables, ports, or devices.")
                    .with_raw(usb.raw())
                    .with_recommendation("Try different USB ports or cables. Update USB drivers. Check for loose connections."),
            );
        } else if usb.count > 0 {
            issues.push(
                Issue::info(format!("{} USB error(s) in kernel log", usb.count))
                    .with_detail("Minor USB errors were detected.")
                    .with_raw(usb.raw())
                    .with_recommendation("Usually harmless if not recurring. Monitor for patterns."),
            );
        }

        if errors.count > 20 {
            issues.push(
                Issue::warning(format!("{} kernel error messages found", errors.count))
                    .with_detail("A high number of error messages in the kernel log.")
                    .with_raw(errors.raw())
                    .with_recommendation("Review errors for patterns: dmesg | grep -i error"),
            );
        }

        Ok(ParseResult::new(summary, issues).or_fallback(
            Issue::info("Kernel log looks clean")
                .with_detail("No significant errors detected in dmesg output.")
                .with_recommendation("No action needed."),
        ))
    }
}
