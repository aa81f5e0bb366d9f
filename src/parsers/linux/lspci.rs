//! `lspci -v` device listing

use serde_json::Value;

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{capture, filename_has, split_before, take_chars};
use crate::parsers::{ParserBase, ReportParser};

/// PCI devices and whether their kernel drivers are bound
pub struct Lspci {
    base: ParserBase,
}

impl Default for Lspci {
    fn default() -> Self {
        Self::new()
    }
}

impl Lspci {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "lspci",
                Category::System,
                "PCI devices, GPUs, network and storage controllers with their kernel drivers",
            ),
        }
    }
}

fn names_or_none(names: &[&str]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

impl ReportParser for Lspci {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["lspci"]) {
            return true;
        }
        regex!(r"(?m)^\d{2}:\d{2}\.\d\s").is_match(take_chars(content, 2000))
            && regex!(r"(?i)Host bridge|VGA compatible|Network controller|Ethernet controller")
                .is_match(content)
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut devices = 0usize;
        let mut gpus: Vec<&str> = Vec::new();
        let mut network: Vec<&str> = Vec::new();
        let mut storage: Vec<&str> = Vec::new();

        for block in split_before(regex!(r"(?m)^\d{2}:\d{2}\.\d\s"), content) {
            let block = block.trim();
            let Some(header) = regex!(r"^(\d{2}:\d{2}\.\d)\s+(.+?):\s*(.+)").captures(block) else {
                continue;
            };
            devices += 1;
            let (kind, name) = match (header.get(2), header.get(3)) {
                (Some(kind), Some(name)) => (kind.as_str(), name.as_str().trim()),
                _ => continue,
            };

            if regex!(r"(?i)VGA|3D|Display").is_match(kind) {
                gpus.push(name);
            } else if regex!(r"(?i)Network|Ethernet|WiFi|Wireless").is_match(kind) {
                network.push(name);
            } else if regex!(r"(?i)SATA|NVMe|RAID|SCSI|IDE|Storage").is_match(kind) {
                storage.push(name);
            }

            let driver = capture(regex!(r"(?i)Kernel\s+driver\s+in\s+use:\s*(.+)"), block);
            let modules = capture(regex!(r"(?i)Kernel\s+modules:\s*(.+)"), block);
            if let (None, Some(modules)) = (driver, modules) {
                if regex!(r"(?i)VGA|3D|Display|Network|Ethernet").is_match(kind) {
                    issues.push(
                        Issue::warning(format!("No kernel driver loaded for: {}", name))
                            .with_detail(format!(
                                "Device type: {}. Available modules: {}",
                                kind, modules
                            ))
                            .with_raw(take_chars(block, 300))
                            .with_recommendation(format!(
                                "Install the appropriate driver. Available modules: {}",
                                modules
                            )),
                    );
                }
            }
        }

        let mut summary = Summary::new().with("devices", devices);
        if !gpus.is_empty() {
            summary.insert("gpu", gpus.join(", "));
        }
        summary.insert("gpus", Value::from(gpus.clone()));
        summary.insert("network_controllers", Value::from(network.clone()));
        summary.insert("storage_controllers", Value::from(storage));

        if gpus.is_empty() {
            issues.push(
                Issue::info("No discrete GPU detected")
                    .with_detail("No VGA or 3D controller found in PCI device list.")
                    .with_recommendation("System may be using integrated graphics or a non-PCI GPU."),
            );
        }

        Ok(ParseResult::new(summary, issues).or_fallback(
            Issue::info(format!("{} PCI devices detected", devices))
                .with_detail("All PCI devices have drivers loaded.")
                .with_raw(format!(
                    "GPUs: {}\nNetwork: {}",
                    names_or_none(&gpus),
                    names_or_none(&network)
                ))
                .with_recommendation("No action needed."),
        ))
    }
}
