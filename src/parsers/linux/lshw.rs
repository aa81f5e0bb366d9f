//! `lshw -json` hardware tree

use serde_json::Value;

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{filename_has, take_chars};
use crate::parsers::{ParserBase, ReportParser};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Hardware inventory and unclaimed devices from lshw
pub struct Lshw {
    base: ParserBase,
}

impl Default for Lshw {
    fn default() -> Self {
        Self::new()
    }
}

impl Lshw {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "lshw",
                Category::System,
                "Hardware inventory: CPU, memory, GPU, disks and network from lshw -json",
            ),
        }
    }
}

/// Depth-first flattening of the `children` tree, root first
fn flatten<'a>(node: &'a Value, out: &mut Vec<&'a Value>) {
    match node {
        Value::Array(items) => items.iter().for_each(|item| flatten(item, out)),
        Value::Object(map) => {
            out.push(node);
            if let Some(Value::Array(children)) = map.get("children") {
                children.iter().for_each(|child| flatten(child, out));
            }
        }
        _ => {}
    }
}

fn text<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn class_is(node: &Value, class: &str) -> bool {
    text(node, "class") == Some(class)
}

/// `product`, else `description`, else `default`
fn label<'a>(node: &'a Value, default: &'a str) -> &'a str {
    text(node, "product")
        .or_else(|| text(node, "description"))
        .unwrap_or(default)
}

impl ReportParser for Lshw {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["lshw"]) {
            return true;
        }
        regex!(r#"(?i)"class"\s*:\s*"system""#).is_match(take_chars(content, 3000))
            && regex!(r#"(?i)"children""#).is_match(take_chars(content, 5000))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let data: Value = match serde_json::from_str(content) {
            Ok(data) => data,
            Err(err) => {
                return Ok(ParseResult::with_score(
                    Summary::new(),
                    50,
                    vec![Issue::warning("Could not parse lshw JSON")
                        .with_detail("The file does not appear to be valid JSON.")
                        .with_raw(err.to_string())
                        .with_recommendation("Re-run: sudo lshw -json > lshw.json")],
                ));
            }
        };
        if !data.is_object() && !data.is_array() {
            return Err(ParseError::Malformed {
                parser: self.base.name.clone(),
                message: "expected a JSON object or array at the top level".to_string(),
            });
        }

        let mut components = Vec::new();
        flatten(&data, &mut components);
        let root = components.first().copied().unwrap_or(&data);

        let mut issues = Vec::new();
        let mut summary = Summary::new();

        let cpu = components.iter().copied().find(|c| class_is(c, "processor"));
        if let Some(cpu) = cpu {
            summary.insert("cpu", label(cpu, "Unknown CPU"));
            summary.insert("cpu_vendor", text(cpu, "vendor").unwrap_or(""));
            if let Some(hz) = cpu.get("capacity").and_then(Value::as_f64).filter(|hz| *hz > 0.0) {
                summary.insert("cpu_max_speed", format!("{:.2} GHz", hz / 1e9));
            }
        }

        let ram_bytes = components
            .iter()
            .copied()
            .find(|c| class_is(c, "memory") && text(c, "id") == Some("memory"))
            .and_then(|bank| bank.get("size"))
            .and_then(Value::as_f64)
            .filter(|size| *size > 0.0);
        if let Some(bytes) = ram_bytes {
            summary.insert("total_ram", format!("{:.1} GB", bytes / GIB));
        }

        let gpus: Vec<&str> = components
            .iter()
            .filter(|c| class_is(c, "display"))
            .map(|g| label(g, "Unknown GPU"))
            .collect();
        if !gpus.is_empty() {
            summary.insert("gpu", gpus.join(", "));
        }

        let disks: Vec<String> = components
            .iter()
            .filter(|c| class_is(c, "disk"))
            .map(|d| {
                let size = d
                    .get("size")
                    .and_then(Value::as_f64)
                    .filter(|size| *size > 0.0)
                    .map(|size| format!("{:.0} GB", size / GIB))
                    .unwrap_or_else(|| "Unknown".to_string());
                format!("{} ({})", text(d, "product").unwrap_or("Disk"), size)
            })
            .collect();
        if !disks.is_empty() {
            summary.insert("disks", Value::from(disks));
        }

        let nics: Vec<&str> = components
            .iter()
            .filter(|c| class_is(c, "network"))
            .map(|n| label(n, "Network Adapter"))
            .collect();
        if !nics.is_empty() {
            summary.insert("network_adapters", Value::from(nics));
        }

        if let Some(model) = text(root, "product") {
            summary.insert("model", model);
        }
        if let Some(vendor) = text(root, "vendor") {
            summary.insert("manufacturer", vendor);
        }

        if cpu.is_none() {
            issues.push(
                Issue::warning("CPU information not found in lshw output")
                    .with_detail("The lshw report did not contain processor information.")
                    .with_recommendation("Ensure lshw was run with sudo: sudo lshw -json"),
            );
        }

        if ram_bytes.is_none() {
            issues.push(
                Issue::info("Memory size not detected")
                    .with_detail("Could not determine total system RAM from the lshw report.")
                    .with_recommendation("Check with: free -h or cat /proc/meminfo"),
            );
        }

        let unclaimed: Vec<&Value> = components
            .iter()
            .copied()
            .filter(|c| {
                c.get("claimed").and_then(Value::as_bool) == Some(false)
                    || c.get("disabled").and_then(Value::as_bool) == Some(true)
            })
            .collect();
        if !unclaimed.is_empty() {
            issues.push(
                Issue::warning(format!("{} unclaimed/disabled device(s) found", unclaimed.len()))
                    .with_detail("Some hardware devices are not claimed by a driver or are disabled.")
                    .with_raw(
                        unclaimed
                            .iter()
                            .map(|u| {
                                format!(
                                    "{}: {}",
                                    text(u, "class").unwrap_or(""),
                                    label(u, text(u, "id").unwrap_or(""))
                                )
                            })
                            .collect::<Vec<_>>()
                            .join("\n"),
                    )
                    .with_recommendation("Install missing drivers or enable disabled devices. Check: lspci -v for details."),
            );
        }

        Ok(ParseResult::new(summary, issues).or_fallback(
            Issue::info("Hardware inventory looks good")
                .with_detail("All hardware components detected and claimed by drivers.")
                .with_recommendation("No action needed."),
        ))
    }
}
