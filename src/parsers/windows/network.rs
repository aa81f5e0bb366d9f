//! `ipconfig /all` text output

use serde_json::{json, Value};

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{filename_has, has_extension, plural};
use crate::parsers::{ParserBase, ReportParser};

struct Adapter {
    name: String,
    connected: bool,
    ipv4: String,
    ipv6: String,
    subnet_mask: String,
    gateway: String,
    dns: Vec<String>,
    dhcp: String,
    mac_address: String,
    description: String,
}

impl Adapter {
    fn is_apipa(&self) -> bool {
        self.ipv4.starts_with("169.254.")
    }

    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "connected": self.connected,
            "ipv4": self.ipv4,
            "ipv6": self.ipv6,
            "subnet_mask": self.subnet_mask,
            "gateway": self.gateway,
            "dns": self.dns,
            "dhcp": self.dhcp,
            "mac_address": self.mac_address,
            "description": self.description,
        })
    }
}

/// Adapter addressing, gateway, DNS and DHCP from `ipconfig /all`
pub struct NetworkConfig {
    base: ParserBase,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "Network Config",
                Category::Network,
                "IP addresses, DNS servers, DHCP, network adapter details",
            ),
        }
    }
}

/// Non-empty values of `Label . . . . : value` lines whose label starts with
/// `label`, each with the offset where its line ends
///
/// The value never spills onto the next line.
fn label_values<'a>(block: &'a str, label: &'a str) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    regex!(r"(?m)^[ \t]*([^:\r\n]*?)[ .]*:[ \t]*([^\r\n]*)")
        .captures_iter(block)
        .filter(move |caps| caps[1].to_lowercase().starts_with(&label.to_lowercase()))
        .filter_map(|caps| {
            let value = caps.get(2)?;
            let trimmed = value.as_str().trim();
            (!trimmed.is_empty()).then_some((value.end(), trimmed))
        })
}

fn labelled(block: &str, label: &str) -> String {
    label_values(block, label)
        .next()
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

/// Every value for `label`, plus the indented continuation lines after the first
fn labelled_all(block: &str, label: &str) -> Vec<String> {
    let found: Vec<(usize, &str)> = label_values(block, label).collect();
    let mut values: Vec<String> = found.iter().map(|(_, value)| value.to_string()).collect();

    if let Some((line_end, _)) = found.first() {
        for line in block[*line_end..].lines().skip(1) {
            let head: String = line.chars().take(30).collect();
            let continuation = regex!(r"^\s{20,}[\d.:a-fA-F]").is_match(line)
                || (line.starts_with(char::is_whitespace)
                    && line.chars().any(|c| c.is_ascii_digit())
                    && !regex!(r":\s").is_match(&head));
            if !continuation {
                break;
            }
            values.push(line.trim().to_string());
        }
    }
    values
}

fn strip_note(address: &str) -> String {
    regex!(r"\(.*\)").replace(address, "").trim().to_string()
}

fn parse_adapters(content: &str) -> Vec<Adapter> {
    regex!(r"(?i)(?:Ethernet adapter|Wireless LAN adapter|Unknown adapter)\s+")
        .split(content)
        .skip(1)
        .enumerate()
        .map(|(idx, block)| {
            let name = regex!(r"^([^:]+):")
                .captures(block)
                .map(|caps| caps[1].trim().to_string())
                .unwrap_or_else(|| format!("Adapter {}", idx + 1));
            let ipv6 = Some(labelled(block, "IPv6 Address"))
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| labelled(block, "Link-local IPv6"));
            Adapter {
                name,
                connected: !regex!(r"(?i)Media disconnected").is_match(block),
                ipv4: strip_note(&labelled(block, "IPv4 Address")),
                ipv6: strip_note(&ipv6),
                subnet_mask: labelled(block, "Subnet Mask"),
                gateway: labelled(block, "Default Gateway"),
                dns: labelled_all(block, "DNS Servers"),
                dhcp: labelled(block, "DHCP Enabled"),
                mac_address: labelled(block, "Physical Address"),
                description: labelled(block, "Description"),
            }
        })
        .collect()
}

impl ReportParser for NetworkConfig {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["ipconfig", "network"]) && has_extension(filename, &[".txt"]) {
            return true;
        }
        regex!(r"(?i)Windows IP Configuration").is_match(content)
            || (regex!(r"(?i)IPv4 Address").is_match(content)
                && regex!(r"(?i)Subnet Mask").is_match(content)
                && regex!(r"(?i)Default Gateway").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let adapters = parse_adapters(content);
        let connected: Vec<&Adapter> = adapters.iter().filter(|a| a.connected).collect();

        let mut summary = Summary::new()
            .with("adapter_count", adapters.len())
            .with("connected_adapters", connected.len());
        summary.insert(
            "adapters",
            Value::Array(adapters.iter().map(Adapter::to_json).collect()),
        );

        if connected.is_empty() && !adapters.is_empty() {
            let verb = if adapters.len() > 1 { "s are" } else { " is" };
            issues.push(
                Issue::critical("No network adapters are connected")
                    .with_detail(format!(
                        "All {} network adapter{} disconnected.",
                        adapters.len(),
                        verb
                    ))
                    .with_raw(
                        adapters
                            .iter()
                            .map(|a| format!("{}: Disconnected", a.name))
                            .collect::<Vec<_>>()
                            .join("\n"),
                    )
                    .with_recommendation("Check physical network connections (Ethernet cable or WiFi). Enable network adapters in Network Settings."),
            );
        }

        for adapter in &connected {
            if adapter.is_apipa() {
                issues.push(
                    Issue::critical(format!("{}: APIPA address detected (no DHCP)", adapter.name))
                        .with_detail(format!(
                            "Adapter \"{}\" has IP {}, which is a self-assigned address. This means DHCP failed and the adapter cannot reach the network.",
                            adapter.name, adapter.ipv4
                        ))
                        .with_raw(format!("{}: IPv4 {}", adapter.name, adapter.ipv4))
                        .with_recommendation("Check DHCP server (router) is running. Try: ipconfig /release && ipconfig /renew. Restart the router if needed."),
                );
            }

            let no_gateway = adapter.gateway.is_empty() || adapter.gateway == "0.0.0.0";
            if no_gateway && !adapter.ipv4.is_empty() && !adapter.is_apipa() {
                issues.push(
                    Issue::warning(format!("{}: No default gateway configured", adapter.name))
                        .with_detail(format!(
                            "Adapter \"{}\" has IP {} but no default gateway. Internet access will not work.",
                            adapter.name, adapter.ipv4
                        ))
                        .with_raw(format!(
                            "{}: Gateway: {}",
                            adapter.name,
                            if adapter.gateway.is_empty() { "none" } else { &adapter.gateway }
                        ))
                        .with_recommendation("Check network configuration. If using static IP, ensure the gateway is set correctly."),
                );
            }

            if adapter.dns.iter().all(String::is_empty) {
                issues.push(
                    Issue::warning(format!("{}: No DNS servers configured", adapter.name))
                        .with_detail(format!(
                            "Adapter \"{}\" has no DNS servers. Name resolution will fail.",
                            adapter.name
                        ))
                        .with_raw(format!("{}: DNS: none", adapter.name))
                        .with_recommendation("Set DNS servers (e.g., 8.8.8.8 and 8.8.4.4 for Google DNS, or 1.1.1.1 for Cloudflare)."),
                );
            }
        }

        let static_ip: Vec<&&Adapter> = connected
            .iter()
            .filter(|a| regex!(r"(?i)no").is_match(&a.dhcp))
            .collect();
        if !static_ip.is_empty() {
            let verb = if static_ip.len() > 1 { "s use" } else { " uses" };
            issues.push(
                Issue::info(format!("{} adapter{} static IP", static_ip.len(), verb))
                    .with_detail(format!(
                        "Static IP adapters: {}",
                        static_ip
                            .iter()
                            .map(|a| format!("{} ({})", a.name, a.ipv4))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                    .with_recommendation("Static IP is fine for servers/printers. For regular use, DHCP is recommended."),
            );
        }

        if issues.is_empty() {
            issues.push(
                Issue::info("Network configuration looks healthy")
                    .with_detail(format!(
                        "{} connected adapter{}.",
                        connected.len(),
                        plural(connected.len())
                    ))
                    .with_raw(
                        connected
                            .iter()
                            .map(|a| format!("{}: {}", a.name, a.ipv4))
                            .collect::<Vec<_>>()
                            .join(", "),
                    )
                    .with_recommendation("No network configuration issues detected."),
            );
        }

        Ok(ParseResult::new(summary, issues))
    }
}
