//! `ip addr` output, optionally followed by `---SS---` and `ss -tuna`

use serde_json::{json, Value};

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{capture, filename_has, split_before, take_chars};
use crate::parsers::{ParserBase, ReportParser};

struct Interface<'a> {
    name: &'a str,
    state: &'a str,
    ipv4: Option<&'a str>,
    ipv6: Option<&'a str>,
    loopback: bool,
    mac: Option<&'a str>,
}

impl Interface<'_> {
    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "state": self.state,
            "ip": self.ipv4,
            "ipv6": self.ipv6,
            "loopback": self.loopback,
            "mac": self.mac,
        })
    }
}

/// Interface state and addressing plus socket counts on Linux
pub struct LinuxNetwork {
    base: ParserBase,
}

impl Default for LinuxNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxNetwork {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "Network (Linux)",
                Category::Network,
                "Interfaces, addresses and listening sockets from ip addr and ss",
            ),
        }
    }
}

impl ReportParser for LinuxNetwork {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["network-linux"])
            || filename.eq_ignore_ascii_case("ip-addr.txt")
        {
            return true;
        }
        regex!(r"(?m)^\d+:\s+\S+:\s+<").is_match(content)
            || (regex!(r"inet\s+\d+\.\d+").is_match(content)
                && regex!(r"(?i)BROADCAST|LOOPBACK|MULTICAST").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut sections = regex!(r"(?i)---SS---").splitn(content, 2);
        let ip_section = sections.next().unwrap_or(content);
        let ss_section = sections.next().unwrap_or("");

        let mut issues = Vec::new();
        let mut interfaces: Vec<Interface> = Vec::new();

        for block in split_before(regex!(r"(?m)^\d+:\s"), ip_section) {
            let block = block.trim();
            let Some(header) = regex!(r"^\d+:\s+(\S+):\s+<([^>]*)>").captures(block) else {
                continue;
            };
            let (Some(name), Some(flags)) = (header.get(1), header.get(2)) else {
                continue;
            };
            let (name, flags) = (name.as_str(), flags.as_str());
            let up = regex!(r"\bUP\b").is_match(flags);
            let loopback = regex!(r"\bLOOPBACK\b").is_match(flags);
            let state = capture(regex!(r"state\s+(\S+)"), block)
                .unwrap_or(if up { "UP" } else { "DOWN" });
            let ipv4 = capture(regex!(r"inet\s+([\d.]+)/\d+"), block);

            if !loopback && state == "DOWN" {
                issues.push(
                    Issue::warning(format!("Network interface {} is DOWN", name))
                        .with_detail(format!("Interface {} is not active.", name))
                        .with_raw(take_chars(block, 200))
                        .with_recommendation(format!(
                            "Bring it up with: sudo ip link set {} up",
                            name
                        )),
                );
            }
            if !loopback && up && ipv4.is_none() && state != "DOWN" {
                issues.push(
                    Issue::warning(format!("Interface {} has no IPv4 address", name))
                        .with_detail("The interface is up but has no IP address assigned.")
                        .with_raw(format!("Interface: {} | State: {}", name, state))
                        .with_recommendation("Check DHCP or configure a static IP address."),
                );
            }

            interfaces.push(Interface {
                name,
                state,
                ipv4,
                ipv6: capture(regex!(r"inet6\s+([\da-f:]+)/\d+"), block),
                loopback,
                mac: capture(regex!(r"(?i)link/ether\s+([\da-f:]+)"), block),
            });
        }

        let mut summary = Summary::new();
        summary.insert(
            "interfaces",
            Value::Array(interfaces.iter().map(Interface::to_json).collect()),
        );

        let mut connections = 0;
        if !ss_section.is_empty() {
            let lines: Vec<&str> = ss_section.trim().split('\n').collect();
            let listening = lines.iter().filter(|l| regex!(r"(?i)^LISTEN").is_match(l)).count();
            let established = lines.iter().filter(|l| regex!(r"(?i)^ESTAB").is_match(l)).count();
            connections = listening + established;
            summary.insert("listening_ports", listening);
            summary.insert("established_connections", established);

            if listening > 50 {
                issues.push(
                    Issue::info(format!("{} listening ports detected", listening))
                        .with_detail("A high number of services are listening for incoming connections.")
                        .with_raw(format!(
                            "Listening: {} | Established: {}",
                            listening, established
                        ))
                        .with_recommendation("Review listening services: ss -tulnp. Disable unnecessary services."),
                );
            }
        }
        summary.insert("connections", connections);

        let active: Vec<&Interface> = interfaces
            .iter()
            .filter(|i| !i.loopback && i.ipv4.is_some())
            .collect();
        if active.is_empty() && !interfaces.is_empty() {
            issues.push(
                Issue::critical("No active network connection detected")
                    .with_detail("No non-loopback interface has an IP address assigned.")
                    .with_raw(format!(
                        "Interfaces: {}",
                        interfaces
                            .iter()
                            .map(|i| format!("{}({})", i.name, i.state))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                    .with_recommendation("Check network cables, WiFi connection, or DHCP configuration."),
            );
        }

        summary.insert(
            "adapters",
            Value::Array(
                active
                    .iter()
                    .map(|i| json!({ "name": i.name, "ip": i.ipv4 }))
                    .collect(),
            ),
        );

        Ok(ParseResult::new(summary, issues).or_fallback(
            Issue::info("Network configuration looks good")
                .with_detail(format!("{} active interface(s) with IP addresses.", active.len()))
                .with_raw(
                    active
                        .iter()
                        .map(|i| format!("{}: {}", i.name, i.ipv4.unwrap_or("")))
                        .collect::<Vec<_>>()
                        .join(", "),
                )
                .with_recommendation("No action needed."),
        ))
    }
}
