use pchc::models::Severity;
use pchc::parsers::linux::{LinuxMemory, LinuxNetwork, LinuxUpdates, Smartctl, SystemdAnalyze};
use pchc::parsers::{DefaultParserRegistry, ParserRegistry, ReportParser};
use pretty_assertions::assert_eq;
use rstest::rstest;

const SMARTCTL: &str = "\
smartctl 7.2 2020-12-30 r5155 [x86_64-linux-5.15.0] (local build)
Device Model:     Samsung SSD 860 EVO 500GB
Serial Number:    S3Z1NB0K123456
SMART overall-health self-assessment test result: PASSED
ID# ATTRIBUTE_NAME          FLAG     VALUE WORST THRESH TYPE      UPDATED  WHEN_FAILED RAW_VALUE
  5 Reallocated_Sector_Ct   0x0033   100   100   010    Pre-fail  Always       -       12
  9 Power_On_Hours          0x0032   093   093   000    Old_age   Always       -       31000
194 Temperature_Celsius     0x0022   036   045   000    Old_age   Always       -       36 (Min/Max 19/45)
197 Current_Pending_Sector  0x0012   100   100   000    Old_age   Always       -       0
";

const MEMINFO: &str = "\
MemTotal:       16000000 kB
MemFree:          500000 kB
MemAvailable:     320000 kB
SwapTotal:             0 kB
SwapFree:              0 kB
";

const APT_UPGRADABLE: &str = "\
Listing... Done
openssl/jammy-security 3.0.2-0ubuntu1.15 amd64 [upgradable from: 3.0.2-0ubuntu1.14]
vim/jammy-updates 2:8.2.3995-1ubuntu2.16 amd64 [upgradable from: 2:8.2.3995-1ubuntu2.15]
";

const IP_ADDR: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN group default qlen 1000
    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
    inet 127.0.0.1/8 scope host lo
2: eth0: <NO-CARRIER,BROADCAST,MULTICAST,UP> mtu 1500 qdisc fq_codel state DOWN group default qlen 1000
    link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff
";

const SYSTEMD_ANALYZE: &str = "\
Startup finished in 5.2s (kernel) + 130.5s (userspace) = 135.7s
graphical.target reached after 130s in userspace
---BLAME---
15.201s NetworkManager-wait-online.service
2.100s snapd.service
";

#[rstest]
#[case("smartctl.txt", SMARTCTL, "smartctl")]
#[case("meminfo.txt", MEMINFO, "Memory (Linux)")]
#[case("apt.txt", APT_UPGRADABLE, "Linux Updates")]
#[case("ip-addr.txt", IP_ADDR, "Network (Linux)")]
#[case("boot.txt", SYSTEMD_ANALYZE, "systemd-analyze")]
fn test_linux_reports_are_detected(
    #[case] filename: &str,
    #[case] content: &str,
    #[case] expected: &str,
) {
    let registry = DefaultParserRegistry::with_default_parsers();

    let outcome = registry
        .detect_and_parse(filename, content)
        .expect("recognised");

    assert_eq!(outcome.parser.name, expected);
}

#[test]
fn test_smartctl_reads_raw_values() {
    let result = Smartctl::new().parse(SMARTCTL).expect("parse");

    assert_eq!(result.summary.get_str("model"), Some("Samsung SSD 860 EVO 500GB"));
    assert_eq!(result.summary.get_str("health"), Some("PASSED"));
    assert_eq!(result.summary.get_i64("reallocated_sectors"), Some(12));
    assert_eq!(result.summary.get_i64("power_on_hours"), Some(31000));
    assert_eq!(result.summary.get_str("temperature"), Some("36 C"));

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].severity, Severity::Warning);
    assert_eq!(result.issues[0].title, "12 reallocated sector(s) detected");
    assert_eq!(result.score, 90);
}

#[test]
fn test_smartctl_failed_health_is_critical() {
    let content = "SMART overall-health self-assessment test result: FAILED!\n";

    let result = Smartctl::new().parse(content).expect("parse");

    assert_eq!(result.issues[0].severity, Severity::Critical);
    assert_eq!(result.issues[0].title, "SMART health check FAILED: FAILED!");
}

#[test]
fn test_healthy_drive_gets_fallback_note() {
    let content = "\
Device Model:     Samsung SSD 860 EVO 500GB
SMART overall-health self-assessment test result: PASSED
";
    let result = Smartctl::new().parse(content).expect("parse");

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].title, "Disk SMART health is good");
    assert_eq!(result.score, 100);
}

#[test]
fn test_meminfo_pressure_and_missing_swap() {
    let result = LinuxMemory::new().parse(MEMINFO).expect("parse");

    let titles: Vec<&str> = result.issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["RAM usage critically high at 98%", "No swap space configured"]
    );
    assert_eq!(result.summary.get_i64("ram_used_percent"), Some(98));
    assert_eq!(result.score, 68);
}

#[test]
fn test_apt_security_updates_are_critical() {
    let result = LinuxUpdates::new().parse(APT_UPGRADABLE).expect("parse");

    assert_eq!(result.summary.get_i64("total_updates"), Some(2));
    assert_eq!(result.summary.get_i64("security_updates"), Some(1));
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].title, "1 security update(s) pending");
    assert_eq!(
        result.issues[0].recommendation,
        "Run: sudo apt update && sudo apt upgrade -y"
    );
}

#[test]
fn test_up_to_date_system() {
    let result = LinuxUpdates::new().parse("Listing... Done\n").expect("parse");

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].title, "System is up to date");
}

#[test]
fn test_down_interface_without_connectivity() {
    let result = LinuxNetwork::new().parse(IP_ADDR).expect("parse");

    let titles: Vec<&str> = result.issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Network interface eth0 is DOWN",
            "No active network connection detected"
        ]
    );
    assert_eq!(result.score, 60);
}

#[test]
fn test_slow_boot_and_services() {
    let result = SystemdAnalyze::new().parse(SYSTEMD_ANALYZE).expect("parse");

    assert_eq!(result.summary.get_str("total_boot_time"), Some("135.7s"));
    assert_eq!(result.summary.get_str("kernel_time"), Some("5.2s"));
    assert_eq!(result.summary.get_str("userspace_time"), Some("130.5s"));
    assert_eq!(result.summary.get_i64("total_services"), Some(2));
    assert_eq!(result.summary.get_i64("slow_services"), Some(1));

    let titles: Vec<&str> = result.issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Slow boot time: 135.7s", "1 slow boot service(s) (>10s)"]
    );
}
