use chrono::{NaiveDate, NaiveDateTime};
use pchc::models::{ParseResult, Severity};
use pchc::parsers::windows::{
    BatteryReport, DxDiag, EnergyReport, MsInfo, NetworkConfig, RunningProcesses, SleepStudy,
    StartupPrograms, SystemEvents, SystemInfo, WifiReport,
};
use pchc::parsers::{Clock, DefaultParserRegistry, ParserRegistry, ReportParser};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn at(year: i32, month: u32, day: u32) -> Clock {
    let instant: NaiveDateTime = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date");
    Clock::Fixed(instant)
}

fn titles(result: &ParseResult) -> Vec<(Severity, &str)> {
    result
        .issues
        .iter()
        .map(|issue| (issue.severity, issue.title.as_str()))
        .collect()
}

// Energy Report

fn energy(errors: u32, warnings: u32, informational: u32) -> String {
    format!(
        "<html><h1>Energy Efficiency Diagnostics Report</h1>\n\
         <div>{} Errors</div>\n<div>{} Warnings</div>\n<div>{} Informational</div>\n</html>",
        errors, warnings, informational
    )
}

#[test]
fn test_energy_errors_and_many_warnings() {
    let content = energy(2, 7, 14);
    let parser = EnergyReport::new();
    assert!(parser.detect(&content, "report.html"));

    let result = parser.parse(&content).expect("parse");

    assert_eq!(
        titles(&result),
        vec![
            (Severity::Critical, "Energy report found 2 errors"),
            (Severity::Warning, "Energy report has 7 warnings"),
        ]
    );
    assert_eq!(result.summary.get_i64("informational"), Some(14));
    assert_eq!(result.score, 60);
}

#[rstest]
#[case(energy(0, 6, 0), Severity::Warning, "Energy report has 6 warnings")]
#[case(energy(0, 5, 0), Severity::Info, "Energy report has 5 warnings")]
#[case(energy(0, 1, 3), Severity::Info, "Energy report has 1 warning")]
#[case(energy(0, 0, 5), Severity::Info, "Energy report: 5 informational items")]
#[case(energy(0, 0, 0), Severity::Info, "Energy report shows no efficiency problems")]
fn test_energy_warning_thresholds(
    #[case] content: String,
    #[case] severity: Severity,
    #[case] title: &str,
) {
    let result = EnergyReport::new().parse(&content).expect("parse");

    assert_eq!(titles(&result), vec![(severity, title)]);
}

#[test]
fn test_energy_fast_timer_resolution() {
    let content = format!("{}<p>Platform Timer Resolution: 1</p>", energy(0, 0, 0));

    let result = EnergyReport::new().parse(&content).expect("parse");

    assert_eq!(
        titles(&result),
        vec![(Severity::Warning, "Platform timer resolution is high (1ms)")]
    );
    assert_eq!(result.score, 90);
}

// Sleep Study

fn sleep_study(drains: &[u32]) -> String {
    let rows: String = drains
        .iter()
        .map(|drain| format!("<tr><td>DC 0:45:00 drained {}%</td></tr>\n", drain))
        .collect();
    format!("<html><h1>Sleep Study</h1>\n<table>\n{}</table></html>", rows)
}

#[test]
fn test_sleep_drain_over_half_the_sessions() {
    let content = sleep_study(&[3, 8, 9, 25]);

    let result = SleepStudy::new().parse(&content).expect("parse");

    assert_eq!(result.summary.get_i64("session_count"), Some(4));
    assert_eq!(
        titles(&result),
        vec![
            (Severity::Warning, "High sleep drain detected in 3 of 4 sessions"),
            (Severity::Critical, "1 sleep session with excessive drain (>20%)"),
        ]
    );
    assert_eq!(result.score, 60);
}

#[test]
fn test_sleep_drain_in_exactly_half_the_sessions() {
    let result = SleepStudy::new()
        .parse(&sleep_study(&[3, 8, 9, 2]))
        .expect("parse");

    assert_eq!(
        titles(&result),
        vec![(Severity::Info, "Sleep study shows no major issues")]
    );
}

// WiFi Report

fn wlan_report(signal: u32, disconnects: usize) -> String {
    let events = "<li>disconnect</li>\n".repeat(disconnects * 2);
    format!(
        "<html><h1>WlanReport</h1>\n<p>SSID: HomeNet</p>\n<p>Signal Quality: {}%</p>\n<ul>\n{}</ul></html>",
        signal, events
    )
}

#[rstest]
#[case(29, Severity::Critical, "Very weak WiFi signal: 29%")]
#[case(30, Severity::Warning, "Weak WiFi signal: 30%")]
#[case(49, Severity::Warning, "Weak WiFi signal: 49%")]
#[case(50, Severity::Info, "WiFi report shows no significant issues")]
fn test_wifi_signal_thresholds(
    #[case] signal: u32,
    #[case] severity: Severity,
    #[case] title: &str,
) {
    let result = WifiReport::new()
        .parse(&wlan_report(signal, 0))
        .expect("parse");

    assert_eq!(result.summary.get_i64("signal_quality"), Some(signal as i64));
    assert_eq!(titles(&result), vec![(severity, title)]);
}

#[rstest]
#[case(11, Severity::Critical, "11 WiFi disconnections detected")]
#[case(6, Severity::Warning, "6 WiFi disconnections detected")]
#[case(5, Severity::Info, "5 WiFi disconnections detected")]
#[case(1, Severity::Info, "1 WiFi disconnection detected")]
fn test_wifi_disconnect_thresholds(
    #[case] disconnects: usize,
    #[case] severity: Severity,
    #[case] title: &str,
) {
    let result = WifiReport::new()
        .parse(&wlan_report(80, disconnects))
        .expect("parse");

    assert_eq!(titles(&result), vec![(severity, title)]);
}

// MSInfo32

fn msinfo(available_gb: &str, extra: &str) -> String {
    format!(
        "[System Summary]\n\n\
         Item\tValue\n\
         OS Name\tMicrosoft Windows 11 Pro\n\
         Version\t10.0.22631 Build 22631\n\
         System Manufacturer\tDell Inc.\n\
         System Model\tXPS 15 9530\n\
         Processor\tIntel(R) Core(TM) i7-13700H, 2400 Mhz\n\
         Total Physical Memory\t16.0 GB\n\
         Available Physical Memory\t{} GB\n{}",
        available_gb, extra
    )
}

#[rstest]
#[case("1.0", vec![(Severity::Critical, "RAM usage critically high: 94%")])]
#[case("1.6", vec![(Severity::Warning, "RAM usage high: 90%")])]
#[case("3.0", vec![(Severity::Warning, "RAM usage high: 81%")])]
#[case("3.2", vec![(Severity::Info, "System hardware appears healthy")])]
fn test_msinfo_memory_thresholds(
    #[case] available_gb: &str,
    #[case] expected: Vec<(Severity, &str)>,
) {
    let content = msinfo(available_gb, "");
    let parser = MsInfo::new();
    assert!(parser.detect(&content, "export.txt"));

    let result = parser.parse(&content).expect("parse");

    assert_eq!(titles(&result), expected);
}

#[test]
fn test_msinfo_problem_devices() {
    let content = msinfo(
        "8.0",
        "\n[Problem Devices]\n\n\
         Item\tDevice\tPNP Device ID\tError Code\n\
         Unknown USB Device\tUSB\\VID_0000&PID_0002\tThis device is not configured correctly.\n",
    );

    let result = MsInfo::new().parse(&content).expect("parse");

    assert_eq!(
        titles(&result),
        vec![(Severity::Warning, "1 problem device detected")]
    );
    assert_eq!(result.summary.get_str("manufacturer"), Some("Dell Inc."));
    assert_eq!(result.summary.get_i64("ram_used_percent"), Some(50));
    assert_eq!(result.score, 90);
}

// DxDiag

fn dxdiag(directx: &str, driver_date: &str) -> String {
    format!(
        "------------------\n\
         System Information\n\
         ------------------\n\
         Operating System: Windows 11 Pro 64-bit (10.0, Build 22631)\n\
         Processor: Intel(R) Core(TM) i7-13700H\n\
         Memory: 16384MB RAM\n\
         DirectX Version: {}\n\n\
         ---------------\n\
         Display Devices\n\
         ---------------\n\
         Card name: NVIDIA GeForce RTX 4060 Laptop GPU\n\
         Manufacturer: NVIDIA\n\
         Driver Version: 31.0.15.3623\n\
         Driver Date/Size: {} 2:00:00 AM, 1234 bytes\n\
         WHQL Logo'd: Yes\n\
         Notes: No problems found.\n",
        directx, driver_date
    )
}

#[rstest]
#[case("9/1/2024", Some(25), Severity::Warning, "Display driver is 25 months old")]
#[case("10/16/2024", Some(24), Severity::Info, "Display driver is 24 months old")]
#[case("9/1/2025", Some(13), Severity::Info, "Display driver is 13 months old")]
#[case("10/16/2025", Some(12), Severity::Info, "Display and DirectX configuration looks good")]
fn test_dxdiag_driver_age(
    #[case] driver_date: &str,
    #[case] months: Option<i64>,
    #[case] severity: Severity,
    #[case] title: &str,
) {
    let content = dxdiag("DirectX 12", driver_date);
    let parser = DxDiag::with_clock(at(2026, 10, 16));
    assert!(parser.detect(&content, "dx.txt"));

    let result = parser.parse(&content).expect("parse");

    assert_eq!(result.summary.get_i64("driver_age_months"), months);
    assert_eq!(
        result.summary.get_str("gpu_name"),
        Some("NVIDIA GeForce RTX 4060 Laptop GPU")
    );
    assert_eq!(titles(&result), vec![(severity, title)]);
}

#[test]
fn test_dxdiag_older_directx() {
    let result = DxDiag::with_clock(at(2026, 10, 16))
        .parse(&dxdiag("DirectX 11", "10/16/2025"))
        .expect("parse");

    assert_eq!(
        titles(&result),
        vec![(Severity::Info, "DirectX DirectX 11 (not the latest)")]
    );
}

// systeminfo

fn systeminfo(boot_time: &str, available_mb: &str) -> String {
    format!(
        "\nHost Name:                 DESKTOP-1\n\
         OS Name:                   Microsoft Windows 11 Pro\n\
         OS Version:                10.0.22631 N/A Build 22631\n\
         System Manufacturer:       Dell Inc.\n\
         System Model:              XPS 15 9530\n\
         System Type:               x64-based PC\n\
         System Boot Time:          {}\n\
         Total Physical Memory:     16,000 MB\n\
         Available Physical Memory: {} MB\n\
         Hotfix(s):                 2 Hotfix(s) Installed.\n\
         \x20                          [01]: KB5030211\n\
         \x20                          [02]: KB5029000\n\
         Network Card(s):           1 NIC(s) Installed.\n",
        boot_time, available_mb
    )
}

#[rstest]
#[case("9/1/2026, 8:00:00 AM", 44, Severity::Warning, "System hasn't been rebooted in 44 days")]
#[case("10/1/2026, 12:00:00 AM", 15, Severity::Info, "System uptime: 15 days")]
#[case("10/10/2026, 9:00:00 AM", 5, Severity::Info, "System info looks healthy")]
fn test_systeminfo_uptime(
    #[case] boot_time: &str,
    #[case] days: i64,
    #[case] severity: Severity,
    #[case] title: &str,
) {
    let parser = SystemInfo::with_clock(at(2026, 10, 16));
    let content = systeminfo(boot_time, "8,000");
    assert!(parser.detect(&content, "systeminfo.txt"));

    let result = parser.parse(&content).expect("parse");

    assert_eq!(result.summary.get_i64("uptime_days"), Some(days));
    assert_eq!(titles(&result), vec![(severity, title)]);
}

#[rstest]
#[case("1,000", Severity::Critical, "RAM usage critically high: 94%")]
#[case("3,000", Severity::Warning, "RAM usage high: 81%")]
fn test_systeminfo_memory_pressure(
    #[case] available_mb: &str,
    #[case] severity: Severity,
    #[case] title: &str,
) {
    let result = SystemInfo::with_clock(at(2026, 10, 16))
        .parse(&systeminfo("10/10/2026, 9:00:00 AM", available_mb))
        .expect("parse");

    assert_eq!(titles(&result), vec![(severity, title)]);
}

#[test]
fn test_systeminfo_hotfixes() {
    let result = SystemInfo::with_clock(at(2026, 10, 16))
        .parse(&systeminfo("10/10/2026, 9:00:00 AM", "8,000"))
        .expect("parse");

    assert_eq!(result.summary.get_i64("hotfix_count"), Some(2));
    assert_eq!(
        result.summary.get("hotfixes"),
        Some(&json!(["KB5030211", "KB5029000"]))
    );
    assert_eq!(result.summary.get_i64("network_adapters"), Some(1));
    assert_eq!(result.summary.get_str("host_name"), Some("DESKTOP-1"));
}

// ipconfig /all

const IPCONFIG_APIPA: &str = "\
Windows IP Configuration

   Host Name . . . . . . . . . . . . : DESKTOP-1

Wireless LAN adapter Wi-Fi:

   Description . . . . . . . . . . . : Intel(R) Wi-Fi 6 AX201 160MHz
   Physical Address. . . . . . . . . : 8C-8D-28-AA-BB-CC
   DHCP Enabled. . . . . . . . . . . : Yes
   IPv4 Address. . . . . . . . . . . : 169.254.10.20(Preferred)
   Subnet Mask . . . . . . . . . . . : 255.255.0.0
   Default Gateway . . . . . . . . . :
   DNS Servers . . . . . . . . . . . : 8.8.8.8
                                       8.8.4.4

Ethernet adapter Ethernet:

   Media State . . . . . . . . . . . : Media disconnected
   Description . . . . . . . . . . . : Realtek PCIe GbE Family Controller
";

const IPCONFIG_STATIC: &str = "\
Windows IP Configuration

Ethernet adapter Ethernet:

   Connection-specific DNS Suffix  . :
   Description . . . . . . . . . . . : Intel(R) Ethernet Connection
   DHCP Enabled. . . . . . . . . . . : No
   IPv4 Address. . . . . . . . . . . : 192.168.1.50(Preferred)
   Subnet Mask . . . . . . . . . . . : 255.255.255.0
   Default Gateway . . . . . . . . . :
";

const IPCONFIG_OFFLINE: &str = "\
Windows IP Configuration

Ethernet adapter Ethernet:

   Media State . . . . . . . . . . . : Media disconnected

Wireless LAN adapter Wi-Fi:

   Media State . . . . . . . . . . . : Media disconnected
";

#[test]
fn test_ipconfig_self_assigned_address() {
    let parser = NetworkConfig::new();
    assert!(parser.detect(IPCONFIG_APIPA, "output.txt"));

    let result = parser.parse(IPCONFIG_APIPA).expect("parse");

    assert_eq!(result.summary.get_i64("adapter_count"), Some(2));
    assert_eq!(result.summary.get_i64("connected_adapters"), Some(1));
    assert_eq!(
        titles(&result),
        vec![(Severity::Critical, "Wi-Fi: APIPA address detected (no DHCP)")]
    );
    assert_eq!(result.score, 70);

    let wifi = &result.summary.get("adapters").expect("adapters")[0];
    assert_eq!(wifi["ipv4"], json!("169.254.10.20"));
    assert_eq!(wifi["dns"], json!(["8.8.8.8", "8.8.4.4"]));
    assert_eq!(wifi["mac_address"], json!("8C-8D-28-AA-BB-CC"));
}

#[test]
fn test_ipconfig_static_address_without_gateway_or_dns() {
    let result = NetworkConfig::new().parse(IPCONFIG_STATIC).expect("parse");

    assert_eq!(
        titles(&result),
        vec![
            (Severity::Warning, "Ethernet: No default gateway configured"),
            (Severity::Warning, "Ethernet: No DNS servers configured"),
            (Severity::Info, "1 adapter uses static IP"),
        ]
    );
    assert_eq!(result.score, 78);
}

#[test]
fn test_ipconfig_everything_disconnected() {
    let result = NetworkConfig::new().parse(IPCONFIG_OFFLINE).expect("parse");

    assert_eq!(result.summary.get_i64("connected_adapters"), Some(0));
    assert_eq!(
        titles(&result),
        vec![(Severity::Critical, "No network adapters are connected")]
    );
}

// wevtutil System log

fn event(provider: &str, id: u32, level: u32, message: &str) -> String {
    format!(
        "<Event xmlns='http://schemas.microsoft.com/win/2004/08/events/event'>\
         <System><Provider Name='{}'/><EventID>{}</EventID><Level>{}</Level>\
         <TimeCreated SystemTime='2026-10-01T08:00:00Z'/></System>\
         <EventData><Data>{}</Data></EventData></Event>\n",
        provider, id, level, message
    )
}

fn service_errors(count: usize) -> String {
    (0..count)
        .map(|_| event("Service Control Manager", 7000, 2, "The service failed to start."))
        .collect()
}

#[test]
fn test_events_crash_shutdown_and_disk_errors() {
    let content = [
        event("Microsoft-Windows-Kernel-Power", 41, 1, "The system has rebooted."),
        event("EventLog", 6008, 2, "The previous system shutdown was unexpected."),
        event("disk", 7, 2, "The device has a bad block."),
    ]
    .concat();
    let parser = SystemEvents::new();
    assert!(parser.detect(&content, "dump.xml"));

    let result = parser.parse(&content).expect("parse");

    assert_eq!(result.summary.get_i64("total_events"), Some(3));
    assert_eq!(result.summary.get_i64("critical"), Some(1));
    assert_eq!(result.summary.get_i64("errors"), Some(2));
    assert_eq!(
        titles(&result),
        vec![
            (Severity::Critical, "1 BSOD/crash event detected"),
            (Severity::Warning, "1 unexpected shutdown detected"),
            (Severity::Critical, "1 disk error in event log"),
        ]
    );
    assert_eq!(result.score, 30);
}

#[rstest]
#[case(5, Severity::Info, "5 system events analyzed — no major issues")]
#[case(6, Severity::Info, "6 error events in system log")]
#[case(20, Severity::Info, "20 error events in system log")]
#[case(21, Severity::Warning, "21 error events in system log")]
fn test_events_error_volume(
    #[case] count: usize,
    #[case] severity: Severity,
    #[case] title: &str,
) {
    let result = SystemEvents::new()
        .parse(&service_errors(count))
        .expect("parse");

    assert_eq!(titles(&result), vec![(severity, title)]);
}

#[test]
fn test_events_empty_dump() {
    let result = SystemEvents::new().parse("<Events></Events>").expect("parse");

    assert_eq!(result.score, 100);
    assert_eq!(titles(&result), vec![(Severity::Info, "No system events found")]);
}

// wmic startup

fn startup(extra_rows: &[&str], generic: usize) -> String {
    let mut csv = String::from("Node,Caption,Command\n");
    for row in extra_rows {
        csv.push_str(row);
        csv.push('\n');
    }
    for i in 0..generic {
        csv.push_str(&format!("DESKTOP-1,Helper{},C:\\Tools\\helper{}.exe\n", i, i));
    }
    csv
}

#[rstest]
#[case(26, Severity::Critical, "26 startup programs — severely impacting boot time")]
#[case(25, Severity::Warning, "25 startup programs — may slow boot time")]
#[case(16, Severity::Warning, "16 startup programs — may slow boot time")]
#[case(15, Severity::Info, "15 startup programs")]
#[case(11, Severity::Info, "11 startup programs")]
#[case(10, Severity::Info, "10 startup programs — good")]
fn test_startup_count_thresholds(
    #[case] count: usize,
    #[case] severity: Severity,
    #[case] title: &str,
) {
    let content = startup(&[], count);
    let parser = StartupPrograms::new();
    assert!(parser.detect(&content, "startup.csv"));

    let result = parser.parse(&content).expect("parse");

    assert_eq!(result.summary.get_i64("startup_count"), Some(count as i64));
    assert_eq!(titles(&result), vec![(severity, title)]);
}

#[test]
fn test_startup_heavy_apps() {
    let content = startup(
        &[
            "DESKTOP-1,Discord,C:\\Users\\me\\AppData\\Local\\Discord\\Update.exe --processStart Discord.exe",
            "DESKTOP-1,Spotify,C:\\Users\\me\\AppData\\Roaming\\Spotify\\Spotify.exe /minimized",
            "DESKTOP-1,Steam,\"C:\\Program Files (x86)\\Steam\\steam.exe\" -silent",
            "DESKTOP-1,com.squirrel.Teams.Teams,C:\\Users\\me\\AppData\\Local\\Microsoft\\Teams\\Update.exe",
        ],
        2,
    );

    let result = StartupPrograms::new().parse(&content).expect("parse");

    assert_eq!(
        titles(&result),
        vec![
            (Severity::Info, "6 startup programs — good"),
            (Severity::Info, "4 resource-heavy apps in startup"),
        ]
    );
}

// tasklist

fn tasklist(rows: &[(&str, &str, &str)]) -> String {
    let mut csv = String::from(
        "\"Image Name\",\"PID\",\"Session Name\",\"Session#\",\"Mem Usage\",\"Status\",\"User Name\",\"CPU Time\",\"Window Title\"\n",
    );
    for (pid, (name, memory, cpu_time)) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "\"{}\",\"{}\",\"Console\",\"1\",\"{}\",\"Running\",\"DESKTOP-1\\me\",\"{}\",\"N/A\"\n",
            name,
            1000 + pid,
            memory,
            cpu_time
        ));
    }
    csv
}

#[rstest]
#[case(
    "2,500,000 K",
    vec![
        (Severity::Warning, "1 process using over 1 GB of RAM"),
        (Severity::Critical, "1 process using over 2 GB of RAM"),
    ]
)]
#[case("1,500,000 K", vec![(Severity::Warning, "1 process using over 1 GB of RAM")])]
#[case("900,000 K", vec![(Severity::Info, "2 processes running — total 977 MB RAM used")])]
fn test_tasklist_memory_thresholds(
    #[case] memory: &str,
    #[case] expected: Vec<(Severity, &str)>,
) {
    let content = tasklist(&[
        ("chrome.exe", memory, "0:12:30"),
        ("svchost.exe", "100,000 K", "0:00:05"),
    ]);

    let result = RunningProcesses::new().parse(&content).expect("parse");

    assert_eq!(result.summary.get_i64("process_count"), Some(2));
    assert_eq!(titles(&result), expected);
}

#[test]
fn test_tasklist_with_enormous_values_does_not_panic() {
    let content = tasklist(&[
        ("leaky.exe", "18000000000000000000 K", "99999999999999999:00:00"),
        ("leakier.exe", "18000000000000000000 K", "99999999999999999:00:00"),
    ]);
    let registry = DefaultParserRegistry::with_default_parsers();

    let outcome = registry
        .detect_and_parse("tasklist.csv", &content)
        .expect("tasklist should be recognised");

    assert_eq!(outcome.parser.name, "Running Processes");
    assert!(titles(&outcome.result)
        .contains(&(Severity::Critical, "2 processes using over 2 GB of RAM")));
}

#[test]
fn test_battery_drain_average_with_enormous_rates_does_not_panic() {
    let content = "\
<html><body><h1>Battery report</h1>
<table>
<tr><td>2026-10-01 08:00:00</td><td>Active</td><td>9000000000000000000 mW</td></tr>
<tr><td>2026-10-01 09:00:00</td><td>Active</td><td>9000000000000000000 mW</td></tr>
</table>
</body></html>
";

    let result = BatteryReport::new().parse(content).expect("parse");

    assert_eq!(result.summary.get_i64("avg_drain_rate"), Some(9_000_000_000_000_000_000));
    assert!(result
        .issues
        .iter()
        .any(|issue| issue.title.starts_with("High average battery drain rate")));
}
