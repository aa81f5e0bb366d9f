use chrono::{NaiveDate, NaiveDateTime};
use pchc::app::Session;
use pchc::models::Severity;
use pchc::parsers::windows::{BatteryReport, DiskInfo, DriverQuery, WindowsUpdates};
use pchc::parsers::{Clock, DefaultParserRegistry, ParserRegistry, ReportParser};
use pretty_assertions::assert_eq;
use rstest::rstest;

const BATTERY_REPORT: &str = "\
<html><body><h1>Battery report</h1>
<p>DESIGN CAPACITY: 50,000 mWh</p>
<p>FULL CHARGE CAPACITY: 20,000 mWh</p>
</body></html>
";

const UPDATES_CSV: &str = "\
Node,Description,HotFixID,InstalledBy,InstalledOn
DESKTOP-1,Security Update,KB5030211,NT AUTHORITY\\SYSTEM,9/15/2026
DESKTOP-1,Update,KB5029000,NT AUTHORITY\\SYSTEM,8/1/2026
";

const DRIVERS_CSV: &str = "\
\"Module Name\",\"Display Name\",\"Driver Type\",\"Start Mode\",\"State\",\"Link Date\"
\"ACPI\",\"Microsoft ACPI Driver\",\"Kernel \",\"Boot\",\"Running\",\"6/21/2006 4:00:00 AM\"
\"nvlddmkm\",\"NVIDIA Display\",\"Kernel \",\"Manual\",\"Running\",\"9/1/2026 10:00:00 AM\"
\"beep\",\"Beep\",\"Kernel \",\"System\",\"Stopped\",\"3/1/2024 8:00:00 AM\"
";

fn at(year: i32, month: u32, day: u32) -> Clock {
    let instant: NaiveDateTime = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date");
    Clock::Fixed(instant)
}

#[test]
fn test_battery_at_forty_percent_is_critical() {
    let parser = BatteryReport::new();
    assert!(parser.detect(BATTERY_REPORT, "battery-report.html"));

    let result = parser.parse(BATTERY_REPORT).expect("parse");

    assert_eq!(result.summary.get_i64("design_capacity"), Some(50000));
    assert_eq!(result.summary.get_i64("full_charge_capacity"), Some(20000));
    assert_eq!(result.summary.get_i64("health_percent"), Some(40));
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].severity, Severity::Critical);
    assert_eq!(result.issues[0].title, "Battery health critically low at 40%");
    assert_eq!(result.score, 70);
}

#[test]
fn test_battery_report_through_session() {
    let registry = DefaultParserRegistry::with_default_parsers();
    let mut session = Session::new();

    let status = session.add_report(&registry, "battery-report.html", BATTERY_REPORT);

    assert_eq!(status.message(), "Parsed battery-report.html as Battery Report");
    assert_eq!(session.global_score(), Some(70));
}

#[test]
fn test_battery_without_capacity_falls_back() {
    let result = BatteryReport::new()
        .parse("<html>Battery report</html>")
        .expect("parse");

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].title, "No battery capacity data found");
    // Fallback notes leave the local score alone
    assert_eq!(result.score, 100);
}

#[rstest]
#[case(at(2026, 10, 16), Severity::Info, "Windows updates are current (31 days ago)")]
#[case(at(2026, 11, 20), Severity::Warning, "Last Windows update was 66 days ago")]
#[case(at(2027, 1, 1), Severity::Critical, "Windows updates are 108 days old")]
fn test_update_age(#[case] clock: Clock, #[case] severity: Severity, #[case] title: &str) {
    let result = WindowsUpdates::with_clock(clock)
        .parse(UPDATES_CSV)
        .expect("parse");

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].severity, severity);
    assert_eq!(result.issues[0].title, title);
    assert_eq!(result.summary.get_str("last_update_kb"), Some("KB5030211"));
    assert_eq!(result.summary.get_str("last_update_date"), Some("9/15/2026"));
    assert_eq!(result.summary.get_i64("update_count"), Some(2));
    assert_eq!(result.summary.get_i64("security_updates"), Some(1));
}

#[test]
fn test_updates_without_security_patches_warn() {
    let csv = "\
Node,Description,HotFixID,InstalledBy,InstalledOn
DESKTOP-1,Update,KB5029000,NT AUTHORITY\\SYSTEM,10/1/2026
";
    let result = WindowsUpdates::with_clock(at(2026, 10, 16))
        .parse(csv)
        .expect("parse");

    let titles: Vec<&str> = result.issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Windows updates are current (15 days ago)",
            "No security updates detected in installed updates"
        ]
    );
    assert_eq!(result.score, 88);
}

#[test]
fn test_empty_update_listing() {
    let result = WindowsUpdates::new().parse("HotFixID,InstalledOn\n").expect("parse");

    assert_eq!(result.score, 80);
    assert_eq!(result.issues[0].title, "No update data found");
}

#[test]
fn test_updates_are_detected_by_registry() {
    let registry = DefaultParserRegistry::with_clock(at(2026, 10, 16));

    let outcome = registry
        .detect_and_parse("updates.csv", UPDATES_CSV)
        .expect("recognised");

    assert_eq!(outcome.parser.name, "Windows Updates");
    assert_eq!(
        outcome.result.summary.get_i64("days_since_last_update"),
        Some(31)
    );
}

#[test]
fn test_driver_age_and_stopped_drivers() {
    let parser = DriverQuery::with_clock(at(2026, 10, 16));
    assert!(parser.detect(DRIVERS_CSV, "drivers.csv"));

    let result = parser.parse(DRIVERS_CSV).expect("parse");

    let titles: Vec<&str> = result.issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "1 auto-start driver is stopped",
            "1 driver is over 5 years old"
        ]
    );
    assert_eq!(result.summary.get_i64("total_drivers"), Some(3));
    assert_eq!(result.summary.get_i64("outdated_drivers"), Some(1));
    assert_eq!(result.summary.get_i64("kernel_drivers"), Some(3));
    assert_eq!(result.score, 88);
}

#[test]
fn test_healthy_drivers_report_all_clear() {
    let csv = "\
\"Module Name\",\"Display Name\",\"Driver Type\",\"Start Mode\",\"State\",\"Link Date\"
\"nvlddmkm\",\"NVIDIA Display\",\"Kernel \",\"Manual\",\"Running\",\"9/1/2026 10:00:00 AM\"
";
    let result = DriverQuery::with_clock(at(2026, 10, 16))
        .parse(csv)
        .expect("parse");

    assert_eq!(result.issues.len(), 1);
    assert_eq!(
        result.issues[0].title,
        "1 drivers loaded — no issues detected"
    );
}

#[test]
fn test_nearly_full_volume_is_critical() {
    let csv = "\
Node,Caption,Capacity,FreeSpace
DESKTOP-1,C:,500000000000,10000000000
DESKTOP-1,D:,1000000000000,500000000000
";
    let parser = DiskInfo::new();
    assert!(parser.detect(csv, "volumes.csv"));

    let result = parser.parse(csv).expect("parse");

    assert_eq!(result.summary.get_i64("volume_count"), Some(2));
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].severity, Severity::Critical);
    assert_eq!(result.issues[0].title, "Volume C: is almost full (98% used)");
}

#[test]
fn test_failing_disk_status_is_critical() {
    let csv = "\
Node,Model,Size,Status
DESKTOP-1,Samsung SSD 970,500105249280,OK
DESKTOP-1,WDC WD10EZEX,1000202273280,Pred Fail
";
    let result = DiskInfo::new().parse(csv).expect("parse");

    assert_eq!(result.summary.get_i64("disk_count"), Some(2));
    assert_eq!(result.issues.len(), 1);
    assert_eq!(
        result.issues[0].title,
        "Disk \"WDC WD10EZEX\" status: Pred Fail"
    );
}
