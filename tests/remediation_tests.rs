use pchc::models::Issue;
use pchc::remediation::{get_remediation, FixKind};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("Battery health critically low at 35%", FixKind::Hardware)]
#[case("Battery health degraded at 55%", FixKind::Manual)]
#[case("High battery cycle count: 1200", FixKind::Hardware)]
#[case("Low disk space on C:", FixKind::Fixable)]
#[case("Outdated driver found", FixKind::Fixable)]
#[case("Kernel panic detected", FixKind::Manual)]
#[case("Segmentation fault in firefox", FixKind::Manual)]
#[case("Machine check exception logged", FixKind::Hardware)]
fn test_fix_kind_by_title(#[case] title: &str, #[case] expected: FixKind) {
    let entry = get_remediation(&Issue::warning(title)).expect("a rule should match");

    assert_eq!(entry.fix_kind, expected);
}

#[test]
fn test_disk_space_suggests_cleanup_command() {
    let entry = get_remediation(&Issue::critical("Low disk space on C:")).expect("rule");

    assert_eq!(entry.command, Some("cleanmgr"));
    assert!(entry.guide.contains("Disk Cleanup"));
}

#[test]
fn test_unknown_issue_has_no_remediation() {
    assert_eq!(get_remediation(&Issue::info("Everything nominal")), None);
}

#[test]
fn test_detail_and_recommendation_are_searched() {
    let issue = Issue::warning("Storage check")
        .with_detail("Drive reports reallocated sectors")
        .with_recommendation("Back up soon");

    let entry = get_remediation(&issue).expect("rule");

    assert_eq!(entry.fix_kind, FixKind::Hardware);
    assert_eq!(entry.command, None);
}

#[test]
fn test_first_matching_rule_wins() {
    // Matches both the critically-low battery rule and the degraded rule
    let issue = Issue::critical("Battery health critically low, degraded to 30%");

    let entry = get_remediation(&issue).expect("rule");

    assert_eq!(entry.fix_kind, FixKind::Hardware);
}

#[test]
fn test_fix_kind_labels() {
    assert_eq!(FixKind::Fixable.to_string(), "fixable");
    assert_eq!(FixKind::Hardware.label(), "Hardware");
    assert_eq!(FixKind::Manual.emoji(), "📋");
}
