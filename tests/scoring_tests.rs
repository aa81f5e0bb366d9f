use pchc::models::{
    Category, DetectionOutcome, Issue, ParseResult, ParserIdentity, Severity, Summary,
};
use pchc::scoring::{calculate_scores, score_label, ScoreBand, SeverityCounts};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn outcome(name: &str, category: Category, issues: Vec<Issue>) -> DetectionOutcome {
    DetectionOutcome {
        parser: ParserIdentity {
            name: name.to_string(),
            category,
        },
        result: ParseResult::new(Summary::new(), issues),
    }
}

#[test]
fn test_empty_session_has_no_global_score() {
    let result = calculate_scores(&Vec::<DetectionOutcome>::new());

    assert_eq!(result.global_score, None);
    assert!(result.is_empty());
    assert_eq!(result.categories.len(), 6);
    assert!(result.categories.iter().all(|c| c.score.is_none() && !c.has_data));
    assert_eq!(result.counts, SeverityCounts::default());
}

#[test]
fn test_category_score_is_clamped_at_zero() {
    let issues = (0..10).map(|i| Issue::critical(format!("Failure {}", i))).collect();
    let outcomes = vec![outcome("smartctl", Category::Storage, issues)];

    let result = calculate_scores(&outcomes);

    let storage = result.category(Category::Storage).expect("storage entry");
    assert_eq!(storage.score, Some(0));
    assert_eq!(storage.counts.critical, 10);
    assert_eq!(result.global_score, Some(0));
}

#[test]
fn test_global_score_renormalizes_over_categories_with_data() {
    let outcomes = vec![
        outcome("upower", Category::Power, Vec::new()),
        outcome(
            "smartctl",
            Category::Storage,
            (0..4).map(|i| Issue::critical(format!("Bad sector {}", i))).collect(),
        ),
    ];

    let result = calculate_scores(&outcomes);

    assert_eq!(result.category(Category::Power).and_then(|c| c.score), Some(100));
    assert_eq!(result.category(Category::Storage).and_then(|c| c.score), Some(0));
    // 100 * 0.20 / (0.20 + 0.15)
    assert_eq!(result.global_score, Some(57));
}

#[test]
fn test_category_with_data_but_no_issues_scores_full() {
    let outcomes = vec![outcome("Network Config", Category::Network, Vec::new())];

    let result = calculate_scores(&outcomes);

    let network = result.category(Category::Network).expect("network entry");
    assert!(network.has_data);
    assert_eq!(network.score, Some(100));
    assert_eq!(network.parsers, vec!["Network Config".to_string()]);

    let power = result.category(Category::Power).expect("power entry");
    assert!(!power.has_data);
    assert_eq!(power.score, None);
    assert_eq!(result.global_score, Some(100));
}

#[test]
fn test_issues_sorted_by_severity_keeping_encounter_order() {
    let outcomes = vec![
        outcome(
            "dmesg",
            Category::System,
            vec![
                Issue::info("first info"),
                Issue::critical("first critical"),
                Issue::warning("only warning"),
            ],
        ),
        outcome(
            "smartctl",
            Category::Storage,
            vec![Issue::critical("second critical")],
        ),
    ];

    let result = calculate_scores(&outcomes);

    let titles: Vec<&str> = result.issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["first critical", "second critical", "only warning", "first info"]
    );
    assert_eq!(
        result.counts,
        SeverityCounts {
            critical: 2,
            warning: 1,
            info: 1
        }
    );
}

#[test]
fn test_issues_are_attributed_to_their_parser() {
    let outcomes = vec![outcome(
        "Windows Updates",
        Category::Security,
        vec![Issue::warning("No security updates detected in installed updates")],
    )];

    let result = calculate_scores(&outcomes);

    let issue = &result.issues[0];
    assert_eq!(issue.category, Some(Category::Security));
    assert_eq!(issue.parser_name.as_deref(), Some("Windows Updates"));
    assert_eq!(result.issues_in(Category::Security).count(), 1);
    assert_eq!(result.issues_in(Category::Power).count(), 0);
}

#[test]
fn test_issue_scores_under_its_parsers_category() {
    // An issue arriving with a stale category still belongs to its parser
    let mut stray = Issue::critical("Reallocated sectors found");
    stray.category = Some(Category::Network);
    stray.parser_name = Some("somewhere else".to_string());
    let outcomes = vec![outcome("smartctl", Category::Storage, vec![stray])];

    let result = calculate_scores(&outcomes);

    let storage = result.category(Category::Storage).expect("storage entry");
    assert_eq!(storage.score, Some(70));
    assert_eq!(storage.counts.critical, 1);
    let network = result.category(Category::Network).expect("network entry");
    assert_eq!(network.score, None);
    assert_eq!(network.counts.total(), 0);
    assert_eq!(result.global_score, Some(70));

    let issue = &result.issues[0];
    assert_eq!(issue.category, Some(Category::Storage));
    assert_eq!(issue.parser_name.as_deref(), Some("smartctl"));
    assert_eq!(result.issues_in(Category::Storage).count(), 1);
}

#[test]
fn test_parsers_sharing_a_category_are_pooled() {
    let outcomes = vec![
        outcome("Battery Report", Category::Power, vec![Issue::warning("a")]),
        outcome("Energy Report", Category::Power, vec![Issue::warning("b")]),
        outcome("Battery Report", Category::Power, vec![Issue::info("c")]),
    ];

    let result = calculate_scores(&outcomes);

    let power = result.category(Category::Power).expect("power entry");
    assert_eq!(power.score, Some(78));
    assert_eq!(
        power.parsers,
        vec!["Battery Report".to_string(), "Energy Report".to_string()]
    );
}

#[test]
fn test_scores_are_recomputed_from_scratch() {
    let first = vec![outcome("lspci", Category::System, vec![Issue::critical("x")])];
    let second = vec![outcome("lspci", Category::System, Vec::new())];

    assert_eq!(calculate_scores(&first).global_score, Some(70));
    assert_eq!(calculate_scores(&second).global_score, Some(100));
}

#[rstest]
#[case(None, "No Data")]
#[case(Some(100), "Excellent")]
#[case(Some(90), "Excellent")]
#[case(Some(85), "Good")]
#[case(Some(60), "Fair")]
#[case(Some(45), "Poor")]
#[case(Some(10), "Critical")]
fn test_score_label(#[case] score: Option<u8>, #[case] expected: &str) {
    assert_eq!(score_label(score), expected);
}

#[rstest]
#[case(100, ScoreBand::Good)]
#[case(80, ScoreBand::Good)]
#[case(79, ScoreBand::Fair)]
#[case(50, ScoreBand::Fair)]
#[case(49, ScoreBand::Poor)]
fn test_score_band(#[case] score: u8, #[case] expected: ScoreBand) {
    assert_eq!(ScoreBand::of(score), expected);
}

#[test]
fn test_severity_counts_helpers() {
    let mut counts = SeverityCounts::default();
    counts.add(Severity::Critical);
    counts.add(Severity::Info);
    counts.add(Severity::Info);

    assert_eq!(counts.get(Severity::Info), 2);
    assert_eq!(counts.get(Severity::Warning), 0);
    assert_eq!(counts.total(), 3);
}
