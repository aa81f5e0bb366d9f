use std::sync::Arc;

use pchc::models::Category;
use pchc::parsers::{DefaultParserRegistry, ParserRegistry};
use pretty_assertions::assert_eq;

mod test_mocks {
    use std::sync::Arc;

    use pchc::errors::ParseError;
    use pchc::models::{Category, Issue, ParseResult, Summary};
    use pchc::parsers::ReportParser;

    /// How a mock responds once asked to parse
    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed,
        Fail,
        Panic,
    }

    /// A mock implementation of the ReportParser trait for testing
    pub struct MockParser {
        name: String,
        category: Category,
        accepts: bool,
        behaviour: Behaviour,
    }

    impl MockParser {
        fn build(name: &str, category: Category, accepts: bool, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                category,
                accepts,
                behaviour,
            })
        }

        /// Create a mock that accepts every report
        pub fn accepting(name: &str, category: Category) -> Arc<Self> {
            Self::build(name, category, true, Behaviour::Succeed)
        }

        /// Create a mock that rejects every report
        pub fn rejecting(name: &str, category: Category) -> Arc<Self> {
            Self::build(name, category, false, Behaviour::Succeed)
        }

        /// Create a mock that claims every report, then fails to parse it
        pub fn failing(name: &str, category: Category) -> Arc<Self> {
            Self::build(name, category, true, Behaviour::Fail)
        }

        /// Create a mock that claims every report, then panics while parsing
        pub fn panicking(name: &str, category: Category) -> Arc<Self> {
            Self::build(name, category, true, Behaviour::Panic)
        }
    }

    impl ReportParser for MockParser {
        fn name(&self) -> &str {
            &self.name
        }

        fn category(&self) -> Category {
            self.category
        }

        fn description(&self) -> &str {
            "Mock parser for testing"
        }

        fn detect(&self, _content: &str, _filename: &str) -> bool {
            self.accepts
        }

        fn parse(&self, _content: &str) -> Result<ParseResult, ParseError> {
            match self.behaviour {
                Behaviour::Succeed => {}
                Behaviour::Fail => {
                    return Err(ParseError::Malformed {
                        parser: self.name.clone(),
                        message: "mock failure".to_string(),
                    })
                }
                Behaviour::Panic => panic!("mock parser blew up"),
            }
            Ok(ParseResult::new(
                Summary::new().with("parsed_by", self.name.as_str()),
                vec![Issue::info(format!("{} ran", self.name))],
            ))
        }
    }
}

use test_mocks::MockParser;

#[test]
fn test_first_registered_match_wins() {
    let mut registry = DefaultParserRegistry::new();
    registry.register_parser(MockParser::rejecting("never", Category::Power));
    registry.register_parser(MockParser::accepting("first", Category::System));
    registry.register_parser(MockParser::accepting("second", Category::Network));

    let outcome = registry
        .detect_and_parse("report.txt", "anything")
        .expect("a parser should match");

    assert_eq!(outcome.parser.name, "first");
    assert_eq!(outcome.parser.category, Category::System);
    assert_eq!(outcome.result.summary.get_str("parsed_by"), Some("first"));
}

#[test]
fn test_failing_parser_is_skipped() {
    let mut registry = DefaultParserRegistry::new();
    registry.register_parser(MockParser::failing("broken", Category::Storage));
    registry.register_parser(MockParser::accepting("fallback", Category::Storage));

    let outcome = registry
        .detect_and_parse("", "content")
        .expect("the next parser should take over");

    assert_eq!(outcome.parser.name, "fallback");
}

#[test]
fn test_panicking_parser_is_skipped() {
    let mut registry = DefaultParserRegistry::new();
    registry.register_parser(MockParser::panicking("explosive", Category::Performance));
    registry.register_parser(MockParser::accepting("steady", Category::Performance));

    let outcome = registry
        .detect_and_parse("report.txt", "content")
        .expect("the next parser should take over");
    assert_eq!(outcome.parser.name, "steady");

    // Forcing the panicking parser yields no outcome instead of unwinding
    assert!(registry.parse_with("explosive", "content").is_none());
}

#[test]
fn test_no_match_returns_none() {
    let mut registry = DefaultParserRegistry::new();
    registry.register_parser(MockParser::rejecting("picky", Category::Security));
    registry.register_parser(MockParser::failing("broken", Category::Security));

    assert!(registry.detect_and_parse("notes.txt", "hello").is_none());
}

#[test]
fn test_duplicate_names_are_skipped() {
    let mut registry = DefaultParserRegistry::new();
    registry.register_parser(MockParser::accepting("dup", Category::Power));
    registry.register_parser(MockParser::accepting("dup", Category::Network));

    assert_eq!(registry.len(), 1);
    let parser = registry.get_parser_by_name("dup").expect("registered");
    assert_eq!(parser.category(), Category::Power);
}

#[test]
fn test_parse_with_bypasses_detection() {
    let mut registry = DefaultParserRegistry::new();
    registry.register_parser(MockParser::rejecting("manual", Category::Performance));
    registry.register_parser(MockParser::failing("broken", Category::Performance));

    let outcome = registry
        .parse_with("manual", "content")
        .expect("forced parser should run");
    assert_eq!(outcome.parser.name, "manual");
    assert_eq!(outcome.result.issues.len(), 1);

    assert!(registry.parse_with("broken", "content").is_none());
    assert!(registry.parse_with("missing", "content").is_none());
}

#[test]
fn test_grouped_by_category_covers_every_category() {
    let registry = DefaultParserRegistry::with_default_parsers();
    let groups = registry.parsers_grouped_by_category();

    let categories: Vec<Category> = groups.iter().map(|(category, _)| *category).collect();
    assert_eq!(
        categories,
        vec![
            Category::Power,
            Category::System,
            Category::Storage,
            Category::Network,
            Category::Security,
            Category::Performance,
        ]
    );
    assert!(groups.iter().all(|(_, parsers)| !parsers.is_empty()));

    let power: Vec<String> = groups[0].1.iter().map(|p| p.name().to_string()).collect();
    assert_eq!(
        power,
        vec!["upower", "Battery Report", "Energy Report", "Sleep Study"]
    );
}

#[test]
fn test_parser_info_lists_every_builtin() {
    let registry = DefaultParserRegistry::with_default_parsers();
    let info = registry.get_parser_info();

    assert_eq!(info.len(), 24);
    assert!(info.iter().all(|parser| !parser.description.is_empty()));
    assert_eq!(
        registry
            .get_parsers_by_category(Category::Storage)
            .iter()
            .map(|p| p.name().to_string())
            .collect::<Vec<_>>(),
        vec!["smartctl", "Disk Info"]
    );
}

#[test]
fn test_linux_detector_wins_ambiguous_battery_input() {
    // Matches both the upower detector and the Windows battery report detector
    let content = "\
  native-path:          BAT0
Device: /org/freedesktop/UPower/devices/battery_BAT0
  energy-full:          40 Wh
  energy-full-design:   50 Wh
Design Capacity 50000 mWh
Full Charge Capacity 40000 mWh
";
    let registry = DefaultParserRegistry::with_default_parsers();
    let outcome = registry
        .detect_and_parse("", content)
        .expect("should be recognised");

    assert_eq!(outcome.parser.name, "upower");
}

#[test]
fn test_unknown_content_is_not_identified() {
    let registry = DefaultParserRegistry::with_default_parsers();
    assert!(registry
        .detect_and_parse("notes.md", "Shopping list: milk, eggs")
        .is_none());
}

#[test]
fn test_arc_parsers_are_shared() {
    let mut registry = DefaultParserRegistry::new();
    let parser = MockParser::accepting("shared", Category::Power);
    registry.register_parser(parser.clone());

    assert_eq!(Arc::strong_count(&parser), 2);
    assert!(registry.has_parser("shared"));
}
