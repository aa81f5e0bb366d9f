//! Report parsers: one detector and extractor per diagnostic report format

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::errors::ParseError;
use crate::models::{Category, DetectionOutcome, ParseResult, ParserIdentity};

/// Compile a regular expression once and reuse it on every later call
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
        RE.get_or_init(|| regex::Regex::new($re).expect("built-in pattern compiles"))
    }};
}

/// Implement the identity half of [`ReportParser`] from a `base: ParserBase` field
macro_rules! parser_identity {
    () => {
        fn name(&self) -> &str {
            &self.base.name
        }

        fn category(&self) -> $crate::models::Category {
            self.base.category
        }

        fn description(&self) -> &str {
            &self.base.description
        }
    };
}

pub mod linux;
pub mod registry;
pub(crate) mod text;
pub mod windows;

pub use registry::DefaultParserRegistry;
pub use text::Clock;

/// Trait implemented by every report format parser
pub trait ReportParser: Send + Sync {
    /// Unique human-readable name, used as the parser's identity
    fn name(&self) -> &str;

    /// Category this parser reports into
    fn category(&self) -> Category;

    /// Short description of the report this parser understands
    fn description(&self) -> &str;

    /// Cheap heuristic: does this content (or its filename) look like our report?
    ///
    /// `filename` is only a hint and may be empty.
    fn detect(&self, content: &str, filename: &str) -> bool;

    /// Extract the summary and issues
    ///
    /// Implementations must not assume `detect` ran first. Missing fields
    /// degrade to absent summary keys; an `Err` is reserved for content the
    /// parser cannot make sense of at all.
    fn parse(&self, content: &str) -> Result<ParseResult, ParseError>;

    /// Name and category as a value
    fn identity(&self) -> ParserIdentity {
        ParserIdentity {
            name: self.name().to_string(),
            category: self.category(),
        }
    }
}

/// Common fields for parser implementations
pub struct ParserBase {
    /// Parser name
    pub name: String,

    /// Parser description
    pub description: String,

    /// Category the parser reports into
    pub category: Category,
}

impl ParserBase {
    pub fn new(name: &str, category: Category, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            category,
        }
    }
}

/// Parser information for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserInfo {
    /// Parser name
    pub name: String,

    /// Category the parser reports into
    pub category: Category,

    /// What the parser reads
    pub description: String,
}

impl ParserInfo {
    pub fn of(parser: &dyn ReportParser) -> Self {
        Self {
            name: parser.name().to_string(),
            category: parser.category(),
            description: parser.description().to_string(),
        }
    }
}

/// Ordered collection of parsers
///
/// Registration order is significant: when several parsers would accept the
/// same report, the first one registered wins.
pub trait ParserRegistry {
    /// Register a new parser at the end of the order
    fn register_parser(&mut self, parser: Arc<dyn ReportParser>);

    /// All registered parsers in registration order
    fn get_all_parsers(&self) -> Vec<Arc<dyn ReportParser>>;

    /// Get a parser by its exact name
    fn get_parser_by_name(&self, name: &str) -> Option<Arc<dyn ReportParser>>;

    /// Parsers reporting into `category`, in registration order
    fn get_parsers_by_category(&self, category: Category) -> Vec<Arc<dyn ReportParser>> {
        self.get_all_parsers()
            .into_iter()
            .filter(|parser| parser.category() == category)
            .collect()
    }

    /// Every category with its parsers, categories in their fixed order
    fn parsers_grouped_by_category(&self) -> Vec<(Category, Vec<Arc<dyn ReportParser>>)> {
        Category::iter()
            .map(|category| (category, self.get_parsers_by_category(category)))
            .collect()
    }

    /// Name, category and description of every parser
    fn get_parser_info(&self) -> Vec<ParserInfo> {
        self.get_all_parsers()
            .iter()
            .map(|parser| ParserInfo::of(parser.as_ref()))
            .collect()
    }

    /// Run the first parser whose `detect` accepts the report
    ///
    /// A parser that fails or panics is logged and skipped, and the search
    /// continues with the next one. `None` means no parser understood the report.
    fn detect_and_parse(&self, filename: &str, content: &str) -> Option<DetectionOutcome> {
        for parser in self.get_all_parsers() {
            match guarded_detect(parser.as_ref(), content, filename) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    warn!("Parser \"{}\" failed on {}: {}", parser.name(), filename, err);
                    continue;
                }
            }
            match guarded_parse(parser.as_ref(), content) {
                Ok(result) => {
                    debug!("{} matched {}", parser.name(), filename);
                    return Some(DetectionOutcome {
                        parser: parser.identity(),
                        result,
                    });
                }
                Err(err) => {
                    warn!("Parser \"{}\" failed on {}: {}", parser.name(), filename, err);
                }
            }
        }
        None
    }

    /// Parse with the named parser, skipping detection
    fn parse_with(&self, parser_name: &str, content: &str) -> Option<DetectionOutcome> {
        let Some(parser) = self.get_parser_by_name(parser_name) else {
            warn!("No parser named \"{}\"", parser_name);
            return None;
        };
        match guarded_parse(parser.as_ref(), content) {
            Ok(result) => Some(DetectionOutcome {
                parser: parser.identity(),
                result,
            }),
            Err(err) => {
                warn!("Parser \"{}\" failed: {}", parser_name, err);
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn panicked(parser: &dyn ReportParser, payload: &(dyn Any + Send)) -> ParseError {
    ParseError::Panicked {
        parser: parser.name().to_string(),
        message: panic_message(payload),
    }
}

/// `detect`, with a panic turned into an error
fn guarded_detect(
    parser: &dyn ReportParser,
    content: &str,
    filename: &str,
) -> Result<bool, ParseError> {
    panic::catch_unwind(AssertUnwindSafe(|| parser.detect(content, filename)))
        .map_err(|payload| panicked(parser, payload.as_ref()))
}

/// `parse`, with a panic turned into an error
fn guarded_parse(parser: &dyn ReportParser, content: &str) -> Result<ParseResult, ParseError> {
    panic::catch_unwind(AssertUnwindSafe(|| parser.parse(content)))
        .map_err(|payload| panicked(parser, payload.as_ref()))?
}
