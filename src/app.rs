use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::cli::{AnalyzeArgs, ExportArgs, OutputFormat, ParseArgs, ParsersArgs, Verbosity};
use crate::config::{ConfigProvider, HealthConfig, OutputConfig};
use crate::errors::{HealthError, ParseError};
use crate::models::{Category, DetectionOutcome, Issue, ParserIdentity, Summary};
use crate::output::{JsonFormatter, MarkdownExporter, OutputFormatter, PrettyFormatter};
use crate::parsers::{Clock, DefaultParserRegistry, ParserInfo, ParserRegistry};
use crate::remediation::{get_remediation, RemediationEntry};
use crate::scoring::{calculate_scores, score_label, ScoreBand, ScoringResult, SeverityCounts};
use crate::search::{filter_issues, IssueFilter};
use crate::utils::{collect_report_files, read_report, report_name};

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    /// File name the report was added under
    pub file: String,

    /// Parser that recognised it, `None` when nothing did
    pub parser: Option<ParserIdentity>,

    /// Set when the file could not be read at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_error: Option<String>,
}

impl FileStatus {
    /// One-line description of the outcome
    pub fn message(&self) -> String {
        match (&self.read_error, &self.parser) {
            (Some(err), _) => format!("Failed to read {}: {}", self.file, err),
            (None, Some(parser)) => format!("Parsed {} as {}", self.file, parser.name),
            (None, None) => format!("Could not identify report type for {}", self.file),
        }
    }
}

/// Display summary of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub label: &'static str,
    pub score: Option<u8>,

    /// Colour band of the score, absent without data
    pub band: Option<ScoreBand>,
    pub counts: SeverityCounts,
    pub parsers: Vec<String>,

    /// Issue count, all-clear note, or a hint naming the reports that feed the category
    pub message: String,
}

/// An issue with its suggested fix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueView {
    #[serde(flatten)]
    pub issue: Issue,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<RemediationEntry>,
}

/// A parsed file as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub parser: Option<String>,
    pub category: Option<Category>,

    /// Local score the parser computed
    pub score: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_error: Option<String>,
}

/// Everything an output formatter renders for a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub files: Vec<FileReport>,
    pub global_score: Option<u8>,
    pub global_label: &'static str,
    pub categories: Vec<CategorySummary>,

    /// Totals over every issue, before filtering
    pub counts: SeverityCounts,

    /// Issues that passed the filter, before `max_issues` truncation
    pub matched: usize,
    pub issues: Vec<IssueView>,
}

/// Set of parsed reports and the scores derived from them
///
/// Reports are kept in insertion order by file name; adding a name again
/// replaces its earlier outcome. Scores are recomputed from scratch on every
/// change and swapped in only once complete.
#[derive(Debug, Clone, Default)]
pub struct Session {
    files: Vec<FileStatus>,
    outcomes: Vec<(String, DetectionOutcome)>,
    scoring: ScoringResult,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detect and parse one report, then rescore
    pub fn add_report<R>(&mut self, registry: &R, filename: &str, content: &str) -> FileStatus
    where
        R: ParserRegistry + ?Sized,
    {
        let outcome = registry.detect_and_parse(filename, content);
        let status = self.record(filename.to_string(), outcome);
        self.recompute();
        status
    }

    /// Record a batch of already detected reports, rescoring once
    pub fn extend<I>(&mut self, reports: I) -> Vec<FileStatus>
    where
        I: IntoIterator<Item = (String, Option<DetectionOutcome>)>,
    {
        let statuses = reports
            .into_iter()
            .map(|(filename, outcome)| self.record(filename, outcome))
            .collect();
        self.recompute();
        statuses
    }

    /// Store an outcome produced outside detection, such as a forced parser
    pub fn insert(&mut self, filename: &str, outcome: DetectionOutcome) -> FileStatus {
        let status = self.record(filename.to_string(), Some(outcome));
        self.recompute();
        status
    }

    /// Drop a report; returns whether it was present
    pub fn remove(&mut self, filename: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|status| status.file != filename);
        self.outcomes.retain(|(name, _)| name != filename);
        let removed = self.files.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.outcomes.clear();
        self.recompute();
    }

    pub fn files(&self) -> &[FileStatus] {
        &self.files
    }

    /// Parsed reports in insertion order
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, &DetectionOutcome)> {
        self.outcomes.iter().map(|(name, outcome)| (name.as_str(), outcome))
    }

    pub fn outcome(&self, filename: &str) -> Option<&DetectionOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, outcome)| outcome)
    }

    pub fn scoring(&self) -> &ScoringResult {
        &self.scoring
    }

    pub fn global_score(&self) -> Option<u8> {
        self.scoring.global_score
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Per category score, colour band and status message
    pub fn category_summaries(&self) -> Vec<CategorySummary> {
        self.scoring
            .categories
            .iter()
            .map(|entry| {
                let message = if !entry.has_data {
                    entry.category.empty_hint().to_string()
                } else if entry.counts.total() > 0 {
                    format!("{} issue(s) found", entry.counts.total())
                } else {
                    "Looking good — no issues detected".to_string()
                };
                CategorySummary {
                    category: entry.category,
                    label: entry.category.label(),
                    score: entry.score,
                    band: entry.score.map(ScoreBand::of),
                    counts: entry.counts,
                    parsers: entry.parsers.clone(),
                    message,
                }
            })
            .collect()
    }

    /// Assemble the view rendered by the output formatters
    pub fn analysis(&self, filter: &IssueFilter, output: &OutputConfig) -> Analysis {
        let files = self
            .files
            .iter()
            .map(|status| {
                let outcome = self.outcome(&status.file);
                FileReport {
                    file: status.file.clone(),
                    parser: status.parser.as_ref().map(|p| p.name.clone()),
                    category: status.parser.as_ref().map(|p| p.category),
                    score: outcome.map(|o| o.result.score),
                    summary: outcome.map(|o| o.result.summary.clone()),
                    read_error: status.read_error.clone(),
                }
            })
            .collect();

        let matched = filter_issues(&self.scoring.issues, filter);
        let limit = output.max_issues.unwrap_or(usize::MAX);
        let issues = matched
            .iter()
            .take(limit)
            .map(|issue| IssueView {
                remediation: if output.show_remediation {
                    get_remediation(issue)
                } else {
                    None
                },
                issue: (*issue).clone(),
            })
            .collect();

        Analysis {
            files,
            global_score: self.scoring.global_score,
            global_label: score_label(self.scoring.global_score),
            categories: self.category_summaries(),
            counts: self.scoring.counts,
            matched: matched.len(),
            issues,
        }
    }

    fn record(&mut self, filename: String, outcome: Option<DetectionOutcome>) -> FileStatus {
        let status = FileStatus {
            file: filename.clone(),
            parser: outcome.as_ref().map(|o| o.parser.clone()),
            read_error: None,
        };
        match &status.parser {
            Some(parser) => info!("Parsed {} as {}", filename, parser.name),
            None => warn!("Could not identify report type for {}", filename),
        }
        self.upsert_status(status.clone());

        let existing = self.outcomes.iter().position(|(name, _)| *name == filename);
        match (existing, outcome) {
            (Some(index), Some(outcome)) => self.outcomes[index].1 = outcome,
            (None, Some(outcome)) => self.outcomes.push((filename, outcome)),
            (Some(index), None) => {
                self.outcomes.remove(index);
            }
            (None, None) => {}
        }

        status
    }

    /// Note a file that could not be read; any earlier outcome for it is dropped
    fn record_unreadable(&mut self, filename: String, error: String) -> FileStatus {
        warn!("Failed to read {}: {}", filename, error);
        let status = FileStatus {
            file: filename.clone(),
            parser: None,
            read_error: Some(error),
        };
        self.upsert_status(status.clone());
        self.outcomes.retain(|(name, _)| *name != filename);
        status
    }

    fn upsert_status(&mut self, status: FileStatus) {
        match self.files.iter_mut().find(|s| s.file == status.file) {
            Some(existing) => *existing = status,
            None => self.files.push(status),
        }
    }

    fn recompute(&mut self) {
        let next = calculate_scores(self.outcomes.iter().map(|(_, outcome)| outcome));
        self.scoring = next;
    }
}

/// Core application that ties intake, detection, scoring and output together
pub struct HealthApp<C>
where
    C: ConfigProvider,
{
    config_provider: C,
    clock: Clock,
    use_emoji: bool,
    verbosity: Verbosity,
}

impl<C> HealthApp<C>
where
    C: ConfigProvider,
{
    /// Create a new instance of HealthApp
    pub fn new(config_provider: C) -> Self {
        Self {
            config_provider,
            clock: Clock::System,
            use_emoji: true,
            verbosity: Verbosity::default(),
        }
    }

    /// Set the verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Pin "now" for the date-dependent parsers
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Turn emoji off regardless of configuration
    pub fn with_emoji(mut self, use_emoji: bool) -> Self {
        self.use_emoji = use_emoji;
        self
    }

    /// Run the analyze command
    ///
    /// Returns `false` when the global score is below the configured `fail_under`.
    pub fn analyze(&self, args: AnalyzeArgs, paths: Vec<PathBuf>) -> Result<bool, HealthError> {
        let paths = pick_paths(args.paths, paths);
        let mut config = self.load_config(&paths)?;
        config.output.show_raw |= args.show_raw;
        let fail_under = args.fail_under.or(config.general.fail_under);

        let registry = self.registry(&config);
        let session = self.load_session(&registry, &paths, &config)?;

        let filter = IssueFilter::new()
            .with_categories(args.category.iter().map(|c| c.to_string()))
            .with_severities(args.severity.iter().map(|s| s.to_string()));
        let filter = match args.query {
            Some(query) => filter.with_query(query),
            None => filter,
        };

        let analysis = session.analysis(&filter, &config.output);
        let formatter = self.formatter(args.format, &config);
        println!("{}", formatter.format_analysis(&analysis, &config.output)?);

        Ok(passes(session.global_score(), fail_under))
    }

    /// Run the parse command: one file, one named parser, no detection
    pub fn parse(&self, args: ParseArgs) -> Result<(), HealthError> {
        let paths = vec![args.file.clone()];
        let mut config = self.load_config(&paths)?;
        config.output.show_raw = true;

        // Disabled parsers stay reachable when named explicitly
        let registry = DefaultParserRegistry::with_clock(self.clock);
        if registry.get_parser_by_name(&args.parser).is_none() {
            return Err(HealthError::ParserNotFound(args.parser));
        }

        let content = read_report(&args.file)?;
        let filename = report_name(&args.file);
        let outcome = registry
            .parse_with(&args.parser, &content)
            .ok_or_else(|| ParseError::Malformed {
                parser: args.parser.clone(),
                message: format!("could not read {}", filename),
            })?;

        let mut session = Session::new();
        session.insert(&filename, outcome);

        let analysis = session.analysis(&IssueFilter::new(), &config.output);
        let formatter = self.formatter(args.format, &config);
        println!("{}", formatter.format_analysis(&analysis, &config.output)?);
        Ok(())
    }

    /// Run the export command, writing a markdown report
    pub fn export(&self, args: ExportArgs, paths: Vec<PathBuf>) -> Result<PathBuf, HealthError> {
        let paths = pick_paths(args.paths, paths);
        let config = self.load_config(&paths)?;
        let registry = self.registry(&config);
        let session = self.load_session(&registry, &paths, &config)?;

        let now = self.clock.now();
        let markdown = MarkdownExporter::render(session.scoring(), now);
        let output = args
            .output
            .unwrap_or_else(|| PathBuf::from(MarkdownExporter::default_file_name(now.date())));

        fs::write(&output, markdown)
            .map_err(|e| HealthError::Export(format!("{}: {}", output.display(), e)))?;
        info!("Report written to {}", output.display());
        if self.verbosity != Verbosity::Quiet {
            println!("Report written to {}", output.display());
        }
        Ok(output)
    }

    /// Run the parsers command
    pub fn parsers(&self, args: ParsersArgs) -> Result<(), HealthError> {
        let config = self.load_config(&[])?;
        let registry = DefaultParserRegistry::with_clock(self.clock);
        let groups: Vec<(Category, Vec<ParserInfo>)> = registry
            .parsers_grouped_by_category()
            .into_iter()
            .map(|(category, parsers)| {
                (category, parsers.iter().map(|p| ParserInfo::of(p.as_ref())).collect())
            })
            .collect();

        let formatter = self.formatter(args.format, &config);
        println!(
            "{}",
            formatter.format_parsers(&groups, &config.parsers.disabled)?
        );
        Ok(())
    }

    /// Read, detect and score every report under `paths`
    ///
    /// Files are read and parsed in parallel; results are recorded in input
    /// order and scored once at the end. A file that cannot be read is logged
    /// and listed with its error while the rest of the batch still loads.
    pub fn load_session<R>(
        &self,
        registry: &R,
        paths: &[PathBuf],
        config: &HealthConfig,
    ) -> Result<Session, HealthError>
    where
        R: ParserRegistry + Sync,
    {
        let include = config.input.include_set()?;
        let files = collect_report_files(paths, &include, config.general.recursive)?;
        if files.is_empty() {
            warn!("No report files found");
        }
        debug!("Reading {} report file(s)", files.len());

        let progress = self.progress_bar(files.len());
        let parsed: Vec<(String, io::Result<Option<DetectionOutcome>>)> = files
            .par_iter()
            .map(|path| {
                let filename = report_name(path);
                progress.set_message(filename.clone());
                let outcome = read_report(path)
                    .map(|content| registry.detect_and_parse(&filename, &content));
                progress.inc(1);
                (filename, outcome)
            })
            .collect();
        progress.finish_and_clear();

        let mut session = Session::new();
        for (filename, outcome) in parsed {
            match outcome {
                Ok(outcome) => {
                    session.record(filename, outcome);
                }
                Err(err) => {
                    session.record_unreadable(filename, err.to_string());
                }
            }
        }
        session.recompute();
        Ok(session)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if self.verbosity == Verbosity::Quiet || len < 2 {
            return ProgressBar::hidden();
        }
        let template = "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}";
        let style = ProgressStyle::with_template(template)
            .map(|style| style.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        ProgressBar::new(len as u64).with_style(style)
    }

    fn registry(&self, config: &HealthConfig) -> DefaultParserRegistry {
        DefaultParserRegistry::with_clock(self.clock).without(&config.parsers.disabled)
    }

    fn formatter(&self, format: OutputFormat, config: &HealthConfig) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Pretty => {
                let use_emoji = self.use_emoji && config.output.use_emoji;
                Box::new(PrettyFormatter::new().with_emoji(use_emoji))
            }
            OutputFormat::Json => Box::new(JsonFormatter::new()),
        }
    }

    /// Load configuration for the directory of the first input
    fn load_config(&self, paths: &[PathBuf]) -> Result<HealthConfig, HealthError> {
        let base_dir = config_base_dir(paths);
        Ok(self.config_provider.load_config(&base_dir)?)
    }
}

/// Subcommand paths win over top-level ones; no paths means the current directory
fn pick_paths(command_paths: Vec<PathBuf>, global_paths: Vec<PathBuf>) -> Vec<PathBuf> {
    if !command_paths.is_empty() {
        command_paths
    } else if !global_paths.is_empty() {
        global_paths
    } else {
        vec![PathBuf::from(".")]
    }
}

fn config_base_dir(paths: &[PathBuf]) -> PathBuf {
    let first = match paths.first() {
        Some(path) => path,
        None => return PathBuf::from("."),
    };
    let dir = if first.is_dir() {
        first.as_path()
    } else {
        first.parent().unwrap_or(Path::new("."))
    };
    if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir.to_path_buf()
    }
}

/// Whether `score` satisfies the `fail_under` threshold
///
/// A session without data has nothing to fail on.
pub fn passes(score: Option<u8>, fail_under: Option<u8>) -> bool {
    match (score, fail_under) {
        (Some(score), Some(threshold)) => score >= threshold,
        _ => true,
    }
}
