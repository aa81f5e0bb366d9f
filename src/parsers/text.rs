//! Extraction helpers shared by the report parsers

use chrono::{Local, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Source of "now" for parsers that compute ages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// The local wall clock
    #[default]
    System,

    /// A pinned instant
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => Local::now().naive_local(),
            Clock::Fixed(instant) => *instant,
        }
    }
}

/// True when the lowercased filename contains any of `needles`
pub fn filename_has(filename: &str, needles: &[&str]) -> bool {
    let lower = filename.to_lowercase();
    needles.iter().any(|needle| lower.contains(needle))
}

/// True when the lowercased filename ends with any of `extensions`
pub fn has_extension(filename: &str, extensions: &[&str]) -> bool {
    let lower = filename.to_lowercase();
    extensions.iter().any(|ext| lower.ends_with(ext))
}

/// First capture group of the first match
pub fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First capture group, trimmed, or `None` when absent or blank
pub fn capture_trimmed(re: &Regex, text: &str) -> Option<String> {
    capture(re, text)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Leading integer of `text`, ignoring thousands separators
///
/// `"50,000 mWh"` gives `50000`; text without leading digits gives `None`.
pub fn parse_int(text: &str) -> Option<i64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let digits: String = cleaned.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Leading decimal number of `text`, like `"12.5 GB"` giving `12.5`
pub fn parse_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '0'..='9' => end = idx + 1,
            '-' | '+' if idx == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
    }
    trimmed[..end].parse().ok()
}

/// Number of regex matches in `text`
pub fn count_matches(re: &Regex, text: &str) -> usize {
    re.find_iter(text).count()
}

/// Round half away from zero to an integer
pub fn round(value: f64) -> i64 {
    value.round() as i64
}

/// Round to `places` decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Plural suffix for counts
pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Split CSV text into trimmed rows, skipping blank lines
///
/// wmic output starts with an empty line and uses `\r\r\n` line endings;
/// both are tolerated.
pub fn csv_rows(content: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    reader
        .records()
        .filter_map(Result::ok)
        .map(|record| record.iter().map(str::to_string).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|field| !field.is_empty()))
        .collect()
}

/// Index of the first header containing `needle`, case-insensitively
pub fn column(headers: &[String], needle: &str) -> Option<usize> {
    let needle = needle.to_lowercase();
    headers
        .iter()
        .position(|header| header.to_lowercase().contains(&needle))
}

/// Field at an optional column index, empty when out of range
pub fn field(row: &[String], index: Option<usize>) -> &str {
    index
        .and_then(|idx| row.get(idx))
        .map(String::as_str)
        .unwrap_or("")
}

/// Minimum row length needed to hold every resolved column
pub fn min_row_len(columns: &[Option<usize>]) -> usize {
    columns
        .iter()
        .flatten()
        .map(|idx| idx + 1)
        .max()
        .unwrap_or(0)
}

/// Parse `M/D/YYYY` at the start of `text`
pub fn parse_us_date(text: &str) -> Option<NaiveDate> {
    let caps = regex!(r"(\d{1,2})/(\d{1,2})/(\d{4})").captures(text)?;
    let month = caps[1].parse().ok()?;
    let day = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse `YYYYMMDD`, as found in compact WMI timestamps
pub fn parse_compact_date(text: &str) -> Option<NaiveDate> {
    let caps = regex!(r"(\d{4})(\d{2})(\d{2})").captures(text)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let caps = regex!(r"(\d{4})-(\d{2})-(\d{2})").captures(text)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whole 30-day months between `date` and `now`
pub fn months_since(date: NaiveDate, now: NaiveDateTime) -> i64 {
    (now.date() - date).num_days().div_euclid(30)
}

/// Split `text` so that every match of `re` starts a new piece
///
/// Text before the first match is kept as the first piece.
pub fn split_before<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    let mut pieces = Vec::new();
    let mut previous = 0;
    for start in re.find_iter(text).map(|m| m.start()) {
        if start > previous {
            pieces.push(&text[previous..start]);
        }
        previous = start;
    }
    pieces.push(&text[previous..]);
    pieces
}

/// Remove HTML tags and collapse whitespace
pub fn strip_tags(html: &str) -> String {
    let without_tags = regex!(r"<[^>]+>").replace_all(html, " ");
    regex!(r"\s+")
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

/// Plain-text excerpt following the first occurrence of `keyword`
pub fn extract_section(content: &str, keyword: &str) -> String {
    match content.find(keyword) {
        Some(start) => {
            let window = take_chars(&content[start..], 300);
            take_chars(&strip_tags(window), 200).to_string()
        }
        None => String::new(),
    }
}

/// At most `count` characters of `text`
pub fn take_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
