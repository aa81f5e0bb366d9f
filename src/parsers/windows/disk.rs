//! `wmic diskdrive` and `wmic volume` CSV

use serde_json::{json, Value};

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{
    column, csv_rows, field, filename_has, has_extension, min_row_len, plural, round,
};
use crate::parsers::{ParserBase, ReportParser};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Physical disk status and volume free space
pub struct DiskInfo {
    base: ParserBase,
}

impl Default for DiskInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskInfo {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "Disk Info",
                Category::Storage,
                "Physical disk models, sizes, health status, and volume free space",
            ),
        }
    }
}

/// Digits of a byte count field, 0 when empty or out of range
fn bytes(text: &str) -> u64 {
    text.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

fn gigabytes(bytes: u64) -> i64 {
    round(bytes as f64 / GIB)
}

fn parse_disk_drives(headers: &[String], body: &[Vec<String>]) -> ParseResult {
    let model_col = column(headers, "model");
    let size_col = column(headers, "size");
    let status_col = column(headers, "status");
    let needed = min_row_len(&[model_col, size_col, status_col]);

    let disks: Vec<(&str, i64, &str)> = body
        .iter()
        .filter(|row| row.len() >= needed)
        .map(|row| {
            let model = field(row, model_col);
            let status = field(row, status_col);
            (
                if model.is_empty() { "Unknown" } else { model },
                gigabytes(bytes(field(row, size_col))),
                if status.is_empty() { "Unknown" } else { status },
            )
        })
        .collect();

    let mut summary = Summary::new().with("disk_count", disks.len());
    summary.insert(
        "disks",
        Value::Array(
            disks
                .iter()
                .map(|(model, size_gb, status)| {
                    json!({ "model": model, "size_gb": size_gb, "status": status })
                })
                .collect(),
        ),
    );

    let mut issues = Vec::new();
    for (model, size_gb, status) in &disks {
        let lower = status.to_lowercase();
        if lower != "ok" && lower != "unknown" {
            issues.push(
                Issue::critical(format!("Disk \"{}\" status: {}", model, status))
                    .with_detail(format!(
                        "Disk {} ({} GB) is reporting status \"{}\" which indicates potential failure.",
                        model, size_gb, status
                    ))
                    .with_raw(format!("Model: {}, Size: {} GB, Status: {}", model, size_gb, status))
                    .with_recommendation("BACK UP YOUR DATA IMMEDIATELY. This disk may be failing. Replace the drive as soon as possible."),
            );
        } else if *size_gb < 64 && *size_gb > 0 {
            issues.push(
                Issue::info(format!("Small disk detected: {} ({} GB)", model, size_gb))
                    .with_detail(format!(
                        "Disk {} is only {} GB. This may be a boot drive or removable media.",
                        model, size_gb
                    ))
                    .with_raw(format!("Model: {}, Size: {} GB", model, size_gb))
                    .with_recommendation("Ensure you have adequate storage space for your needs."),
            );
        }
    }

    if issues.is_empty() && !disks.is_empty() {
        issues.push(
            Issue::info(format!(
                "{} disk{} detected — all reporting OK",
                disks.len(),
                plural(disks.len())
            ))
            .with_detail(
                disks
                    .iter()
                    .map(|(model, size_gb, _)| format!("{} ({} GB)", model, size_gb))
                    .collect::<Vec<_>>()
                    .join(", "),
            )
            .with_recommendation("Disk health looks good."),
        );
    }

    ParseResult::new(summary, issues).or_fallback(no_rows_issue())
}

struct Volume<'a> {
    caption: &'a str,
    capacity_gb: i64,
    free_gb: i64,
    used_percent: i64,
}

fn parse_volumes(headers: &[String], body: &[Vec<String>]) -> ParseResult {
    let caption_col = column(headers, "caption");
    let capacity_col = column(headers, "capacity");
    let free_col = column(headers, "freespace").or_else(|| column(headers, "free"));
    let needed = min_row_len(&[caption_col, capacity_col, free_col]);

    let volumes: Vec<Volume> = body
        .iter()
        .filter(|row| row.len() >= needed)
        .filter_map(|row| {
            let capacity = bytes(field(row, capacity_col));
            let free = bytes(field(row, free_col));
            if capacity == 0 {
                return None;
            }
            Some(Volume {
                caption: field(row, caption_col),
                capacity_gb: gigabytes(capacity),
                free_gb: gigabytes(free),
                used_percent: round((capacity as f64 - free as f64) / capacity as f64 * 100.0),
            })
        })
        .collect();

    let mut summary = Summary::new().with("volume_count", volumes.len());
    summary.insert(
        "volumes",
        Value::Array(
            volumes
                .iter()
                .map(|v| {
                    json!({
                        "caption": v.caption,
                        "capacity_gb": v.capacity_gb,
                        "free_gb": v.free_gb,
                        "used_percent": v.used_percent,
                    })
                })
                .collect(),
        ),
    );

    let mut issues = Vec::new();
    for v in &volumes {
        let raw = format!(
            "Caption: {}, Capacity: {} GB, Free: {} GB",
            v.caption, v.capacity_gb, v.free_gb
        );
        if v.used_percent > 95 {
            issues.push(
                Issue::critical(format!(
                    "Volume {} is almost full ({}% used)",
                    v.caption, v.used_percent
                ))
                .with_detail(format!(
                    "Only {} GB free of {} GB total on {}.",
                    v.free_gb, v.capacity_gb, v.caption
                ))
                .with_raw(raw)
                .with_recommendation("Free up disk space immediately. Delete temp files, empty recycle bin, or move data to external storage."),
            );
        } else if v.used_percent > 85 {
            issues.push(
                Issue::warning(format!("Volume {} is {}% full", v.caption, v.used_percent))
                    .with_detail(format!(
                        "{} GB free of {} GB total on {}.",
                        v.free_gb, v.capacity_gb, v.caption
                    ))
                    .with_raw(raw)
                    .with_recommendation("Consider freeing up space. Run Disk Cleanup or remove unused applications."),
            );
        }
    }

    if issues.is_empty() && !volumes.is_empty() {
        issues.push(
            Issue::info(format!(
                "{} volume{} — adequate free space",
                volumes.len(),
                plural(volumes.len())
            ))
            .with_detail(
                volumes
                    .iter()
                    .map(|v| format!("{} {}/{} GB free", v.caption, v.free_gb, v.capacity_gb))
                    .collect::<Vec<_>>()
                    .join(", "),
            )
            .with_recommendation("Storage space looks sufficient."),
        );
    }

    ParseResult::new(summary, issues).or_fallback(no_rows_issue())
}

fn no_rows_issue() -> Issue {
    Issue::info("No disk data found")
        .with_detail("Could not parse disk info output.")
        .with_recommendation("Ensure the file was generated with: wmic diskdrive get model,size,status /format:csv")
}

impl ReportParser for DiskInfo {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["disk", "volume"]) && has_extension(filename, &[".csv"]) {
            return true;
        }
        (regex!(r"(?i)Model").is_match(content)
            && regex!(r"(?i)Size").is_match(content)
            && regex!(r"(?i)Status").is_match(content)
            && regex!(r"(?i)Node").is_match(content))
            || (regex!(r"(?i)Caption").is_match(content)
                && regex!(r"(?i)Capacity").is_match(content)
                && regex!(r"(?i)FreeSpace").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let rows = csv_rows(content);
        if rows.len() < 2 {
            return Ok(ParseResult::with_score(
                Summary::new().with("disk_count", 0),
                100,
                vec![no_rows_issue()],
            ));
        }

        let (headers, body) = (&rows[0], &rows[1..]);
        let is_disk_drive = headers.iter().any(|h| h.to_lowercase().contains("model"));
        let is_volume = headers.iter().any(|h| {
            let h = h.to_lowercase();
            h.contains("freespace") || h.contains("capacity")
        });

        if is_volume && !is_disk_drive {
            Ok(parse_volumes(headers, body))
        } else {
            Ok(parse_disk_drives(headers, body))
        }
    }
}
