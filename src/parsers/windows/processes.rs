//! `tasklist /v /fo csv`

use serde_json::{json, Value};

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{
    column, csv_rows, field, filename_has, has_extension, min_row_len, round,
};
use crate::parsers::{ParserBase, ReportParser};

const KB_PER_GB: u64 = 1024 * 1024;

struct Process<'a> {
    name: &'a str,
    pid: u64,
    memory_kb: u64,
    status: &'a str,
    cpu_time: &'a str,
}

impl Process<'_> {
    fn memory_mb(&self) -> i64 {
        round(self.memory_kb as f64 / 1024.0)
    }

    /// `H:MM:SS` CPU time in seconds, 0 when unreadable or out of range
    fn cpu_seconds(&self) -> u64 {
        regex!(r"(\d+):(\d+):(\d+)")
            .captures(self.cpu_time)
            .and_then(|caps| {
                let hours: u64 = caps[1].parse().ok()?;
                let minutes: u64 = caps[2].parse().ok()?;
                let seconds: u64 = caps[3].parse().ok()?;
                hours
                    .checked_mul(3600)?
                    .checked_add(minutes.checked_mul(60)?)?
                    .checked_add(seconds)
            })
            .unwrap_or(0)
    }
}

/// Digits of `"123,456 K"`, 0 when there are none
fn memory_kb(text: &str) -> u64 {
    text.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

fn plural_es(count: usize) -> &'static str {
    if count > 1 {
        "es"
    } else {
        ""
    }
}

/// Process list with memory, status and CPU time
pub struct RunningProcesses {
    base: ParserBase,
}

impl Default for RunningProcesses {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningProcesses {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "Running Processes",
                Category::Performance,
                "All running processes with memory usage and CPU time",
            ),
        }
    }
}

fn no_process_data() -> Issue {
    Issue::info("No process data found")
        .with_detail("Could not parse tasklist output.")
        .with_recommendation("Ensure the file was generated with: tasklist /v /fo csv")
}

fn memory_hogs(
    title: String,
    hogs: &[&Process],
    severity_recommendation: &str,
    critical: bool,
) -> Issue {
    let issue = if critical {
        Issue::critical(title)
    } else {
        Issue::warning(title)
    };
    issue
        .with_detail(
            hogs.iter()
                .map(|p| format!("{}: {} MB", p.name, p.memory_mb()))
                .collect::<Vec<_>>()
                .join(", "),
        )
        .with_raw(
            hogs.iter()
                .map(|p| format!("{} (PID {}): {} MB", p.name, p.pid, p.memory_mb()))
                .collect::<Vec<_>>()
                .join("\n"),
        )
        .with_recommendation(severity_recommendation)
}

impl ReportParser for RunningProcesses {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["tasklist", "process"]) && has_extension(filename, &[".csv"]) {
            return true;
        }
        regex!(r"(?i)Image Name").is_match(content)
            && regex!(r"(?i)PID").is_match(content)
            && regex!(r"(?i)Mem Usage").is_match(content)
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let rows = csv_rows(content);
        if rows.len() < 2 {
            return Ok(ParseResult::with_score(
                Summary::new().with("process_count", 0),
                100,
                vec![no_process_data()],
            ));
        }

        let (headers, body) = (&rows[0], &rows[1..]);
        let name_col = column(headers, "image name");
        let pid_col = column(headers, "pid");
        let mem_col = column(headers, "mem");
        let status_col = column(headers, "status");
        let cpu_col = column(headers, "cpu time");
        let needed = min_row_len(&[name_col, pid_col, mem_col]);

        let processes: Vec<Process> = body
            .iter()
            .filter(|row| row.len() >= needed)
            .map(|row| Process {
                name: field(row, name_col),
                pid: field(row, pid_col).parse().unwrap_or(0),
                memory_kb: memory_kb(field(row, mem_col)),
                status: field(row, status_col),
                cpu_time: field(row, cpu_col),
            })
            .filter(|p| !p.name.is_empty())
            .collect();

        let total_kb: f64 = processes.iter().map(|p| p.memory_kb as f64).sum();
        let total_mb = round(total_kb / 1024.0);
        let mut by_memory: Vec<&Process> = processes.iter().collect();
        by_memory.sort_by(|a, b| b.memory_kb.cmp(&a.memory_kb));
        by_memory.truncate(10);

        let mut summary = Summary::new()
            .with("process_count", processes.len())
            .with("total_memory_mb", total_mb);
        summary.insert(
            "top_memory_processes",
            Value::Array(
                by_memory
                    .iter()
                    .map(|p| json!({ "name": p.name, "memory_mb": p.memory_mb() }))
                    .collect(),
            ),
        );

        let mut issues = Vec::new();

        let over_1gb: Vec<&Process> =
            processes.iter().filter(|p| p.memory_kb > KB_PER_GB).collect();
        if !over_1gb.is_empty() {
            issues.push(memory_hogs(
                format!(
                    "{} process{} using over 1 GB of RAM",
                    over_1gb.len(),
                    plural_es(over_1gb.len())
                ),
                &over_1gb,
                "Check if these processes are behaving normally. Restart the application if memory usage seems excessive.",
                false,
            ));
        }

        let over_2gb: Vec<&Process> = processes
            .iter()
            .filter(|p| p.memory_kb > 2 * KB_PER_GB)
            .collect();
        if !over_2gb.is_empty() {
            issues.push(memory_hogs(
                format!(
                    "{} process{} using over 2 GB of RAM",
                    over_2gb.len(),
                    plural_es(over_2gb.len())
                ),
                &over_2gb,
                "These processes may have a memory leak. Consider restarting them or the application.",
                true,
            ));
        }

        let count = processes.len();
        if count > 200 {
            issues.push(
                Issue::warning(format!("{} running processes — high count", count))
                    .with_detail(format!(
                        "A typical Windows system runs 80-150 processes. {} is above normal.",
                        count
                    ))
                    .with_raw(format!("Process count: {}", count))
                    .with_recommendation("Review running processes and close unnecessary applications and services."),
            );
        } else if count > 150 {
            issues.push(
                Issue::info(format!("{} running processes", count))
                    .with_detail("Slightly above average but may be normal depending on installed software.")
                    .with_raw(format!("Process count: {}", count))
                    .with_recommendation("Monitor if the count continues to grow. Close unused applications."),
            );
        }

        let hung: Vec<&Process> = processes
            .iter()
            .filter(|p| regex!(r"(?i)not responding").is_match(p.status))
            .collect();
        if !hung.is_empty() {
            issues.push(
                Issue::warning(format!(
                    "{} process{} not responding",
                    hung.len(),
                    plural_es(hung.len())
                ))
                .with_detail(format!(
                    "Hung processes: {}",
                    hung.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
                ))
                .with_raw(
                    hung.iter()
                        .map(|p| format!("{} (PID {}) - Not Responding", p.name, p.pid))
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
                .with_recommendation("Force-close hung processes via Task Manager. If recurring, reinstall the affected applications."),
            );
        }

        let busy: Vec<&Process> = processes.iter().filter(|p| p.cpu_seconds() > 3600).collect();
        if busy.len() > 3 {
            issues.push(
                Issue::info(format!("{} processes with high CPU time (>1hr)", busy.len()))
                    .with_detail(format!(
                        "Processes with significant CPU usage: {}",
                        busy.iter().take(5).map(|p| p.name).collect::<Vec<_>>().join(", ")
                    ))
                    .with_raw(
                        busy.iter()
                            .take(5)
                            .map(|p| format!("{}: CPU Time {}", p.name, p.cpu_time))
                            .collect::<Vec<_>>()
                            .join("\n"),
                    )
                    .with_recommendation("Some high CPU time is normal for system processes. Check for any unexpected CPU-intensive processes."),
            );
        }

        if issues.is_empty() && !by_memory.is_empty() {
            issues.push(
                Issue::info(format!(
                    "{} processes running — total {} MB RAM used",
                    count, total_mb
                ))
                .with_detail(format!(
                    "Top consumers: {}",
                    by_memory
                        .iter()
                        .take(5)
                        .map(|p| format!("{} ({} MB)", p.name, p.memory_mb()))
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
                .with_recommendation("Process list looks healthy."),
            );
        }

        Ok(ParseResult::new(summary, issues).or_fallback(no_process_data()))
    }
}
