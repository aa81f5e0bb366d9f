//! File intake helpers

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use log::debug;
use walkdir::WalkDir;

use crate::errors::HealthError;

/// Expand `paths` into the report files to read
///
/// Files named explicitly are always kept. Directories are walked (only one
/// level deep unless `recursive`) and contribute the files whose name matches
/// `include`. Order follows `paths`, directory entries sorted by name, with
/// duplicates dropped.
pub fn collect_report_files(
    paths: &[PathBuf],
    include: &GlobSet,
    recursive: bool,
) -> Result<Vec<PathBuf>, HealthError> {
    let mut files: Vec<PathBuf> = Vec::new();

    for path in paths {
        if path.is_file() {
            push_unique(&mut files, path.clone());
        } else if path.is_dir() {
            let mut walker = WalkDir::new(path).follow_links(false).sort_by_file_name();
            if !recursive {
                walker = walker.max_depth(1);
            }
            for entry in walker.into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                if include.is_match(entry.file_name()) {
                    push_unique(&mut files, entry.into_path());
                } else {
                    debug!("Skipping {:?}, not an included file type", entry.path());
                }
            }
        } else {
            return Err(HealthError::InvalidPath(path.clone()));
        }
    }

    Ok(files)
}

fn push_unique(files: &mut Vec<PathBuf>, path: PathBuf) {
    if !files.contains(&path) {
        files.push(path);
    }
}

/// Read a report as text
///
/// Windows tools often write UTF-16 with a byte order mark; that and a UTF-8
/// BOM are handled, anything else is decoded as lossy UTF-8.
pub fn read_report(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(decode_text(&bytes))
}

/// Decode report bytes to a string, honouring a leading byte order mark
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Name a report by its file name, falling back to the full path
pub fn report_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
