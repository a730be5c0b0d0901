// logrange - platform/fs.rs
//
// Filesystem access for input logs: pattern expansion and buffered opening.

use crate::util::constants;
use crate::util::error::LogRangeError;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Open a log file for line-by-line reading.
pub fn open_log(path: &Path) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    tracing::debug!(path = %path.display(), "Opened input log");
    Ok(BufReader::new(file))
}

/// Expand input arguments into concrete file paths.
///
/// An argument containing glob metacharacters is expanded and its matches
/// sorted; any other argument is kept as a literal path so that a missing
/// file surfaces as an open failure rather than silently disappearing.
/// Duplicates are removed, keeping the first occurrence.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>, LogRangeError> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        if !is_glob(pattern) {
            push_unique(&mut paths, PathBuf::from(pattern));
            continue;
        }

        let entries = glob::glob(pattern).map_err(|source| LogRangeError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        let mut matched: Vec<PathBuf> = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => matched.push(path),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        path = %e.path().display(),
                        error = %e.error(),
                        "Skipping unreadable match"
                    );
                }
            }
        }

        if matched.is_empty() {
            tracing::warn!(pattern = %pattern, "Input pattern matched no files");
        }
        matched.sort();
        for path in matched {
            push_unique(&mut paths, path);
        }
    }

    if paths.len() > constants::MAX_INPUT_FILES {
        tracing::warn!(
            count = paths.len(),
            max = constants::MAX_INPUT_FILES,
            "Too many input files; truncating"
        );
        paths.truncate(constants::MAX_INPUT_FILES);
    }

    Ok(paths)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(&['*', '?', '['][..])
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}
