//! Cookie file lookup for authenticated catalogs.
//!
//! Cookie files use the Netscape HTTP cookie format (7 TAB-separated fields
//! per line) exported from a browser. The file is handed to the backend as
//! is; it is only inspected here so obviously broken files get a warning.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

/// Counts of usable and unusable lines in a cookie file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookieFileSummary {
    /// Lines that look like valid cookies.
    pub cookies: usize,
    /// Non-comment lines that do not.
    pub malformed: usize,
}

/// Resolves a configured cookie file against the configuration directory.
///
/// Returns `None` (after logging a warning) when the file does not exist, so
/// callers proceed unauthenticated. Relative paths are resolved against
/// `config_dir`.
#[instrument(level = "debug", skip(config_dir))]
pub fn resolve_cookie_file(config_dir: &Path, configured: Option<&str>) -> Option<PathBuf> {
    let configured = configured?;
    let candidate = Path::new(configured);
    let path = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        config_dir.join(candidate)
    };

    if !path.is_file() {
        warn!(path = %path.display(), "cookie file specified but does not exist");
        return None;
    }

    match summarize_cookie_file(&path) {
        Ok(summary) if summary.cookies == 0 => {
            warn!(
                path = %path.display(),
                malformed = summary.malformed,
                "cookie file contains no valid cookies"
            );
        }
        Ok(summary) => {
            debug!(
                path = %path.display(),
                cookies = summary.cookies,
                malformed = summary.malformed,
                "cookie file used"
            );
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "cookie file could not be inspected");
        }
    }

    Some(path)
}

/// Counts valid and malformed cookie lines in a Netscape cookie file.
///
/// Blank lines and `#` comments are skipped, except `#HttpOnly_` lines which
/// are real cookies with a marker prefix.
///
/// # Errors
///
/// Returns the IO error when the file cannot be opened or read.
pub fn summarize_cookie_file(path: &Path) -> Result<CookieFileSummary, std::io::Error> {
    let reader = BufReader::new(File::open(path)?);
    let mut summary = CookieFileSummary::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let line = match line.strip_prefix("#HttpOnly_") {
            Some(rest) => rest,
            None if line.starts_with('#') => continue,
            None => line,
        };
        if is_cookie_line(line) {
            summary.cookies += 1;
        } else {
            summary.malformed += 1;
        }
    }

    Ok(summary)
}

fn is_cookie_line(line: &str) -> bool {
    let fields: Vec<&str> = line.split('\t').collect();
    fields.len() == 7
        && !fields[0].is_empty()
        && fields[4].parse::<u64>().is_ok()
        && !fields[5].is_empty()
}
