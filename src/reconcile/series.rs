//! Series configuration resolver.
//!
//! Joins the media manager's series list with the configured wanted entries.
//! Only exact title matches survive; the result keeps the manager's ordering.

use std::path::PathBuf;

use tracing::{debug, instrument, warn};

use super::offset::AirDateOffset;
use crate::config::SeriesEntry;
use crate::manager::{ManagerError, MediaManager, SeriesRecord};
use crate::matching::Rewrite;

/// Subtitle handling for a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitlePolicy {
    /// Download subtitles at all.
    pub enabled: bool,
    /// Languages to request.
    pub languages: Vec<String>,
    /// Whether automatically generated subtitles were asked for in the config.
    pub autogenerated: bool,
}

impl Default for SubtitlePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            languages: vec!["en".to_string()],
            autogenerated: false,
        }
    }
}

/// Everything a pass needs to know about one wanted series.
#[derive(Debug, Clone)]
pub struct SeriesPolicy {
    /// Manager-side id.
    pub id: i64,
    /// Title shared by the manager and the config entry.
    pub title: String,
    /// Whether the manager monitors the series.
    pub monitored: bool,
    /// Library path of the series folder.
    pub path: String,
    /// Channel or playlist URL to search.
    pub remote_url: String,
    /// Enumerate the playlist in reverse.
    pub playlist_reverse: bool,
    /// Subtitle handling.
    pub subtitles: SubtitlePolicy,
    /// Prefix display titles with the series title.
    pub prepend_title: bool,
    /// Cookie file as configured (resolved per use).
    pub cookies_file: Option<PathBuf>,
    /// Format override.
    pub format_override: Option<String>,
    /// Rewrite for manager-side episode titles.
    pub title_rewrite: Option<Rewrite>,
    /// Rewrite for the compiled search pattern.
    pub site_rewrite: Option<Rewrite>,
    /// Air-date shift.
    pub air_date_offset: Option<AirDateOffset>,
}

impl SeriesPolicy {
    /// Merges a manager record with its configured entry.
    #[must_use]
    pub fn from_parts(record: &SeriesRecord, entry: &SeriesEntry) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            monitored: record.monitored,
            path: record.path.clone(),
            remote_url: entry.url.clone(),
            playlist_reverse: entry.playlist_reverse,
            subtitles: entry.subtitles.clone(),
            prepend_title: entry.prepend_title,
            cookies_file: entry.cookies_file.as_ref().map(PathBuf::from),
            format_override: entry.format.clone(),
            title_rewrite: entry.title_rewrite.clone(),
            site_rewrite: entry.site_rewrite.clone(),
            air_date_offset: entry.offset,
        }
    }
}

/// Builds one policy per manager series that has a configured entry.
///
/// # Errors
///
/// Returns the [`ManagerError`] when the series list cannot be fetched.
#[instrument(skip_all, fields(wanted = wanted.len()))]
pub async fn resolve_series(
    manager: &dyn MediaManager,
    wanted: &[SeriesEntry],
) -> Result<Vec<SeriesPolicy>, ManagerError> {
    let records = manager.list_series().await?;

    let mut policies = Vec::new();
    for record in &records {
        for entry in wanted.iter().filter(|entry| entry.title == record.title) {
            policies.push(SeriesPolicy::from_parts(record, entry));
        }
    }

    for entry in wanted {
        if !policies.iter().any(|policy| policy.title == entry.title) {
            debug!(series = %entry.title, "configured series not found in media manager");
        }
    }
    for policy in policies.iter().filter(|policy| !policy.monitored) {
        warn!(series = %policy.title, "series is not currently monitored");
    }

    debug!(
        remote = records.len(),
        matched = policies.len(),
        "resolved wanted series"
    );
    Ok(policies)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(id: i64, title: &str, monitored: bool) -> SeriesRecord {
        SeriesRecord {
            id,
            title: title.to_string(),
            monitored,
            path: format!("/tv/{title}"),
        }
    }

    #[test]
    fn test_from_parts_copies_entry_options() {
        let mut entry = SeriesEntry::new("Show", "https://example.com/list");
        entry.cookies_file = Some("cookies.txt".to_string());
        entry.format = Some("worst".to_string());
        entry.prepend_title = true;
        entry.playlist_reverse = false;

        let policy = SeriesPolicy::from_parts(&record(4, "Show", true), &entry);
        assert_eq!(policy.id, 4);
        assert_eq!(policy.path, "/tv/Show");
        assert_eq!(policy.remote_url, "https://example.com/list");
        assert_eq!(policy.cookies_file, Some(PathBuf::from("cookies.txt")));
        assert_eq!(policy.format_override.as_deref(), Some("worst"));
        assert!(policy.prepend_title);
        assert!(!policy.playlist_reverse);
    }

    #[test]
    fn test_subtitle_policy_defaults() {
        let policy = SubtitlePolicy::default();
        assert!(!policy.enabled);
        assert_eq!(policy.languages, vec!["en".to_string()]);
        assert!(!policy.autogenerated);
    }
}
