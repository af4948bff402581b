//! Video catalog capability: search a channel/playlist and download one item.
//!
//! The reconciliation engine only talks to the [`Catalog`] trait. The shipped
//! backend, [`YtDlpCatalog`], drives the `yt-dlp` executable; tests plug in
//! in-memory fakes.
//!
//! # Architecture
//!
//! - [`Catalog`] - Async trait with `search` (metadata only) and `fetch` (download)
//! - [`CatalogQuery`] / [`CatalogResult`] - Search request and returned metadata
//! - [`DownloadJob`] - Everything needed to download a single matched item
//! - [`CatalogHooks`] - Caller-supplied logging verbosity and progress callbacks
//! - [`resolve_cookie_file`] - Cookie file lookup shared by search and download

mod cookies;
mod error;
mod progress;
mod ytdlp;

pub use cookies::{CookieFileSummary, resolve_cookie_file, summarize_cookie_file};
pub use error::CatalogError;
pub use progress::{ProgressEvent, parse_progress_line};
pub use ytdlp::YtDlpCatalog;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info};

/// Subtitle format downloaded subtitles are converted to.
pub const SUBTITLE_CONVERT_FORMAT: &str = "srt";

/// A catalog search scoped to one channel or playlist URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Channel or playlist URL to enumerate.
    pub url: String,
    /// Compiled title pattern candidates must match (case-insensitive search).
    pub title_pattern: String,
    /// Enumerate the playlist newest-last instead of newest-first.
    pub playlist_reverse: bool,
    /// Cookie file for authenticated catalogs (already checked to exist).
    pub cookies_file: Option<PathBuf>,
    /// Skip entries that fail to extract instead of aborting the query.
    pub ignore_errors: bool,
}

impl CatalogQuery {
    /// Creates a query with entry errors ignored and default ordering.
    #[must_use]
    pub fn new(url: impl Into<String>, title_pattern: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title_pattern: title_pattern.into(),
            playlist_reverse: false,
            cookies_file: None,
            ignore_errors: true,
        }
    }

    /// Sets the playlist enumeration order.
    #[must_use]
    pub fn with_playlist_reverse(mut self, reverse: bool) -> Self {
        self.playlist_reverse = reverse;
        self
    }

    /// Attaches a cookie file.
    #[must_use]
    pub fn with_cookies(mut self, cookies_file: Option<PathBuf>) -> Self {
        self.cookies_file = cookies_file;
        self
    }
}

/// Metadata returned by a catalog search.
///
/// A playlist or channel carries `entries`; a single item carries only its
/// own `webpage_url`. Entries that failed to extract show up as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogResult {
    /// Canonical URL of the queried object itself.
    #[serde(default)]
    pub webpage_url: Option<String>,
    /// Title of the queried object itself.
    #[serde(default)]
    pub title: Option<String>,
    /// Entries of a playlist/channel, already filtered by the backend.
    #[serde(default)]
    pub entries: Option<Vec<Option<CatalogEntry>>>,
}

impl CatalogResult {
    /// A result describing a single item.
    #[must_use]
    pub fn single(webpage_url: impl Into<String>) -> Self {
        Self {
            webpage_url: Some(webpage_url.into()),
            title: None,
            entries: None,
        }
    }

    /// A result describing a playlist with the given entries.
    #[must_use]
    pub fn playlist(webpage_url: impl Into<String>, entries: Vec<Option<CatalogEntry>>) -> Self {
        Self {
            webpage_url: Some(webpage_url.into()),
            title: None,
            entries: Some(entries),
        }
    }
}

/// One entry of a playlist/channel result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    /// Backend-specific item id.
    #[serde(default)]
    pub id: Option<String>,
    /// Item title.
    #[serde(default)]
    pub title: Option<String>,
    /// Canonical URL of the item.
    #[serde(default)]
    pub webpage_url: Option<String>,
}

impl CatalogEntry {
    /// Creates an entry with a title and URL.
    #[must_use]
    pub fn new(title: impl Into<String>, webpage_url: impl Into<String>) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            webpage_url: Some(webpage_url.into()),
        }
    }
}

/// Subtitle handling for a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleRequest {
    /// Subtitle languages to request.
    pub languages: Vec<String>,
    /// Request uploaded (manual) subtitles.
    pub manual: bool,
    /// Request automatically generated subtitles.
    pub automatic: bool,
    /// Format to convert subtitles to.
    pub convert_to: String,
    /// Embed subtitles into the output container.
    pub embed: bool,
}

impl SubtitleRequest {
    /// Manual and automatic subtitles in `languages`, converted to SRT and embedded.
    #[must_use]
    pub fn embedded(languages: Vec<String>) -> Self {
        Self {
            languages,
            manual: true,
            automatic: true,
            convert_to: SUBTITLE_CONVERT_FORMAT.to_string(),
            embed: true,
        }
    }
}

/// A single resolved item to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    /// Resolved item URL.
    pub source_url: String,
    /// Output path template; `%(ext)s` is filled in by the backend.
    pub output_template: String,
    /// Format selection expression.
    pub format: String,
    /// Container used when merging separate audio/video streams.
    pub merge_output_format: String,
    /// Subtitle handling, when enabled for the series.
    pub subtitles: Option<SubtitleRequest>,
    /// Cookie file (already checked to exist).
    pub cookies_file: Option<PathBuf>,
    /// Download only the item even if the URL also names a playlist.
    pub no_playlist: bool,
}

/// Progress callback invoked by backends while downloading.
pub type ProgressHook = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Caller-supplied logging and progress hooks for catalog operations.
#[derive(Clone, Default)]
pub struct CatalogHooks {
    verbose: bool,
    progress: Vec<ProgressHook>,
}

impl CatalogHooks {
    /// Hooks with no progress callbacks.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            progress: Vec::new(),
        }
    }

    /// Adds a progress callback.
    #[must_use]
    pub fn with_progress<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.progress.push(Arc::new(hook));
        self
    }

    /// Whether backends should run verbosely.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Delivers a progress event to every registered callback.
    pub fn emit(&self, event: &ProgressEvent) {
        for hook in &self.progress {
            hook(event);
        }
    }

    /// Forwards one line of backend diagnostics to the log.
    ///
    /// Errors always surface; warnings are raised to info only in verbose mode.
    pub fn log_line(&self, line: &str) {
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        if let Some(message) = line.strip_prefix("ERROR:") {
            error!(message = message.trim(), "catalog backend error");
        } else if let Some(message) = line.strip_prefix("WARNING:") {
            if self.verbose {
                info!(message = message.trim(), "catalog backend warning");
            } else {
                debug!(message = message.trim(), "catalog backend warning");
            }
        } else {
            debug!(line, "catalog backend output");
        }
    }
}

impl fmt::Debug for CatalogHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogHooks")
            .field("verbose", &self.verbose)
            .field("progress_hooks", &self.progress.len())
            .finish()
    }
}

/// A searchable, downloadable video catalog.
///
/// Uses `async_trait` so the pass runner can hold `&dyn Catalog`.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Backend name for logs (e.g., "yt-dlp").
    fn name(&self) -> &str;

    /// Enumerates `query.url`, keeping entries whose title matches the pattern.
    async fn search(
        &self,
        query: &CatalogQuery,
        hooks: &CatalogHooks,
    ) -> Result<CatalogResult, CatalogError>;

    /// Downloads a single item to disk.
    async fn fetch(&self, job: &DownloadJob, hooks: &CatalogHooks) -> Result<(), CatalogError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_catalog_query_defaults_ignore_errors() {
        let query = CatalogQuery::new("https://example.com/list", "PILOT");
        assert!(query.ignore_errors);
        assert!(!query.playlist_reverse);
        assert!(query.cookies_file.is_none());
    }

    #[test]
    fn test_catalog_result_deserializes_playlist_with_null_entries() {
        let raw = r#"{
            "webpage_url": "https://example.com/list",
            "title": "Uploads",
            "entries": [null, {"id": "a1", "title": "Pilot", "webpage_url": "https://example.com/v/a1"}]
        }"#;
        let result: CatalogResult = serde_json::from_str(raw).unwrap();
        let entries = result.entries.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_none());
        assert_eq!(
            entries[1].as_ref().unwrap().webpage_url.as_deref(),
            Some("https://example.com/v/a1")
        );
    }

    #[test]
    fn test_catalog_result_deserializes_single_item() {
        let raw = r#"{"id": "a1", "webpage_url": "https://example.com/v/a1", "duration": 10}"#;
        let result: CatalogResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.webpage_url.as_deref(), Some("https://example.com/v/a1"));
        assert!(result.entries.is_none());
    }

    #[test]
    fn test_subtitle_request_embedded() {
        let request = SubtitleRequest::embedded(vec!["es".to_string()]);
        assert!(request.manual);
        assert!(request.automatic);
        assert!(request.embed);
        assert_eq!(request.convert_to, "srt");
    }

    #[test]
    fn test_hooks_emit_reaches_every_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&seen);
        let second = Arc::clone(&seen);
        let hooks = CatalogHooks::new(false)
            .with_progress(move |event| first.lock().unwrap().push(format!("a:{event:?}")))
            .with_progress(move |event| second.lock().unwrap().push(format!("b:{event:?}")));

        hooks.emit(&ProgressEvent::Finished {
            filename: "x.mkv".to_string(),
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("a:"));
        assert!(seen[1].starts_with("b:"));
    }

    #[test]
    fn test_hooks_debug_does_not_require_debug_closures() {
        let hooks = CatalogHooks::new(true).with_progress(|_| {});
        let rendered = format!("{hooks:?}");
        assert!(rendered.contains("progress_hooks: 1"));
    }
}
