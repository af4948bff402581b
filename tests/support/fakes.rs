//! In-memory media manager and catalog used by pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sonarr_ytdl_core::catalog::{
    Catalog, CatalogEntry, CatalogError, CatalogHooks, CatalogQuery, CatalogResult, DownloadJob,
    ProgressEvent,
};
use sonarr_ytdl_core::manager::{
    CommandRecord, EpisodeFileRecord, EpisodeRecord, ManagerError, MediaManager, SeriesRecord,
};
use sonarr_ytdl_core::matching::TitleMatcher;

pub fn series(id: i64, title: &str) -> SeriesRecord {
    SeriesRecord {
        id,
        title: title.to_string(),
        monitored: true,
        path: format!("/tv/{title}"),
    }
}

pub fn episode(
    id: i64,
    series_id: i64,
    title: &str,
    season: u32,
    number: u32,
    aired: Option<DateTime<Utc>>,
) -> EpisodeRecord {
    EpisodeRecord {
        id,
        series_id,
        title: title.to_string(),
        season_number: season,
        episode_number: number,
        air_date_utc: aired,
        monitored: true,
        has_file: false,
    }
}

/// Media manager backed by fixed series/episode lists.
#[derive(Default)]
pub struct FakeManager {
    pub series: Vec<SeriesRecord>,
    pub episodes: HashMap<i64, Vec<EpisodeRecord>>,
    pub fail_series_listing: bool,
    pub failing_episode_listings: HashSet<i64>,
    pub fail_rescans: bool,
    pub rescans: Mutex<Vec<i64>>,
}

impl FakeManager {
    pub fn with_series(mut self, record: SeriesRecord, episodes: Vec<EpisodeRecord>) -> Self {
        self.episodes.insert(record.id, episodes);
        self.series.push(record);
        self
    }

    pub fn rescanned(&self) -> Vec<i64> {
        self.rescans.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaManager for FakeManager {
    async fn list_series(&self) -> Result<Vec<SeriesRecord>, ManagerError> {
        if self.fail_series_listing {
            return Err(ManagerError::http_status("/api/series", 503));
        }
        Ok(self.series.clone())
    }

    async fn get_series(&self, id: i64) -> Result<SeriesRecord, ManagerError> {
        self.series
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| ManagerError::http_status(format!("/api/series/{id}"), 404))
    }

    async fn list_episodes(&self, series_id: i64) -> Result<Vec<EpisodeRecord>, ManagerError> {
        if self.failing_episode_listings.contains(&series_id) {
            return Err(ManagerError::http_status("/api/episode", 500));
        }
        Ok(self.episodes.get(&series_id).cloned().unwrap_or_default())
    }

    async fn list_episode_files(
        &self,
        _series_id: i64,
    ) -> Result<Vec<EpisodeFileRecord>, ManagerError> {
        Ok(Vec::new())
    }

    async fn rescan_series(&self, series_id: i64) -> Result<CommandRecord, ManagerError> {
        self.rescans.lock().unwrap().push(series_id);
        if self.fail_rescans {
            return Err(ManagerError::http_status("/api/command", 500));
        }
        Ok(CommandRecord {
            id: 1,
            name: "RescanSeries".to_string(),
            status: Some("queued".to_string()),
        })
    }
}

/// Catalog that filters fixed playlists with the query's title pattern,
/// the way `--match-title` does.
#[derive(Default)]
pub struct FakeCatalog {
    pub playlists: HashMap<String, Vec<CatalogEntry>>,
    pub fail_search: bool,
    pub failing_fetch_urls: HashSet<String>,
    pub searches: Mutex<Vec<CatalogQuery>>,
    pub fetches: Mutex<Vec<DownloadJob>>,
}

impl FakeCatalog {
    pub fn with_playlist(mut self, url: &str, entries: Vec<CatalogEntry>) -> Self {
        self.playlists.insert(url.to_string(), entries);
        self
    }

    pub fn searched(&self) -> Vec<CatalogQuery> {
        self.searches.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<DownloadJob> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search(
        &self,
        query: &CatalogQuery,
        _hooks: &CatalogHooks,
    ) -> Result<CatalogResult, CatalogError> {
        self.searches.lock().unwrap().push(query.clone());
        if self.fail_search {
            return Err(CatalogError::exit("fake", &query.url, "exit status: 1", "ERROR: offline"));
        }
        let matcher = TitleMatcher::new(&query.title_pattern).unwrap();
        let entries = self
            .playlists
            .get(&query.url)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.title.as_deref().is_some_and(|t| matcher.is_match(t)))
                    .cloned()
                    .map(Some)
                    .collect()
            })
            .unwrap_or_default();
        Ok(CatalogResult::playlist(&query.url, entries))
    }

    async fn fetch(&self, job: &DownloadJob, hooks: &CatalogHooks) -> Result<(), CatalogError> {
        self.fetches.lock().unwrap().push(job.clone());
        if self.failing_fetch_urls.contains(&job.source_url) {
            return Err(CatalogError::exit(
                "fake",
                &job.source_url,
                "exit status: 1",
                "ERROR: unavailable",
            ));
        }
        hooks.emit(&ProgressEvent::Finished {
            filename: job.output_template.replace("%(ext)s", "mkv"),
        });
        Ok(())
    }
}
