//! Download orchestrator.
//!
//! For every needed episode: search the series' catalog URL, download the
//! single match into the library layout, then ask the media manager to
//! rescan. Each step's failure is logged and the loop moves on.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use super::episodes::{NeededEpisode, WantedSeries};
use super::filename::output_template;
use super::series::SeriesPolicy;
use crate::catalog::{
    Catalog, CatalogHooks, CatalogQuery, DownloadJob, ProgressEvent, SubtitleRequest,
    resolve_cookie_file,
};
use crate::config::AppConfig;
use crate::manager::MediaManager;
use crate::matching::{MatchResult, build_search_pattern, search_episode};

/// Download settings shared by every series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Format selection unless a series overrides it.
    pub default_format: String,
    /// Container for merged streams.
    pub merge_output_format: String,
    /// Root prepended to series paths.
    pub output_root: String,
    /// Directory relative cookie paths resolve against.
    pub config_dir: PathBuf,
}

impl DownloadSettings {
    /// Extracts the download settings from a validated config.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_format: config.ytdl.default_format.clone(),
            merge_output_format: config.ytdl.merge_output_format.clone(),
            output_root: config.ytdl.output_root.clone(),
            config_dir: config.config_dir.clone(),
        }
    }
}

/// Counts of per-episode outcomes in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Episodes downloaded successfully.
    pub downloaded: usize,
    /// Episodes with no catalog match.
    pub missing: usize,
    /// Episodes whose download failed.
    pub failed: usize,
}

impl DownloadSummary {
    /// Number of episodes processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.downloaded + self.missing + self.failed
    }
}

/// Title used for searching and log lines.
#[must_use]
pub fn display_title(policy: &SeriesPolicy, episode: &NeededEpisode) -> String {
    if policy.prepend_title {
        format!("{} - {}", policy.title, episode.title)
    } else {
        episode.title.clone()
    }
}

/// Hooks that report download progress through the log.
#[must_use]
pub fn logging_hooks(verbose: bool) -> CatalogHooks {
    CatalogHooks::new(verbose).with_progress(|event| match event {
        ProgressEvent::Destination { filename } => debug!(%filename, "download started"),
        ProgressEvent::Downloading { percent, eta } => {
            debug!(percent, eta = eta.as_deref().unwrap_or("-"), "downloading");
        }
        ProgressEvent::Finished { filename } => {
            info!(%filename, "done downloading, now post-processing");
        }
    })
}

enum EpisodeOutcome {
    Downloaded,
    Missing,
    Failed,
}

/// Drives search, download and rescan for the wanted series of a pass.
pub struct DownloadOrchestrator<'a> {
    manager: &'a dyn MediaManager,
    catalog: &'a dyn Catalog,
    settings: &'a DownloadSettings,
    hooks: CatalogHooks,
}

impl<'a> DownloadOrchestrator<'a> {
    /// Creates an orchestrator over the given capabilities.
    #[must_use]
    pub fn new(
        manager: &'a dyn MediaManager,
        catalog: &'a dyn Catalog,
        settings: &'a DownloadSettings,
        hooks: CatalogHooks,
    ) -> Self {
        Self {
            manager,
            catalog,
            settings,
            hooks,
        }
    }

    /// The catalog query for one episode.
    #[must_use]
    pub fn build_query(
        &self,
        policy: &SeriesPolicy,
        episode: &NeededEpisode,
        cookies_file: Option<PathBuf>,
    ) -> CatalogQuery {
        let pattern = build_search_pattern(
            &display_title(policy, episode),
            policy.site_rewrite.as_ref(),
        );
        CatalogQuery::new(&policy.remote_url, pattern)
            .with_playlist_reverse(policy.playlist_reverse)
            .with_cookies(cookies_file)
    }

    /// The download job for a matched episode.
    #[must_use]
    pub fn build_job(
        &self,
        policy: &SeriesPolicy,
        episode: &NeededEpisode,
        source_url: &str,
        cookies_file: Option<PathBuf>,
    ) -> DownloadJob {
        let subtitles = policy
            .subtitles
            .enabled
            .then(|| SubtitleRequest::embedded(policy.subtitles.languages.clone()));
        DownloadJob {
            source_url: source_url.to_string(),
            output_template: output_template(&self.settings.output_root, policy, episode),
            format: policy
                .format_override
                .clone()
                .unwrap_or_else(|| self.settings.default_format.clone()),
            merge_output_format: self.settings.merge_output_format.clone(),
            subtitles,
            cookies_file,
            no_playlist: true,
        }
    }

    /// Processes every needed episode, strictly one after another.
    pub async fn process(&self, wanted: &[WantedSeries]) -> DownloadSummary {
        let mut summary = DownloadSummary::default();
        if wanted.is_empty() {
            info!("nothing to process");
            return summary;
        }

        info!("processing wanted downloads");
        for series in wanted {
            info!(series = %series.policy.title, episodes = series.episodes.len(), "series");
            let cookies = self.series_cookies(&series.policy);
            for (index, episode) in series.episodes.iter().enumerate() {
                match self
                    .process_episode(index + 1, &series.policy, episode, cookies.as_deref())
                    .await
                {
                    EpisodeOutcome::Downloaded => summary.downloaded += 1,
                    EpisodeOutcome::Missing => summary.missing += 1,
                    EpisodeOutcome::Failed => summary.failed += 1,
                }
            }
        }
        summary
    }

    fn series_cookies(&self, policy: &SeriesPolicy) -> Option<PathBuf> {
        let configured = policy.cookies_file.as_ref()?;
        resolve_cookie_file(&self.settings.config_dir, configured.to_str())
    }

    async fn process_episode(
        &self,
        position: usize,
        policy: &SeriesPolicy,
        episode: &NeededEpisode,
        cookies: Option<&Path>,
    ) -> EpisodeOutcome {
        let title = display_title(policy, episode);
        let query = self.build_query(policy, episode, cookies.map(Path::to_path_buf));

        let url = match search_episode(self.catalog, &query, &self.hooks).await {
            MatchResult::Found { url } => url,
            MatchResult::NotFound(reason) => {
                info!(position, %title, ?reason, "missing");
                return EpisodeOutcome::Missing;
            }
        };
        info!(position, %title, %url, "found");

        let job = self.build_job(policy, episode, &url, cookies.map(Path::to_path_buf));
        debug!(?job, "download job");
        if let Err(err) = self.catalog.fetch(&job, &self.hooks).await {
            error!(
                %title,
                series = %policy.title,
                season = episode.season_number,
                episode = episode.episode_number,
                error = %err,
                "failed"
            );
            return EpisodeOutcome::Failed;
        }

        if let Err(err) = self.manager.rescan_series(policy.id).await {
            warn!(series = %policy.title, error = %err, "rescan request failed");
        }
        info!(%title, "downloaded");
        EpisodeOutcome::Downloaded
    }
}
