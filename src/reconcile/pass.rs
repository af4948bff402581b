//! One reconciliation pass: resolve series, filter episodes, download.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, instrument};

use super::download::{DownloadOrchestrator, DownloadSettings, DownloadSummary};
use super::episodes::filter_needed;
use super::series::resolve_series;
use crate::catalog::{Catalog, CatalogHooks};
use crate::config::SeriesEntry;
use crate::manager::{ManagerError, MediaManager};

/// Errors that abort a pass. The scheduler logs them and waits for the next tick.
#[derive(Debug, Error)]
pub enum PassError {
    /// The series list could not be fetched.
    #[error("media manager unavailable: {0}")]
    ManagerUnavailable(#[from] ManagerError),
}

/// Capabilities and settings a pass runs against.
pub struct PassContext<'a> {
    /// Media manager.
    pub manager: &'a dyn MediaManager,
    /// Video catalog.
    pub catalog: &'a dyn Catalog,
    /// Configured wanted series.
    pub wanted: &'a [SeriesEntry],
    /// Shared download settings.
    pub settings: &'a DownloadSettings,
    /// Hooks passed to every catalog call.
    pub hooks: CatalogHooks,
}

/// What a pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Series matched between the manager and the config.
    pub matched_series: usize,
    /// Series with at least one needed episode.
    pub wanted_series: usize,
    /// Needed episodes across all series.
    pub needed_episodes: usize,
    /// Per-episode download outcomes.
    pub downloads: DownloadSummary,
}

/// Runs one pass with `now` as the air-date cutoff.
///
/// # Errors
///
/// Returns [`PassError::ManagerUnavailable`] when the series list cannot be
/// fetched. Every later failure is per series or per episode and only logged.
#[instrument(skip_all, fields(now = %now))]
pub async fn run_pass(ctx: &PassContext<'_>, now: DateTime<Utc>) -> Result<PassSummary, PassError> {
    let policies = resolve_series(ctx.manager, ctx.wanted).await?;
    let matched_series = policies.len();

    let wanted = filter_needed(ctx.manager, policies, now).await;
    let needed_episodes = wanted.iter().map(|series| series.episodes.len()).sum();

    let orchestrator =
        DownloadOrchestrator::new(ctx.manager, ctx.catalog, ctx.settings, ctx.hooks.clone());
    let downloads = orchestrator.process(&wanted).await;

    let summary = PassSummary {
        matched_series,
        wanted_series: wanted.len(),
        needed_episodes,
        downloads,
    };
    info!(
        matched_series = summary.matched_series,
        needed = summary.needed_episodes,
        processed = downloads.total(),
        downloaded = downloads.downloaded,
        missing = downloads.missing,
        failed = downloads.failed,
        "pass complete"
    );
    Ok(summary)
}
