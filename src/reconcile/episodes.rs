//! Episode need filter.
//!
//! An episode is needed when it is monitored, has no file, and its
//! (offset-adjusted) air date is not after the pass's `now` snapshot.

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};

use super::series::SeriesPolicy;
use crate::manager::{EpisodeRecord, MediaManager};

/// An episode confirmed eligible for download in this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeededEpisode {
    /// Manager-side id.
    pub id: i64,
    /// Owning series id.
    pub series_id: i64,
    /// Title after the series' title rewrite.
    pub title: String,
    /// Season number.
    pub season_number: u32,
    /// Episode number.
    pub episode_number: u32,
    /// Air timestamp as reported by the manager (before any offset).
    pub air_date_utc: Option<DateTime<Utc>>,
}

/// A series and the episodes it still needs.
#[derive(Debug, Clone)]
pub struct WantedSeries {
    /// Series policy.
    pub policy: SeriesPolicy,
    /// Needed episodes in manager order; never empty.
    pub episodes: Vec<NeededEpisode>,
}

/// Whether `episode` should be downloaded for `policy` as of `now`.
#[must_use]
pub fn is_needed(policy: &SeriesPolicy, episode: &EpisodeRecord, now: DateTime<Utc>) -> bool {
    if !episode.monitored || episode.has_file {
        return false;
    }
    let available_at = match (episode.air_date_utc, policy.air_date_offset) {
        (Some(aired), Some(offset)) => offset.apply(aired),
        (Some(aired), None) => aired,
        (None, _) => now,
    };
    available_at <= now
}

/// Applies the series' title rewrite to an eligible episode.
#[must_use]
pub fn to_needed(policy: &SeriesPolicy, episode: &EpisodeRecord) -> NeededEpisode {
    let title = match &policy.title_rewrite {
        Some(rewrite) => rewrite.apply(&episode.title),
        None => episode.title.clone(),
    };
    NeededEpisode {
        id: episode.id,
        series_id: episode.series_id,
        title,
        season_number: episode.season_number,
        episode_number: episode.episode_number,
        air_date_utc: episode.air_date_utc,
    }
}

/// A blank title compiles to a pattern that matches every upload, so such
/// episodes are never searched.
fn has_searchable_title(policy: &SeriesPolicy, episode: &NeededEpisode) -> bool {
    if episode.title.trim().is_empty() {
        warn!(
            series = %policy.title,
            season = episode.season_number,
            episode = episode.episode_number,
            "episode has no title, skipping"
        );
        return false;
    }
    true
}

/// Lists each series' episodes and keeps the needed ones.
///
/// Episodes whose title is blank after the rewrite are skipped. Series
/// without needed episodes are dropped. A series whose episodes cannot be
/// listed is logged and skipped.
#[instrument(skip_all, fields(series = policies.len(), now = %now))]
pub async fn filter_needed(
    manager: &dyn MediaManager,
    policies: Vec<SeriesPolicy>,
    now: DateTime<Utc>,
) -> Vec<WantedSeries> {
    let mut wanted = Vec::new();
    for policy in policies {
        let episodes = match manager.list_episodes(policy.id).await {
            Ok(episodes) => episodes,
            Err(err) => {
                error!(series = %policy.title, error = %err, "failed to list episodes, skipping series");
                continue;
            }
        };

        let needed: Vec<NeededEpisode> = episodes
            .iter()
            .filter(|episode| is_needed(&policy, episode, now))
            .map(|episode| to_needed(&policy, episode))
            .filter(|episode| has_searchable_title(&policy, episode))
            .collect();

        if needed.is_empty() {
            info!(series = %policy.title, "no episodes needed");
            continue;
        }

        info!(series = %policy.title, missing = needed.len(), "missing episodes");
        for (index, episode) in needed.iter().enumerate() {
            info!("  {}: {} - {}", index + 1, policy.title, episode.title);
        }
        wanted.push(WantedSeries {
            policy,
            episodes: needed,
        });
    }
    wanted
}
