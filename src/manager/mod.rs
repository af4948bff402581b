//! Media-manager (Sonarr) capability.
//!
//! The reconciliation engine depends on the [`MediaManager`] trait only;
//! [`SonarrClient`] is the REST implementation.
//!
//! # Architecture
//!
//! - [`MediaManager`] - Async trait over the five calls a pass needs
//! - [`SeriesRecord`] / [`EpisodeRecord`] / [`EpisodeFileRecord`] - API models
//! - [`SonarrClient`] - reqwest client with API-key auth and a fixed timeout

mod client;
mod error;

pub use client::{API_TIMEOUT, SonarrClient};
pub use error::ManagerError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A series tracked by the media manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRecord {
    /// Manager-side id.
    pub id: i64,
    /// Display title; matched exactly against configured titles.
    pub title: String,
    /// Whether the series is monitored.
    #[serde(default)]
    pub monitored: bool,
    /// Library path of the series folder.
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
}

/// An episode of a series.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    /// Manager-side id.
    pub id: i64,
    /// Owning series id.
    pub series_id: i64,
    /// Episode title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Season number (0 for specials).
    pub season_number: u32,
    /// Episode number within the season.
    pub episode_number: u32,
    /// Air timestamp, when known.
    #[serde(default)]
    pub air_date_utc: Option<DateTime<Utc>>,
    /// Whether the episode is monitored.
    #[serde(default)]
    pub monitored: bool,
    /// Whether a file is already on disk.
    #[serde(default)]
    pub has_file: bool,
}

/// A file the manager has imported for a series.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeFileRecord {
    /// Manager-side id.
    pub id: i64,
    /// Owning series id.
    pub series_id: i64,
    /// Path relative to the series folder.
    #[serde(default)]
    pub relative_path: Option<String>,
    /// Absolute path.
    #[serde(default)]
    pub path: Option<String>,
    /// File size in bytes.
    #[serde(default)]
    pub size: u64,
}

/// A command queued on the manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRecord {
    /// Command id.
    pub id: i64,
    /// Command name (e.g., `RescanSeries`).
    pub name: String,
    /// Queue status, when reported.
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of a `RescanSeries` command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RescanCommand<'a> {
    pub name: &'a str,
    pub series_id: i64,
}

impl RescanCommand<'_> {
    pub(crate) fn new(series_id: i64) -> Self {
        Self {
            name: "RescanSeries",
            series_id,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The media-manager calls a reconciliation pass depends on.
#[async_trait]
pub trait MediaManager: Send + Sync {
    /// Lists every series, in the manager's order.
    async fn list_series(&self) -> Result<Vec<SeriesRecord>, ManagerError>;

    /// Fetches one series.
    async fn get_series(&self, id: i64) -> Result<SeriesRecord, ManagerError>;

    /// Lists a series' episodes, in the manager's order.
    async fn list_episodes(&self, series_id: i64) -> Result<Vec<EpisodeRecord>, ManagerError>;

    /// Lists a series' imported files.
    async fn list_episode_files(
        &self,
        series_id: i64,
    ) -> Result<Vec<EpisodeFileRecord>, ManagerError>;

    /// Asks the manager to rescan a series folder.
    async fn rescan_series(&self, series_id: i64) -> Result<CommandRecord, ManagerError>;
}
