//! The reconciliation engine.
//!
//! A pass resolves configured series against the media manager, keeps the
//! episodes that have aired and are missing, and downloads each one from the
//! series' catalog URL. Capabilities come in as trait objects
//! ([`crate::manager::MediaManager`], [`crate::catalog::Catalog`]) so the
//! whole pipeline runs against in-memory fakes in tests.
//!
//! # Architecture
//!
//! - [`resolve_series`] - manager series x config entries -> [`SeriesPolicy`]
//! - [`filter_needed`] - episodes -> [`WantedSeries`] using [`AirDateOffset`]
//! - [`DownloadOrchestrator`] - search, download and rescan per episode
//! - [`run_pass`] - the three steps above, in order

mod download;
mod episodes;
mod filename;
mod offset;
mod pass;
mod series;

pub use download::{
    DownloadOrchestrator, DownloadSettings, DownloadSummary, display_title, logging_hooks,
};
pub use episodes::{NeededEpisode, WantedSeries, filter_needed, is_needed, to_needed};
pub use filename::output_template;
pub use offset::AirDateOffset;
pub use pass::{PassContext, PassError, PassSummary, run_pass};
pub use series::{SeriesPolicy, SubtitlePolicy, resolve_series};
