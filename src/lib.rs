//! sonarr-ytdl core library
//!
//! Reconciles a Sonarr library's wanted episodes against video sites:
//! episode titles are compiled into tolerant match patterns, searched in the
//! configured channel or playlist, and the single match is downloaded into
//! the series folder before Sonarr is asked to rescan.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`matching`] - Title pattern compiler, rewrite rules, catalog match resolution
//! - [`reconcile`] - Series resolver, episode need filter, download orchestrator, pass runner
//! - [`catalog`] - Video catalog capability and the `yt-dlp` backend
//! - [`manager`] - Media-manager capability and the Sonarr REST client
//! - [`config`] - YAML configuration loading and validation
//! - [`scheduler`] - Fixed-interval pass loop

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod manager;
pub mod matching;
pub mod reconcile;
pub mod scheduler;
mod user_agent;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, CatalogHooks, CatalogQuery, CatalogResult, YtDlpCatalog};
pub use config::{AppConfig, ConfigError, load_config};
pub use manager::{ManagerError, MediaManager, SonarrClient};
pub use matching::{MatchResult, TitleMatcher, compile_title_pattern};
pub use reconcile::{DownloadSummary, PassContext, PassError, PassSummary, run_pass};
pub use scheduler::Scheduler;
