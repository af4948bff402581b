//! Configuration loading and validation.
//!
//! The YAML file is parsed into the lenient shapes in `file`, then validated
//! into [`AppConfig`]: required sections are checked, rewrite rules compiled
//! and defaults filled in. Everything that can be rejected is rejected here so
//! a pass never discovers a bad regex halfway through.
//!
//! When the file is missing, [`write_template`] drops an annotated example
//! next to the expected location.

mod error;
mod file;

pub use error::ConfigError;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::matching::Rewrite;
use crate::reconcile::{AirDateOffset, SubtitlePolicy};

use file::{FileConfig, RewriteSection, SeriesSection};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "CONFIGPATH";

/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

/// Root prepended to series paths in download output templates.
pub const DEFAULT_OUTPUT_ROOT: &str = "/sonarr_root";

/// Annotated example written when no configuration exists.
pub const CONFIG_TEMPLATE: &str = include_str!("template.yml");

/// Validated configuration for the whole process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Minutes between passes.
    pub scan_interval_minutes: u64,
    /// Debug logging requested in the file.
    pub debug: bool,
    /// Media-manager connection.
    pub sonarr: SonarrSettings,
    /// Download settings.
    pub ytdl: YtdlSettings,
    /// Wanted series, in file order.
    pub series: Vec<SeriesEntry>,
    /// Directory holding the configuration file; cookie paths resolve against it.
    pub config_dir: PathBuf,
}

impl AppConfig {
    /// Time between passes.
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_minutes.saturating_mul(60))
    }
}

/// Media-manager connection settings.
#[derive(Clone)]
pub struct SonarrSettings {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// API key sent with every request.
    pub api_key: String,
    /// Use HTTPS.
    pub ssl: bool,
    /// Manager major version (`v4` selects `api/v3`).
    pub version: Option<String>,
    /// URL base when the manager runs under a sub-path.
    pub basedir: Option<String>,
}

impl SonarrSettings {
    /// API path segment for the configured version.
    #[must_use]
    pub fn api_segment(&self) -> &'static str {
        match self.version.as_deref() {
            Some(version) if version.trim().eq_ignore_ascii_case("v4") => "api/v3",
            _ => "api",
        }
    }

    /// `{scheme}://{host}:{port}[/{basedir}]`.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        let basedir = self
            .basedir
            .as_deref()
            .map(|dir| dir.trim_matches('/'))
            .filter(|dir| !dir.is_empty())
            .map(|dir| format!("/{dir}"))
            .unwrap_or_default();
        format!("{scheme}://{}:{}{basedir}", self.host, self.port)
    }

    /// Base URL plus the API segment.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        format!("{}/{}", self.base_url(), self.api_segment())
    }
}

impl std::fmt::Debug for SonarrSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SonarrSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("ssl", &self.ssl)
            .field("version", &self.version)
            .field("basedir", &self.basedir)
            .finish_non_exhaustive()
    }
}

/// Download-side settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YtdlSettings {
    /// Format selection used unless a series overrides it.
    pub default_format: String,
    /// Container for merged audio/video streams.
    pub merge_output_format: String,
    /// Root prepended to series paths.
    pub output_root: String,
    /// Downloader executable, when not `yt-dlp` on `PATH`.
    pub binary: Option<String>,
}

/// One wanted series from the configuration file.
#[derive(Debug, Clone)]
pub struct SeriesEntry {
    /// Title, matched exactly against the media manager.
    pub title: String,
    /// Channel or playlist URL.
    pub url: String,
    /// Cookie file, relative to the config directory unless absolute.
    pub cookies_file: Option<String>,
    /// Format override.
    pub format: Option<String>,
    /// Enumerate the playlist in reverse.
    pub playlist_reverse: bool,
    /// Prefix display titles with the series title.
    pub prepend_title: bool,
    /// Rewrite applied to manager-side episode titles.
    pub title_rewrite: Option<Rewrite>,
    /// Rewrite applied to the compiled search pattern.
    pub site_rewrite: Option<Rewrite>,
    /// Air-date shift; an all-zero offset is stored as `None`.
    pub offset: Option<AirDateOffset>,
    /// Subtitle handling.
    pub subtitles: SubtitlePolicy,
}

impl SeriesEntry {
    /// An entry with every option at its default.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            cookies_file: None,
            format: None,
            playlist_reverse: true,
            prepend_title: false,
            title_rewrite: None,
            site_rewrite: None,
            offset: None,
            subtitles: SubtitlePolicy::default(),
        }
    }
}

/// Reads the configuration path from [`CONFIG_PATH_ENV`].
#[must_use]
pub fn config_path_from_env() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Loads and validates the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when the file is missing, and the other
/// variants for unreadable, unparsable or invalid content.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    parse_config(&text, path, config_dir)
}

/// Parses and validates configuration text.
///
/// `path` is only used in error messages.
///
/// # Errors
///
/// Returns [`ConfigError`] when the text is not valid YAML or fails validation.
pub fn parse_config(text: &str, path: &Path, config_dir: PathBuf) -> Result<AppConfig, ConfigError> {
    let raw: FileConfig = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(raw, config_dir)
}

/// Writes `<path>.template` unless it already exists; returns its location.
///
/// # Errors
///
/// Returns [`ConfigError::Template`] when the file cannot be written.
pub fn write_template(path: &Path) -> Result<PathBuf, ConfigError> {
    let mut template = path.as_os_str().to_owned();
    template.push(".template");
    let template = PathBuf::from(template);

    if template.exists() {
        debug!(path = %template.display(), "configuration template already present");
        return Ok(template);
    }
    std::fs::write(&template, CONFIG_TEMPLATE).map_err(|source| ConfigError::Template {
        path: template.clone(),
        source,
    })?;
    info!(path = %template.display(), "wrote configuration template");
    Ok(template)
}

fn validate(raw: FileConfig, config_dir: PathBuf) -> Result<AppConfig, ConfigError> {
    let daemon = raw
        .sonarrytdl
        .ok_or_else(|| ConfigError::invalid("missing 'sonarrytdl' section"))?;
    let sonarr = raw
        .sonarr
        .ok_or_else(|| ConfigError::invalid("missing 'sonarr' section"))?;
    let ytdl = raw
        .ytdl
        .ok_or_else(|| ConfigError::invalid("missing 'ytdl' section"))?;
    let series = raw
        .series
        .ok_or_else(|| ConfigError::invalid("missing 'series' section"))?;

    if daemon.scan_interval == 0 {
        return Err(ConfigError::invalid("sonarrytdl.scan_interval must be at least 1 minute"));
    }
    require_non_empty("sonarr.host", &sonarr.host)?;
    require_non_empty("sonarr.apikey", &sonarr.apikey)?;
    require_non_empty("ytdl.default_format", &ytdl.default_format)?;
    require_non_empty("ytdl.merge_output_format", &ytdl.merge_output_format)?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(series.len());
    for section in series {
        if !seen.insert(section.title.clone()) {
            return Err(ConfigError::invalid(format!(
                "series '{}' is configured more than once",
                section.title
            )));
        }
        entries.push(validate_series(section)?);
    }

    Ok(AppConfig {
        scan_interval_minutes: daemon.scan_interval,
        debug: daemon.debug,
        sonarr: SonarrSettings {
            host: sonarr.host,
            port: sonarr.port,
            api_key: sonarr.apikey,
            ssl: sonarr.ssl,
            version: sonarr.version,
            basedir: sonarr.basedir,
        },
        ytdl: YtdlSettings {
            default_format: ytdl.default_format,
            merge_output_format: ytdl.merge_output_format,
            output_root: ytdl
                .output_root
                .unwrap_or_else(|| DEFAULT_OUTPUT_ROOT.to_string()),
            binary: ytdl.binary.filter(|binary| !binary.trim().is_empty()),
        },
        series: entries,
        config_dir,
    })
}

fn validate_series(section: SeriesSection) -> Result<SeriesEntry, ConfigError> {
    require_non_empty("series[].title", &section.title)?;
    require_non_empty(&format!("url of series '{}'", section.title), &section.url)?;

    let regex = section.regex.unwrap_or_default();
    let title_rewrite = compile_rule(&section.title, "sonarr", regex.sonarr)?;
    let site_rewrite = compile_rule(&section.title, "site", regex.site)?;

    let mut subtitles = SubtitlePolicy::default();
    if let Some(configured) = section.subtitles {
        subtitles.enabled = configured.enabled.unwrap_or(true);
        if let Some(languages) = configured.languages {
            if languages.is_empty() {
                return Err(ConfigError::invalid(format!(
                    "subtitles.languages of series '{}' is empty",
                    section.title
                )));
            }
            subtitles.languages = languages;
        }
        if let Some(autogenerated) = configured.autogenerated {
            subtitles.autogenerated = autogenerated;
        }
    }

    Ok(SeriesEntry {
        cookies_file: section.cookies_file.filter(|path| !path.trim().is_empty()),
        format: section.format.filter(|format| !format.trim().is_empty()),
        playlist_reverse: section.playlistreverse.unwrap_or(true),
        prepend_title: section.prepend_with_title.unwrap_or(false),
        title_rewrite,
        site_rewrite,
        offset: section.offset.filter(|offset| !offset.is_zero()),
        subtitles,
        title: section.title,
        url: section.url,
    })
}

fn compile_rule(
    series: &str,
    rule: &'static str,
    section: Option<RewriteSection>,
) -> Result<Option<Rewrite>, ConfigError> {
    section
        .map(|section| {
            Rewrite::new(&section.pattern, &section.replace).map_err(|source| {
                ConfigError::InvalidRegex {
                    series: series.to_string(),
                    rule,
                    source,
                }
            })
        })
        .transpose()
}

fn require_non_empty(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(format!("{name} must not be empty")));
    }
    Ok(())
}
