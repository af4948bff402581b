//! Configuration errors. All of them are fatal at startup.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}\n  Suggestion: Fill in the generated {}.template and rename it", path.display(), path.display())]
    NotFound {
        /// Expected location.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or has the wrong shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A required value is missing or out of range.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },

    /// A configured rewrite rule is not a valid regex.
    #[error("invalid regex for series '{series}' ({rule}): {source}")]
    InvalidRegex {
        /// Series title the rule belongs to.
        series: String,
        /// Which rule (`sonarr` or `site`).
        rule: &'static str,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The template file could not be written.
    #[error("failed to write configuration template {}: {source}", path.display())]
    Template {
        /// Template path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates an `Invalid` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
