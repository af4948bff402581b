//! Error types for catalog backends.

use thiserror::Error;

/// Errors raised while querying or downloading from the video catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backend program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to launch.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// IO failure while talking to a running backend.
    #[error("IO error while running {program}: {source}")]
    Io {
        /// Program being driven.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The backend exited unsuccessfully.
    #[error("{program} exited with status {status} for {url}: {detail}")]
    Exit {
        /// Program that failed.
        program: String,
        /// URL being processed.
        url: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Last error line the backend printed, if any.
        detail: String,
    },

    /// The backend's metadata output could not be decoded.
    #[error("invalid catalog metadata for {url}: {source}")]
    Decode {
        /// URL that was queried.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// Creates a spawn error.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            program: program.into(),
            source,
        }
    }

    /// Creates an exit-status error.
    pub fn exit(
        program: impl Into<String>,
        url: impl Into<String>,
        status: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Exit {
            program: program.into(),
            url: url.into(),
            status: status.into(),
            detail: detail.into(),
        }
    }

    /// Creates a metadata decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }
}
