//! Error types for media-manager API calls.
//!
//! Messages name the endpoint path only; the API key travels in the query
//! string and is never rendered.

use thiserror::Error;

/// Errors raised while talking to the media manager's REST API.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The configured connection settings do not form a valid URL.
    #[error("invalid media manager URL '{url}': {reason}\n  Suggestion: Check sonarr.host, sonarr.port and sonarr.basedir")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The request could not be sent or timed out.
    #[error("request to {endpoint} failed: {source}\n  Suggestion: Check that Sonarr is running and reachable")]
    Request {
        /// Endpoint path.
        endpoint: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}{hint}")]
    HttpStatus {
        /// Endpoint path.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Extra guidance for well-known statuses.
        hint: &'static str,
    },

    /// The response body was not the expected JSON.
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        /// Endpoint path.
        endpoint: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl ManagerError {
    /// Creates an `InvalidUrl` error.
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Request` error.
    pub fn request(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Creates an `HttpStatus` error with a hint for common failures.
    pub fn http_status(endpoint: impl Into<String>, status: u16) -> Self {
        let hint = match status {
            401 => "\n  Suggestion: Check sonarr.apikey",
            404 => "\n  Suggestion: Check sonarr.version and sonarr.basedir",
            _ => "",
        };
        Self::HttpStatus {
            endpoint: endpoint.into(),
            status,
            hint,
        }
    }

    /// Creates a `Decode` error.
    pub fn decode(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_unauthorized_mentions_apikey() {
        let msg = ManagerError::http_status("/api/series", 401).to_string();
        assert!(msg.contains("/api/series returned HTTP 401"), "got: {msg}");
        assert!(msg.contains("sonarr.apikey"), "got: {msg}");
    }

    #[test]
    fn test_http_status_other_has_no_hint() {
        let msg = ManagerError::http_status("/api/series", 500).to_string();
        assert_eq!(msg, "/api/series returned HTTP 500");
    }

    #[test]
    fn test_invalid_url_display() {
        let msg = ManagerError::invalid_url("http://:0", "empty host").to_string();
        assert!(msg.contains("invalid media manager URL"));
        assert!(msg.contains("empty host"));
    }
}
