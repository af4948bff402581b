//! REST client for the Sonarr API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{
    CommandRecord, EpisodeFileRecord, EpisodeRecord, ManagerError, MediaManager, RescanCommand,
    SeriesRecord,
};
use crate::config::SonarrSettings;
use crate::user_agent;

/// Request timeout for every API call.
pub const API_TIMEOUT: Duration = Duration::from_secs(10);

/// [`MediaManager`] implementation backed by Sonarr's REST API.
///
/// Every request carries the API key as the `apikey` query parameter.
pub struct SonarrClient {
    client: Client,
    api_base: Url,
    api_key: String,
}

impl SonarrClient {
    /// Creates a client from validated connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError`] if the settings do not form a valid URL or the
    /// HTTP client cannot be built.
    pub fn new(settings: &SonarrSettings) -> Result<Self, ManagerError> {
        Self::with_base_url(&settings.api_base_url(), settings.api_key.clone())
    }

    /// Creates a client for an explicit API base URL (e.g. a wiremock server
    /// plus `/api`).
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError`] if `api_base` is not an absolute URL or the
    /// HTTP client cannot be built.
    pub fn with_base_url(api_base: &str, api_key: impl Into<String>) -> Result<Self, ManagerError> {
        let mut base =
            Url::parse(api_base).map_err(|error| ManagerError::invalid_url(api_base, error))?;
        if base.cannot_be_a_base() {
            return Err(ManagerError::invalid_url(api_base, "not a base URL"));
        }
        // Url::join drops the last segment unless the path ends in a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .build()
            .map_err(|source| ManagerError::Client { source })?;

        Ok(Self {
            client,
            api_base: base,
            api_key: api_key.into(),
        })
    }

    /// The normalized API base URL.
    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Builds the URL for `path` plus query parameters and the API key.
    ///
    /// Returns the URL and its path, which is what logs and errors show.
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<(Url, String), ManagerError> {
        let mut url = self
            .api_base
            .join(path)
            .map_err(|error| ManagerError::invalid_url(path, error))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("apikey", &self.api_key);
        }
        let label = url.path().to_string();
        Ok((url, label))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ManagerError> {
        let (url, label) = self.endpoint(path, query)?;
        debug!(endpoint = %label, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| ManagerError::request(&label, error.without_url()))?;
        decode_response(response, &label).await
    }
}

async fn decode_response<T: DeserializeOwned>(
    response: Response,
    label: &str,
) -> Result<T, ManagerError> {
    let status = response.status();
    if !status.is_success() {
        debug!(endpoint = %label, status = status.as_u16(), "API error status");
        return Err(ManagerError::http_status(label, status.as_u16()));
    }
    response
        .json::<T>()
        .await
        .map_err(|error| ManagerError::decode(label, error.without_url()))
}

impl std::fmt::Debug for SonarrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SonarrClient")
            .field("api_base", &self.api_base.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MediaManager for SonarrClient {
    #[instrument(skip(self))]
    async fn list_series(&self) -> Result<Vec<SeriesRecord>, ManagerError> {
        self.get_json("series", &[]).await
    }

    #[instrument(skip(self))]
    async fn get_series(&self, id: i64) -> Result<SeriesRecord, ManagerError> {
        self.get_json(&format!("series/{id}"), &[]).await
    }

    #[instrument(skip(self))]
    async fn list_episodes(&self, series_id: i64) -> Result<Vec<EpisodeRecord>, ManagerError> {
        self.get_json("episode", &[("seriesId", series_id.to_string())])
            .await
    }

    #[instrument(skip(self))]
    async fn list_episode_files(
        &self,
        series_id: i64,
    ) -> Result<Vec<EpisodeFileRecord>, ManagerError> {
        self.get_json("episodefile", &[("seriesId", series_id.to_string())])
            .await
    }

    #[instrument(skip(self))]
    async fn rescan_series(&self, series_id: i64) -> Result<CommandRecord, ManagerError> {
        let (url, label) = self.endpoint("command", &[])?;
        debug!(endpoint = %label, series_id, "POST RescanSeries");
        let response = self
            .client
            .post(url)
            .json(&RescanCommand::new(series_id))
            .send()
            .await
            .map_err(|error| ManagerError::request(&label, error.without_url()))?;
        decode_response(response, &label).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = SonarrClient::with_base_url("http://localhost:8989/sonarr/api/v3", "k").unwrap();
        assert_eq!(client.api_base().as_str(), "http://localhost:8989/sonarr/api/v3/");
    }

    #[test]
    fn test_endpoint_appends_query_then_apikey() {
        let client = SonarrClient::with_base_url("http://localhost:8989/api", "secret").unwrap();
        let (url, label) = client
            .endpoint("episode", &[("seriesId", "7".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8989/api/episode?seriesId=7&apikey=secret"
        );
        assert_eq!(label, "/api/episode");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = SonarrClient::with_base_url("not a url", "k").unwrap_err();
        assert!(matches!(err, ManagerError::InvalidUrl { .. }));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = SonarrClient::with_base_url("http://localhost:8989/api", "secret").unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("secret"));
    }
}
