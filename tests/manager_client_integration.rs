//! Integration tests for the Sonarr REST client.
//!
//! Runs the client against a wiremock server and checks paths, the `apikey`
//! query parameter, decoding and error mapping.

use sonarr_ytdl_core::manager::{ManagerError, MediaManager, SonarrClient};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

const API_KEY: &str = "test-key";

#[tokio::test]
async fn test_list_series_sends_apikey_and_decodes() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/series"))
        .and(query_param("apikey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 42, "title": "Example Show", "monitored": true, "path": "/tv/Example Show"},
            {"id": 7, "title": "Other", "monitored": false, "path": "/tv/Other", "seasons": []}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = SonarrClient::with_base_url(&format!("{}/api", server.uri()), API_KEY).unwrap();
    let series = client.list_series().await.unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].id, 42);
    assert_eq!(series[0].path, "/tv/Example Show");
    assert!(!series[1].monitored);
}

#[tokio::test]
async fn test_v3_api_path_and_episode_query() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/sonarr/api/v3/episode"))
        .and(query_param("seriesId", "42"))
        .and(query_param("apikey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": 1, "seriesId": 42, "title": "Pilot",
                "seasonNumber": 1, "episodeNumber": 1,
                "airDateUtc": "2024-01-01T00:00:00Z",
                "monitored": true, "hasFile": false
            },
            {
                "id": 2, "seriesId": 42, "title": "TBA",
                "seasonNumber": 1, "episodeNumber": 2,
                "monitored": true, "hasFile": false
            }
        ])))
        .mount(&server)
        .await;

    let client =
        SonarrClient::with_base_url(&format!("{}/sonarr/api/v3", server.uri()), API_KEY).unwrap();
    let episodes = client.list_episodes(42).await.unwrap();

    assert_eq!(episodes.len(), 2);
    assert!(episodes[0].air_date_utc.is_some());
    assert!(episodes[1].air_date_utc.is_none());
}

#[tokio::test]
async fn test_get_series_and_episode_files() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/series/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(
            {"id": 42, "title": "Example Show", "monitored": true, "path": "/tv/Example Show"}
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/episodefile"))
        .and(query_param("seriesId", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 9, "seriesId": 42, "relativePath": "Season 1/a.mkv", "size": 1024}
        ])))
        .mount(&server)
        .await;

    let client = SonarrClient::with_base_url(&format!("{}/api", server.uri()), API_KEY).unwrap();

    let series = client.get_series(42).await.unwrap();
    assert_eq!(series.title, "Example Show");

    let files = client.list_episode_files(42).await.unwrap();
    assert_eq!(files[0].relative_path.as_deref(), Some("Season 1/a.mkv"));
    assert_eq!(files[0].size, 1024);
}

#[tokio::test]
async fn test_rescan_posts_command_body() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/api/command"))
        .and(query_param("apikey", API_KEY))
        .and(body_json(serde_json::json!({"name": "RescanSeries", "seriesId": 42})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!(
            {"id": 100, "name": "RescanSeries", "status": "queued"}
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = SonarrClient::with_base_url(&format!("{}/api", server.uri()), API_KEY).unwrap();
    let command = client.rescan_series(42).await.unwrap();

    assert_eq!(command.id, 100);
    assert_eq!(command.status.as_deref(), Some("queued"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_http_status_without_leaking_key() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/series"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = SonarrClient::with_base_url(&format!("{}/api", server.uri()), API_KEY).unwrap();
    let err = client.list_series().await.unwrap_err();

    assert!(matches!(err, ManagerError::HttpStatus { status: 401, .. }));
    let msg = err.to_string();
    assert!(msg.contains("/api/series"), "got: {msg}");
    assert!(!msg.contains(API_KEY), "API key leaked: {msg}");
}

#[tokio::test]
async fn test_malformed_body_maps_to_decode_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/series"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = SonarrClient::with_base_url(&format!("{}/api", server.uri()), API_KEY).unwrap();
    let err = client.list_series().await.unwrap_err();

    assert!(matches!(err, ManagerError::Decode { .. }), "got: {err}");
}

#[tokio::test]
async fn test_unreachable_server_maps_to_request_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let base = format!("{}/api", server.uri());
    drop(server);

    let client = SonarrClient::with_base_url(&base, API_KEY).unwrap();
    let err = client.list_series().await.unwrap_err();

    assert!(matches!(err, ManagerError::Request { .. }), "got: {err}");
    assert!(!err.to_string().contains(API_KEY));
}
