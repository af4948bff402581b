//! Skips wiremock-backed tests on hosts that forbid loopback listeners.
//!
//! CI sets `SONARR_YTDL_REQUIRE_SOCKET_TESTS=1` so a missing listener fails
//! loudly instead of silently skipping the Sonarr client tests.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "SONARR_YTDL_REQUIRE_SOCKET_TESTS";

fn loopback_required() -> bool {
    std::env::var(REQUIRE_ENV).is_ok_and(|value| {
        matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
    })
}

/// Starts a mock Sonarr server, or returns `None` when loopback sockets are
/// unavailable and the environment allows skipping.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl Future<Output = Option<MockServer>> {
    let caller = Location::caller();
    let can_listen = TcpListener::bind("127.0.0.1:0").is_ok();
    async move {
        if can_listen {
            return Some(MockServer::start().await);
        }
        let message = format!(
            "mock Sonarr server cannot listen on 127.0.0.1 ({}:{})",
            caller.file(),
            caller.line()
        );
        assert!(!loopback_required(), "{message}; unset {REQUIRE_ENV} to skip");
        eprintln!("{message}; skipping");
        None
    }
}
