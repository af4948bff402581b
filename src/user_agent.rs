//! User-Agent string for media-manager API requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/sonarr-ytdl";

/// Default User-Agent: crate name, version and project URL.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("sonarr-ytdl/{version} (+{PROJECT_UA_URL})")
}
