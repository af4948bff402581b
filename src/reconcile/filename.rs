//! Output path templates for downloaded episodes.
//!
//! Files land in `{root}{series path}/Season {N}/{series}.S{N}E{NN}.{episode}.%(ext)s`
//! so the media manager's rescan picks them up by name. The `%(ext)s` field is
//! filled in by the downloader, so any other `%` is escaped.

use super::episodes::NeededEpisode;
use super::series::SeriesPolicy;

/// Builds the output template for one episode under `root`.
#[must_use]
pub fn output_template(root: &str, policy: &SeriesPolicy, episode: &NeededEpisode) -> String {
    let root = root.trim_end_matches('/');
    let series_path = policy.path.trim_end_matches('/');
    let separator = if series_path.starts_with('/') { "" } else { "/" };
    let series_title = escape_template(&clean_series_title(&policy.title));
    let episode_title = escape_template(&clean_episode_title(&episode.title));

    format!(
        "{root}{separator}{path}/Season {season}/{series_title}.S{season}E{number:02}.{episode_title}.%(ext)s",
        path = escape_template(series_path),
        season = episode.season_number,
        number = episode.episode_number,
    )
}

/// Removes characters that would break the file name.
pub(crate) fn clean_series_title(title: &str) -> String {
    title.replace(':', "").replace('/', "-")
}

/// Like [`clean_series_title`], and also collapses whitespace runs.
pub(crate) fn clean_episode_title(title: &str) -> String {
    clean_series_title(title)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escapes `%` so the downloader does not read it as a template field.
pub(crate) fn escape_template(value: &str) -> String {
    value.replace('%', "%%")
}
