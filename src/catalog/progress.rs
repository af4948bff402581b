//! Progress events reported by catalog backends.

/// A progress notification delivered to [`super::CatalogHooks`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The backend started writing `filename`.
    Destination {
        /// Output file path.
        filename: String,
    },
    /// Periodic transfer progress.
    Downloading {
        /// Completed percentage (0-100).
        percent: f32,
        /// Estimated remaining time, as printed by the backend.
        eta: Option<String>,
    },
    /// The final output file is complete.
    Finished {
        /// Output file path.
        filename: String,
    },
}

/// Parses one line of `yt-dlp --newline` output into a progress event.
///
/// Returns `None` for lines that carry no progress information.
#[must_use]
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let line = line.trim();

    if let Some(target) = line.strip_prefix("[Merger] Merging formats into ") {
        return Some(ProgressEvent::Finished {
            filename: target.trim().trim_matches('"').to_string(),
        });
    }

    let rest = line.strip_prefix("[download]")?.trim_start();

    if let Some(path) = rest.strip_prefix("Destination:") {
        return Some(ProgressEvent::Destination {
            filename: path.trim().to_string(),
        });
    }

    if let Some(path) = rest.strip_suffix(" has already been downloaded") {
        return Some(ProgressEvent::Finished {
            filename: path.trim().to_string(),
        });
    }

    let (percent_text, tail) = rest.split_once('%')?;
    let percent = percent_text.trim().parse::<f32>().ok()?;
    let eta = tail
        .split_once("ETA ")
        .and_then(|(_, eta)| eta.split_whitespace().next())
        .filter(|eta| !eta.is_empty())
        .map(str::to_string);

    Some(ProgressEvent::Downloading { percent, eta })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_destination_line() {
        let event = parse_progress_line("[download] Destination: /tv/Show/Season 1/Show.S1E01.Pilot.f137.mp4");
        assert_eq!(
            event,
            Some(ProgressEvent::Destination {
                filename: "/tv/Show/Season 1/Show.S1E01.Pilot.f137.mp4".to_string()
            })
        );
    }

    #[test]
    fn test_parse_percentage_line_with_eta() {
        let event =
            parse_progress_line("[download]  45.3% of   10.00MiB at    1.00MiB/s ETA 00:05");
        assert_eq!(
            event,
            Some(ProgressEvent::Downloading {
                percent: 45.3,
                eta: Some("00:05".to_string())
            })
        );
    }

    #[test]
    fn test_parse_completed_line_without_eta() {
        let event = parse_progress_line("[download] 100% of   10.00MiB in 00:00:03 at 3.20MiB/s");
        assert_eq!(
            event,
            Some(ProgressEvent::Downloading {
                percent: 100.0,
                eta: None
            })
        );
    }

    #[test]
    fn test_parse_merger_line() {
        let event = parse_progress_line(r#"[Merger] Merging formats into "/tv/Show/Show.S1E01.Pilot.mkv""#);
        assert_eq!(
            event,
            Some(ProgressEvent::Finished {
                filename: "/tv/Show/Show.S1E01.Pilot.mkv".to_string()
            })
        );
    }

    #[test]
    fn test_parse_already_downloaded_line() {
        let event = parse_progress_line("[download] /tv/a.mkv has already been downloaded");
        assert_eq!(
            event,
            Some(ProgressEvent::Finished {
                filename: "/tv/a.mkv".to_string()
            })
        );
    }

    #[test]
    fn test_parse_unrelated_lines() {
        assert_eq!(parse_progress_line("[youtube] abc: Downloading webpage"), None);
        assert_eq!(parse_progress_line("[download] Downloading item 1 of 3"), None);
        assert_eq!(parse_progress_line(""), None);
    }
}
