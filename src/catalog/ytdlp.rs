//! `yt-dlp` process backend for the [`Catalog`] trait.
//!
//! Search runs `yt-dlp --dump-single-json` and decodes the single JSON line it
//! prints; download streams `--newline` progress output into the caller's
//! hooks while the transfer runs.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout, Command};
use tracing::{debug, instrument};

use super::progress::{ProgressEvent, parse_progress_line};
use super::{Catalog, CatalogError, CatalogHooks, CatalogQuery, CatalogResult, DownloadJob};

/// Default executable name, looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "yt-dlp";

/// Catalog backend that shells out to `yt-dlp`.
#[derive(Debug, Clone)]
pub struct YtDlpCatalog {
    program: PathBuf,
    prefix_args: Vec<OsString>,
}

impl YtDlpCatalog {
    /// Uses `yt-dlp` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Uses an explicit executable.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// Arguments placed before every generated argument list
    /// (e.g. `python3 -m yt_dlp`).
    #[must_use]
    pub fn with_prefix_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.prefix_args = args.into_iter().map(Into::into).collect();
        self
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    fn command(&self, args: Vec<OsString>) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.prefix_args)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

impl Default for YtDlpCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the argument list for a metadata-only search.
pub(crate) fn search_args(query: &CatalogQuery, hooks: &CatalogHooks) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--dump-single-json".into()];
    if query.ignore_errors {
        args.push("--ignore-errors".into());
    }
    args.push("--match-title".into());
    args.push(query.title_pattern.clone().into());
    if query.playlist_reverse {
        args.push("--playlist-reverse".into());
    }
    if let Some(cookies) = &query.cookies_file {
        args.push("--cookies".into());
        args.push(cookies.clone().into_os_string());
    }
    if hooks.is_verbose() {
        args.push("--verbose".into());
    }
    args.push("--".into());
    args.push(query.url.clone().into());
    args
}

/// Builds the argument list for downloading one item.
pub(crate) fn fetch_args(job: &DownloadJob, hooks: &CatalogHooks) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--newline".into(),
        "--format".into(),
        job.format.clone().into(),
        "--merge-output-format".into(),
        job.merge_output_format.clone().into(),
        "--output".into(),
        job.output_template.clone().into(),
    ];
    if job.no_playlist {
        args.push("--no-playlist".into());
    }
    if let Some(subtitles) = &job.subtitles {
        if subtitles.manual {
            args.push("--write-subs".into());
        }
        if subtitles.automatic {
            args.push("--write-auto-subs".into());
        }
        args.push("--sub-langs".into());
        args.push(subtitles.languages.join(",").into());
        args.push("--convert-subs".into());
        args.push(subtitles.convert_to.clone().into());
        if subtitles.embed {
            args.push("--embed-subs".into());
        }
    }
    if let Some(cookies) = &job.cookies_file {
        args.push("--cookies".into());
        args.push(cookies.clone().into_os_string());
    }
    if hooks.is_verbose() {
        args.push("--verbose".into());
    }
    args.push("--".into());
    args.push(job.source_url.clone().into());
    args
}

fn last_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
        .or_else(|| stderr.lines().rev().find(|line| !line.trim().is_empty()))
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn status_text(status: ExitStatus) -> String {
    status.to_string()
}

#[derive(Debug, Default)]
struct StdoutState {
    destination: Option<String>,
    finished: bool,
}

async fn read_stdout(
    stdout: Option<ChildStdout>,
    hooks: &CatalogHooks,
) -> Result<StdoutState, std::io::Error> {
    let mut state = StdoutState::default();
    let Some(stdout) = stdout else {
        return Ok(state);
    };
    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_progress_line(&line) {
            Some(event) => {
                match &event {
                    ProgressEvent::Destination { filename } => {
                        state.destination = Some(filename.clone());
                    }
                    ProgressEvent::Finished { .. } => state.finished = true,
                    ProgressEvent::Downloading { .. } => {}
                }
                hooks.emit(&event);
            }
            None => hooks.log_line(&line),
        }
    }
    Ok(state)
}

async fn read_stderr(
    stderr: Option<ChildStderr>,
    hooks: &CatalogHooks,
) -> Result<String, std::io::Error> {
    let mut collected = String::new();
    let Some(stderr) = stderr else {
        return Ok(collected);
    };
    let mut lines = BufReader::new(stderr).lines();
    while let Some(line) = lines.next_line().await? {
        hooks.log_line(&line);
        collected.push_str(&line);
        collected.push('\n');
    }
    Ok(collected)
}

#[async_trait]
impl Catalog for YtDlpCatalog {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    #[instrument(skip(self, hooks), fields(url = %query.url))]
    async fn search(
        &self,
        query: &CatalogQuery,
        hooks: &CatalogHooks,
    ) -> Result<CatalogResult, CatalogError> {
        let args = search_args(query, hooks);
        debug!(?args, "running catalog search");
        let output = self
            .command(args)
            .output()
            .await
            .map_err(|error| CatalogError::spawn(self.program_name(), error))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            hooks.log_line(line);
        }

        // With --ignore-errors the exit status can be non-zero even though
        // usable metadata was printed.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let payload = stdout
            .lines()
            .rev()
            .find(|line| line.trim_start().starts_with('{'));

        match payload {
            Some(json) => serde_json::from_str(json)
                .map_err(|error| CatalogError::decode(&query.url, error)),
            None if output.status.success() => Ok(CatalogResult::default()),
            None => Err(CatalogError::exit(
                self.program_name(),
                &query.url,
                status_text(output.status),
                last_error_line(&stderr),
            )),
        }
    }

    #[instrument(skip(self, job, hooks), fields(url = %job.source_url))]
    async fn fetch(&self, job: &DownloadJob, hooks: &CatalogHooks) -> Result<(), CatalogError> {
        let args = fetch_args(job, hooks);
        debug!(?args, "running catalog download");
        let mut child = self
            .command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| CatalogError::spawn(self.program_name(), error))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (stdout_state, stderr_text) =
            tokio::join!(read_stdout(stdout, hooks), read_stderr(stderr, hooks));

        let status = child
            .wait()
            .await
            .map_err(|error| CatalogError::io(self.program_name(), error))?;
        let stdout_state =
            stdout_state.map_err(|error| CatalogError::io(self.program_name(), error))?;
        let stderr_text =
            stderr_text.map_err(|error| CatalogError::io(self.program_name(), error))?;

        if !status.success() {
            return Err(CatalogError::exit(
                self.program_name(),
                &job.source_url,
                status_text(status),
                last_error_line(&stderr_text),
            ));
        }

        if !stdout_state.finished {
            if let Some(filename) = stdout_state.destination {
                hooks.emit(&ProgressEvent::Finished { filename });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::SubtitleRequest;

    fn to_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    fn job() -> DownloadJob {
        DownloadJob {
            source_url: "https://example.com/watch?v=abc".to_string(),
            output_template: "/sonarr_root/tv/Show/Season 1/Show.S1E01.Pilot.%(ext)s".to_string(),
            format: "bestvideo+bestaudio".to_string(),
            merge_output_format: "mkv".to_string(),
            subtitles: None,
            cookies_file: None,
            no_playlist: true,
        }
    }

    #[test]
    fn test_search_args_minimal() {
        let query = CatalogQuery::new("https://example.com/list", "PILOT");
        let args = to_strings(&search_args(&query, &CatalogHooks::new(false)));
        assert_eq!(
            args,
            [
                "--dump-single-json",
                "--ignore-errors",
                "--match-title",
                "PILOT",
                "--",
                "https://example.com/list"
            ]
        );
    }

    #[test]
    fn test_search_args_reverse_cookies_verbose() {
        let query = CatalogQuery::new("https://example.com/list", "PILOT")
            .with_playlist_reverse(true)
            .with_cookies(Some(PathBuf::from("/config/cookies.txt")));
        let args = to_strings(&search_args(&query, &CatalogHooks::new(true)));
        assert!(args.contains(&"--playlist-reverse".to_string()));
        let cookie_idx = args.iter().position(|a| a == "--cookies").unwrap();
        assert_eq!(args[cookie_idx + 1], "/config/cookies.txt");
        assert!(args.contains(&"--verbose".to_string()));
        assert_eq!(args.last().unwrap(), "https://example.com/list");
    }

    #[test]
    fn test_fetch_args_without_subtitles() {
        let args = to_strings(&fetch_args(&job(), &CatalogHooks::new(false)));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.iter().any(|a| a.contains("sub")));
        let output_idx = args.iter().position(|a| a == "--output").unwrap();
        assert_eq!(
            args[output_idx + 1],
            "/sonarr_root/tv/Show/Season 1/Show.S1E01.Pilot.%(ext)s"
        );
        assert_eq!(args.last().unwrap(), "https://example.com/watch?v=abc");
    }

    #[test]
    fn test_fetch_args_with_subtitles() {
        let mut job = job();
        job.subtitles = Some(SubtitleRequest::embedded(vec![
            "es".to_string(),
            "en".to_string(),
        ]));
        let args = to_strings(&fetch_args(&job, &CatalogHooks::new(false)));
        for flag in ["--write-subs", "--write-auto-subs", "--embed-subs"] {
            assert!(args.contains(&flag.to_string()), "missing {flag}");
        }
        let langs_idx = args.iter().position(|a| a == "--sub-langs").unwrap();
        assert_eq!(args[langs_idx + 1], "es,en");
        let convert_idx = args.iter().position(|a| a == "--convert-subs").unwrap();
        assert_eq!(args[convert_idx + 1], "srt");
    }

    #[test]
    fn test_last_error_line_prefers_error_prefix() {
        let stderr = "WARNING: slow\nERROR: Video unavailable\nsomething else\n";
        assert_eq!(last_error_line(stderr), "ERROR: Video unavailable");
        assert_eq!(last_error_line("only text\n"), "only text");
        assert_eq!(last_error_line(""), "");
    }

    #[test]
    fn test_default_program_name() {
        let catalog = YtDlpCatalog::default();
        assert_eq!(catalog.program_name(), "yt-dlp");
        assert_eq!(catalog.name(), "yt-dlp");
    }
}
