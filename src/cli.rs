//! CLI argument definitions using clap derive macros.

use clap::Parser;

/// Periodically download wanted Sonarr episodes from video sites.
///
/// Settings are read from the YAML file named by the `CONFIGPATH`
/// environment variable (default `config.yml`).
#[derive(Parser, Debug)]
#[command(name = "sonarr-ytdl")]
#[command(author, version, about)]
pub struct Args {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub debug: bool,
}
