//! Daemon entry point for sonarr-ytdl.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use sonarr_ytdl_core::catalog::YtDlpCatalog;
use sonarr_ytdl_core::config::{
    AppConfig, ConfigError, config_path_from_env, load_config, write_template,
};
use sonarr_ytdl_core::manager::SonarrClient;
use sonarr_ytdl_core::reconcile::{DownloadSettings, PassContext, logging_hooks, run_pass};
use sonarr_ytdl_core::scheduler::Scheduler;
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // The config file can also request debug logging, so it is read before
    // the subscriber exists and any error is reported right after.
    let config_path = config_path_from_env();
    let loaded = load_config(&config_path);
    let debug = args.debug || loaded.as_ref().is_ok_and(|config| config.debug);
    init_tracing(debug);
    debug!(?args, path = %config_path.display(), "CLI arguments parsed");
    if let Ok(config) = &loaded {
        info!(
            path = %config_path.display(),
            series = config.series.len(),
            scan_interval_minutes = config.scan_interval_minutes,
            "configuration loaded"
        );
    }

    match run(loaded, debug).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Priority: `RUST_LOG` > `--debug` / `sonarrytdl.debug` > info.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(loaded: Result<AppConfig, ConfigError>, debug: bool) -> Result<()> {
    let config = match loaded {
        Ok(config) => config,
        Err(ConfigError::NotFound { path }) => {
            let template = write_template(&path)?;
            bail!(
                "configuration file {} not found; fill in {} and rename it",
                path.display(),
                template.display()
            );
        }
        Err(err) => return Err(err).context("failed to load configuration"),
    };

    let manager = SonarrClient::new(&config.sonarr).context("failed to create Sonarr client")?;
    let catalog = match &config.ytdl.binary {
        Some(binary) => YtDlpCatalog::with_program(PathBuf::from(binary)),
        None => YtDlpCatalog::new(),
    };
    let settings = DownloadSettings::from_config(&config);
    let ctx = PassContext {
        manager: &manager,
        catalog: &catalog,
        wanted: &config.series,
        settings: &settings,
        hooks: logging_hooks(debug),
    };

    let scheduler = Scheduler::new(config.scan_interval());
    info!(
        minutes = config.scan_interval_minutes,
        series = config.series.len(),
        "scan interval set by configuration"
    );

    let ctx = &ctx;
    scheduler
        .run_until(
            move || async move {
                if let Err(err) = run_pass(ctx, Utc::now()).await {
                    error!(error = %err, "pass aborted");
                }
            },
            shutdown_signal(),
        )
        .await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
