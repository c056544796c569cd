mod cli;
mod config;
mod output;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use vidrelay::{Category, Relay, RelayError, SelectionMode, VideoSource};

use crate::cli::{Args, Backend, Commands};
use crate::config::AppConfig;
use crate::output::OutputManager;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(args.verbose, args.quiet) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let unavailable = e
                .downcast_ref::<RelayError>()
                .is_some_and(RelayError::is_temporarily_unavailable);
            if unavailable {
                error!("Temporarily unavailable: {:#}", e);
                eprintln!("Temporarily unavailable: {e:#}. Try again later.");
                ExitCode::from(2)
            } else {
                error!("Application error: {:#}", e);
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}

async fn run(args: Args) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(url) = args.definition_url {
        config.relay.definition_url = Some(url);
    }
    if args.stream_validation {
        config.relay.stream_validation = true;
    }
    debug!(?config, "Loaded configuration");

    let relay = Arc::new(Relay::new(config.relay.clone())?);
    let interrupted = Arc::clone(&relay);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, abandoning remaining instances");
            interrupted.cancel_in_flight();
        }
    });

    let mode = SelectionMode::parse(&args.source);
    let out = OutputManager::new(args.json);

    let reload_requested = matches!(args.command, Commands::Pool { reload: true, .. });
    if args.backend == Backend::Mirrors && !reload_requested {
        prepare_pool(&relay).await?;
    }

    let ytdlp;
    let source: &dyn VideoSource = match args.backend {
        Backend::Mirrors => &*relay,
        Backend::Ytdlp => {
            ytdlp = config.ytdlp.source();
            &ytdlp
        }
    };

    match args.command {
        Commands::Video { id, all: true } => {
            require_mirrors(args.backend, "video --all")?;
            out.videos(&relay.fetch_video_from_all(&id, mode).await?)?;
        }
        Commands::Video { id, all: false } => match args.backend {
            Backend::Mirrors => {
                let video = relay.fetch_video(&id, mode).await?;
                out.video(&video.record, Some(video.source.as_str()))?;
            }
            Backend::Ytdlp => out.video(&source.video(&id, mode).await?, None)?,
        },
        Commands::Search { query, page } => out.hits(&source.search(&query, page, mode).await?)?,
        Commands::Channel { id } => out.channel(&source.channel(&id, mode).await?)?,
        Commands::Playlist { id, page } => {
            out.playlist(&source.playlist(&id, page, mode).await?)?
        }
        Commands::Comments { id, all: true } => {
            out.comments_from_all(&source.comments_from_all(&id, mode).await?)?
        }
        Commands::Comments { id, all: false } => out.comments(&source.comments(&id, mode).await?)?,
        Commands::Suggest { keyword } => out.lines(&relay.suggest(&keyword).await?)?,
        Commands::Pool {
            reload,
            toggle_stream_validation,
        } => {
            if reload {
                relay
                    .reload_configured_pool()
                    .await
                    .context("pool reload failed")?;
            }
            if toggle_stream_validation {
                relay.toggle_stream_validation();
            }
            out.pool(&relay.describe_pool())?;
        }
        Commands::Rotate { category } => {
            let category: Category = category.parse().map_err(anyhow::Error::msg)?;
            match relay.rotate(category) {
                Some(rotated) => println!("Rotated {rotated} to the end of the {category} list"),
                None => println!("No {category} instances configured"),
            }
            out.pool(&relay.describe_pool())?;
        }
    }

    Ok(())
}

/// Loads the configured definition document. The seed pool stays in use when
/// the reload fails and the seed is not empty.
async fn prepare_pool(relay: &Relay) -> Result<()> {
    if relay.config().definition_url.is_none() {
        return Ok(());
    }
    match relay.reload_configured_pool().await {
        Ok(snapshot) => {
            debug!(version = ?snapshot.version, "Instance pool loaded");
            Ok(())
        }
        Err(e) if relay.config().pool.as_ref().is_some_and(|p| !p.is_empty()) => {
            warn!(error = %e, "Pool reload failed, using the configured seed pool");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn require_mirrors(backend: Backend, operation: &'static str) -> Result<()> {
    match backend {
        Backend::Mirrors => Ok(()),
        Backend::Ytdlp => Err(RelayError::Unsupported {
            backend: "yt-dlp",
            operation,
        }
        .into()),
    }
}
