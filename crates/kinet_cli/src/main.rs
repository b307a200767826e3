//! Kinet CLI
//!
//! `kinet init` writes a default `kinet.toml`; `kinet run <widget>` replays a
//! scripted scenario headlessly and prints every surface write.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod scenario;

use config::KinetConfig;
use scenario::WidgetKind;

#[derive(Parser)]
#[command(name = "kinet")]
#[command(author, version, about = "Pointer-reactive animation engine playground")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default kinet.toml
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Replay a widget scenario and print its surface writes
    Run {
        #[arg(value_enum)]
        widget: WidgetKind,
        /// Number of frames to play
        #[arg(short, long, default_value_t = 120)]
        frames: usize,
        /// Config file or directory containing kinet.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print one JSON object per frame
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match cli.command {
        Commands::Init { path, force } => {
            let written = config::write_default(&path, force)?;
            tracing::info!(path = %written.display(), "wrote default configuration");
            Ok(())
        }
        Commands::Run {
            widget,
            frames,
            config,
            json,
        } => run(widget, frames, config, json),
    }
}

fn run(widget: WidgetKind, frames: usize, config: Option<PathBuf>, json: bool) -> Result<()> {
    let config = KinetConfig::resolve(config.as_deref())?;
    let playback = scenario::play(widget, &config, frames)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in &playback.frames {
        if json {
            let line = serde_json::to_string(record).context("Failed to encode frame")?;
            writeln!(out, "{line}")?;
            continue;
        }
        for call in &record.calls {
            writeln!(out, "{:>5} {:>9.2}ms  {call}", record.frame, record.timestamp_ms)?;
        }
    }
    out.flush()?;

    tracing::info!(?widget, frames, "{}", playback.summary);
    Ok(())
}
