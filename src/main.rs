use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use posture_hold::replay::replay;
use posture_hold::{Config, LogSink, PostureAnalyzer};

/// Replay recorded keypoint frames and report posture holds.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// TOML file with templates and tick cadence (defaults built in)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines frame stream; stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the built-in configuration to this path and exit
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    if let Some(path) = cli.write_default_config {
        Config::default()
            .save(&path)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        info!(path = %path.display(), "default config written");
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut analyzer = PostureAnalyzer::from_config(&config).context("invalid configuration")?;
    info!(
        templates = analyzer.templates().len(),
        side = ?config.side,
        tick_ms = config.tick_interval_ms,
        "posture-hold starting"
    );

    let mut sink = LogSink;
    let summary = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening frame stream {}", path.display()))?;
            replay(BufReader::new(file), &mut analyzer, &mut sink)?
        }
        None => replay(io::stdin().lock(), &mut analyzer, &mut sink)?,
    };

    let longest_ticks = u32::try_from(summary.longest_session_ticks).unwrap_or(u32::MAX);
    let longest_hold = analyzer.tick_interval().saturating_mul(longest_ticks);
    info!(
        frames = summary.frames,
        transitions = summary.transitions,
        longest_hold = ?longest_hold,
        "replay complete"
    );

    Ok(())
}
