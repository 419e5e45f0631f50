//! mocap-events — detect motion events in motion-capture trace exports.
//!
//! Usage:
//!   mocap-events <PATH>                         Prompt for hand marker and nodes
//!   mocap-events <PATH> --hand H --nodes A,B,C  Run non-interactively
//!   mocap-events <PATH> --info                  Show trace header and markers

use std::path::PathBuf;

use clap::Parser;
use mocap_common::config::{AppConfig, LoggingConfig};
use mocap_common::error::MocapError;

mod commands;
mod prompt;

#[derive(Parser)]
#[command(
    name = "mocap-events",
    about = "Detect hand-to-node motion events in motion-capture marker trajectories",
    version,
    author
)]
struct Cli {
    /// Path to the tab-delimited trace export
    path: PathBuf,

    /// Hand marker name (prompted for if omitted)
    #[arg(long)]
    hand: Option<String>,

    /// Motion nodes in order, comma separated (prompted for if omitted)
    #[arg(long, value_delimiter = ',')]
    nodes: Option<Vec<String>>,

    /// Approach ratio threshold, between 0 and 0.5
    #[arg(long)]
    threshold: Option<f64>,

    /// Minimum frames in an approach before a departure counts
    #[arg(long)]
    buffer: Option<u32>,

    /// Output CSV path (default: <input stem>_events.csv beside the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show trace header information and exit
    #[arg(long)]
    info: bool,

    /// Config file (default: $XDG_CONFIG_HOME/mocap-events/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    // Initialize logging
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    mocap_common::logging::init_logging(&LoggingConfig {
        level: log_level,
        json: cli.json_logs || config.logging.json,
    });

    if !cli.path.is_file() {
        return Err(MocapError::FileNotFound { path: cli.path }.into());
    }

    if cli.info {
        return commands::info::run(cli.path);
    }

    commands::detect::run(
        commands::detect::DetectArgs {
            path: cli.path,
            hand: cli.hand,
            nodes: cli.nodes,
            threshold: cli.threshold,
            buffer: cli.buffer,
            output: cli.output,
        },
        &config,
    )
}
