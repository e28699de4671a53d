use std::fs::File;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::cmd::Commands;

/// Terminal task board. Tasks live in memory for the session only.
/// A read-only JSON seed file can pre-populate the board via --seed.
#[derive(Parser)]
#[command(name = "taskboard", version, about = "In-memory terminal task board")]
pub struct Cli {
    /// JSON file of tasks to start the session with. Never written to.
    #[arg(long, global = true, env = "TASKBOARD_SEED")]
    pub seed: Option<PathBuf>,

    /// Write log output to this file (the board otherwise discards logs).
    #[arg(long, global = true, env = "TASKBOARD_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// More log output. Repeat for more detail.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Less log output.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

fn default_level(verbose: u8, quiet: u8) -> &'static str {
    match (verbose, quiet) {
        (_, q) if q >= 2 => "error",
        (_, 1) => "error",
        (0, _) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the level derived from `-v`/`-q`. Output goes to
/// `log_file` when set, otherwise to stderr, unless `interactive` is true in
/// which case it is discarded so the alternate screen stays clean.
pub fn init_tracing(
    verbose: u8,
    quiet: u8,
    log_file: Option<&Path>,
    interactive: bool,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let (writer, ansi) = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None if interactive => (BoxMakeWriter::new(std::io::sink), false),
        None => (BoxMakeWriter::new(std::io::stderr), std::io::stderr().is_terminal()),
    };

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer)
        .try_init();

    if let Err(err) = init_result {
        tracing::debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}
