//! # taskboard - in-memory terminal task board
//!
//! A small task manager with an interactive terminal board and a scripting
//! friendly `list` command.
//!
//! ## Key Features
//!
//! - **Session-only storage**: tasks live in memory and disappear on exit.
//!   A read-only JSON seed file can pre-populate the session.
//! - **Category filter**: show only tasks carrying one category label.
//! - **Multi-key sorting**: toggle columns to build a composite, stable sort
//!   (priority, deadline, state, title, ...), ascending or descending per key.
//! - **Guarded deletes**: the board always asks before removing a task.
//!
//! ## Quick Start
//!
//! ```bash
//! # Empty board
//! taskboard
//!
//! # Board pre-populated from a seed file
//! taskboard --seed tasks.json
//!
//! # Print the seed sorted by priority, then deadline
//! taskboard --seed tasks.json list --sort priority --sort deadline:asc
//! ```
//!
//! ## Seed Format
//!
//! `{"tasks": [...]}` or a bare array of objects with `id`, `title`,
//! `category` (list), `description`, `deadline` (`YYYY-MM-DD`), `priority`
//! (rank 1-3 with 1 = high, or "high"/"medium"/"low") and `state`
//! ("active"/"completed").

use std::path::Path;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod dates;
pub mod error;
pub mod fields;
pub mod render;
pub mod store;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::{init_tracing, Cli};
use cmd::*;
use store::TaskStore;

fn load_store(seed: Option<&Path>) -> anyhow::Result<TaskStore> {
    let store = match seed {
        Some(path) => TaskStore::load_seed(path)?,
        None => TaskStore::new(),
    };
    tracing::info!(tasks = store.len(), seeded = seed.is_some(), "session started");
    Ok(store)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Ui);
    let interactive = matches!(command, Commands::Ui);
    init_tracing(cli.verbose, cli.quiet, cli.log_file.as_deref(), interactive)?;
    let seed = cli.seed.as_deref();

    match command {
        Commands::Ui => cmd_ui(load_store(seed)?),
        Commands::List { category, sort, limit } => {
            cmd_list(&load_store(seed)?, category, sort, limit)
        }
        Commands::Categories => cmd_categories(&load_store(seed)?),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
