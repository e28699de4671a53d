//! Command implementations for the CLI interface.
//!
//! `ui` launches the interactive board; `list` and `categories` print the
//! derived view of the session's seed for scripting.

use std::io;

use anyhow::Context;
use chrono::Local;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::render::print_table;
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::run::run_tui;
use crate::view::{derive_view, SortKey, SortSpec, ViewSpec};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive board (default).
    Ui,

    /// Print the filtered and sorted task list.
    List {
        /// Only tasks carrying this category (case-sensitive).
        #[arg(long)]
        category: Option<String>,
        /// Sort key `field[:asc|desc]`. Repeat for secondary keys; the first wins.
        /// Fields: id, title, category, description, priority, deadline, state.
        #[arg(long = "sort")]
        sort: Vec<SortKey>,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List distinct categories and task counts.
    Categories,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui(store: TaskStore) -> anyhow::Result<()> {
    run_tui(store).context("UI error")
}

/// Print the view derived from the store.
pub fn cmd_list(
    store: &TaskStore,
    category: Option<String>,
    sort: Vec<SortKey>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let view = list_view(store, category, sort, limit);
    print_table(&view, Local::now().date_naive());
    Ok(())
}

fn list_view(
    store: &TaskStore,
    category: Option<String>,
    sort: Vec<SortKey>,
    limit: Option<usize>,
) -> Vec<&Task> {
    let spec = ViewSpec {
        category,
        sort: SortSpec::new(sort),
    };
    let mut view = derive_view(store.tasks(), &spec);
    if let Some(n) = limit {
        view.truncate(n);
    }
    tracing::debug!(rows = view.len(), sort = %spec.sort, "listing tasks");
    view
}

fn category_counts(store: &TaskStore) -> Vec<(String, usize)> {
    store
        .categories()
        .into_iter()
        .map(|label| {
            let count = store.tasks().iter().filter(|t| t.has_category(&label)).count();
            (label, count)
        })
        .collect()
}

/// Print every category with the number of tasks carrying it.
pub fn cmd_categories(store: &TaskStore) -> anyhow::Result<()> {
    let counts = category_counts(store);
    if counts.is_empty() {
        println!("No categories.");
        return Ok(());
    }
    for (label, count) in counts {
        println!("{:<24} {}", label, count);
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
