//! TUI entry point and terminal setup.

use std::io;
use std::panic;

use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::store::TaskStore;
use crate::tui::app::App;

/// Initialise the terminal, run the board on `store` until the user quits,
/// then restore the terminal. The store is dropped when this returns.
pub fn run_tui(store: TaskStore) -> io::Result<()> {
    chain_panic_hook(|| {
        let _ = restore_terminal();
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);
    let result = app.run(&mut terminal);

    restore_terminal()?;

    tracing::info!(tasks = app.store().len(), "board closed");
    result
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show)
}

/// Run `restore` before the current panic hook so a crash report lands on
/// the normal screen instead of the alternate one.
fn chain_panic_hook(restore: impl Fn() + Send + Sync + 'static) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore();
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn test_panic_runs_restore_first() {
        static RESTORED: AtomicBool = AtomicBool::new(false);
        chain_panic_hook(|| RESTORED.store(true, Ordering::SeqCst));

        let result: std::thread::Result<()> = panic::catch_unwind(|| panic!("board crashed"));
        let _ = panic::take_hook();

        assert!(result.is_err());
        assert!(RESTORED.load(Ordering::SeqCst));
    }
}
