//! Walkthrough runtime.
//!
//! Loads a compiled runbook and walks the user through it: step navigation,
//! paginated suggestions, edit-then-run commands, the snippet stash and
//! persistent history.

mod action;
mod error;
mod pager;
mod render;
mod scratch;
mod session;
mod snippet;

use std::io::{self, IsTerminal};

use anyhow::Context;

pub use action::Action;
pub use error::UserCommandError;
pub use pager::{Pager, CHROME_ROWS, FALLBACK_ROWS, MIN_PAGE_SIZE};
pub use render::Renderer;
pub use session::{SessionEnd, SessionState, SessionStore, Walkthrough, HISTORY_FILE, SNIPPET_FILE};
pub use snippet::{PasteMode, SnippetCommand, SnippetStash};

use crate::core::terminal::{install_panic_hook, stdin_is_terminal, terminal_rows};
use crate::core::{Config, Executor, LineReader, PlainReader, TerminalReader};
use crate::runbook::Runbook;

/// Options of one interactive run.
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    /// Suggestions per page, overriding configuration and terminal height
    pub page_size: Option<usize>,
    /// 1-based step to start at
    pub start_step: Option<usize>,
}

/// Run the walkthrough `identity` on the real terminal.
pub fn play(runbook: Runbook, identity: &str, config: &Config, options: &PlayOptions) -> anyhow::Result<SessionEnd> {
    if let Some(step) = options.start_step {
        if step == 0 || step > runbook.step_count() {
            anyhow::bail!("{}", UserCommandError::InvalidStep { number: step, max: runbook.step_count() });
        }
    }

    install_panic_hook();
    // Ctrl-C belongs to the child process; the session itself keeps going.
    ctrlc::set_handler(|| {}).context("Failed to install the interrupt handler")?;

    let store = SessionStore::open(config, identity);
    let pager = Pager::from_settings(options.page_size.or(config.ui.page_size), terminal_rows());
    let renderer = Renderer::new(config.ui.color && io::stdout().is_terminal());
    let mut runner = Executor::from_config(config);

    let mut reader: Box<dyn LineReader> = if stdin_is_terminal() {
        let recall = store.history.commands().into_iter().filter(|c| !c.contains('\n')).collect();
        Box::new(TerminalReader::new(recall))
    } else {
        Box::new(PlainReader::new(io::stdin().lock(), io::stdout()))
    };
    let mut out = io::stdout();

    tracing::info!(identity, steps = runbook.step_count(), page_size = pager.page_size(), "Starting walkthrough");

    let end = Walkthrough::new(runbook, store, reader.as_mut(), &mut runner, &mut out)
        .with_pager(pager)
        .with_renderer(renderer)
        .starting_at(options.start_step.unwrap_or(1))
        .run()?;

    tracing::debug!(end = ?end, "Walkthrough ended");
    Ok(end)
}
