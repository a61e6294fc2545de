//! Core services shared by the generator and the walkthrough runtime:
//! configuration, child process execution, command history and terminal
//! input.

mod config;
mod executor;
mod history;
pub mod terminal;

pub use config::{
    expand_path, Config, EditorConfig, GeneralConfig, PathsConfig, UiConfig, DEFAULT_EDITOR,
    DEFAULT_SHELL,
};
pub use executor::{ExecutionResult, Executor, Outcome, ProcessRunner};
pub use history::{CommandHistory, HistoryEntry, HistoryManager, DEFAULT_MAX_HISTORY};
pub use terminal::{LineReader, PlainReader, TerminalReader};
