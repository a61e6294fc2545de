//! Runbook compilation.
//!
//! Runbooks are step-by-step guides written in a small indentation-based
//! format. They are compiled (or authored with the wizard) into a flat record
//! stream, which is then projected onto the step/suggestion tables the
//! walkthrough runs from.

mod builder;
mod cursor;
mod error;
mod parser;
mod schema;
mod wizard;

pub use builder::build_runbook;
pub use cursor::LineCursor;
pub use error::{CompileError, CompileResult};
pub use parser::{parse_runbook, parse_runbook_str};
pub use schema::{Record, Runbook, Step, StepStatus, Suggestion, SuggestionKind};
pub use wizard::{ensure_interactive, run_wizard};

/// Compile a specification string straight to the runtime tables.
pub fn compile_str(content: &str) -> CompileResult<Runbook> {
    build_runbook(&parse_runbook_str(content)?)
}
