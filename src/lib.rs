//! # Walkbook
//!
//! Executable documentation for your terminal: compile step-by-step runbooks
//! into self-contained interactive walkthrough programs.
//!
//! A runbook is a small indentation-based document of steps, each with a
//! description and a list of suggestions. A suggestion is either a command,
//! edited then run in the shell, or a snippet, edited then kept in a stash
//! that can be pasted into files.
//!
//! ## Quick Start
//!
//! ```bash
//! # Build a walkthrough program from a runbook
//! walkbook --from deploy.yml -o deploy
//!
//! # Run it
//! ./deploy
//!
//! # Or walk through a runbook without building anything
//! walkbook play deploy.yml
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::unused_self)]

pub mod artifact;
pub mod core;
pub mod runbook;
pub mod walkthrough;

// Re-export commonly used types
pub use artifact::Payload;
pub use core::Config;
pub use runbook::{CompileError, Runbook};
pub use walkthrough::{SessionEnd, Walkthrough};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "walkbook";
