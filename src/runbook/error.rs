//! Runbook compilation error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Fatal conditions that abort compilation before any output is produced.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The specification file could not be read.
    #[error("Cannot read specification '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No step was found (or confirmed, for the wizard).
    #[error("No steps found")]
    NoSteps,

    /// The wizard needs a terminal on stdin.
    #[error("The wizard requires an interactive terminal")]
    NotInteractive,

    /// A record arrived outside of an open step.
    #[error("Malformed record stream: {0}")]
    MalformedIr(String),

    /// IO error while prompting.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
