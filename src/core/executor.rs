//! Command execution module.
//!
//! Spawns the shell and the editor with the terminal passed through and
//! blocks until they exit.

use std::fmt;
use std::path::Path;
use std::process::{Command as ProcessCommand, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::Context;

use super::Config;

/// Classification of a child's exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Exit code 0
    Ok,
    /// Exit code 128 or above, including death by signal
    Interrupted,
    /// Any other exit code
    Error,
}

impl Outcome {
    /// Classify an exit code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            c if c >= 128 => Self::Interrupted,
            _ => Self::Error,
        }
    }

    /// Label shown next to the exit code.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Interrupted => "interrupted",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of running a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code, `128 + signal` when killed by a signal
    pub code: i32,

    /// Time taken to execute
    pub duration: Duration,
}

impl ExecutionResult {
    /// Result with the given code and no duration.
    pub fn from_code(code: i32) -> Self {
        Self { code, duration: Duration::ZERO }
    }

    /// Check if the process succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Classify the exit code.
    pub fn outcome(&self) -> Outcome {
        Outcome::from_code(self.code)
    }
}

/// Blocking spawn of interactive child processes.
pub trait ProcessRunner {
    /// Run a command text in the shell and wait for it.
    fn run_command(&mut self, command: &str) -> anyhow::Result<ExecutionResult>;

    /// Open a file in the editor and wait for the editor to exit.
    fn open_editor(&mut self, path: &Path) -> anyhow::Result<ExecutionResult>;
}

/// Process runner backed by the configured shell and editor.
#[derive(Debug, Clone)]
pub struct Executor {
    /// Shell program used for commands and to launch the editor
    pub shell: String,

    /// Editor command line, may contain arguments
    pub editor: String,
}

impl Executor {
    /// Create an executor.
    pub fn new(shell: impl Into<String>, editor: impl Into<String>) -> Self {
        Self { shell: shell.into(), editor: editor.into() }
    }

    /// Create an executor from the resolved configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.shell(), config.editor_program())
    }

    fn spawn(&self, mut cmd: ProcessCommand) -> anyhow::Result<ExecutionResult> {
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let start = Instant::now();
        let status = cmd.status().with_context(|| format!("Failed to start '{}'", self.shell))?;

        Ok(ExecutionResult { code: exit_code(status), duration: start.elapsed() })
    }
}

impl ProcessRunner for Executor {
    fn run_command(&mut self, command: &str) -> anyhow::Result<ExecutionResult> {
        let mut cmd = ProcessCommand::new(&self.shell);
        cmd.arg(shell_flag()).arg(command);
        self.spawn(cmd)
    }

    fn open_editor(&mut self, path: &Path) -> anyhow::Result<ExecutionResult> {
        let mut cmd = ProcessCommand::new(&self.shell);
        if cfg!(target_os = "windows") {
            cmd.arg(shell_flag()).arg(format!("{} \"{}\"", self.editor, path.display()));
        } else {
            // The path travels as $1 so it never needs quoting.
            cmd.arg(shell_flag()).arg(format!("{} \"$1\"", self.editor)).arg("walkbook-editor").arg(path);
        }
        self.spawn(cmd)
    }
}

/// Flag that makes the shell run its next argument.
fn shell_flag() -> &'static str {
    if cfg!(target_os = "windows") {
        "/C"
    } else {
        "-c"
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status.code().unwrap_or_else(|| status.signal().map_or(1, |signal| 128 + signal))
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
