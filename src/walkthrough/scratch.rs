//! Scratch files handed to the editor.
//!
//! A command buffer is a comment header followed by the command; comment
//! lines are stripped before the text is run. A snippet buffer wraps the
//! snippet between two marker lines and only the text between them is kept.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;

use crate::runbook::{Step, Suggestion};

/// Line that opens the editable part of a snippet buffer.
pub const SNIPPET_START: &str = "# ----- snippet start (edit below) -----";

/// Line that closes the editable part of a snippet buffer.
pub const SNIPPET_END: &str = "# ----- snippet end -----";

fn push_comment(buffer: &mut String, line: &str) {
    if line.is_empty() {
        buffer.push_str("#\n");
    } else {
        buffer.push_str("# ");
        buffer.push_str(line);
        buffer.push('\n');
    }
}

fn write_header(buffer: &mut String, index: usize, step: &Step, suggestion: &Suggestion) {
    push_comment(buffer, &format!("Step {index}: {}", step.title));
    if let Some(description) = &step.description {
        description.lines().for_each(|line| push_comment(buffer, line));
    }
    if let Some(note) = &suggestion.note {
        push_comment(buffer, "");
        note.lines().for_each(|line| push_comment(buffer, line));
    }
}

/// Editor contents for a `cmd` suggestion.
pub fn command_buffer(index: usize, step: &Step, suggestion: &Suggestion) -> String {
    let mut buffer = String::new();
    write_header(&mut buffer, index, step, suggestion);
    buffer.push_str("# Lines starting with '#' are ignored. Save and quit to run.\n");
    buffer.push_str(&suggestion.body);
    buffer.push('\n');
    buffer
}

/// Editor contents for a `snippet` suggestion.
pub fn snippet_buffer(index: usize, step: &Step, suggestion: &Suggestion) -> String {
    let mut buffer = String::new();
    write_header(&mut buffer, index, step, suggestion);
    buffer.push_str(SNIPPET_START);
    buffer.push('\n');
    if !suggestion.body.is_empty() {
        buffer.push_str(&suggestion.body);
        buffer.push('\n');
    }
    buffer.push_str(SNIPPET_END);
    buffer.push('\n');
    buffer
}

/// Command text left after dropping comment lines, trimmed.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Lines between the snippet markers, `None` when a marker is missing.
pub fn extract_snippet(text: &str) -> Option<String> {
    let mut lines = text.lines();
    lines.by_ref().find(|line| line.trim_end() == SNIPPET_START)?;

    let mut body = Vec::new();
    for line in lines {
        if line.trim_end() == SNIPPET_END {
            return Some(body.join("\n"));
        }
        body.push(line);
    }
    None
}

/// Write `contents` to a fresh file in `dir`. The file is removed when the
/// handle is dropped.
pub fn write_scratch(dir: &Path, suffix: &str, contents: &str) -> anyhow::Result<NamedTempFile> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create scratch directory {}", dir.display()))?;

    let mut file = tempfile::Builder::new()
        .prefix("walkbook-")
        .suffix(suffix)
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create scratch file in {}", dir.display()))?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}
