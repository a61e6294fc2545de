//! Interactive runbook authoring.
//!
//! Asks for steps one at a time and produces the same record stream the
//! compiler would produce for the equivalent document.

use std::io::{self, Write};

use super::{CompileError, CompileResult, Record, SuggestionKind};
use crate::core::terminal::stdin_is_terminal;
use crate::core::LineReader;

/// Line that ends a multi-line answer.
const END_OF_TEXT: &str = ".";

/// Fail unless stdin is a terminal.
pub fn ensure_interactive() -> CompileResult<()> {
    if stdin_is_terminal() {
        Ok(())
    } else {
        Err(CompileError::NotInteractive)
    }
}

/// Run the wizard until the user leaves a step title empty.
pub fn run_wizard(reader: &mut dyn LineReader, out: &mut dyn Write) -> CompileResult<Vec<Record>> {
    let mut records = Vec::new();
    let mut confirmed = 0usize;

    writeln!(out, "Add steps one at a time. Leave the title empty when you are done.")?;

    loop {
        writeln!(out)?;
        let title = match ask(reader, &format!("Step {} title: ", confirmed + 1))? {
            Some(title) if !title.is_empty() => title,
            _ => break,
        };

        writeln!(out, "Description (finish with a line holding a single '.', empty line for none):")?;
        let description = read_text(reader)?;

        let mut step = vec![Record::Step { title }];
        while let Some(suggestion) = ask_suggestion(reader, out)? {
            step.push(suggestion);
        }
        if !description.is_empty() {
            step.push(Record::Description { text: description });
        }
        step.push(Record::EndOfStep);

        let keep = ask(reader, "Keep this step? [Y/n] ")?.unwrap_or_default();
        if keep.is_empty() || is_yes(&keep) {
            records.extend(step);
            confirmed += 1;
        } else {
            writeln!(out, "Step discarded.")?;
        }
    }

    if confirmed == 0 {
        return Err(CompileError::NoSteps);
    }
    Ok(records)
}

fn ask_suggestion(reader: &mut dyn LineReader, out: &mut dyn Write) -> CompileResult<Option<Record>> {
    loop {
        let Some(answer) = ask(reader, "Add a suggestion? [c]md, [s]nippet, Enter to stop: ")? else {
            return Ok(None);
        };
        let kind = match answer.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "c" | "cmd" => SuggestionKind::Cmd,
            "s" | "snippet" => SuggestionKind::Snippet,
            other => {
                writeln!(out, "Unknown kind '{other}'.")?;
                continue;
            }
        };

        let note = ask(reader, "Note (optional): ")?.filter(|n| !n.is_empty());
        let label = if kind == SuggestionKind::Cmd { "Command" } else { "Snippet" };
        writeln!(out, "{label} (finish with a line holding a single '.'):")?;
        let body = read_text(reader)?;

        return Ok(Some(Record::Suggestion { kind, note, body }));
    }
}

/// Trimmed answer, `None` at end of input.
fn ask(reader: &mut dyn LineReader, prompt: &str) -> io::Result<Option<String>> {
    Ok(reader.read_line(prompt)?.map(|answer| answer.trim().to_string()))
}

/// Multi-line answer. An empty first line means no text.
fn read_text(reader: &mut dyn LineReader) -> io::Result<String> {
    let mut lines = Vec::new();
    while let Some(line) = reader.read_line("| ")? {
        if line == END_OF_TEXT || (lines.is_empty() && line.trim().is_empty()) {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}
