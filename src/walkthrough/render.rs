//! Walkthrough output.
//!
//! Everything the session prints goes through [`Renderer`], which styles it
//! with crossterm when colour is enabled and prints plain text otherwise.

use std::io::{self, Write};

use crossterm::style::{style, StyledContent, Stylize};

use super::Pager;
use crate::core::{ExecutionResult, Outcome};
use crate::runbook::{Runbook, Step, SuggestionKind};

const HELP: &[(&str, &str)] = &[
    ("<n>, pick <n>", "edit and run (or stash) suggestion n"),
    ("h, ?, home", "show the step again from page 1"),
    ("s, suggestions", "list the current page of suggestions"),
    ("np, more / pp", "next / previous page"),
    ("page <n>", "jump to page n"),
    ("f, flow", "show all steps and their status"),
    ("ns, next", "mark this step done and move on"),
    ("g, goto <n>", "jump to step n"),
    ("finish", "end the walkthrough"),
    ("x, exit", "leave this prompt"),
    ("q, quit", "quit immediately"),
    (":snippet show|edit|clear", "inspect the snippet stash"),
    (":snippet paste <file> [append|overwrite]", "write the stash into a file"),
    (":snippet open <file>", "paste the stash if wanted, then edit the file"),
    ("anything else", "run it in the shell"),
];

/// Writes session output, optionally coloured.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, apply: fn(StyledContent<String>) -> StyledContent<String>) -> String {
        if self.color {
            apply(style(text.to_string())).to_string()
        } else {
            text.to_string()
        }
    }

    /// Title line and description of a step.
    pub fn step_header(&self, out: &mut dyn Write, index: usize, total: usize, step: &Step) -> io::Result<()> {
        writeln!(out)?;
        let title = format!("== Step {index}/{total}: {} ==", step.title);
        writeln!(out, "{}", self.paint(&title, |s| s.bold().cyan()))?;
        if let Some(description) = &step.description {
            writeln!(out, "{description}")?;
        }
        Ok(())
    }

    /// Overview of every step with its status and a pointer at `current`.
    pub fn flow(&self, out: &mut dyn Write, runbook: &Runbook, current: usize) -> io::Result<()> {
        writeln!(out, "{}", self.paint("Flow:", |s| s.bold()))?;
        for (i, step) in runbook.steps.iter().enumerate() {
            let index = i + 1;
            let pointer = if index == current { self.paint(">", |s| s.yellow().bold()) } else { " ".to_string() };
            let marker = if step.is_done() { self.paint("[x]", |s| s.green()) } else { "[ ]".to_string() };
            writeln!(out, "{pointer} {marker} {index}. {}", step.title)?;
        }
        Ok(())
    }

    /// One page of a step's suggestions, numbered across the whole step.
    pub fn suggestions(
        &self,
        out: &mut dyn Write,
        runbook: &Runbook,
        index: usize,
        pager: &Pager,
        page: usize,
    ) -> io::Result<()> {
        let suggestions = runbook.suggestions_of(index);
        if suggestions.is_empty() {
            writeln!(out, "Suggestions: (none defined)")?;
            return Ok(());
        }

        let page = pager.clamp(page, suggestions.len());
        writeln!(
            out,
            "{} (page {page}/{}):",
            self.paint("Suggestions", |s| s.bold()),
            pager.max_page(suggestions.len())
        )?;

        for offset in pager.visible(page, suggestions.len()) {
            let suggestion = &suggestions[offset];
            let number = self.paint(&format!("[{}]", offset + 1), |s| s.bold().yellow());
            let kind = match suggestion.kind {
                SuggestionKind::Cmd => "(cmd)".to_string(),
                SuggestionKind::Snippet => self.paint("(snippet)", |s| s.magenta()),
            };
            match &suggestion.note {
                Some(note) => writeln!(out, "  {number} {kind} {note}")?,
                None => writeln!(out, "  {number} {kind}")?,
            }
            for line in suggestion.body.lines() {
                writeln!(out, "      {}", self.paint(line, |s| s.dark_grey()))?;
            }
        }
        Ok(())
    }

    /// Command reference.
    pub fn help(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint("Commands:", |s| s.bold()))?;
        let width = HELP.iter().map(|(command, _)| command.len()).max().unwrap_or(0);
        for (command, meaning) in HELP {
            writeln!(out, "  {command:<width$}  {meaning}")?;
        }
        Ok(())
    }

    /// One-line reminder printed before the first prompt of a step.
    pub fn hint(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint("Pick a number, 'ns' for the next step, 'help' for all commands.", |s| s.dark_grey()))
    }

    /// Classified exit status of a child process.
    pub fn outcome(&self, out: &mut dyn Write, result: &ExecutionResult) -> io::Result<()> {
        let text = format!("exit code {} ({})", result.code, result.outcome());
        let painted = match result.outcome() {
            Outcome::Ok => self.paint(&text, |s| s.green()),
            Outcome::Interrupted => self.paint(&text, |s| s.yellow()),
            Outcome::Error => self.paint(&text, |s| s.red()),
        };
        writeln!(out, "{painted}")
    }

    pub fn error(&self, out: &mut dyn Write, message: &str) -> io::Result<()> {
        writeln!(out, "{} {message}", self.paint("error:", |s| s.red().bold()))
    }

    pub fn warning(&self, out: &mut dyn Write, message: &str) -> io::Result<()> {
        writeln!(out, "{} {message}", self.paint("warning:", |s| s.yellow().bold()))
    }

    pub fn notice(&self, out: &mut dyn Write, message: &str) -> io::Result<()> {
        writeln!(out, "{message}")
    }
}
