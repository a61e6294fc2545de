//! Prompt input normalization.
//!
//! Every line typed at the walkthrough prompt resolves to one [`Action`].
//! Aliases collapse onto their canonical command; anything unrecognized is
//! an ad hoc shell command.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{SnippetCommand, UserCommandError};

/// Commands that take a number argument.
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(pick|goto_step|goto|g|page)(?:\s+(.*))?$").unwrap());

/// A bare number picks a suggestion.
static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

static SNIPPET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:snippet(?:\s+(.*))?$").unwrap());

/// A normalized prompt command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Home,
    ShowSuggestions,
    Flow,
    Help,
    Pick(usize),
    NextStep,
    GotoStep(usize),
    NextPage,
    PrevPage,
    Page(usize),
    Finish,
    Quit,
    Exit,
    Snippet(SnippetCommand),
    Shell(String),
    Nothing,
}

impl Action {
    /// Resolve one line of input.
    pub fn normalize(input: &str) -> Result<Self, UserCommandError> {
        let line = input.trim();

        let action = match line {
            "" => Self::Nothing,
            "home" | "h" | "?" => Self::Home,
            "show_suggestions" | "suggestions" | "s" => Self::ShowSuggestions,
            "flow" | "f" => Self::Flow,
            "help" => Self::Help,
            "next_step" | "next" | "ns" => Self::NextStep,
            "next_page" | "np" | "more" => Self::NextPage,
            "prev_page" | "pp" => Self::PrevPage,
            "finish" => Self::Finish,
            "quit" | "q" | ":q" | ":quit" => Self::Quit,
            "exit" | "x" => Self::Exit,
            _ => return Self::normalize_compound(line),
        };
        Ok(action)
    }

    fn normalize_compound(line: &str) -> Result<Self, UserCommandError> {
        if BARE_NUMBER.is_match(line) {
            return parse_number(line).map(Self::Pick);
        }

        if let Some(caps) = NUMBERED.captures(line) {
            let verb = &caps[1];
            let Some(arg) = caps.get(2).map(|m| m.as_str().trim()).filter(|a| !a.is_empty()) else {
                return Err(UserCommandError::MissingNumber { command: verb.to_string() });
            };
            let number = parse_number(arg)?;
            return Ok(match verb {
                "pick" => Self::Pick(number),
                "page" => Self::Page(number),
                _ => Self::GotoStep(number),
            });
        }

        if let Some(caps) = SNIPPET.captures(line) {
            let args = caps.get(1).map_or("", |m| m.as_str());
            return SnippetCommand::parse(args).map(Self::Snippet);
        }

        Ok(Self::Shell(line.to_string()))
    }
}

fn parse_number(value: &str) -> Result<usize, UserCommandError> {
    value.parse().map_err(|_| UserCommandError::InvalidNumber { value: value.to_string() })
}
