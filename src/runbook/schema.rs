//! Runbook schema definitions.
//!
//! Defines the intermediate record stream produced by the compiler and the
//! wizard, and the step/suggestion tables the walkthrough runs from.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// One record of the intermediate representation.
///
/// A step's suggestions always sit between its `Step` and `EndOfStep`
/// records, in presentation order. A description, when present, is flushed
/// right before `EndOfStep`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Record {
    /// Opens a step with the given title.
    Step { title: String },

    /// Description of the currently open step.
    Description { text: String },

    /// One suggestion of the currently open step.
    Suggestion { kind: SuggestionKind, note: Option<String>, body: String },

    /// Closes the currently open step.
    EndOfStep,
}

/// Kind of a suggestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// A command that is edited then executed.
    #[default]
    Cmd,

    /// A text snippet that is edited then stashed.
    Snippet,
}

impl SuggestionKind {
    /// Parse a kind name, falling back to `Cmd` for anything unrecognized.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "snippet" => Self::Snippet,
            "cmd" | "command" => Self::Cmd,
            other => {
                tracing::debug!(kind = other, "Unrecognized suggestion kind, using cmd");
                Self::Cmd
            }
        }
    }

    /// Short label used when rendering.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cmd => "cmd",
            Self::Snippet => "snippet",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Completion status of a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Todo,
    Done,
}

/// A step of the walkthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Single-line title
    pub title: String,

    /// Optional multi-line description, rendered verbatim
    pub description: Option<String>,

    /// Completion status
    #[serde(default)]
    pub status: StepStatus,

    /// Offset of the first suggestion in the global table
    pub start: usize,

    /// Number of suggestions owned by this step
    pub len: usize,
}

impl Step {
    /// Range of this step's suggestions in the global table.
    pub fn suggestion_range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Whether the step has been marked done.
    pub fn is_done(&self) -> bool {
        self.status == StepStatus::Done
    }
}

/// An actionable item of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub note: Option<String>,
    pub body: String,
}

/// Runtime data model: the step table and the global suggestion table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runbook {
    /// Steps in presentation order
    pub steps: Vec<Step>,

    /// Suggestions of every step, each step owning a contiguous slice
    pub suggestions: Vec<Suggestion>,
}

impl Runbook {
    /// Get the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get a step by its 1-based index.
    pub fn step(&self, index: usize) -> Option<&Step> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// Suggestions owned by the step with the given 1-based index.
    pub fn suggestions_of(&self, index: usize) -> &[Suggestion] {
        self.step(index).map_or(&[], |step| &self.suggestions[step.suggestion_range()])
    }

    /// Mark the step with the given 1-based index as done.
    pub fn mark_done(&mut self, index: usize) {
        if let Some(step) = index.checked_sub(1).and_then(|i| self.steps.get_mut(i)) {
            step.status = StepStatus::Done;
        }
    }

    /// 1-based indices of the steps that are not done yet.
    pub fn pending_steps(&self) -> Vec<usize> {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, step)| !step.is_done())
            .map(|(i, _)| i + 1)
            .collect()
    }
}
