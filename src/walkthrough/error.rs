//! Errors reported inline during a walkthrough session.

use thiserror::Error;

/// Mistakes in what the user typed. The session reports them and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserCommandError {
    /// Pick number outside of the current step's suggestions.
    #[error("No suggestion {number} on this step (valid: {})", valid_range(*.max))]
    InvalidPick { number: usize, max: usize },

    /// Step number outside of the walkthrough.
    #[error("No step {number} (valid: {})", valid_range(*.max))]
    InvalidStep { number: usize, max: usize },

    /// A number was expected.
    #[error("'{value}' is not a number")]
    InvalidNumber { value: String },

    /// A navigation command without its number.
    #[error("Usage: {command} <number>")]
    MissingNumber { command: String },

    /// Malformed `:snippet` command.
    #[error("Usage: {0}")]
    SnippetUsage(String),

    /// The stash holds nothing to paste.
    #[error("The snippet stash is empty")]
    EmptyStash,

    /// The snippet markers were removed in the editor.
    #[error("Snippet markers were removed, the stash was left unchanged")]
    MissingMarkers,
}

fn valid_range(max: usize) -> String {
    match max {
        0 => "none".to_string(),
        1 => "1".to_string(),
        n => format!("1-{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            UserCommandError::InvalidPick { number: 4, max: 3 }.to_string(),
            "No suggestion 4 on this step (valid: 1-3)"
        );
        assert_eq!(
            UserCommandError::InvalidPick { number: 1, max: 0 }.to_string(),
            "No suggestion 1 on this step (valid: none)"
        );
        assert_eq!(UserCommandError::InvalidStep { number: 9, max: 1 }.to_string(), "No step 9 (valid: 1)");
    }
}
