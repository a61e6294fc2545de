//! Snippet stash.
//!
//! One text blob per walkthrough, stored as a plain file so it can be opened
//! in the editor directly. Picking a snippet replaces it; `:snippet` commands
//! show, edit, clear or paste it.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::UserCommandError;
use crate::core::expand_path;

const PASTE_USAGE: &str = ":snippet paste <file> [append|overwrite]";
const OPEN_USAGE: &str = ":snippet open <file>";
const VERBS_USAGE: &str = ":snippet show|edit|clear|paste <file> [append|overwrite]|open <file>";

/// How pasted text reaches the target file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasteMode {
    #[default]
    Append,
    Overwrite,
}

impl fmt::Display for PasteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => f.write_str("append"),
            Self::Overwrite => f.write_str("overwrite"),
        }
    }
}

/// A parsed `:snippet` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetCommand {
    Show,
    Edit,
    Clear,
    Paste { file: PathBuf, mode: PasteMode },
    Open { file: PathBuf },
}

impl SnippetCommand {
    /// Parse the words following `:snippet`.
    pub fn parse(args: &str) -> Result<Self, UserCommandError> {
        let mut words = args.split_whitespace();
        let verb = words.next().unwrap_or_default();

        let command = match verb {
            "show" => Self::Show,
            "edit" => Self::Edit,
            "clear" => Self::Clear,
            "paste" => {
                let file = words.next().ok_or_else(|| usage(PASTE_USAGE))?;
                let mode = match words.next() {
                    None | Some("append" | "a") => PasteMode::Append,
                    Some("overwrite" | "o") => PasteMode::Overwrite,
                    Some(_) => return Err(usage(PASTE_USAGE)),
                };
                Self::Paste { file: expand_path(Path::new(file)), mode }
            }
            "open" => {
                let file = words.next().ok_or_else(|| usage(OPEN_USAGE))?;
                Self::Open { file: expand_path(Path::new(file)) }
            }
            _ => return Err(usage(VERBS_USAGE)),
        };

        if words.next().is_some() {
            return Err(usage(VERBS_USAGE));
        }
        Ok(command)
    }
}

fn usage(text: &str) -> UserCommandError {
    UserCommandError::SnippetUsage(text.to_string())
}

/// The persisted snippet buffer.
#[derive(Debug, Clone)]
pub struct SnippetStash {
    path: PathBuf,
}

impl SnippetStash {
    /// Stash stored at `path`. Nothing is created until the first write.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the stash file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents, empty when nothing was stashed yet.
    pub fn read(&self) -> io::Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// Check if the stash holds anything.
    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Replace the contents.
    pub fn replace(&self, content: &str) -> io::Result<()> {
        self.ensure_parent()?;
        fs::write(&self.path, content)
    }

    /// Empty the stash.
    pub fn clear(&self) -> io::Result<()> {
        self.replace("")
    }

    /// Make sure the file exists without touching existing contents.
    pub fn touch(&self) -> io::Result<()> {
        self.ensure_parent()?;
        OpenOptions::new().create(true).append(true).open(&self.path).map(drop)
    }

    /// Write the stash into `target`.
    pub fn paste_into(&self, target: &Path, mode: PasteMode) -> anyhow::Result<()> {
        let content = self.read()?;
        if content.is_empty() {
            return Err(UserCommandError::EmptyStash.into());
        }

        match mode {
            PasteMode::Overwrite => fs::write(target, &content)?,
            PasteMode::Append => {
                let mut file = OpenOptions::new().create(true).append(true).open(target)?;
                file.write_all(content.as_bytes())?;
            }
        }

        tracing::info!(target = ?target, mode = %mode, "Pasted snippet");
        Ok(())
    }

    fn ensure_parent(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_commands() {
        assert_eq!(SnippetCommand::parse("show"), Ok(SnippetCommand::Show));
        assert_eq!(SnippetCommand::parse(" edit "), Ok(SnippetCommand::Edit));
        assert_eq!(
            SnippetCommand::parse("paste out.txt"),
            Ok(SnippetCommand::Paste { file: PathBuf::from("out.txt"), mode: PasteMode::Append })
        );
        assert_eq!(
            SnippetCommand::parse("paste out.txt overwrite"),
            Ok(SnippetCommand::Paste { file: PathBuf::from("out.txt"), mode: PasteMode::Overwrite })
        );
        assert_eq!(
            SnippetCommand::parse("open notes.md"),
            Ok(SnippetCommand::Open { file: PathBuf::from("notes.md") })
        );
    }

    #[test]
    fn test_parse_usage_errors() {
        assert!(matches!(SnippetCommand::parse("paste"), Err(UserCommandError::SnippetUsage(_))));
        assert!(matches!(
            SnippetCommand::parse("paste f.txt sideways"),
            Err(UserCommandError::SnippetUsage(_))
        ));
        assert!(matches!(SnippetCommand::parse("open"), Err(UserCommandError::SnippetUsage(_))));
        assert!(matches!(SnippetCommand::parse(""), Err(UserCommandError::SnippetUsage(_))));
        assert!(matches!(SnippetCommand::parse("frobnicate"), Err(UserCommandError::SnippetUsage(_))));
    }

    #[test]
    fn test_missing_stash_reads_empty() {
        let dir = tempdir().unwrap();
        let stash = SnippetStash::new(dir.path().join("state").join("snippet.txt"));
        assert!(stash.is_empty().unwrap());
        assert_eq!(stash.read().unwrap(), "");
    }

    #[test]
    fn test_replace_is_wholesale() {
        let dir = tempdir().unwrap();
        let stash = SnippetStash::new(dir.path().join("state").join("snippet.txt"));

        stash.replace("first\nversion").unwrap();
        stash.replace("X").unwrap();
        assert_eq!(stash.read().unwrap(), "X");

        stash.clear().unwrap();
        assert!(stash.is_empty().unwrap());
    }

    #[test]
    fn test_touch_keeps_contents() {
        let dir = tempdir().unwrap();
        let stash = SnippetStash::new(dir.path().join("snippet.txt"));
        stash.replace("keep").unwrap();
        stash.touch().unwrap();
        assert_eq!(stash.read().unwrap(), "keep");
    }

    #[test]
    fn test_paste_overwrite_then_append() {
        let dir = tempdir().unwrap();
        let stash = SnippetStash::new(dir.path().join("snippet.txt"));
        let target = dir.path().join("f.txt");
        fs::write(&target, "old contents").unwrap();

        stash.replace("X").unwrap();
        stash.paste_into(&target, PasteMode::Overwrite).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "X");

        stash.paste_into(&target, PasteMode::Append).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "XX");
    }

    #[test]
    fn test_paste_empty_stash_fails() {
        let dir = tempdir().unwrap();
        let stash = SnippetStash::new(dir.path().join("snippet.txt"));
        let target = dir.path().join("f.txt");

        let err = stash.paste_into(&target, PasteMode::Append).unwrap_err();
        assert_eq!(err.downcast_ref::<UserCommandError>(), Some(&UserCommandError::EmptyStash));
        assert!(!target.exists());
    }
}
