//! Command history.
//!
//! Keeps an append-only log of the commands a walkthrough executed, bounded
//! to a configurable number of entries and persisted as JSON.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Suffix of the copy kept when a history file cannot be read.
pub const BACKUP_SUFFIX: &str = "bak";

/// Default number of history entries kept.
pub const DEFAULT_MAX_HISTORY: usize = 500;

/// History manager.
#[derive(Debug)]
pub struct HistoryManager {
    /// Path to the history file
    history_path: PathBuf,
    /// Command history data
    history: CommandHistory,
    /// Maximum number of history entries to keep
    max_entries: usize,
}

/// Stored command history data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandHistory {
    /// Entries, oldest first
    pub entries: VecDeque<HistoryEntry>,
    /// Version for future migrations
    #[serde(default)]
    pub version: u32,
}

/// A single executed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Command text as executed
    pub command: String,
    /// Step the command was run from, if any
    pub step: Option<usize>,
    /// Execution timestamp (Unix epoch seconds)
    pub recorded_at: i64,
}

impl HistoryManager {
    /// Open the history stored at `path`, keeping at most `max_entries`.
    ///
    /// A missing file starts an empty history. An unreadable one is moved
    /// aside to `<path>.bak` first so the next save does not overwrite it.
    pub fn with_path(path: PathBuf, max_entries: usize) -> Self {
        let history = match Self::load_history(&path) {
            Ok(history) => history,
            Err(e) => {
                let backup = backup_path(&path);
                match fs::rename(&path, &backup) {
                    Ok(()) => tracing::warn!(path = ?path, backup = ?backup, error = %e, "Moved unreadable history file aside"),
                    Err(rename_error) => {
                        tracing::warn!(path = ?path, error = %e, rename_error = %rename_error, "Ignoring unreadable history file");
                    }
                }
                CommandHistory::default()
            }
        };

        let mut manager = Self { history_path: path, history, max_entries: max_entries.max(1) };
        manager.prune_old_entries();
        manager
    }

    /// Load history from file.
    fn load_history(path: &Path) -> anyhow::Result<CommandHistory> {
        if !path.exists() {
            return Ok(CommandHistory::default());
        }

        let content = fs::read_to_string(path)?;
        let history: CommandHistory = serde_json::from_str(&content)?;
        Ok(history)
    }

    /// Save history to file.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(&self.history)?;

        // Ensure parent directory exists
        if let Some(parent) = self.history_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.history_path, content)?;
        Ok(())
    }

    /// Append an executed command.
    pub fn record(&mut self, command: &str, step: Option<usize>) {
        self.history.entries.push_back(HistoryEntry {
            command: command.to_string(),
            step,
            recorded_at: chrono::Utc::now().timestamp(),
        });
        self.prune_old_entries();
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.entries.iter()
    }

    /// Command texts, oldest first.
    pub fn commands(&self) -> Vec<String> {
        self.history.entries.iter().map(|e| e.command.clone()).collect()
    }

    /// Path of the history file.
    pub fn path(&self) -> &Path {
        &self.history_path
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.history.entries.len()
    }

    /// Check if history has any entries.
    pub fn is_empty(&self) -> bool {
        self.history.entries.is_empty()
    }

    /// Drop the oldest entries beyond `max_entries`.
    fn prune_old_entries(&mut self) {
        while self.history.entries.len() > self.max_entries {
            self.history.entries.pop_front();
        }
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_and_retrieve() {
        let dir = tempdir().unwrap();
        let mut manager = HistoryManager::with_path(dir.path().join("history.json"), 10);

        assert!(manager.is_empty());
        manager.record("make build", Some(1));
        manager.record("make test", None);

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.commands(), vec!["make build", "make test"]);
        assert_eq!(manager.entries().next().unwrap().step, Some(1));
    }

    #[test]
    fn test_bounded_drops_oldest() {
        let dir = tempdir().unwrap();
        let mut manager = HistoryManager::with_path(dir.path().join("history.json"), 2);

        manager.record("one", None);
        manager.record("two", None);
        manager.record("three", None);

        assert_eq!(manager.commands(), vec!["two", "three"]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        // Create and save
        {
            let mut manager = HistoryManager::with_path(path.clone(), 10);
            manager.record("echo hi", Some(2));
            manager.save().unwrap();
        }

        // Load and verify
        {
            let manager = HistoryManager::with_path(path, 10);
            assert_eq!(manager.len(), 1);
            let entry = manager.entries().next().unwrap();
            assert_eq!(entry.command, "echo hi");
            assert_eq!(entry.step, Some(2));
        }
    }

    #[test]
    fn test_smaller_limit_prunes_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut manager = HistoryManager::with_path(path.clone(), 10);
        for i in 0..5 {
            manager.record(&format!("cmd {i}"), None);
        }
        manager.save().unwrap();

        let manager = HistoryManager::with_path(path, 3);
        assert_eq!(manager.commands(), vec!["cmd 2", "cmd 3", "cmd 4"]);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json").unwrap();

        let mut manager = HistoryManager::with_path(path.clone(), 10);
        assert!(manager.is_empty());

        manager.record("ls", None);
        manager.save().unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("history.json.bak")).unwrap(), "not json");
        assert_eq!(HistoryManager::with_path(path, 10).commands(), vec!["ls"]);
    }
}
