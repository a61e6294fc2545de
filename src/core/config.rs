//! Configuration management for walkbook.
//!
//! Settings come from an optional TOML file and are then overlaid with
//! environment variables, which always win.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::history::DEFAULT_MAX_HISTORY;

/// Editor used when nothing else is configured.
pub const DEFAULT_EDITOR: &str = "vi";

/// Shell used when nothing else is configured.
pub const DEFAULT_SHELL: &str = "sh";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Editor settings
    pub editor: EditorConfig,

    /// Display settings
    pub ui: UiConfig,

    /// Scratch and state locations
    pub paths: PathsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Maximum number of history entries to keep
    pub max_history: usize,

    /// Shell used to run commands
    pub shell: Option<String>,
}

/// Editor settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Editor command line (e.g. "code --wait")
    pub program: Option<String>,
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Suggestions per page; derived from the terminal height when unset
    pub page_size: Option<usize>,

    /// Whether to use colors
    pub color: bool,
}

/// File system locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for the files opened in the editor
    pub scratch_dir: Option<PathBuf>,

    /// Root of the per-walkthrough history and snippet stash
    pub state_dir: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { max_history: DEFAULT_MAX_HISTORY, shell: None }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { page_size: None, color: true }
    }
}

impl Config {
    /// Load configuration from the default location, then apply the
    /// environment.
    ///
    /// Looks for config in:
    /// 1. `.walkbook.toml` in current directory
    /// 2. `~/.config/walkbook/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> anyhow::Result<Self> {
        // Try local config first
        let local_config = PathBuf::from(".walkbook.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(path) = Self::config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = ?path, "Loaded configuration");
        Ok(config)
    }

    /// Overlay settings taken from environment variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.editor.program.is_none() {
            self.editor.program = var("VISUAL").or_else(|| var("EDITOR"));
        }
        if let Some(shell) = var("WALKBOOK_SHELL") {
            self.general.shell = Some(shell);
        }
        if let Some(dir) = var("WALKBOOK_TMPDIR") {
            self.paths.scratch_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = var("WALKBOOK_STATE_DIR") {
            self.paths.state_dir = Some(PathBuf::from(dir));
        }
        if let Some(size) = var("WALKBOOK_PAGE_SIZE") {
            match size.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.ui.page_size = Some(n),
                _ => tracing::warn!(value = size, "Ignoring invalid WALKBOOK_PAGE_SIZE"),
            }
        }
        if let Some(size) = var("WALKBOOK_HISTORY_SIZE") {
            match size.trim().parse::<usize>() {
                Ok(n) => self.general.max_history = n,
                Err(_) => tracing::warn!(value = size, "Ignoring invalid WALKBOOK_HISTORY_SIZE"),
            }
        }
        if lookup("NO_COLOR").is_some() {
            self.ui.color = false;
        }
    }

    /// Path of the user configuration file.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Get the configuration directory.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("walkbook"))
    }

    /// Editor command line.
    pub fn editor_program(&self) -> String {
        self.editor.program.clone().unwrap_or_else(|| DEFAULT_EDITOR.to_string())
    }

    /// Shell program.
    pub fn shell(&self) -> String {
        self.general.shell.clone().unwrap_or_else(|| DEFAULT_SHELL.to_string())
    }

    /// Directory for scratch files.
    pub fn scratch_dir(&self) -> PathBuf {
        self.paths.scratch_dir.as_deref().map_or_else(std::env::temp_dir, expand_path)
    }

    /// Root directory of persistent state.
    pub fn state_root(&self) -> PathBuf {
        if let Some(dir) = self.paths.state_dir.as_deref() {
            return expand_path(dir);
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("walkbook")
    }

    /// State directory of one generated walkthrough.
    pub fn state_dir_for(&self, identity: &str) -> PathBuf {
        self.state_root().join(identity)
    }
}

/// Expand a leading `~` in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(text.as_ref()).into_owned())
}
