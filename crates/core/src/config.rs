//! Application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ::config::{Config, Environment, File, FileFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::save::FileStore;

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "banker";

/// Prefix for environment overrides, e.g. `BANKER_AUTOSAVE=true`.
pub const ENV_PREFIX: &str = "BANKER";

const DEFAULT_CONFIG: &str = r#"# Board-game banker settings.

# Where the session is saved. Defaults to <config dir>/banker/session.json.
# save_file = "/path/to/session.json"

# Save after every action, undo and redo.
autosave = false

# Prefix shown in front of amounts.
currency = "Rs."

# Entries kept in the activity feed.
activity_capacity = 50

# Choices offered by the build form.
building_types = ["1 House", "2 Houses", "3 Houses", "4 Houses", "Hotel"]

# Log file directory (relative to the working directory) and default filter.
log_dir = "logs"
log_filter = "info"
"#;

/// Settings read from `config.toml` and `BANKER_*` variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Saved session location.
    pub save_file: PathBuf,
    /// Persist after every successful change.
    pub autosave: bool,
    /// Display prefix for amounts.
    pub currency: String,
    /// Maximum entries in the activity feed.
    pub activity_capacity: usize,
    /// Building labels offered by the build form.
    pub building_types: Vec<String>,
    /// Directory receiving `banker.log`.
    pub log_dir: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            save_file: FileStore::default_path(),
            autosave: false,
            currency: "Rs.".to_string(),
            activity_capacity: 50,
            building_types: ["1 House", "2 Houses", "3 Houses", "4 Houses", "Hotel"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            log_dir: PathBuf::from("logs"),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default config file plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from `path` (which may be missing) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Store used for saving and loading the session.
    pub fn store(&self) -> FileStore {
        FileStore::new(self.save_file.clone())
    }

    fn normalized(mut self) -> Self {
        self.activity_capacity = self.activity_capacity.max(1);
        self.building_types.retain(|label| !label.trim().is_empty());
        if self.building_types.is_empty() {
            self.building_types = AppConfig::default().building_types;
        }
        self
    }
}

/// Path of `config.toml` under the user's config directory.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write the default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(config_path()).map(|_| ())
}

/// Write the default config to `path` unless it exists. Returns whether a
/// file was written.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    Ok(true)
}
