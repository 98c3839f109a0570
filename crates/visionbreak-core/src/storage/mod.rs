mod config;

pub use config::{clamp_interval, Settings, SettingsPatch};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

/// Returns `~/.config/visionbreak[-dev]/` based on VISIONBREAK_ENV.
///
/// Set VISIONBREAK_ENV=dev to use the development data directory, or
/// VISIONBREAK_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("VISIONBREAK_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("VISIONBREAK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("visionbreak-dev")
            } else {
                base_dir.join("visionbreak")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Get/update contract for durable settings.
///
/// Implementors only provide a snapshot and a wholesale replace; merges and
/// dot-path edits are built on top.
pub trait SettingsStore: Send {
    /// Current full snapshot.
    fn get(&self) -> Settings;

    /// Persist `settings` and return the stored snapshot.
    fn replace(&mut self, settings: Settings) -> Result<Settings>;

    /// Shallow-merge `patch` and return the new full snapshot.
    fn update(&mut self, patch: SettingsPatch) -> Result<Settings> {
        let mut settings = self.get();
        settings.merge(patch)?;
        self.replace(settings)
    }

    /// Set a single dot-path key.
    fn set_key(&mut self, key: &str, value: &str) -> Result<Settings> {
        let mut settings = self.get();
        settings.set_key(key, value)?;
        self.replace(settings)
    }
}

/// Settings kept only in memory. Used by tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    settings: Settings,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self) -> Settings {
        self.settings.clone()
    }

    fn replace(&mut self, settings: Settings) -> Result<Settings> {
        self.settings = settings;
        Ok(self.settings.clone())
    }
}

/// Settings persisted as TOML on disk.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl FileSettingsStore {
    /// Open `config.toml` in the default data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(data_dir()?.join("config.toml"))
    }

    /// Load from `path`, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// defaults cannot be written.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let settings: Settings =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                debug!(path = %path.display(), "loaded settings");
                Ok(Self { path, settings })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Settings::default();
                save(&path, &settings)?;
                info!(path = %path.display(), "created default settings");
                Ok(Self { path, settings })
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }
            .into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore defaults and persist them.
    pub fn reset(&mut self) -> Result<Settings> {
        self.replace(Settings::default())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self) -> Settings {
        self.settings.clone()
    }

    fn replace(&mut self, settings: Settings) -> Result<Settings> {
        save(&self.path, &settings)?;
        self.settings = settings;
        Ok(self.settings.clone())
    }
}

fn save(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let save_failed = |message: String| ConfigError::SaveFailed {
        path: path.to_path_buf(),
        message,
    };
    let content = toml::to_string_pretty(settings).map_err(|e| save_failed(e.to_string()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
    }
    std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
}
