//! Persisted validator configuration
//!
//! [`ValidatorConfig`] is the TOML document holding the autorun flag, the
//! batching priority and every filter toggle. Persistence goes through a
//! [`ConfigStore`] so hosts can keep it wherever they like.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vigil_diagnostics::FilterSettings;
use vigil_traverse::{BatchSize, BatchingPriority};

use crate::error::{EngineError, Result};

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Run background scans on ticks
    pub autorun: bool,

    /// Batching priority for background scans
    pub batching: BatchingPriority,

    /// Filter toggles
    pub filters: FilterSettings,
}

impl ValidatorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set autorun
    #[inline]
    #[must_use]
    pub fn with_autorun(mut self, autorun: bool) -> Self {
        self.autorun = autorun;
        self
    }

    /// Set background batching priority
    #[inline]
    #[must_use]
    pub fn with_batching(mut self, batching: BatchingPriority) -> Self {
        self.batching = batching;
        self
    }

    /// Set filter toggles
    #[inline]
    #[must_use]
    pub fn with_filters(mut self, filters: FilterSettings) -> Self {
        self.filters = filters;
        self
    }

    /// Batch size for background scans
    #[inline]
    #[must_use]
    pub fn batch_size(&self) -> BatchSize {
        self.batching.batch_size()
    }

    /// Parse from TOML text; severity toggles are always present afterwards
    ///
    /// # Errors
    /// Returns [`EngineError::ConfigParse`] on malformed input
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text)?;
        config.filters.register_severities();
        Ok(config)
    }

    /// Render as TOML text
    ///
    /// # Errors
    /// Returns [`EngineError::ConfigSerialize`] if serialization fails
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            autorun: true,
            batching: BatchingPriority::default(),
            filters: FilterSettings::new(),
        }
    }
}

/// Load/save seam for [`ValidatorConfig`]
pub trait ConfigStore {
    /// Load configuration
    ///
    /// # Errors
    /// Fails if stored data cannot be read or parsed
    fn load(&self) -> Result<ValidatorConfig>;

    /// Persist configuration
    ///
    /// # Errors
    /// Fails if data cannot be written
    fn save(&self, config: &ValidatorConfig) -> Result<()>;
}

/// Configuration kept in a TOML file; a missing file yields defaults
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    /// Store at the given path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for TomlFileStore {
    fn load(&self) -> Result<ValidatorConfig> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                debug!(path = %self.path.display(), "configuration loaded");
                ValidatorConfig::from_toml(&text)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no configuration file, using defaults");
                Ok(ValidatorConfig::default())
            }
            Err(err) => Err(EngineError::io(&self.path, err)),
        }
    }

    fn save(&self, config: &ValidatorConfig) -> Result<()> {
        let text = config.to_toml()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        }
        std::fs::write(&self.path, text).map_err(|e| EngineError::io(&self.path, e))?;
        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }
}

/// In-memory store for hosts without persistent storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<ValidatorConfig>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<ValidatorConfig> {
        Ok(self.saved.lock().clone().unwrap_or_default())
    }

    fn save(&self, config: &ValidatorConfig) -> Result<()> {
        *self.saved.lock() = Some(config.clone());
        Ok(())
    }
}
