//! Persisted filter toggles

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vigil_model::Severity;

/// Boolean filter toggles keyed by module, scene, asset path and severity
///
/// Keys that were never registered read as enabled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Module id → shown
    pub modules: IndexMap<String, bool>,

    /// Exact origin-group (scene) name → shown
    pub scenes: IndexMap<String, bool>,

    /// Tracked asset path prefix → shown
    pub asset_paths: IndexMap<String, bool>,

    /// Severity name → shown
    pub severities: IndexMap<String, bool>,
}

impl FilterSettings {
    /// Create settings with every severity registered and enabled
    #[must_use]
    pub fn new() -> Self {
        let mut settings = Self::default();
        settings.register_severities();
        settings
    }

    /// Add any missing severity keys as enabled
    pub fn register_severities(&mut self) {
        for severity in Severity::ALL {
            self.severities
                .entry(severity.as_str().to_string())
                .or_insert(true);
        }
    }

    /// Add module key as enabled unless already present
    pub fn register_module(&mut self, module: &str) {
        self.modules.entry(module.to_string()).or_insert(true);
    }

    /// Add scene key as enabled unless already present
    pub fn register_scene(&mut self, scene: &str) {
        self.scenes.entry(scene.to_string()).or_insert(true);
    }

    /// Track an asset path prefix (enabled unless already present)
    pub fn add_asset_path(&mut self, prefix: &str) {
        self.asset_paths.entry(prefix.to_string()).or_insert(true);
    }

    /// Stop tracking an asset path prefix
    pub fn remove_asset_path(&mut self, prefix: &str) -> bool {
        self.asset_paths.shift_remove(prefix).is_some()
    }

    /// Check if records of a module are shown
    #[inline]
    #[must_use]
    pub fn module_enabled(&self, module: &str) -> bool {
        self.modules.get(module).copied().unwrap_or(true)
    }

    /// Check if records of a scene are shown
    #[inline]
    #[must_use]
    pub fn scene_enabled(&self, scene: &str) -> bool {
        self.scenes.get(scene).copied().unwrap_or(true)
    }

    /// Check if records of a severity are shown
    #[inline]
    #[must_use]
    pub fn severity_enabled(&self, severity: Severity) -> bool {
        self.severities
            .get(severity.as_str())
            .copied()
            .unwrap_or(true)
    }

    /// Toggle a module
    pub fn set_module(&mut self, module: &str, enabled: bool) {
        self.modules.insert(module.to_string(), enabled);
    }

    /// Toggle a scene
    pub fn set_scene(&mut self, scene: &str, enabled: bool) {
        self.scenes.insert(scene.to_string(), enabled);
    }

    /// Toggle a tracked asset path
    pub fn set_asset_path(&mut self, prefix: &str, enabled: bool) {
        self.asset_paths.insert(prefix.to_string(), enabled);
    }

    /// Toggle a severity
    pub fn set_severity(&mut self, severity: Severity, enabled: bool) {
        self.severities
            .insert(severity.as_str().to_string(), enabled);
    }

    /// Enabled asset path prefixes in order
    pub fn enabled_asset_paths(&self) -> impl Iterator<Item = &str> {
        self.asset_paths
            .iter()
            .filter(|(_, on)| **on)
            .map(|(p, _)| p.as_str())
    }
}
