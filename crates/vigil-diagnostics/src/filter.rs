//! Filtered views over record lists
//!
//! A [`FilterPipeline`] is an ordered list of named, pure predicates. A record
//! is kept when every predicate accepts it. Order never changes the result but
//! is fixed so tests and debugging output stay deterministic.

use crate::record::DiagnosticRecord;
use crate::settings::FilterSettings;
use std::fmt;
use std::sync::Arc;

/// Predicate over a record
pub type RecordPredicate = Arc<dyn Fn(&DiagnosticRecord) -> bool + Send + Sync>;

/// Name of the module-enabled filter
pub const MODULE_FILTER: &str = "module";
/// Name of the severity-enabled filter
pub const SEVERITY_FILTER: &str = "severity";
/// Name of the scene filter
pub const SCENE_FILTER: &str = "scene";
/// Name of the asset path filter
pub const ASSET_PATH_FILTER: &str = "asset_path";

/// Ordered predicate pipeline
#[derive(Clone, Default)]
pub struct FilterPipeline {
    filters: Vec<(String, RecordPredicate)>,
}

impl FilterPipeline {
    /// Create empty pipeline (accepts everything)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default pipeline: module filter, then severity filter
    #[must_use]
    pub fn from_settings(settings: &FilterSettings) -> Self {
        Self::new()
            .with_module_filter(settings)
            .with_severity_filter(settings)
    }

    /// Append a named predicate
    #[must_use]
    pub fn with(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&DiagnosticRecord) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filters.push((name.into(), Arc::new(predicate)));
        self
    }

    /// Keep records whose module is enabled
    #[must_use]
    pub fn with_module_filter(self, settings: &FilterSettings) -> Self {
        let settings = settings.clone();
        self.with(MODULE_FILTER, move |r| {
            settings.module_enabled(r.module().as_str())
        })
    }

    /// Keep records whose severity is enabled
    #[must_use]
    pub fn with_severity_filter(self, settings: &FilterSettings) -> Self {
        let settings = settings.clone();
        self.with(SEVERITY_FILTER, move |r| {
            settings.severity_enabled(r.severity())
        })
    }

    /// Keep records of enabled scenes and records without a group
    #[must_use]
    pub fn with_scene_filter(self, settings: &FilterSettings) -> Self {
        let scenes = settings.scenes.clone();
        self.with(SCENE_FILTER, move |r| {
            r.group().is_empty() || scenes.get(r.group()).copied().unwrap_or(false)
        })
    }

    /// Keep records under an enabled asset path prefix and records without a group
    #[must_use]
    pub fn with_asset_path_filter(self, settings: &FilterSettings) -> Self {
        let prefixes: Vec<String> = settings
            .enabled_asset_paths()
            .map(str::to_string)
            .collect();
        self.with(ASSET_PATH_FILTER, move |r| {
            r.group().is_empty() || prefixes.iter().any(|p| r.group().contains(p.as_str()))
        })
    }

    /// Check if every predicate accepts the record
    #[must_use]
    pub fn accepts(&self, record: &DiagnosticRecord) -> bool {
        self.filters.iter().all(|(_, p)| p(record))
    }

    /// Records accepted by every predicate, in input order
    #[must_use]
    pub fn apply<'r>(&self, records: &'r [DiagnosticRecord]) -> Vec<&'r DiagnosticRecord> {
        records.iter().filter(|r| self.accepts(r)).collect()
    }

    /// Predicate names in evaluation order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of predicates
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if pipeline has no predicates
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("filters", &self.names())
            .finish()
    }
}
