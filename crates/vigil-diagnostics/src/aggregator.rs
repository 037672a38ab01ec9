//! Counters derived from the current record list

use crate::filter::FilterPipeline;
use crate::record::{DiagnosticRecord, ModuleId};
use indexmap::IndexMap;
use serde::Serialize;
use vigil_model::Severity;

/// Record counts by severity, origin group and module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticCounters {
    total: usize,
    infos: usize,
    warnings: usize,
    errors: usize,
    by_scene: IndexMap<String, usize>,
    by_asset_path: IndexMap<String, usize>,
    by_module: IndexMap<ModuleId, usize>,
}

impl DiagnosticCounters {
    /// Count of records with the given severity
    #[inline]
    #[must_use]
    pub fn severity(&self, severity: Severity) -> usize {
        match severity {
            Severity::Info => self.infos,
            Severity::Warning => self.warnings,
            Severity::Error => self.errors,
        }
    }

    /// Total records counted
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Count for a tracked scene (0 when untracked)
    #[inline]
    #[must_use]
    pub fn scene(&self, scene: &str) -> usize {
        self.by_scene.get(scene).copied().unwrap_or(0)
    }

    /// Count for a tracked asset path prefix (0 when untracked)
    #[inline]
    #[must_use]
    pub fn asset_path(&self, prefix: &str) -> usize {
        self.by_asset_path.get(prefix).copied().unwrap_or(0)
    }

    /// Count for a module (0 when it produced nothing)
    #[inline]
    #[must_use]
    pub fn module(&self, module: &ModuleId) -> usize {
        self.by_module.get(module).copied().unwrap_or(0)
    }

    /// Scene counts in tracking order
    #[inline]
    #[must_use]
    pub fn scenes(&self) -> &IndexMap<String, usize> {
        &self.by_scene
    }

    /// Asset path counts in tracking order
    #[inline]
    #[must_use]
    pub fn asset_paths(&self) -> &IndexMap<String, usize> {
        &self.by_asset_path
    }

    /// Module counts
    #[inline]
    #[must_use]
    pub fn modules(&self) -> &IndexMap<ModuleId, usize> {
        &self.by_module
    }

    fn zero(&mut self) {
        self.total = 0;
        self.infos = 0;
        self.warnings = 0;
        self.errors = 0;
        self.by_scene.values_mut().for_each(|n| *n = 0);
        self.by_asset_path.values_mut().for_each(|n| *n = 0);
        self.by_module.values_mut().for_each(|n| *n = 0);
    }

    fn count(&mut self, record: &DiagnosticRecord) {
        self.total += 1;
        match record.severity() {
            Severity::Info => self.infos += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }

        let group = record.group();
        // path prefixes only group records that do not belong to a tracked scene
        if let Some(n) = self.by_scene.get_mut(group) {
            *n += 1;
        } else if let Some((_, n)) = self
            .by_asset_path
            .iter_mut()
            .find(|(prefix, _)| group.contains(prefix.as_str()))
        {
            *n += 1;
        }
        *self.by_module.entry(record.module().clone()).or_insert(0) += 1;
    }
}

/// Derived, read-only view over the orchestrator's merged record list
///
/// Counters are recomputed from scratch on every refresh; they are never
/// patched incrementally. Tracked keys survive [`reset`](Self::reset) with
/// zero counts so consumers can show empty groups.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticAggregator {
    counters: DiagnosticCounters,
}

impl DiagnosticAggregator {
    /// Create aggregator with no tracked groups
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an exact scene name
    pub fn track_scene(&mut self, scene: &str) {
        self.counters.by_scene.entry(scene.to_string()).or_insert(0);
    }

    /// Track an asset path prefix
    pub fn track_asset_path(&mut self, prefix: &str) {
        self.counters
            .by_asset_path
            .entry(prefix.to_string())
            .or_insert(0);
    }

    /// Stop tracking an asset path prefix
    pub fn untrack_asset_path(&mut self, prefix: &str) -> bool {
        self.counters.by_asset_path.shift_remove(prefix).is_some()
    }

    /// Track a module so it reports zero instead of being absent
    pub fn track_module(&mut self, module: &ModuleId) {
        self.counters.by_module.entry(module.clone()).or_insert(0);
    }

    /// Zero every counter, keeping tracked keys
    pub fn reset(&mut self) {
        self.counters.zero();
    }

    /// Re-derive every counter from `records` in a single pass
    pub fn recompute(&mut self, records: &[DiagnosticRecord]) -> &DiagnosticCounters {
        self.reset();
        for record in records {
            self.counters.count(record);
        }
        tracing::trace!(total = self.counters.total, "diagnostic counters recomputed");
        &self.counters
    }

    /// Current counters
    #[inline]
    #[must_use]
    pub fn counters(&self) -> &DiagnosticCounters {
        &self.counters
    }

    /// Records accepted by every predicate of `pipeline`, in order
    #[must_use]
    pub fn filtered<'r>(
        &self,
        records: &'r [DiagnosticRecord],
        pipeline: &FilterPipeline,
    ) -> Vec<&'r DiagnosticRecord> {
        pipeline.apply(records)
    }
}
