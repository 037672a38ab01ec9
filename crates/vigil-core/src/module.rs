//! Validator module contract
//!
//! A module is a resumable generator: [`ValidatorModule::begin_scan`] resets
//! it for a new session, then [`ValidatorModule::resume`] advances it one
//! batch slice at a time until it reports [`Step::Complete`]. Records
//! accumulate in [`ValidatorModule::logs`] and are only read by the
//! orchestrator once the module completes.

use vigil_diagnostics::{DiagnosticRecord, ModuleId};
use vigil_model::{ComponentId, ContainerId, FieldKey, SceneGraph, Severity, TypeRegistry};
use vigil_traverse::{BatchSize, Step};

use crate::host::HostGraph;

/// Read-only view handed to modules while they run
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'h> {
    /// Graph being validated
    pub graph: &'h SceneGraph,

    /// Type/member table and annotation source
    pub types: &'h TypeRegistry,
}

impl<'h> ScanContext<'h> {
    /// Create context from explicit parts
    #[inline]
    #[must_use]
    pub fn new(graph: &'h SceneGraph, types: &'h TypeRegistry) -> Self {
        Self { graph, types }
    }

    /// Create context from a host
    #[inline]
    #[must_use]
    pub fn from_host(host: &'h dyn HostGraph) -> Self {
        Self::new(host.graph(), host.types())
    }
}

/// Static properties of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleCapabilities {
    /// Run only on explicit full scans, never during autorun
    pub full_scan_only: bool,

    /// Listed in the module filter UI
    pub visible_in_filter_ui: bool,
}

impl ModuleCapabilities {
    /// Builder: only run on explicit full scans
    #[inline]
    #[must_use]
    pub fn full_scan_only(mut self) -> Self {
        self.full_scan_only = true;
        self
    }

    /// Builder: hide from the module filter UI
    #[inline]
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible_in_filter_ui = false;
        self
    }
}

impl Default for ModuleCapabilities {
    fn default() -> Self {
        Self {
            full_scan_only: false,
            visible_in_filter_ui: true,
        }
    }
}

/// Fresh verdict for a watched field after its value changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveUpdate {
    /// Field the verdict is for
    pub key: FieldKey,

    /// Condition that was re-evaluated
    pub condition: String,

    /// Whether the condition now holds
    pub valid: bool,

    /// Message a diagnostic would carry
    pub message: String,

    /// Severity a diagnostic would carry
    pub severity: Severity,
}

/// A pluggable check producing diagnostic records
pub trait ValidatorModule {
    /// Stable identity used for filtering and counting
    fn id(&self) -> ModuleId;

    /// Human readable name
    fn display_name(&self) -> &str;

    /// Static capabilities
    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::default()
    }

    /// Reset for a new session: clears logs and rewinds any traversal
    fn begin_scan(&mut self, roots: &[ContainerId], batch: BatchSize);

    /// Advance by one batch slice
    fn resume(&mut self, ctx: &ScanContext<'_>) -> Step;

    /// Records produced by the current (or last) session
    fn logs(&self) -> &[DiagnosticRecord];

    /// Re-check watched fields of `component` after a value change
    fn reevaluate(&self, _component: ComponentId, _ctx: &ScanContext<'_>) -> Vec<LiveUpdate> {
        Vec::new()
    }

    /// Run a whole session without suspending
    fn scan(&mut self, roots: &[ContainerId], ctx: &ScanContext<'_>) -> &[DiagnosticRecord] {
        self.begin_scan(roots, BatchSize::Unlimited);
        while !self.resume(ctx).is_complete() {}
        self.logs()
    }
}
