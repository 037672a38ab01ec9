//! Warns when the host's validation features are switched off

use vigil_diagnostics::{DiagnosticRecord, ModuleId, Origin, RemediationAction};
use vigil_model::{ContainerId, Severity};
use vigil_traverse::{BatchSize, Step};

use crate::host::FeatureSwitch;
use crate::module::{ModuleCapabilities, ScanContext, ValidatorModule};

/// Module id
pub const FEATURE_TOGGLE_MODULE: ModuleId = ModuleId::from_static("FeatureToggle");

const MESSAGE: &str = "Validation features are disabled";

/// Emits a single Warning, with a fix that enables the switch, while it is off
///
/// Does not walk the graph; one resume always completes.
#[derive(Debug, Clone)]
pub struct FeatureToggleModule {
    features: FeatureSwitch,
    pending: bool,
    logs: Vec<DiagnosticRecord>,
}

impl FeatureToggleModule {
    /// Watch the given switch
    #[must_use]
    pub fn new(features: FeatureSwitch) -> Self {
        Self {
            features,
            pending: false,
            logs: Vec::new(),
        }
    }
}

impl ValidatorModule for FeatureToggleModule {
    fn id(&self) -> ModuleId {
        FEATURE_TOGGLE_MODULE
    }

    fn display_name(&self) -> &str {
        "Feature Toggle"
    }

    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::default().hidden()
    }

    fn begin_scan(&mut self, _roots: &[ContainerId], _batch: BatchSize) {
        self.logs.clear();
        self.pending = true;
    }

    fn resume(&mut self, _ctx: &ScanContext<'_>) -> Step {
        if std::mem::take(&mut self.pending) && !self.features.is_enabled() {
            let switch = self.features.clone();
            let fix = RemediationAction::new("Enable validation features", move || {
                switch.set(true);
                Ok(())
            });
            self.logs.push(
                DiagnosticRecord::new(
                    FEATURE_TOGGLE_MODULE,
                    Severity::Warning,
                    MESSAGE,
                    Origin::detached("Validation features"),
                )
                .with_category("settings")
                .with_fix(fix),
            );
        }
        Step::Complete
    }

    fn logs(&self) -> &[DiagnosticRecord] {
        &self.logs
    }
}
