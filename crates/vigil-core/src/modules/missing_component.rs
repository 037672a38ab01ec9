//! Reports components whose definition reference is broken

use vigil_diagnostics::{DiagnosticRecord, ModuleId, Origin};
use vigil_model::{Component, Container, Severity};

use crate::batched::ContainerCheck;
use crate::module::{ModuleCapabilities, ScanContext};

/// Module id
pub const MISSING_COMPONENT_MODULE: ModuleId = ModuleId::from_static("MissingComponent");

/// Message attached to every finding
pub const MISSING_COMPONENT_MESSAGE: &str = "Component has corrupted definition reference";

/// One Error per missing component, attributed to its container
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingComponentCheck;

impl ContainerCheck for MissingComponentCheck {
    fn id(&self) -> ModuleId {
        MISSING_COMPONENT_MODULE
    }

    fn display_name(&self) -> &str {
        "Missing Component Check"
    }

    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::default().hidden()
    }

    fn check(&mut self, container: &Container, _ctx: &ScanContext<'_>, out: &mut Vec<DiagnosticRecord>) {
        for (id, component) in container.component_ids() {
            let Component::Missing { declared_type } = component else {
                continue;
            };
            tracing::trace!(component = %id, declared = ?declared_type, "missing component");
            out.push(
                DiagnosticRecord::new(
                    MISSING_COMPONENT_MODULE,
                    Severity::Error,
                    MISSING_COMPONENT_MESSAGE,
                    Origin::container(container.id(), container.name(), container.group()),
                )
                .with_category("missing_component"),
            );
        }
    }
}
