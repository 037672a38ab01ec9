//! Evaluates `ValidateInput` condition annotations on fields

use tracing::trace;
use vigil_condition::{ConditionEvaluator, ConditionTarget};
use vigil_diagnostics::{DiagnosticRecord, ModuleId, Origin};
use vigil_model::{
    Annotation, AnnotationSource, Applicability, ComponentId, ConditionAnnotation, FieldKey,
};

use crate::batched::{FieldCheck, FieldOffer, FieldRole};
use crate::module::{LiveUpdate, ScanContext};

/// Module id
pub const CONDITION_MODULE: ModuleId = ModuleId::from_static("ValidateInput");

#[derive(Debug, Clone)]
struct Watch {
    key: FieldKey,
    annotation: ConditionAnnotation,
    element: bool,
}

/// Field check producing one record per failed condition
///
/// List fields see annotations meant for the list as a whole, their
/// elements see annotations marked [`Applicability::Elements`]. Plain
/// fields see both kinds.
#[derive(Debug, Clone, Default)]
pub struct ConditionCheck {
    watches: Vec<Watch>,
}

impl ConditionCheck {
    /// Create check
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields registered for live re-evaluation during the last scan
    #[must_use]
    pub fn watched(&self) -> Vec<&FieldKey> {
        self.watches.iter().map(|w| &w.key).collect()
    }
}

fn accepts(role: FieldRole, applies_to: Applicability) -> bool {
    match role {
        FieldRole::Scalar => true,
        FieldRole::Array => applies_to == Applicability::Array,
        FieldRole::Element(_) => applies_to == Applicability::Elements,
    }
}

impl FieldCheck for ConditionCheck {
    fn id(&self) -> ModuleId {
        CONDITION_MODULE
    }

    fn display_name(&self) -> &str {
        "Validate Input"
    }

    fn begin(&mut self) {
        self.watches.clear();
    }

    fn check(&mut self, offer: &FieldOffer<'_>, ctx: &ScanContext<'_>, out: &mut Vec<DiagnosticRecord>) {
        let annotations = ctx.types.annotations(offer.owner.type_name(), offer.field);
        if annotations.is_empty() {
            return;
        }
        let element = matches!(offer.role, FieldRole::Element(_));
        let declared = if element {
            None
        } else {
            ctx.types.field_type(offer.owner.type_name(), offer.field)
        };
        let target = ConditionTarget {
            owner: offer.owner,
            value: offer.value,
            declared,
        };
        let evaluator = ConditionEvaluator::new(ctx.types);

        for annotation in annotations
            .iter()
            .filter_map(Annotation::as_condition)
            .filter(|a| accepts(offer.role, a.applies_to))
        {
            let evaluation = evaluator.evaluate(annotation, &target);
            trace!(field = %offer.key, condition = %annotation.condition, state = ?evaluation.state(), "condition evaluated");
            if annotation.reevaluate_on_change {
                self.watches.push(Watch {
                    key: offer.key.clone(),
                    annotation: annotation.clone(),
                    element,
                });
            }
            if evaluation.is_valid() {
                continue;
            }
            let label = format!("{} > {}.{}", offer.container.name(), offer.root.type_name(), offer.key.path);
            out.push(
                DiagnosticRecord::new(
                    CONDITION_MODULE,
                    evaluation.severity(),
                    evaluation.message(),
                    Origin::field(offer.key.clone(), label, offer.container.group()),
                )
                .with_category("condition"),
            );
        }
    }

    fn reevaluate(&self, component: ComponentId, ctx: &ScanContext<'_>) -> Vec<LiveUpdate> {
        let Some(root) = ctx.graph.component_object(component) else {
            return Vec::new();
        };
        let evaluator = ConditionEvaluator::new(ctx.types);
        self.watches
            .iter()
            .filter(|w| w.key.component == component)
            .filter_map(|w| {
                let location = w.key.path.locate(root)?;
                let declared = if w.element {
                    None
                } else {
                    ctx.types.field_type(location.owner.type_name(), location.field)
                };
                let evaluation = evaluator.evaluate(
                    &w.annotation,
                    &ConditionTarget {
                        owner: location.owner,
                        value: location.value,
                        declared,
                    },
                );
                Some(LiveUpdate {
                    key: w.key.clone(),
                    condition: w.annotation.condition.clone(),
                    valid: evaluation.is_valid(),
                    message: evaluation.message().to_owned(),
                    severity: evaluation.severity(),
                })
            })
            .collect()
    }
}
