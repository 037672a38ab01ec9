//! Adapters turning per-node checks into batched validator modules
//!
//! [`ContainerBatchedModule`] drives a [`HierarchyWalk`] and offers every
//! reachable container to a [`ContainerCheck`]. [`FieldBatchedModule`]
//! drives a [`FieldWalk`] and offers each field node to a [`FieldCheck`]
//! once: a list as a whole, then every element from its own visit.

use tracing::trace;
use vigil_diagnostics::{DiagnosticRecord, ModuleId};
use vigil_model::{ComponentId, Container, ContainerId, FieldKey, Object, Value};
use vigil_traverse::{BatchSize, FieldVisit, FieldWalk, HierarchyWalk, Step};

use crate::module::{LiveUpdate, ModuleCapabilities, ScanContext, ValidatorModule};

/// Check run once per reachable container
pub trait ContainerCheck {
    /// Module identity
    fn id(&self) -> ModuleId;

    /// Human readable name
    fn display_name(&self) -> &str;

    /// Static capabilities
    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::default()
    }

    /// Inspect one container, appending findings to `out`
    fn check(&mut self, container: &Container, ctx: &ScanContext<'_>, out: &mut Vec<DiagnosticRecord>);
}

/// [`ValidatorModule`] over a hierarchy walk
#[derive(Debug)]
pub struct ContainerBatchedModule<C> {
    check: C,
    walk: Option<HierarchyWalk>,
    logs: Vec<DiagnosticRecord>,
}

impl<C: ContainerCheck> ContainerBatchedModule<C> {
    /// Wrap a container check
    #[must_use]
    pub fn new(check: C) -> Self {
        Self {
            check,
            walk: None,
            logs: Vec::new(),
        }
    }

    /// Wrapped check
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.check
    }
}

impl<C: ContainerCheck> ValidatorModule for ContainerBatchedModule<C> {
    fn id(&self) -> ModuleId {
        self.check.id()
    }

    fn display_name(&self) -> &str {
        self.check.display_name()
    }

    fn capabilities(&self) -> ModuleCapabilities {
        self.check.capabilities()
    }

    fn begin_scan(&mut self, roots: &[ContainerId], batch: BatchSize) {
        self.logs.clear();
        self.walk = Some(HierarchyWalk::new(roots.iter().copied(), batch));
    }

    fn resume(&mut self, ctx: &ScanContext<'_>) -> Step {
        let Some(walk) = self.walk.as_mut() else {
            return Step::Complete;
        };
        let check = &mut self.check;
        let logs = &mut self.logs;
        let step = walk.resume(ctx.graph, |container| check.check(container, ctx, logs));
        if step.is_complete() {
            trace!(module = %check.id(), visits = walk.visits(), "container walk complete");
            self.walk = None;
        }
        step
    }

    fn logs(&self) -> &[DiagnosticRecord] {
        &self.logs
    }
}

/// How a field node is being offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// A non-list field
    Scalar,

    /// A list field as a whole
    Array,

    /// One element of a list field
    Element(usize),
}

/// A field node offered to a [`FieldCheck`]
#[derive(Debug, Clone, Copy)]
pub struct FieldOffer<'a> {
    /// Structural identity (element offers carry the element's key)
    pub key: &'a FieldKey,

    /// Container owning the component
    pub container: &'a Container,

    /// Component root object
    pub root: &'a Object,

    /// Object declaring the field
    pub owner: &'a Object,

    /// Declared field name (elements use the list's name)
    pub field: &'a str,

    /// Offered value
    pub value: &'a Value,

    /// List, element or plain field
    pub role: FieldRole,
}

/// Check run on every field node of every component
pub trait FieldCheck {
    /// Module identity
    fn id(&self) -> ModuleId;

    /// Human readable name
    fn display_name(&self) -> &str;

    /// Static capabilities
    fn capabilities(&self) -> ModuleCapabilities {
        ModuleCapabilities::default()
    }

    /// Reset per-session state
    fn begin(&mut self) {}

    /// Inspect one field node, appending findings to `out`
    fn check(&mut self, offer: &FieldOffer<'_>, ctx: &ScanContext<'_>, out: &mut Vec<DiagnosticRecord>);

    /// Re-check watched fields of `component`
    fn reevaluate(&self, _component: ComponentId, _ctx: &ScanContext<'_>) -> Vec<LiveUpdate> {
        Vec::new()
    }
}

/// [`ValidatorModule`] over a field walk
#[derive(Debug)]
pub struct FieldBatchedModule<F> {
    check: F,
    walk: Option<FieldWalk>,
    logs: Vec<DiagnosticRecord>,
}

impl<F: FieldCheck> FieldBatchedModule<F> {
    /// Wrap a field check
    #[must_use]
    pub fn new(check: F) -> Self {
        Self {
            check,
            walk: None,
            logs: Vec::new(),
        }
    }

    /// Wrapped check
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &F {
        &self.check
    }
}

impl<F: FieldCheck> ValidatorModule for FieldBatchedModule<F> {
    fn id(&self) -> ModuleId {
        self.check.id()
    }

    fn display_name(&self) -> &str {
        self.check.display_name()
    }

    fn capabilities(&self) -> ModuleCapabilities {
        self.check.capabilities()
    }

    fn begin_scan(&mut self, roots: &[ContainerId], batch: BatchSize) {
        self.logs.clear();
        self.check.begin();
        self.walk = Some(FieldWalk::new(roots.iter().copied(), batch));
    }

    fn resume(&mut self, ctx: &ScanContext<'_>) -> Step {
        let Some(walk) = self.walk.as_mut() else {
            return Step::Complete;
        };
        let check = &mut self.check;
        let logs = &mut self.logs;
        let step = walk.resume(ctx.graph, |visit| fan_out(check, visit, ctx, logs));
        if step.is_complete() {
            trace!(
                module = %check.id(),
                visits = walk.visits(),
                skipped = walk.skipped(),
                "field walk complete"
            );
            self.walk = None;
        }
        step
    }

    fn logs(&self) -> &[DiagnosticRecord] {
        &self.logs
    }

    fn reevaluate(&self, component: ComponentId, ctx: &ScanContext<'_>) -> Vec<LiveUpdate> {
        self.check.reevaluate(component, ctx)
    }
}

/// Offer one walked node under the role its position gives it
///
/// A list is offered whole when the walk reaches it. Its elements are
/// offered from their own visits, so each visit costs exactly one offer.
fn fan_out<F: FieldCheck>(
    check: &mut F,
    visit: &FieldVisit<'_>,
    ctx: &ScanContext<'_>,
    out: &mut Vec<DiagnosticRecord>,
) {
    let role = match (visit.location.index, visit.value()) {
        (Some(index), _) => FieldRole::Element(index),
        (None, Value::List(_)) => FieldRole::Array,
        (None, _) => FieldRole::Scalar,
    };
    let offer = FieldOffer {
        key: visit.key,
        container: visit.container,
        root: visit.root,
        owner: visit.owner(),
        field: visit.field_name(),
        value: visit.value(),
        role,
    };
    check.check(&offer, ctx, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_diagnostics::Origin;
    use vigil_model::{SceneGraph, Severity, TypeRegistry};

    #[derive(Default)]
    struct NameRecorder {
        seen: Vec<String>,
    }

    impl ContainerCheck for NameRecorder {
        fn id(&self) -> ModuleId {
            ModuleId::from_static("names")
        }

        fn display_name(&self) -> &str {
            "Names"
        }

        fn check(&mut self, container: &Container, _: &ScanContext<'_>, out: &mut Vec<DiagnosticRecord>) {
            self.seen.push(container.name().to_owned());
            out.push(DiagnosticRecord::new(
                self.id(),
                Severity::Info,
                container.name(),
                Origin::container(container.id(), container.name(), container.group()),
            ));
        }
    }

    #[derive(Default)]
    struct OfferRecorder {
        offers: Vec<String>,
    }

    impl FieldCheck for OfferRecorder {
        fn id(&self) -> ModuleId {
            ModuleId::from_static("offers")
        }

        fn display_name(&self) -> &str {
            "Offers"
        }

        fn begin(&mut self) {
            self.offers.clear();
        }

        fn check(&mut self, offer: &FieldOffer<'_>, _: &ScanContext<'_>, _: &mut Vec<DiagnosticRecord>) {
            self.offers.push(format!("{:?} {}", offer.role, offer.key.path));
        }
    }

    #[test]
    fn test_container_module_suspends_and_completes() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root("root", "Main");
        for i in 0..4 {
            graph.add_child(root, format!("child{i}")).unwrap();
        }
        let types = TypeRegistry::new();
        let ctx = ScanContext::new(&graph, &types);

        let mut module = ContainerBatchedModule::new(NameRecorder::default());
        module.begin_scan(&[root], BatchSize::limited(2));
        let mut slices = 1;
        while module.resume(&ctx) == Step::Suspended {
            slices += 1;
        }
        assert_eq!(slices, 3);
        assert_eq!(module.logs().len(), 5);
        assert_eq!(module.inner().seen[0], "root");
    }

    #[test]
    fn test_begin_scan_clears_logs() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root("root", "Main");
        let types = TypeRegistry::new();
        let ctx = ScanContext::new(&graph, &types);

        let mut module = ContainerBatchedModule::new(NameRecorder::default());
        assert_eq!(module.scan(&[root], &ctx).len(), 1);
        assert_eq!(module.scan(&[root], &ctx).len(), 1);
    }

    #[test]
    fn test_lists_fan_out_to_elements() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root("root", "Main");
        graph
            .attach(
                root,
                Object::new("Bag")
                    .with("name", "bag")
                    .with("items", vec![Value::from(1), Value::from(2)]),
            )
            .unwrap();
        let types = TypeRegistry::new();
        let ctx = ScanContext::new(&graph, &types);

        let mut module = FieldBatchedModule::new(OfferRecorder::default());
        module.scan(&[root], &ctx);
        assert_eq!(
            module.inner().offers,
            vec!["Scalar name", "Array items", "Element(0) items.0", "Element(1) items.1"]
        );
    }

    #[test]
    fn test_resume_without_begin_is_complete() {
        let graph = SceneGraph::new();
        let types = TypeRegistry::new();
        let ctx = ScanContext::new(&graph, &types);
        let mut module = FieldBatchedModule::new(OfferRecorder::default());
        assert_eq!(module.resume(&ctx), Step::Complete);
        assert!(module.logs().is_empty());
    }

    #[test]
    fn test_nested_list_elements_are_offered() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root("root", "Main");
        graph
            .attach(
                root,
                Object::new("Grid").with(
                    "rows",
                    vec![Value::from(vec![Value::from(1), Value::from(2)])],
                ),
            )
            .unwrap();
        let types = TypeRegistry::new();
        let ctx = ScanContext::new(&graph, &types);

        let mut module = FieldBatchedModule::new(OfferRecorder::default());
        module.scan(&[root], &ctx);
        assert_eq!(
            module.inner().offers,
            vec!["Array rows", "Element(0) rows.0", "Element(0) rows.0.0", "Element(1) rows.0.1"]
        );
    }

    #[derive(Default)]
    struct OfferCounter {
        current: usize,
    }

    impl FieldCheck for OfferCounter {
        fn id(&self) -> ModuleId {
            ModuleId::from_static("counter")
        }

        fn display_name(&self) -> &str {
            "Counter"
        }

        fn check(&mut self, _: &FieldOffer<'_>, _: &ScanContext<'_>, _: &mut Vec<DiagnosticRecord>) {
            self.current += 1;
        }
    }

    #[test]
    fn test_long_list_respects_batch_size() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root("root", "Main");
        graph
            .attach(root, Object::new("Bag").with("items", vec![Value::from(1); 1000]))
            .unwrap();
        let types = TypeRegistry::new();
        let ctx = ScanContext::new(&graph, &types);

        let mut module = FieldBatchedModule::new(OfferCounter::default());
        module.begin_scan(&[root], BatchSize::limited(10));
        let mut per_slice = Vec::new();
        loop {
            let step = module.resume(&ctx);
            per_slice.push(std::mem::take(&mut module.check.current));
            if step == Step::Complete {
                break;
            }
        }
        assert!(per_slice.iter().all(|&n| n <= 10), "{per_slice:?}");
        assert_eq!(per_slice.iter().sum::<usize>(), 1001);
        assert_eq!(per_slice[0], 10);
    }
}
