//! Testing utilities for the Vigil workspace
//!
//! Shared fixtures: described types, sample worlds and an event recorder.

#![allow(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;

use vigil_core::{HostGraph, ScanEvent, World};
use vigil_diagnostics::DiagnosticRecord;
use vigil_model::{
    Component, ComponentId, ConditionAnnotation, ContainerId, FieldDescriptor, MethodDescriptor,
    Object, ParamDescriptor, PropertyDescriptor, SceneGraph, Severity, TypeDescriptor,
    TypeRegistry, Value, ValueType,
};

pub const DOOR_MESSAGE: &str = "door is not ready";
pub const CODE_MESSAGE: &str = "code rejected";

/// `Door` (field condition, list element condition) and `Lock`
/// (method condition with out slots, property condition)
pub fn door_types() -> TypeRegistry {
    TypeRegistry::new()
        .with(
            TypeDescriptor::new("Door")
                .field(FieldDescriptor::new("ready", ValueType::Bool))
                .field(
                    FieldDescriptor::new("key", ValueType::Str).annotated(
                        ConditionAnnotation::new("ready")
                            .with_message(DOOR_MESSAGE)
                            .with_reevaluate(true),
                    ),
                )
                .field(
                    FieldDescriptor::new("hinges", ValueType::List).annotated(
                        ConditionAnnotation::new("hinge_ok")
                            .with_severity(Severity::Warning)
                            .on_elements(),
                    ),
                )
                .method(
                    MethodDescriptor::new("hinge_ok", ValueType::Bool, |_, args| {
                        Ok(Value::Bool(args[0].as_int().is_some_and(|n| n >= 0)))
                    })
                    .param(ParamDescriptor::input("hinge", ValueType::Any)),
                ),
        )
        .with(
            TypeDescriptor::new("Lock")
                .field(
                    FieldDescriptor::new("code", ValueType::Str)
                        .annotated(ConditionAnnotation::new("accepts").with_severity(Severity::Info)),
                )
                .field(FieldDescriptor::new("jammed", ValueType::Bool))
                .field(
                    FieldDescriptor::new("label", ValueType::Str)
                        .annotated(ConditionAnnotation::new("is_free").with_severity(Severity::Warning)),
                )
                .property(PropertyDescriptor::new("is_free", ValueType::Bool, |owner| {
                    Value::Bool(owner.get("jammed") != Some(&Value::Bool(true)))
                }))
                .method(
                    MethodDescriptor::new("accepts", ValueType::Bool, |_, args| {
                        let ok = args[0].as_str().is_some_and(|code| code.len() == 4);
                        if !ok {
                            args[1] = Value::from(CODE_MESSAGE);
                            args[2] = Value::Severity(Severity::Error);
                        }
                        Ok(Value::Bool(ok))
                    })
                    .param(ParamDescriptor::input("code", ValueType::Str))
                    .param(ParamDescriptor::out_message("message"))
                    .param(ParamDescriptor::out_severity("severity")),
                ),
        )
}

pub fn door(ready: bool, hinges: &[i64]) -> Object {
    Object::new("Door")
        .with("ready", ready)
        .with("key", "brass")
        .with("hinges", hinges.iter().copied().map(Value::Int).collect::<Vec<_>>())
}

pub fn lock(code: &str, jammed: bool) -> Object {
    Object::new("Lock")
        .with("code", code)
        .with("jammed", jammed)
        .with("label", "front")
}

/// One root `Hall` in group `Main` holding a single door
pub fn door_world(ready: bool) -> (World, ComponentId) {
    let mut graph = SceneGraph::new();
    let root = graph.add_root("Hall", "Main");
    let component = graph.attach(root, door(ready, &[])).unwrap();
    (World::new(graph, door_types()), component)
}

/// `roots` roots in alternating groups, each with `children` children;
/// every third child has a missing component, every container a door
/// that is not ready
pub fn wide_world(roots: usize, children: usize) -> World {
    let mut graph = SceneGraph::new();
    for r in 0..roots {
        let group = if r % 2 == 0 { "Main" } else { "Side" };
        let root = graph.add_root(format!("root{r}"), group);
        graph.attach(root, door(false, &[1, -1])).unwrap();
        for c in 0..children {
            let child = graph.add_child(root, format!("child{r}.{c}")).unwrap();
            graph.attach(child, door(false, &[])).unwrap();
            if c % 3 == 0 {
                graph
                    .attach(child, Component::Missing { declared_type: None })
                    .unwrap();
            }
        }
    }
    World::new(graph, door_types())
}

/// Shared child reachable from two parents, plus a cycle back to a root
pub fn diamond_world() -> (World, ContainerId) {
    let mut graph = SceneGraph::new();
    let root = graph.add_root("top", "Main");
    let left = graph.add_child(root, "left").unwrap();
    let right = graph.add_child(root, "right").unwrap();
    let shared = graph.add_child(left, "shared").unwrap();
    graph.link_child(right, shared).unwrap();
    graph.link_child(shared, root).unwrap();
    graph
        .attach(shared, Component::Missing { declared_type: None })
        .unwrap();
    (World::new(graph, door_types()), shared)
}

/// Host whose root set is unavailable
#[derive(Debug, Default)]
pub struct NoRoots(pub World);

impl HostGraph for NoRoots {
    fn graph(&self) -> &SceneGraph {
        self.0.graph()
    }

    fn types(&self) -> &TypeRegistry {
        self.0.types()
    }

    fn root_set(&self) -> Option<Vec<ContainerId>> {
        None
    }
}

/// Collects scan events from a subscribed listener
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<ScanEvent>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener to pass to `Orchestrator::subscribe`
    pub fn listener(&self) -> impl FnMut(&ScanEvent) + 'static {
        let events = Rc::clone(&self.0);
        move |event| events.borrow_mut().push(event.clone())
    }

    pub fn events(&self) -> Vec<ScanEvent> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&ScanEvent) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| pred(e)).count()
    }
}

/// Records as `(module, severity, message)` triples for comparisons
pub fn summarize(records: &[DiagnosticRecord]) -> Vec<(String, Severity, String)> {
    records
        .iter()
        .map(|r| (r.module().to_string(), r.severity(), r.message().to_owned()))
        .collect()
}
