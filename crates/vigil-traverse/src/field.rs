//! Breadth-first walk over the field trees of components

use crate::batch::{BatchBudget, BatchSize, Step};
use crate::hierarchy::HierarchyWalk;
use std::collections::{HashSet, VecDeque};
use vigil_model::{
    ComponentId, Container, ContainerId, FieldKey, FieldLocation, FieldPath, Object, SceneGraph,
    Value,
};

/// One field node offered to a visitor
#[derive(Debug, Clone, Copy)]
pub struct FieldVisit<'a> {
    /// Structural identity of the node
    pub key: &'a FieldKey,

    /// Container owning the component
    pub container: &'a Container,

    /// Component root object
    pub root: &'a Object,

    /// Resolved position of the node inside `root`
    pub location: FieldLocation<'a>,
}

impl<'a> FieldVisit<'a> {
    /// Field value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.location.value
    }

    /// Object holding the field (for list elements, the object holding the list)
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &'a Object {
        self.location.owner
    }

    /// Field name (list elements are named after their list)
    #[inline]
    #[must_use]
    pub fn field_name(&self) -> &'a str {
        self.location.field
    }

    /// Check if the node is a list element
    #[inline]
    #[must_use]
    pub fn is_element(&self) -> bool {
        self.location.index.is_some()
    }
}

/// Resumable breadth-first walk over every field node of every component
///
/// Components are discovered from the container hierarchy under the roots
/// (each container once), then each component's tree is walked breadth-first
/// from its root fields. Field nodes are deduplicated by [`FieldKey`]. A node
/// whose component or path no longer resolves when dequeued is skipped. Only
/// field visits count toward the batch size.
#[derive(Debug, Clone)]
pub struct FieldWalk {
    containers: Option<HierarchyWalk>,
    components: VecDeque<ComponentId>,
    fields: VecDeque<FieldKey>,
    visited: HashSet<FieldKey>,
    budget: BatchBudget,
    skipped: usize,
}

impl FieldWalk {
    /// Walk all components attached under the given roots
    #[must_use]
    pub fn new(roots: impl IntoIterator<Item = ContainerId>, batch: BatchSize) -> Self {
        Self {
            containers: Some(HierarchyWalk::new(roots, BatchSize::Unlimited)),
            components: VecDeque::new(),
            fields: VecDeque::new(),
            visited: HashSet::new(),
            budget: BatchBudget::new(batch),
            skipped: 0,
        }
    }

    /// Walk only the given components
    #[must_use]
    pub fn over_components(
        components: impl IntoIterator<Item = ComponentId>,
        batch: BatchSize,
    ) -> Self {
        Self {
            containers: None,
            components: components.into_iter().collect(),
            fields: VecDeque::new(),
            visited: HashSet::new(),
            budget: BatchBudget::new(batch),
            skipped: 0,
        }
    }

    /// Continue until the next batch boundary or the end of the walk
    pub fn resume(&mut self, graph: &SceneGraph, mut visit: impl FnMut(&FieldVisit<'_>)) -> Step {
        loop {
            if let Some(key) = self.fields.pop_front() {
                if !self.visited.insert(key.clone()) {
                    continue;
                }
                let resolved = graph.container(key.component.container).and_then(|container| {
                    let root = graph.component_object(key.component)?;
                    let location = key.path.locate(root)?;
                    Some((container, root, location))
                });
                let Some((container, root, location)) = resolved else {
                    self.skipped += 1;
                    tracing::trace!(field = %key, "skipping stale field node");
                    continue;
                };

                visit(&FieldVisit {
                    key: &key,
                    container,
                    root,
                    location,
                });
                self.enqueue_children(&key, location.value);

                if self.budget.record_visit() {
                    tracing::trace!(visits = self.budget.visits(), "field walk suspended");
                    return Step::Suspended;
                }
                continue;
            }

            if let Some(component) = self.components.pop_front() {
                if let Some(root) = graph.component_object(component) {
                    self.fields.extend(
                        root.fields()
                            .map(|(name, _)| FieldKey::new(component, FieldPath::field(name))),
                    );
                }
                continue;
            }

            let Some(containers) = self.containers.as_mut() else {
                return Step::Complete;
            };
            let Some(id) = containers.next_container(graph) else {
                return Step::Complete;
            };
            if let Some(container) = graph.container(id) {
                self.components.extend(
                    container
                        .component_ids()
                        .filter(|(_, c)| !c.is_missing())
                        .map(|(cid, _)| cid),
                );
                containers.enqueue_children(container);
            }
        }
    }

    fn enqueue_children(&mut self, key: &FieldKey, value: &Value) {
        match value {
            Value::Object(object) => self.fields.extend(
                object
                    .fields()
                    .map(|(name, _)| FieldKey::new(key.component, key.path.child_field(name))),
            ),
            Value::List(items) => self.fields.extend(
                (0..items.len()).map(|i| FieldKey::new(key.component, key.path.child_index(i))),
            ),
            _ => {}
        }
    }

    /// Field nodes visited so far
    #[inline]
    #[must_use]
    pub fn visits(&self) -> usize {
        self.budget.visits()
    }

    /// Suspension points reached so far
    #[inline]
    #[must_use]
    pub fn suspensions(&self) -> usize {
        self.budget.suspensions()
    }

    /// Stale field nodes skipped so far
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_model::Component;

    fn paths(walk: &mut FieldWalk, graph: &SceneGraph) -> Vec<String> {
        let mut seen = Vec::new();
        while walk.resume(graph, |v| seen.push(v.key.to_string())) == Step::Suspended {}
        seen
    }

    fn inventory_graph() -> (SceneGraph, ComponentId) {
        let mut graph = SceneGraph::new();
        let root = graph.add_root("player", "Main");
        let comp = graph
            .attach(
                root,
                Object::new("Inventory")
                    .with("owner", "hero")
                    .with(
                        "slots",
                        vec![
                            Value::from(Object::new("Slot").with("item", "sword")),
                            Value::from(Object::new("Slot").with("item", "shield")),
                        ],
                    )
                    .with("gold", 10),
            )
            .unwrap();
        (graph, comp)
    }

    #[test]
    fn field_tree_breadth_first() {
        let (graph, _) = inventory_graph();
        let mut walk = FieldWalk::new(graph.roots().to_vec(), BatchSize::Unlimited);
        assert_eq!(
            paths(&mut walk, &graph),
            vec![
                "#0/0:owner",
                "#0/0:slots",
                "#0/0:gold",
                "#0/0:slots.0",
                "#0/0:slots.1",
                "#0/0:slots.0.item",
                "#0/0:slots.1.item",
            ]
        );
    }

    #[test]
    fn elements_report_list_owner() {
        let (graph, _) = inventory_graph();
        let mut walk = FieldWalk::new(graph.roots().to_vec(), BatchSize::Unlimited);
        let mut elements = Vec::new();
        walk.resume(&graph, |v| {
            if v.is_element() {
                elements.push((v.field_name().to_string(), v.owner().type_name().to_string()));
            }
        });
        assert_eq!(
            elements,
            vec![
                ("slots".to_string(), "Inventory".to_string()),
                ("slots".to_string(), "Inventory".to_string()),
            ]
        );
    }

    #[test]
    fn missing_components_are_not_walked() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root("a", "S");
        graph
            .attach(root, Component::Missing { declared_type: None })
            .unwrap();
        graph.attach(root, Object::new("T").with("x", 1)).unwrap();
        let mut walk = FieldWalk::new(vec![root], BatchSize::Unlimited);
        assert_eq!(paths(&mut walk, &graph), vec!["#0/1:x"]);
    }

    #[test]
    fn stale_nodes_are_skipped_between_slices() {
        let (mut graph, comp) = inventory_graph();
        let mut walk = FieldWalk::new(graph.roots().to_vec(), BatchSize::limited(2));
        let mut seen = Vec::new();
        assert_eq!(
            walk.resume(&graph, |v| seen.push(v.key.path.to_string())),
            Step::Suspended
        );
        // slots shrinks to one element after slots.0/slots.1 were queued
        graph
            .set_field(
                comp,
                &FieldPath::field("slots"),
                vec![Value::from(Object::new("Slot").with("item", "axe"))],
            )
            .unwrap();
        while walk.resume(&graph, |v| seen.push(v.key.path.to_string())) == Step::Suspended {}
        assert_eq!(seen, vec!["owner", "slots", "gold", "slots.0", "slots.0.item"]);
        assert_eq!(walk.skipped(), 1);
    }

    #[test]
    fn over_components_limits_scope() {
        let mut graph = SceneGraph::new();
        let a = graph.add_root("a", "S");
        let b = graph.add_root("b", "S");
        graph.attach(a, Object::new("T").with("x", 1)).unwrap();
        let cb = graph.attach(b, Object::new("T").with("y", 2)).unwrap();
        let mut walk = FieldWalk::over_components(vec![cb], BatchSize::Unlimited);
        assert_eq!(paths(&mut walk, &graph), vec!["#1/0:y"]);
    }
}
