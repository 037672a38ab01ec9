//! Host object graph
//!
//! [`SceneGraph`] is an arena of [`Container`]s addressed by [`ContainerId`].
//! Containers form a hierarchy that is acyclic in practice but not by
//! construction: [`SceneGraph::link_child`] may add a second parent or even a
//! cycle, and destroyed containers may still be referenced from elsewhere.
//! Consumers must therefore track visits and tolerate dangling ids.

use crate::error::GraphError;
use crate::path::FieldPath;
use crate::value::{Object, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// Identity of a container node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub u64);

impl Display for ContainerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a component node: owning container plus attachment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    /// Owning container
    pub container: ContainerId,

    /// Position in the container's component list
    pub slot: usize,
}

impl ComponentId {
    /// Create new component id
    #[inline]
    #[must_use]
    pub fn new(container: ContainerId, slot: usize) -> Self {
        Self { container, slot }
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.slot)
    }
}

/// Data attached to a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    /// Component with a live definition and a field tree
    Resolved(Object),

    /// Component whose underlying definition is missing or corrupted
    Missing {
        /// Type the host expected, when known
        declared_type: Option<String>,
    },
}

impl Component {
    /// Field tree root, when the definition is intact
    #[inline]
    #[must_use]
    pub fn object(&self) -> Option<&Object> {
        match self {
            Self::Resolved(o) => Some(o),
            Self::Missing { .. } => None,
        }
    }

    /// True when the definition is missing
    #[inline]
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

impl From<Object> for Component {
    fn from(o: Object) -> Self {
        Self::Resolved(o)
    }
}

/// A node of the hierarchy (an entity)
#[derive(Debug, Clone)]
pub struct Container {
    id: ContainerId,
    name: String,
    group: String,
    parent: Option<ContainerId>,
    children: Vec<ContainerId>,
    components: Vec<Component>,
}

impl Container {
    /// Identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Origin group (scene name or asset path)
    #[inline]
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Primary parent, if any
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    /// Child containers in order (may contain dangling ids)
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ContainerId] {
        &self.children
    }

    /// Attached components in slot order
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Component ids paired with components
    pub fn component_ids(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        let id = self.id;
        self.components
            .iter()
            .enumerate()
            .map(move |(slot, c)| (ComponentId::new(id, slot), c))
    }
}

/// Arena holding the host's container hierarchy
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    containers: IndexMap<ContainerId, Container>,
    roots: Vec<ContainerId>,
    next_id: u64,
    structure_revision: u64,
    value_revision: u64,
}

impl SceneGraph {
    /// Create empty graph
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, name: String, group: String, parent: Option<ContainerId>) -> ContainerId {
        let id = ContainerId(self.next_id);
        self.next_id += 1;
        self.containers.insert(
            id,
            Container {
                id,
                name,
                group,
                parent,
                children: Vec::new(),
                components: Vec::new(),
            },
        );
        self.structure_revision += 1;
        id
    }

    /// Add a top-level container in the given origin group
    pub fn add_root(&mut self, name: impl Into<String>, group: impl Into<String>) -> ContainerId {
        let id = self.allocate(name.into(), group.into(), None);
        self.roots.push(id);
        id
    }

    /// Add a child container; it inherits the parent's origin group
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownContainer`] if `parent` does not exist
    pub fn add_child(
        &mut self,
        parent: ContainerId,
        name: impl Into<String>,
    ) -> Result<ContainerId, GraphError> {
        let group = self
            .containers
            .get(&parent)
            .ok_or(GraphError::UnknownContainer(parent))?
            .group
            .clone();
        let id = self.allocate(name.into(), group, Some(parent));
        if let Some(p) = self.containers.get_mut(&parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Add an extra parent → child edge without changing the primary parent
    ///
    /// This is how shared subtrees (and, in broken hosts, cycles) appear.
    ///
    /// # Errors
    /// Fails if either container does not exist or `parent == child`
    pub fn link_child(&mut self, parent: ContainerId, child: ContainerId) -> Result<(), GraphError> {
        if parent == child {
            return Err(GraphError::SelfLink(parent));
        }
        if !self.containers.contains_key(&child) {
            return Err(GraphError::UnknownContainer(child));
        }
        let p = self
            .containers
            .get_mut(&parent)
            .ok_or(GraphError::UnknownContainer(parent))?;
        p.children.push(child);
        self.structure_revision += 1;
        Ok(())
    }

    /// Attach a component to a container
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownContainer`] if the container is gone
    pub fn attach(
        &mut self,
        container: ContainerId,
        component: impl Into<Component>,
    ) -> Result<ComponentId, GraphError> {
        let c = self
            .containers
            .get_mut(&container)
            .ok_or(GraphError::UnknownContainer(container))?;
        c.components.push(component.into());
        self.structure_revision += 1;
        Ok(ComponentId::new(container, c.components.len() - 1))
    }

    /// Destroy a container and its primary-owned subtree
    ///
    /// Extra edges created by [`link_child`](Self::link_child) are left
    /// dangling on purpose: the host graph may reference destroyed nodes.
    /// Returns the number of containers removed.
    pub fn destroy(&mut self, id: ContainerId) -> usize {
        let Some(parent) = self.containers.get(&id).map(|c| c.parent) else {
            return 0;
        };
        if let Some(p) = parent.and_then(|p| self.containers.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
        self.roots.retain(|r| *r != id);

        let mut removed = 0;
        let mut stack = vec![id];
        let mut seen = HashSet::new();
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            if let Some(c) = self.containers.shift_remove(&next) {
                removed += 1;
                stack.extend(c.children.iter().copied().filter(|child| {
                    self.containers
                        .get(child)
                        .is_some_and(|cc| cc.parent == Some(next))
                }));
            }
        }
        self.structure_revision += 1;
        removed
    }

    /// Replace the value at `path` inside a component's field tree
    ///
    /// # Errors
    /// Fails if the component is unknown/missing or the path is stale
    pub fn set_field(
        &mut self,
        component: ComponentId,
        path: &FieldPath,
        value: impl Into<Value>,
    ) -> Result<Value, GraphError> {
        let object = self
            .containers
            .get_mut(&component.container)
            .and_then(|c| c.components.get_mut(component.slot))
            .and_then(|c| match c {
                Component::Resolved(o) => Some(o),
                Component::Missing { .. } => None,
            })
            .ok_or(GraphError::UnknownComponent(component))?;
        let slot = path
            .value_mut(object)
            .ok_or_else(|| GraphError::InvalidFieldPath(path.to_string()))?;
        let previous = std::mem::replace(slot, value.into());
        self.value_revision += 1;
        Ok(previous)
    }

    /// Container by id; `None` once destroyed
    #[inline]
    #[must_use]
    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(&id)
    }

    /// Component by id
    #[inline]
    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.containers
            .get(&id.container)
            .and_then(|c| c.components.get(id.slot))
    }

    /// Field tree root of a component, when it is alive and resolved
    #[inline]
    #[must_use]
    pub fn component_object(&self, id: ComponentId) -> Option<&Object> {
        self.component(id).and_then(Component::object)
    }

    /// Whether the container still exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ContainerId) -> bool {
        self.containers.contains_key(&id)
    }

    /// Current top-level containers
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[ContainerId] {
        &self.roots
    }

    /// Distinct origin groups of the top-level containers, in first-seen order
    #[must_use]
    pub fn root_groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for root in &self.roots {
            if let Some(c) = self.containers.get(root) {
                if !groups.contains(&c.group.as_str()) {
                    groups.push(&c.group);
                }
            }
        }
        groups
    }

    /// Iterate live containers in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.containers.values()
    }

    /// Number of live containers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// True if no containers exist
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Bumped on every structural change (add, link, attach, destroy)
    #[inline]
    #[must_use]
    pub fn structure_revision(&self) -> u64 {
        self.structure_revision
    }

    /// Bumped on every field value change
    #[inline]
    #[must_use]
    pub fn value_revision(&self) -> u64 {
        self.value_revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_inherit_group() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root("Level", "Main");
        let child = graph.add_child(root, "Door").unwrap();
        assert_eq!(graph.container(child).unwrap().group(), "Main");
        assert_eq!(graph.container(root).unwrap().children(), &[child]);
    }

    #[test]
    fn link_child_allows_shared_subtree() {
        let mut graph = SceneGraph::new();
        let a = graph.add_root("A", "S");
        let b = graph.add_root("B", "S");
        let shared = graph.add_child(a, "Shared").unwrap();
        graph.link_child(b, shared).unwrap();
        assert_eq!(graph.container(b).unwrap().children(), &[shared]);
        assert_eq!(graph.link_child(a, a), Err(GraphError::SelfLink(a)));
    }

    #[test]
    fn destroy_removes_subtree_and_leaves_links_dangling() {
        let mut graph = SceneGraph::new();
        let a = graph.add_root("A", "S");
        let b = graph.add_root("B", "S");
        let child = graph.add_child(a, "Child").unwrap();
        let grandchild = graph.add_child(child, "Grandchild").unwrap();
        graph.link_child(b, child).unwrap();

        let removed = graph.destroy(child);
        assert_eq!(removed, 2);
        assert!(!graph.contains(child));
        assert!(!graph.contains(grandchild));
        assert!(graph.container(a).unwrap().children().is_empty());
        assert_eq!(graph.container(b).unwrap().children(), &[child]);
    }

    #[test]
    fn destroy_root_updates_roots() {
        let mut graph = SceneGraph::new();
        let a = graph.add_root("A", "S");
        graph.destroy(a);
        assert!(graph.roots().is_empty());
        assert_eq!(graph.destroy(a), 0);
    }

    #[test]
    fn set_field_bumps_value_revision() {
        let mut graph = SceneGraph::new();
        let a = graph.add_root("A", "S");
        let comp = graph
            .attach(a, Object::new("Gate").with("open", false))
            .unwrap();
        let before = graph.value_revision();
        let previous = graph.set_field(comp, &FieldPath::field("open"), true).unwrap();
        assert_eq!(previous, Value::Bool(false));
        assert_eq!(graph.value_revision(), before + 1);
        assert!(matches!(
            graph.set_field(comp, &FieldPath::field("missing"), 1),
            Err(GraphError::InvalidFieldPath(_))
        ));
    }

    #[test]
    fn missing_component_has_no_object() {
        let mut graph = SceneGraph::new();
        let a = graph.add_root("A", "S");
        let comp = graph
            .attach(a, Component::Missing { declared_type: None })
            .unwrap();
        assert!(graph.component(comp).unwrap().is_missing());
        assert!(graph.component_object(comp).is_none());
    }

    #[test]
    fn root_groups_are_distinct() {
        let mut graph = SceneGraph::new();
        graph.add_root("A", "Main");
        graph.add_root("B", "Menu");
        graph.add_root("C", "Main");
        assert_eq!(graph.root_groups(), vec!["Main", "Menu"]);
    }
}
