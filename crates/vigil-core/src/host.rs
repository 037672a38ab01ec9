//! Host-side collaborators: graph provider and feature switch

use parking_lot::RwLock;
use std::sync::Arc;
use vigil_model::{ContainerId, SceneGraph, TypeRegistry};

/// Supplies the graph, its type table and the current root set
pub trait HostGraph {
    /// Current graph
    fn graph(&self) -> &SceneGraph;

    /// Type/member table and annotation source
    fn types(&self) -> &TypeRegistry;

    /// Top-level containers to scan; `None` when the host cannot provide them
    fn root_set(&self) -> Option<Vec<ContainerId>>;
}

/// Shared on/off switch for a host feature
///
/// Cloning shares the same switch.
#[derive(Debug, Clone)]
pub struct FeatureSwitch(Arc<RwLock<bool>>);

impl FeatureSwitch {
    /// Create switch in the given position
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(RwLock::new(enabled)))
    }

    /// Current position
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        *self.0.read()
    }

    /// Flip the switch
    pub fn set(&self, enabled: bool) {
        *self.0.write() = enabled;
    }
}

impl Default for FeatureSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

/// In-process host: a scene graph plus its type table
#[derive(Debug, Clone, Default)]
pub struct World {
    graph: SceneGraph,
    types: TypeRegistry,
    features: FeatureSwitch,
}

impl World {
    /// Create world from a graph and type table
    #[must_use]
    pub fn new(graph: SceneGraph, types: TypeRegistry) -> Self {
        Self {
            graph,
            types,
            features: FeatureSwitch::default(),
        }
    }

    /// With a specific feature switch
    #[inline]
    #[must_use]
    pub fn with_features(mut self, features: FeatureSwitch) -> Self {
        self.features = features;
        self
    }

    /// Mutable graph access for host edits between ticks
    #[inline]
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Validation feature switch
    #[inline]
    #[must_use]
    pub fn features(&self) -> &FeatureSwitch {
        &self.features
    }
}

impl HostGraph for World {
    fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn root_set(&self) -> Option<Vec<ContainerId>> {
        Some(self.graph.roots().to_vec())
    }
}
