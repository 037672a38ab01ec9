//! JSON scene documents
//!
//! A document describes object types (fields, annotations, static values)
//! and a container hierarchy with components. It is how the `vigil` binary
//! and the integration tests build a [`World`].
//!
//! ```json
//! {
//!   "types": [{ "name": "Door", "fields": [
//!     { "name": "ready", "type": "bool" },
//!     { "name": "key", "type": "str",
//!       "annotations": [{ "kind": "validate_input", "condition": "ready" }] }
//!   ]}],
//!   "containers": [{ "name": "Hall", "group": "Main",
//!     "components": [{ "$type": "Door", "ready": false, "key": "brass" }] }]
//! }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vigil_model::{
    Annotation, Component, ContainerId, FieldDescriptor, Object, SceneGraph, TypeDescriptor,
    TypeRegistry, Value, ValueType,
};

use crate::error::{EngineError, Result};
use crate::host::{FeatureSwitch, World};

/// Group used for roots that do not name one
pub const DEFAULT_GROUP: &str = "Untitled";

/// Field of a described type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDoc {
    /// Field name
    pub name: String,

    /// Declared type
    #[serde(rename = "type", default = "any_type")]
    pub ty: ValueType,

    /// Validation annotations
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

fn any_type() -> ValueType {
    ValueType::Any
}

/// A described object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDoc {
    /// Type name
    pub name: String,

    /// Declared fields
    #[serde(default)]
    pub fields: Vec<FieldDoc>,

    /// Static members
    #[serde(default)]
    pub statics: IndexMap<String, Value>,
}

/// A component entry: a field tree, or a broken reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentDoc {
    /// `{ "missing": "OldType" }` or `{ "missing": null }`
    Missing(MissingDoc),

    /// Object with a `$type` field
    Resolved(Object),
}

/// Broken component reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissingDoc {
    /// Type the host expected
    pub missing: Option<String>,
}

/// A container and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDoc {
    /// Display name
    pub name: String,

    /// Origin group; only read on roots, children inherit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Attached components
    #[serde(default)]
    pub components: Vec<ComponentDoc>,

    /// Child containers
    #[serde(default)]
    pub children: Vec<ContainerDoc>,
}

/// Whole scene document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Described types
    #[serde(default)]
    pub types: Vec<TypeDoc>,

    /// Root containers
    #[serde(default)]
    pub containers: Vec<ContainerDoc>,

    /// Initial position of the validation feature switch
    #[serde(default = "enabled")]
    pub features_enabled: bool,
}

fn enabled() -> bool {
    true
}

impl SceneDocument {
    /// Parse JSON text
    ///
    /// # Errors
    /// Returns [`EngineError::Document`] on malformed input
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON file
    ///
    /// # Errors
    /// Fails if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        let document = Self::from_json(&text)?;
        tracing::debug!(
            path = %path.display(),
            types = document.types.len(),
            roots = document.containers.len(),
            "scene document loaded"
        );
        Ok(document)
    }

    /// Type table described by the document
    #[must_use]
    pub fn type_registry(&self) -> TypeRegistry {
        let mut types = TypeRegistry::new();
        for doc in &self.types {
            let mut descriptor = TypeDescriptor::new(&doc.name);
            for field in &doc.fields {
                let mut descriptor_field = FieldDescriptor::new(&field.name, field.ty.clone());
                for annotation in &field.annotations {
                    descriptor_field = descriptor_field.annotated(annotation.clone());
                }
                descriptor = descriptor.field(descriptor_field);
            }
            for (name, value) in &doc.statics {
                descriptor = descriptor.static_value(name, value.clone());
            }
            types.register(descriptor);
        }
        types
    }

    /// Build the graph described by the document
    ///
    /// # Errors
    /// Returns [`EngineError::Graph`] if the graph cannot be assembled
    pub fn scene_graph(&self) -> Result<SceneGraph> {
        let mut graph = SceneGraph::new();
        for root in &self.containers {
            let group = root.group.as_deref().unwrap_or(DEFAULT_GROUP);
            let id = graph.add_root(&root.name, group);
            populate(&mut graph, id, root)?;
        }
        Ok(graph)
    }

    /// Build a host world from the document
    ///
    /// # Errors
    /// Returns [`EngineError::Graph`] if the graph cannot be assembled
    pub fn into_world(self) -> Result<World> {
        let graph = self.scene_graph()?;
        Ok(World::new(graph, self.type_registry())
            .with_features(FeatureSwitch::new(self.features_enabled)))
    }
}

fn populate(graph: &mut SceneGraph, id: ContainerId, doc: &ContainerDoc) -> Result<()> {
    for component in &doc.components {
        let component = match component {
            ComponentDoc::Missing(doc) => Component::Missing {
                declared_type: doc.missing.clone(),
            },
            ComponentDoc::Resolved(object) => Component::Resolved(object.clone()),
        };
        graph.attach(id, component)?;
    }
    for child in &doc.children {
        let child_id = graph.add_child(id, &child.name)?;
        populate(graph, child_id, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostGraph;
    use vigil_model::AnnotationSource;

    const DOC: &str = r#"{
        "types": [{
            "name": "Door",
            "fields": [
                { "name": "ready", "type": "bool" },
                { "name": "key", "type": "str",
                  "annotations": [{ "kind": "validate_input", "condition": "ready", "severity": "warning" }] }
            ],
            "statics": { "limit": 3 }
        }],
        "containers": [{
            "name": "Hall",
            "group": "Main",
            "components": [{ "$type": "Door", "ready": false, "key": "brass" }],
            "children": [{ "name": "Crate", "components": [{ "missing": "OldScript" }] }]
        }]
    }"#;

    #[test]
    fn test_builds_world() {
        let world = SceneDocument::from_json(DOC).unwrap().into_world().unwrap();
        assert_eq!(world.graph().len(), 2);
        let root = world.graph().roots()[0];
        let hall = world.graph().container(root).unwrap();
        assert_eq!(hall.group(), "Main");
        let crate_id = hall.children()[0];
        let crate_node = world.graph().container(crate_id).unwrap();
        assert_eq!(crate_node.group(), "Main");
        assert!(crate_node.components()[0].is_missing());
        assert!(world.features().is_enabled());
    }

    #[test]
    fn test_types_carry_annotations_and_statics() {
        let doc = SceneDocument::from_json(DOC).unwrap();
        let types = doc.type_registry();
        assert_eq!(types.annotations("Door", "key").len(), 1);
        assert_eq!(types.field_type("Door", "ready"), Some(&ValueType::Bool));
        assert_eq!(types.get("Door").unwrap().get_static("limit"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_root_without_group() {
        let doc = SceneDocument::from_json(r#"{ "containers": [{ "name": "x" }], "features_enabled": false }"#)
            .unwrap();
        let world = doc.into_world().unwrap();
        let root = world.graph().roots()[0];
        assert_eq!(world.graph().container(root).unwrap().group(), DEFAULT_GROUP);
        assert!(!world.features().is_enabled());
    }

    #[test]
    fn test_malformed_document() {
        let err = SceneDocument::from_json("{ \"containers\": 3 }").unwrap_err();
        assert!(matches!(err, EngineError::Document(_)));
    }
}
