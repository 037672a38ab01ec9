//! Vigil graph model
//!
//! Shared data model of the validation engine.
//!
//! # Core Concepts
//!
//! - [`SceneGraph`]: arena of [`Container`]s with attached [`Component`]s
//! - [`Value`] / [`Object`]: the nested field tree of a component
//! - [`FieldPath`] / [`FieldKey`]: structural identity of a field node
//! - [`Annotation`]: parsed validation metadata of a field
//! - [`TypeRegistry`]: type/member table used for runtime member lookup
//! - [`Severity`]: Info / Warning / Error

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod annotation;
mod error;
mod graph;
mod path;
mod registry;
mod severity;
mod value;

pub use annotation::{Annotation, Applicability, ConditionAnnotation, DEFAULT_CONDITION_MESSAGE};
pub use error::{GraphError, PathError};
pub use graph::{Component, ComponentId, Container, ContainerId, SceneGraph};
pub use path::{FieldKey, FieldLocation, FieldPath, PathSegment};
pub use registry::{
    AnnotationSource, FieldDescriptor, MethodBody, MethodDescriptor, ParamDescriptor, ParamKind,
    PropertyDescriptor, PropertyGetter, TypeDescriptor, TypeRegistry,
};
pub use severity::{Severity, UnknownSeverity};
pub use value::{Object, Value, ValueType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
