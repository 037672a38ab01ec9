//! Type/member table
//!
//! Runtime member lookup without reflection: each object type name maps to a
//! [`TypeDescriptor`] listing declared fields (with their annotations), static
//! values, computed properties and invocable methods. Tables are built once at
//! startup and shared read-only.

use crate::annotation::Annotation;
use crate::value::{Object, Value, ValueType};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Getter of a computed property
pub type PropertyGetter = Arc<dyn Fn(&Object) -> Value + Send + Sync>;

/// Body of a method
///
/// Receives the owner object and the bound arguments. Output parameters are
/// written back into the argument slice. An `Err` carries the failure text.
pub type MethodBody = Arc<dyn Fn(&Object, &mut [Value]) -> Result<Value, String> + Send + Sync>;

/// Declared field of a type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    ty: ValueType,
    annotations: Vec<Annotation>,
}

impl FieldDescriptor {
    /// Create field descriptor
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }

    /// Attach an annotation
    #[inline]
    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &ValueType {
        &self.ty
    }

    /// Attached annotations in declaration order
    #[inline]
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// Computed, read-only property
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: String,
    ty: ValueType,
    getter: PropertyGetter,
}

impl PropertyDescriptor {
    /// Create property descriptor
    pub fn new(
        name: impl Into<String>,
        ty: ValueType,
        getter: impl Fn(&Object) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            getter: Arc::new(getter),
        }
    }

    /// Property name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &ValueType {
        &self.ty
    }

    /// Read the property on an owner
    #[inline]
    #[must_use]
    pub fn get(&self, owner: &Object) -> Value {
        (self.getter)(owner)
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// How a method parameter is bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Input of the given type
    In(ValueType),

    /// Output slot receiving a human-readable message
    OutMessage,

    /// Output slot receiving a severity
    OutSeverity,
}

/// Method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
}

impl ParamDescriptor {
    /// Input parameter
    #[must_use]
    pub fn input(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::In(ty),
            default: None,
        }
    }

    /// Output message parameter
    #[must_use]
    pub fn out_message(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::OutMessage,
            default: None,
        }
    }

    /// Output severity parameter
    #[must_use]
    pub fn out_severity(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::OutSeverity,
            default: None,
        }
    }

    /// Make the parameter optional
    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Parameter name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binding kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// Default value of an optional parameter
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the parameter may be left unbound
    #[inline]
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// Invocable method
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<ParamDescriptor>,
    returns: ValueType,
    is_static: bool,
    body: MethodBody,
}

impl MethodDescriptor {
    /// Create method with no parameters
    pub fn new(
        name: impl Into<String>,
        returns: ValueType,
        body: impl Fn(&Object, &mut [Value]) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns,
            is_static: false,
            body: Arc::new(body),
        }
    }

    /// Append a parameter
    #[inline]
    #[must_use]
    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Mark as static (owner is still passed but should be ignored)
    #[inline]
    #[must_use]
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in declaration order
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// Declared return type
    #[inline]
    #[must_use]
    pub fn returns(&self) -> &ValueType {
        &self.returns
    }

    /// Whether the method is static
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Call the body with already-bound arguments
    ///
    /// # Errors
    /// Returns the body's failure text
    pub fn invoke(&self, owner: &Object, args: &mut [Value]) -> Result<Value, String> {
        (self.body)(owner, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

/// Members of one object type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
    statics: IndexMap<String, Value>,
    properties: IndexMap<String, PropertyDescriptor>,
    methods: IndexMap<String, MethodDescriptor>,
}

impl TypeDescriptor {
    /// Create empty type descriptor
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            statics: IndexMap::new(),
            properties: IndexMap::new(),
            methods: IndexMap::new(),
        }
    }

    /// Declare a field
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Declare a static value
    #[must_use]
    pub fn static_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statics.insert(name.into(), value.into());
        self
    }

    /// Declare a computed property
    #[must_use]
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.insert(property.name.clone(), property);
        self
    }

    /// Declare a method
    #[must_use]
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    /// Type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared field by name
    #[inline]
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Static value by name
    #[inline]
    #[must_use]
    pub fn get_static(&self, name: &str) -> Option<&Value> {
        self.statics.get(name)
    }

    /// Property by name
    #[inline]
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// Method by name
    #[inline]
    #[must_use]
    pub fn get_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// Declared fields in order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }
}

/// Supplies validation annotations and declared types of fields
pub trait AnnotationSource {
    /// Annotations of `field` on objects of type `type_name`
    fn annotations(&self, type_name: &str, field: &str) -> &[Annotation];

    /// Declared type of `field`, if the type is described
    fn field_type(&self, type_name: &str, field: &str) -> Option<&ValueType>;
}

/// Table of all described object types
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a type
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Descriptor by type name
    #[inline]
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }

    /// Check if type is described
    #[inline]
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Described type names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Number of described types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl AnnotationSource for TypeRegistry {
    fn annotations(&self, type_name: &str, field: &str) -> &[Annotation] {
        self.get(type_name)
            .and_then(|t| t.get_field(field))
            .map_or(&[], FieldDescriptor::annotations)
    }

    fn field_type(&self, type_name: &str, field: &str) -> Option<&ValueType> {
        self.get(type_name)
            .and_then(|t| t.get_field(field))
            .map(FieldDescriptor::ty)
    }
}
