//! Dotted-path member resolution
//!
//! Resolves a path such as `settings.limits.0.enabled` against a root object
//! to the *member* named by the last segment, together with the object that
//! owns it. Callers read fields and properties or invoke methods on that
//! owner themselves.

use crate::error::ResolutionError;
use std::borrow::Cow;
use vigil_model::{MethodDescriptor, Object, PropertyDescriptor, TypeRegistry, Value, ValueType};

/// Separator between path segments
pub const PATH_SEPARATOR: char = '.';

/// Member named by the last path segment
#[derive(Debug, Clone)]
pub enum Member<'a> {
    /// Instance field stored on the owner
    Field {
        /// Field name
        name: String,
        /// Current value
        value: Cow<'a, Value>,
        /// Declared type, when the owner's type is described
        declared: Option<&'a ValueType>,
    },

    /// Static value of the owner's type
    Static {
        /// Static name
        name: String,
        /// Value
        value: &'a Value,
    },

    /// Computed property of the owner's type
    Property(&'a PropertyDescriptor),

    /// Method of the owner's type
    Method(&'a MethodDescriptor),
}

impl Member<'_> {
    /// Member name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field { name, .. } | Self::Static { name, .. } => name,
            Self::Property(p) => p.name(),
            Self::Method(m) => m.name(),
        }
    }
}

/// Result of a successful resolution
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// Object owning the member
    pub owner: Cow<'a, Object>,

    /// The member itself
    pub member: Member<'a>,
}

/// Resolves member paths using a type/member table
#[derive(Debug, Clone, Copy)]
pub struct ConditionResolver<'t> {
    types: &'t TypeRegistry,
}

impl<'t> ConditionResolver<'t> {
    /// Create resolver over a type table
    #[inline]
    #[must_use]
    pub fn new(types: &'t TypeRegistry) -> Self {
        Self { types }
    }

    /// Resolve `path` starting at `root`
    ///
    /// Each non-final segment must name a field, static or property whose
    /// value (after any index segments) is an object; that object becomes the
    /// owner for the next segment. Lookup order on each owner is instance
    /// field, static value, property, method.
    ///
    /// # Errors
    /// Returns [`ResolutionError`] when the path is empty, a segment is
    /// missing, an index is out of range or misplaced, or a method is used
    /// before the last segment.
    pub fn resolve<'a>(&self, path: &str, root: &'a Object) -> Result<Resolution<'a>, ResolutionError>
    where
        't: 'a,
    {
        let path = path.trim();
        if path.is_empty() {
            return Err(ResolutionError::EmptyPath);
        }

        let segments: Vec<&str> = path.split(PATH_SEPARATOR).map(str::trim).collect();
        let mut owner: Cow<'a, Object> = Cow::Borrowed(root);
        let mut i = 0;

        loop {
            let name = segments[i];
            if let Ok(index) = name.parse::<usize>() {
                // an index where a member name is expected
                return Err(ResolutionError::NotIndexable {
                    member: format!("{}[{index}]", owner.type_name()),
                });
            }
            let member = self.lookup(&owner, name)?;
            i += 1;
            if i == segments.len() {
                return Ok(Resolution { owner, member });
            }

            let mut value: Cow<'a, Value> = match member {
                Member::Field { value, .. } => value,
                Member::Static { value, .. } => Cow::Borrowed(value),
                Member::Property(p) => Cow::Owned(p.get(&owner)),
                Member::Method(m) => {
                    return Err(ResolutionError::MethodInPath {
                        method: m.name().to_string(),
                    })
                }
            };

            while let Some(index) = segments.get(i).and_then(|s| s.parse::<usize>().ok()) {
                value = index_into(value, name, index)?;
                i += 1;
            }
            if i == segments.len() {
                return Err(ResolutionError::TrailingIndex {
                    path: path.to_string(),
                });
            }

            owner = match value {
                Cow::Borrowed(Value::Object(o)) => Cow::Borrowed(o),
                Cow::Owned(Value::Object(o)) => Cow::Owned(o),
                _ => {
                    return Err(ResolutionError::NotTraversable {
                        member: name.to_string(),
                    })
                }
            };
        }
    }

    fn lookup<'a>(&self, owner: &Cow<'a, Object>, name: &str) -> Result<Member<'a>, ResolutionError>
    where
        't: 'a,
    {
        let type_name = owner.type_name();
        let descriptor = self.types.get(type_name);

        let field = match owner {
            Cow::Borrowed(o) => {
                let o: &'a Object = *o;
                o.get(name).map(Cow::Borrowed)
            }
            Cow::Owned(o) => o.get(name).cloned().map(Cow::Owned),
        };
        if let Some(value) = field {
            return Ok(Member::Field {
                name: name.to_string(),
                value,
                declared: descriptor
                    .and_then(|d| d.get_field(name))
                    .map(vigil_model::FieldDescriptor::ty),
            });
        }

        let Some(descriptor) = descriptor else {
            return Err(not_found(name, type_name));
        };
        if let Some(value) = descriptor.get_static(name) {
            return Ok(Member::Static {
                name: name.to_string(),
                value,
            });
        }
        if let Some(p) = descriptor.get_property(name) {
            return Ok(Member::Property(p));
        }
        if let Some(m) = descriptor.get_method(name) {
            return Ok(Member::Method(m));
        }
        Err(not_found(name, type_name))
    }
}

fn not_found(name: &str, type_name: &str) -> ResolutionError {
    ResolutionError::MemberNotFound {
        name: name.to_string(),
        type_name: type_name.to_string(),
    }
}

fn index_into<'a>(value: Cow<'a, Value>, member: &str, index: usize) -> Result<Cow<'a, Value>, ResolutionError> {
    let len = value
        .as_list()
        .ok_or_else(|| ResolutionError::NotIndexable {
            member: member.to_string(),
        })?
        .len();
    let out_of_range = || ResolutionError::IndexOutOfRange {
        member: member.to_string(),
        index,
        len,
    };
    match value {
        Cow::Borrowed(v) => v
            .as_list()
            .and_then(|items| items.get(index))
            .map(Cow::Borrowed)
            .ok_or_else(out_of_range),
        Cow::Owned(Value::List(mut items)) if index < items.len() => {
            Ok(Cow::Owned(items.swap_remove(index)))
        }
        Cow::Owned(_) => Err(out_of_range()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_model::{FieldDescriptor, MethodDescriptor, PropertyDescriptor, TypeDescriptor};

    fn types() -> TypeRegistry {
        TypeRegistry::new()
            .with(
                TypeDescriptor::new("Door")
                    .field(FieldDescriptor::new("locked", ValueType::Bool))
                    .static_value("always", true)
                    .property(PropertyDescriptor::new("frame", ValueType::Object(None), |_| {
                        Value::from(Object::new("Frame").with("sturdy", true))
                    }))
                    .method(MethodDescriptor::new("check", ValueType::Bool, |_, _| {
                        Ok(Value::Bool(true))
                    })),
            )
    }

    fn door() -> Object {
        Object::new("Door")
            .with("locked", false)
            .with(
                "hinges",
                vec![
                    Value::from(Object::new("Hinge").with("oiled", true)),
                    Value::from(Object::new("Hinge").with("oiled", false)),
                ],
            )
            .with("label", "front")
    }

    #[test]
    fn resolves_instance_field_with_declared_type() {
        let types = types();
        let root = door();
        let r = ConditionResolver::new(&types).resolve("locked", &root).unwrap();
        assert_eq!(r.owner.type_name(), "Door");
        match r.member {
            Member::Field { value, declared, .. } => {
                assert_eq!(&*value, &Value::Bool(false));
                assert_eq!(declared, Some(&ValueType::Bool));
            }
            other => panic!("unexpected member {other:?}"),
        }
    }

    #[test]
    fn resolves_through_list_index() {
        let types = types();
        let root = door();
        let r = ConditionResolver::new(&types)
            .resolve("hinges.1.oiled", &root)
            .unwrap();
        assert_eq!(r.owner.type_name(), "Hinge");
        assert!(matches!(r.owner, Cow::Borrowed(_)));
        assert_eq!(r.member.name(), "oiled");
    }

    #[test]
    fn resolves_static_property_and_method() {
        let types = types();
        let root = door();
        let resolver = ConditionResolver::new(&types);
        assert!(matches!(resolver.resolve("always", &root).unwrap().member, Member::Static { .. }));
        assert!(matches!(resolver.resolve("check", &root).unwrap().member, Member::Method(_)));

        let through_property = resolver.resolve("frame.sturdy", &root).unwrap();
        assert_eq!(through_property.owner.type_name(), "Frame");
        assert!(matches!(through_property.owner, Cow::Owned(_)));
    }

    #[test]
    fn resolution_errors() {
        let types = types();
        let root = door();
        let resolver = ConditionResolver::new(&types);
        assert_eq!(resolver.resolve("  ", &root).unwrap_err(), ResolutionError::EmptyPath);
        assert!(matches!(
            resolver.resolve("missing", &root).unwrap_err(),
            ResolutionError::MemberNotFound { .. }
        ));
        assert_eq!(
            resolver.resolve("hinges.5.oiled", &root).unwrap_err(),
            ResolutionError::IndexOutOfRange {
                member: "hinges".into(),
                index: 5,
                len: 2
            }
        );
        assert!(matches!(
            resolver.resolve("label.0.x", &root).unwrap_err(),
            ResolutionError::NotIndexable { .. }
        ));
        assert!(matches!(
            resolver.resolve("label.length", &root).unwrap_err(),
            ResolutionError::NotTraversable { .. }
        ));
        assert!(matches!(
            resolver.resolve("check.x", &root).unwrap_err(),
            ResolutionError::MethodInPath { .. }
        ));
        assert!(matches!(
            resolver.resolve("hinges.0", &root).unwrap_err(),
            ResolutionError::TrailingIndex { .. }
        ));
    }

    #[test]
    fn undescribed_types_expose_only_fields() {
        let types = TypeRegistry::new();
        let root = Object::new("Loose").with("ok", true);
        let resolver = ConditionResolver::new(&types);
        assert!(resolver.resolve("ok", &root).is_ok());
        assert!(resolver.resolve("other", &root).is_err());
    }
}
