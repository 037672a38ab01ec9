//! Structural field paths
//!
//! Provides [`FieldPath`] for addressing a field node inside a component's
//! field tree, and [`FieldKey`], the structural identity used to deduplicate
//! field visits.

use crate::error::PathError;
use crate::graph::ComponentId;
use crate::value::{Object, Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Named field of an object
    Field(String),

    /// Zero-based element of a list
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Path of a field node relative to its component's root object
///
/// # Examples
/// - `["door", "locked"]` → `door.locked`
/// - `["slots", 2, "item"]` → `slots.2.item`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Empty path (the component root itself)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path with a single field segment
    #[inline]
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self(vec![PathSegment::Field(name.into())])
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root path
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a field segment, returning new path
    #[inline]
    #[must_use]
    pub fn child_field(&self, name: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::Field(name.into()));
        new
    }

    /// Append an index segment, returning new path
    #[inline]
    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::Index(index));
        new
    }

    /// Parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Index of the last segment when this path addresses a list element
    #[inline]
    #[must_use]
    pub fn element_index(&self) -> Option<usize> {
        match self.0.last() {
            Some(PathSegment::Index(i)) => Some(*i),
            _ => None,
        }
    }

    /// Name of the last field segment
    ///
    /// For `slots.2` this is `slots`: elements are named after their list.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|seg| match seg {
            PathSegment::Field(name) => Some(name.as_str()),
            PathSegment::Index(_) => None,
        })
    }

    /// Locate the addressed value inside a component's root object
    ///
    /// Returns `None` when any segment no longer matches the data, which is
    /// how callers detect that a queued field node went stale.
    #[must_use]
    pub fn locate<'a>(&self, root: &'a Object) -> Option<FieldLocation<'a>> {
        let mut owner = root;
        let mut field: Option<&'a str> = None;
        let mut index = None;
        let mut current: Option<&'a Value> = None;

        for segment in &self.0 {
            match segment {
                PathSegment::Field(name) => {
                    let object = match current {
                        None => root,
                        Some(value) => value.as_object()?,
                    };
                    let (key, value) = object.get_entry(name)?;
                    owner = object;
                    current = Some(value);
                    field = Some(key);
                    index = None;
                }
                PathSegment::Index(i) => {
                    current = Some(current?.as_list()?.get(*i)?);
                    index = Some(*i);
                }
            }
        }

        Some(FieldLocation {
            owner,
            field: field?,
            index,
            value: current?,
        })
    }

    /// Mutable access to the addressed value
    pub fn value_mut<'a>(&self, root: &'a mut Object) -> Option<&'a mut Value> {
        let mut segments = self.0.iter();
        let PathSegment::Field(first) = segments.next()? else {
            return None;
        };
        let mut current = root.get_mut(first)?;
        for segment in segments {
            current = match segment {
                PathSegment::Field(name) => current.as_object_mut()?.get_mut(name)?,
                PathSegment::Index(i) => current.as_list_mut()?.get_mut(*i)?,
            };
        }
        Some(current)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<PathSegment> = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if let Ok(i) = seg.parse::<usize>() {
                    Ok(PathSegment::Index(i))
                } else {
                    Ok(PathSegment::Field(seg.to_string()))
                }
            })
            .collect::<Result<_, _>>()?;

        if let Some(PathSegment::Index(i)) = segments.first() {
            return Err(PathError::LeadingIndex(*i));
        }

        Ok(Self(segments))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

/// Where a [`FieldPath`] landed inside an object tree
#[derive(Debug, Clone, Copy)]
pub struct FieldLocation<'a> {
    /// Structural parent object (for list elements: the object holding the list)
    pub owner: &'a Object,

    /// Name of the field on `owner`
    pub field: &'a str,

    /// Element index when the path addresses a list element
    pub index: Option<usize>,

    /// The addressed value
    pub value: &'a Value,
}

/// Structural identity of a field node: owning component plus path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldKey {
    /// Owning component
    pub component: ComponentId,

    /// Path inside the component
    pub path: FieldPath,
}

impl FieldKey {
    /// Create new key
    #[inline]
    #[must_use]
    pub fn new(component: ComponentId, path: FieldPath) -> Self {
        Self { component, path }
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.component, self.path)
    }
}
