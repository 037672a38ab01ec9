//! Validation annotations attached to fields
//!
//! The host's metadata source parses attributes into these values; the
//! engine only consumes them.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// Message used when a condition annotation does not set one
pub const DEFAULT_CONDITION_MESSAGE: &str = "Invalid Input";

/// Whether an annotation on a list field targets the list or its elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    /// Checked once on the list field itself (also used for non-list fields)
    #[default]
    Array,

    /// Checked on each element of the list
    Elements,
}

/// A boolean condition that must hold for the annotated field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionAnnotation {
    /// Dotted member path, or the literal `true` / `false`
    pub condition: String,

    /// Message of the record emitted when the condition is false
    #[serde(default = "default_message")]
    pub message: String,

    /// Severity of the record emitted when the condition is false
    #[serde(default)]
    pub severity: Severity,

    /// Re-evaluate when the owning object changes, without a rescan
    #[serde(default = "default_true")]
    pub reevaluate_on_change: bool,

    /// List or element targeting
    #[serde(default)]
    pub applies_to: Applicability,
}

fn default_message() -> String {
    DEFAULT_CONDITION_MESSAGE.to_string()
}

fn default_true() -> bool {
    true
}

impl ConditionAnnotation {
    /// Create annotation with default message and severity
    #[must_use]
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            message: default_message(),
            severity: Severity::default(),
            reevaluate_on_change: true,
            applies_to: Applicability::default(),
        }
    }

    /// Set message
    #[inline]
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set severity
    #[inline]
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set live re-evaluation flag
    #[inline]
    #[must_use]
    pub fn with_reevaluate(mut self, enabled: bool) -> Self {
        self.reevaluate_on_change = enabled;
        self
    }

    /// Target list elements instead of the list
    #[inline]
    #[must_use]
    pub fn on_elements(mut self) -> Self {
        self.applies_to = Applicability::Elements;
        self
    }
}

/// Annotation kinds understood by the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Annotation {
    /// Condition check
    ValidateInput(ConditionAnnotation),

    /// Opaque marker for host-specific modules
    Marker {
        /// Marker name
        name: String,
    },
}

impl Annotation {
    /// Condition payload, if this is a condition annotation
    #[inline]
    #[must_use]
    pub fn as_condition(&self) -> Option<&ConditionAnnotation> {
        match self {
            Self::ValidateInput(c) => Some(c),
            Self::Marker { .. } => None,
        }
    }

    /// List or element targeting; markers target the field itself
    #[inline]
    #[must_use]
    pub fn applies_to(&self) -> Applicability {
        match self {
            Self::ValidateInput(c) => c.applies_to,
            Self::Marker { .. } => Applicability::Array,
        }
    }
}

impl From<ConditionAnnotation> for Annotation {
    fn from(c: ConditionAnnotation) -> Self {
        Self::ValidateInput(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_defaults() {
        let a = ConditionAnnotation::new("ready");
        assert_eq!(a.message, "Invalid Input");
        assert_eq!(a.severity, Severity::Error);
        assert!(a.reevaluate_on_change);
        assert_eq!(a.applies_to, Applicability::Array);
    }

    #[test]
    fn deserialize_fills_defaults() {
        let json = r#"{"kind":"validate_input","condition":"ready","severity":"warning"}"#;
        let a: Annotation = serde_json::from_str(json).unwrap();
        let c = a.as_condition().unwrap();
        assert_eq!(c.condition, "ready");
        assert_eq!(c.severity, Severity::Warning);
        assert_eq!(c.message, DEFAULT_CONDITION_MESSAGE);
    }

    #[test]
    fn element_targeting() {
        let a: Annotation = ConditionAnnotation::new("ok").on_elements().into();
        assert_eq!(a.applies_to(), Applicability::Elements);
        let m = Annotation::Marker { name: "x".into() };
        assert!(m.as_condition().is_none());
    }
}
