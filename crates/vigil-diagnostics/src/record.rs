//! Diagnostic records
//!
//! A [`DiagnosticRecord`] is one finding of one module. Records are built
//! once and never mutated; modules discard them wholesale at the start of
//! their next scan.

use crate::error::RemediationError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use vigil_model::{ContainerId, FieldKey, Severity};

/// Reserved origin group for isolated editing contexts
pub const ISOLATED_STAGE_GROUP: &str = "PrefabStage";

/// Stable identity of a validator module
///
/// Used as configuration key and counter key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(Cow<'static, str>);

impl ModuleId {
    /// Id from a static name
    #[inline]
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Id from an owned name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Name as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ModuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a record points at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OriginTarget {
    /// Not tied to a graph node (environment checks)
    None,

    /// A container
    Container {
        /// Container id
        id: ContainerId,
    },

    /// A field node
    Field {
        /// Field identity
        key: FieldKey,
    },
}

/// Where a record came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin {
    /// Pointed-at node
    pub target: OriginTarget,

    /// Human label (container name, optionally with a field path)
    pub label: String,

    /// Origin group: scene name or asset path, empty when unknown
    pub group: String,
}

impl Origin {
    /// Origin without a graph node
    #[must_use]
    pub fn detached(label: impl Into<String>) -> Self {
        Self {
            target: OriginTarget::None,
            label: label.into(),
            group: String::new(),
        }
    }

    /// Origin pointing at a container
    #[must_use]
    pub fn container(id: ContainerId, label: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            target: OriginTarget::Container { id },
            label: label.into(),
            group: group.into(),
        }
    }

    /// Origin pointing at a field node
    #[must_use]
    pub fn field(key: FieldKey, label: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            target: OriginTarget::Field { key },
            label: label.into(),
            group: group.into(),
        }
    }

    /// Container the origin belongs to, if any
    #[must_use]
    pub fn container_id(&self) -> Option<ContainerId> {
        match &self.target {
            OriginTarget::None => None,
            OriginTarget::Container { id } => Some(*id),
            OriginTarget::Field { key } => Some(key.component.container),
        }
    }
}

/// Zero-argument, fallible fix attached to a record
#[derive(Clone)]
pub struct RemediationAction {
    label: String,
    action: Arc<dyn Fn() -> Result<(), RemediationError> + Send + Sync>,
}

impl RemediationAction {
    /// Create fix action
    pub fn new(
        label: impl Into<String>,
        action: impl Fn() -> Result<(), RemediationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            action: Arc::new(action),
        }
    }

    /// Short description shown next to the record
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the fix
    ///
    /// # Errors
    /// Returns whatever the fix reports
    pub fn run(&self) -> Result<(), RemediationError> {
        (self.action)()
    }
}

impl fmt::Debug for RemediationAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemediationAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// One validation finding
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord {
    severity: Severity,
    message: String,
    category: Cow<'static, str>,
    origin: Origin,
    module: ModuleId,
    #[serde(skip)]
    fix: Option<RemediationAction>,
}

impl DiagnosticRecord {
    /// Create record; the category hint defaults to the severity name
    #[must_use]
    pub fn new(
        module: ModuleId,
        severity: Severity,
        message: impl Into<String>,
        origin: Origin,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            category: Cow::Borrowed(severity.as_str()),
            origin,
            module,
            fix: None,
        }
    }

    /// Set category/icon hint
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<Cow<'static, str>>) -> Self {
        self.category = category.into();
        self
    }

    /// Attach a fix action
    #[inline]
    #[must_use]
    pub fn with_fix(mut self, fix: RemediationAction) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Severity
    #[inline]
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Category/icon hint
    #[inline]
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Origin
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Origin group name
    #[inline]
    #[must_use]
    pub fn group(&self) -> &str {
        &self.origin.group
    }

    /// Producing module
    #[inline]
    #[must_use]
    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    /// Fix action, if any
    #[inline]
    #[must_use]
    pub fn fix(&self) -> Option<&RemediationAction> {
        self.fix.as_ref()
    }
}

/// Records compare by content; fix closures only by presence
impl PartialEq for DiagnosticRecord {
    fn eq(&self, other: &Self) -> bool {
        self.severity == other.severity
            && self.message == other.message
            && self.category == other.category
            && self.origin == other.origin
            && self.module == other.module
            && self.fix.is_some() == other.fix.is_some()
    }
}

impl Eq for DiagnosticRecord {}

impl Display for DiagnosticRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.severity, self.origin.label, self.message, self.module
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_model::{ComponentId, FieldPath};

    const MODULE: ModuleId = ModuleId::from_static("TestCheck");

    #[test]
    fn record_defaults_category_to_severity() {
        let r = DiagnosticRecord::new(
            MODULE,
            Severity::Warning,
            "odd",
            Origin::detached("Project"),
        );
        assert_eq!(r.category(), "warning");
        assert_eq!(r.group(), "");
        assert!(r.fix().is_none());
        assert_eq!(r.to_string(), "[warning] Project: odd (TestCheck)");
    }

    #[test]
    fn equality_ignores_closure_identity() {
        let origin = Origin::container(ContainerId(1), "Door", "Main");
        let a = DiagnosticRecord::new(MODULE, Severity::Error, "x", origin.clone())
            .with_fix(RemediationAction::new("fix", || Ok(())));
        let b = DiagnosticRecord::new(MODULE, Severity::Error, "x", origin.clone())
            .with_fix(RemediationAction::new("other", || Err(RemediationError::NoFix)));
        let c = DiagnosticRecord::new(MODULE, Severity::Error, "x", origin);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn field_origin_belongs_to_container() {
        let key = FieldKey::new(ComponentId::new(ContainerId(4), 0), FieldPath::field("hp"));
        let origin = Origin::field(key, "Player.hp", "Main");
        assert_eq!(origin.container_id(), Some(ContainerId(4)));
        assert_eq!(Origin::detached("x").container_id(), None);
    }

    #[test]
    fn fix_runs() {
        let fix = RemediationAction::new("noop", || Err(RemediationError::Failed("nope".into())));
        assert_eq!(fix.run(), Err(RemediationError::Failed("nope".into())));
        assert_eq!(fix.label(), "noop");
    }

    #[test]
    fn record_serializes_without_fix() {
        let r = DiagnosticRecord::new(
            MODULE,
            Severity::Error,
            "bad",
            Origin::container(ContainerId(2), "Gate", "Main"),
        )
        .with_fix(RemediationAction::new("fix", || Ok(())));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["module"], "TestCheck");
        assert_eq!(json["origin"]["target"]["kind"], "container");
        assert!(json.get("fix").is_none());
    }
}
