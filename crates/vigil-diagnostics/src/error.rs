//! Error types for remediation actions

/// Failure of a record's fix action
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemediationError {
    /// The object the fix targets no longer exists
    #[error("fix target no longer exists: {0}")]
    TargetGone(String),

    /// The fix ran and failed
    #[error("fix failed: {0}")]
    Failed(String),

    /// No fix is attached to the record
    #[error("record has no fix action")]
    NoFix,
}
