//! Evaluation state of one condition

use crate::error::TransitionError;

/// Lifecycle of a condition evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConditionState {
    /// Not evaluated yet
    #[default]
    Unresolved,

    /// Path resolution and member dispatch in progress
    Resolving,

    /// Condition holds
    Valid,

    /// Condition evaluated to false
    Invalid,

    /// Path, binding or invocation failed
    ResolutionFailed,
}

impl ConditionState {
    /// Check if evaluation has finished
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Valid | Self::Invalid | Self::ResolutionFailed)
    }
}

/// States reachable from `from`
///
/// Literal conditions go straight from `Unresolved` to a result. Terminal
/// states may only restart evaluation.
#[must_use]
pub fn allowed_transitions(from: ConditionState) -> &'static [ConditionState] {
    use ConditionState::{Invalid, Resolving, ResolutionFailed, Unresolved, Valid};
    match from {
        Unresolved => &[Resolving, Valid, Invalid],
        Resolving => &[Valid, Invalid, ResolutionFailed],
        Valid | Invalid | ResolutionFailed => &[Unresolved],
    }
}

/// Validate a state transition
///
/// # Errors
/// Returns [`TransitionError`] when `to` is not reachable from `from`
pub fn validate_transition(from: ConditionState, to: ConditionState) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}
