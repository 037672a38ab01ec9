//! Error types for condition resolution and evaluation

/// A condition path cannot be bound to a member
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Path is empty or whitespace
    #[error("condition path is empty")]
    EmptyPath,

    /// No field, static, property or method with this name
    #[error("member '{name}' not found on '{type_name}'")]
    MemberNotFound {
        /// Segment name
        name: String,
        /// Runtime type searched
        type_name: String,
    },

    /// Index past the end of a list
    #[error("index {index} out of range for '{member}' (length {len})")]
    IndexOutOfRange {
        /// Member being indexed
        member: String,
        /// Requested index
        index: usize,
        /// List length
        len: usize,
    },

    /// Index applied to something that is not a list
    #[error("'{member}' is not a list and cannot be indexed")]
    NotIndexable {
        /// Member being indexed
        member: String,
    },

    /// Path continues through a value that is not an object
    #[error("cannot resolve members of '{member}': not an object")]
    NotTraversable {
        /// Member whose value is not an object
        member: String,
    },

    /// A method appears before the last segment
    #[error("method '{method}' can only appear as the last segment")]
    MethodInPath {
        /// Method name
        method: String,
    },

    /// Path ends with an index instead of a member
    #[error("condition path '{path}' must end with a member name")]
    TrailingIndex {
        /// Full path
        path: String,
    },
}

/// Evaluation of a resolved condition failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    /// Path did not resolve
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Field, property or method result is not boolean
    #[error("condition member must be boolean: '{member}'")]
    NotBoolean {
        /// Member name
        member: String,
    },

    /// One of the first three parameters matches no slot and has no default
    #[error("parameter not assignable and not optional: method '{method}', parameter '{param}'")]
    ParameterNotAssignable {
        /// Method name
        method: String,
        /// Parameter name
        param: String,
    },

    /// A parameter past the third, or after a defaulted slot parameter, has no default
    #[error("parameter not assignable and not optional: method '{method}', trailing parameter '{param}'")]
    TrailingParameterNotOptional {
        /// Method name
        method: String,
        /// Parameter name
        param: String,
    },

    /// The method failed or panicked
    #[error("method '{method}' failed: {reason}")]
    Invocation {
        /// Method name
        method: String,
        /// Failure text
        reason: String,
    },
}

/// Illegal condition state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal condition state transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    /// Source state
    pub from: crate::state::ConditionState,
    /// Target state
    pub to: crate::state::ConditionState,
}
