//! Vigil conditions
//!
//! Resolution of dotted member paths against nested objects, and evaluation
//! of boolean condition annotations on top of it.
//!
//! # Core Concepts
//!
//! - [`ConditionResolver`]: path → owning object + [`Member`]
//! - [`ConditionEvaluator`]: literal shortcut, member dispatch, method
//!   parameter binding, failure capture
//! - [`ConditionState`]: per-evaluation state machine
//!
//! # Example
//!
//! ```rust
//! use vigil_condition::{ConditionEvaluator, ConditionTarget};
//! use vigil_model::{ConditionAnnotation, Object, TypeRegistry, Value};
//!
//! let types = TypeRegistry::new();
//! let owner = Object::new("Gate").with("ready", false);
//! let target = ConditionTarget { owner: &owner, value: &Value::Null, declared: None };
//! let eval = ConditionEvaluator::new(&types).evaluate(&ConditionAnnotation::new("ready"), &target);
//! assert!(!eval.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod evaluator;
mod resolver;
mod state;

pub use error::{ConditionError, ResolutionError, TransitionError};
pub use evaluator::{
    literal, ConditionEvaluator, ConditionTarget, Evaluation, Verdict, MAX_SLOT_PARAMS,
    MESSAGE_PREFIX,
};
pub use resolver::{ConditionResolver, Member, Resolution, PATH_SEPARATOR};
pub use state::{allowed_transitions, validate_transition, ConditionState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
