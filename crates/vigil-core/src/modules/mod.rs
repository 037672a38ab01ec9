//! Built-in validator modules

mod condition;
mod feature_toggle;
mod missing_component;

pub use condition::{ConditionCheck, CONDITION_MODULE};
pub use feature_toggle::{FeatureToggleModule, FEATURE_TOGGLE_MODULE};
pub use missing_component::{MissingComponentCheck, MISSING_COMPONENT_MESSAGE, MISSING_COMPONENT_MODULE};
