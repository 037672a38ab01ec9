//! Vigil diagnostics
//!
//! Findings produced by validator modules, and the derived state consumers
//! read after each refresh.
//!
//! # Core Concepts
//!
//! - [`DiagnosticRecord`]: one immutable finding with severity, origin and optional fix
//! - [`DiagnosticAggregator`] / [`DiagnosticCounters`]: counts recomputed from the record list
//! - [`FilterSettings`]: persisted toggles per module, scene, asset path and severity
//! - [`FilterPipeline`]: ordered predicates producing a filtered view

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod aggregator;
mod error;
mod filter;
mod record;
mod settings;

pub use aggregator::{DiagnosticAggregator, DiagnosticCounters};
pub use error::RemediationError;
pub use filter::{
    FilterPipeline, RecordPredicate, ASSET_PATH_FILTER, MODULE_FILTER, SCENE_FILTER,
    SEVERITY_FILTER,
};
pub use record::{
    DiagnosticRecord, ModuleId, Origin, OriginTarget, RemediationAction, ISOLATED_STAGE_GROUP,
};
pub use settings::FilterSettings;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
