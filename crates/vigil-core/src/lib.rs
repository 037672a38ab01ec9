//! Vigil Core - validator modules and the scan orchestrator
//!
//! Ties the object model, the batched walks, the diagnostics layer and the
//! condition evaluator together into a cooperative validation engine.
//!
//! # Core Concepts
//!
//! - **Module**: a resumable generator producing diagnostic records
//!   ([`ValidatorModule`]); most are built from a per-node check wrapped in
//!   [`ContainerBatchedModule`] or [`FieldBatchedModule`]
//! - **Registry**: the ordered module list ([`ModuleRegistry`])
//! - **Orchestrator**: runs modules in scan sessions, one batch slice per
//!   tick, and owns the visible record list and its counters
//!   ([`Orchestrator`])
//! - **Host**: supplies the graph, type table and root set ([`HostGraph`])
//!
//! # Example
//!
//! ```rust
//! use vigil_core::{ModuleRegistry, Orchestrator, SceneDocument, ValidatorConfig};
//!
//! # fn main() -> Result<(), vigil_core::EngineError> {
//! let world = SceneDocument::from_json(r#"{
//!     "containers": [{ "name": "Hall", "group": "Main",
//!                      "components": [{ "missing": "OldScript" }] }]
//! }"#)?
//! .into_world()?;
//!
//! let registry = ModuleRegistry::with_defaults(world.features().clone());
//! let mut orchestrator = Orchestrator::new(registry, ValidatorConfig::default());
//! orchestrator.run_full_scan(&world)?;
//! assert_eq!(orchestrator.counters().total(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod batched;
mod config;
mod document;
mod error;
mod host;
mod module;
pub mod modules;
mod orchestrator;
mod registry;
mod session;

pub use batched::{
    ContainerBatchedModule, ContainerCheck, FieldBatchedModule, FieldCheck, FieldOffer, FieldRole,
};
pub use config::{ConfigStore, MemoryStore, TomlFileStore, ValidatorConfig};
pub use document::{
    ComponentDoc, ContainerDoc, FieldDoc, MissingDoc, SceneDocument, TypeDoc, DEFAULT_GROUP,
};
pub use error::{EngineError, Result};
pub use host::{FeatureSwitch, HostGraph, World};
pub use module::{LiveUpdate, ModuleCapabilities, ScanContext, ValidatorModule};
pub use orchestrator::{ListenerId, Orchestrator, OrchestratorState, ScanEvent, SessionStatus};
pub use registry::ModuleRegistry;
pub use session::ScanMode;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosting the engine
    pub use crate::{
        HostGraph, ModuleRegistry, Orchestrator, ScanEvent, SceneDocument, SessionStatus,
        ValidatorConfig, ValidatorModule, World,
    };
    pub use vigil_diagnostics::{DiagnosticRecord, FilterPipeline, Origin};
    pub use vigil_model::{Severity, Value};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
