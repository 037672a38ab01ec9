//! Error types for the engine
//!
//! Only session preconditions, registry misuse, remediation requests and
//! configuration/document I/O surface as [`EngineError`]. Per-node failures
//! are always recorded as diagnostic records instead.

use std::path::PathBuf;
use vigil_diagnostics::{ModuleId, RemediationError};
use vigil_model::GraphError;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Scan requested with an empty module registry
    #[error("no validator modules registered")]
    NoModules,

    /// Host could not supply the root container set
    #[error("root container set unavailable")]
    RootSetUnavailable,

    /// A module with the same id is already registered
    #[error("module already registered: {0}")]
    DuplicateModule(ModuleId),

    /// No visible record at this index
    #[error("no diagnostic record at index {0}")]
    RecordIndex(usize),

    /// A fix action failed
    #[error("remediation failed: {0}")]
    Remediation(#[from] RemediationError),

    /// File could not be read or written
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("cannot serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Scene document is not valid JSON for the expected shape
    #[error("invalid scene document: {0}")]
    Document(#[from] serde_json::Error),

    /// Scene document describes an inconsistent graph
    #[error("scene document error: {0}")]
    Graph(#[from] GraphError),
}

impl EngineError {
    /// Check if the error aborts a scan session
    #[inline]
    #[must_use]
    pub fn is_fatal_precondition(&self) -> bool {
        matches!(self, Self::NoModules | Self::RootSetUnavailable)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
