//! State of one in-flight scan

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use vigil_diagnostics::DiagnosticRecord;
use vigil_model::ContainerId;
use vigil_traverse::BatchSize;

/// How a session was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Background scan driven by ticks at the configured batching priority
    Autorun,

    /// Explicit full scan, unlimited batching, every module
    Full,
}

impl Display for ScanMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Autorun => f.write_str("autorun"),
            Self::Full => f.write_str("full"),
        }
    }
}

/// Progress of a session through the module list
///
/// Results are staged per module position and only replace the committed
/// set once the whole session finishes.
#[derive(Debug)]
pub(crate) struct ScanSession {
    pub(crate) generation: u64,
    pub(crate) mode: ScanMode,
    pub(crate) batch: BatchSize,
    pub(crate) roots: Vec<ContainerId>,
    pub(crate) module_index: usize,
    pub(crate) module_started: bool,
    staged: Vec<Option<Vec<DiagnosticRecord>>>,
}

impl ScanSession {
    pub(crate) fn new(
        generation: u64,
        mode: ScanMode,
        batch: BatchSize,
        roots: Vec<ContainerId>,
        modules: usize,
    ) -> Self {
        Self {
            generation,
            mode,
            batch,
            roots,
            module_index: 0,
            module_started: false,
            staged: vec![None; modules],
        }
    }

    /// Move past the current module without running it
    pub(crate) fn skip_module(&mut self) {
        self.module_index += 1;
        self.module_started = false;
    }

    /// Stage the current module's records and move on
    pub(crate) fn complete_module(&mut self, records: Vec<DiagnosticRecord>) {
        if let Some(slot) = self.staged.get_mut(self.module_index) {
            *slot = Some(records);
        }
        self.skip_module();
    }

    pub(crate) fn staged(&self, index: usize) -> Option<&[DiagnosticRecord]> {
        self.staged.get(index).and_then(Option::as_deref)
    }

    /// Final per-module result sets; skipped modules contribute nothing
    pub(crate) fn into_results(self) -> Vec<Vec<DiagnosticRecord>> {
        self.staged.into_iter().map(Option::unwrap_or_default).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_modules_commit_empty() {
        let mut session = ScanSession::new(1, ScanMode::Autorun, BatchSize::limited(10), vec![], 3);
        session.complete_module(vec![]);
        session.skip_module();
        assert!(session.staged(0).is_some());
        assert!(session.staged(1).is_none());
        assert_eq!(session.module_index, 2);
        let results = session.into_results();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(ScanMode::Autorun.to_string(), "autorun");
        assert_eq!(ScanMode::Full.to_string(), "full");
    }
}
