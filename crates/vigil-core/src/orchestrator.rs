//! Scan orchestrator
//!
//! Drives registered modules one after another inside a scan session,
//! one batch slice per [`Orchestrator::tick`]. Module results become
//! visible as each module completes; the merged list is committed when the
//! session finishes. Starting a new session (or a structural change in the
//! host) cancels the in-flight one and restores the committed results.
//!
//! Listeners receive [`ScanEvent`]s synchronously and cannot call back into
//! the orchestrator.

use tracing::{debug, info, info_span, trace, warn};
use vigil_diagnostics::{
    DiagnosticAggregator, DiagnosticCounters, DiagnosticRecord, FilterPipeline, ModuleId,
};
use vigil_model::ComponentId;
use vigil_traverse::{BatchSize, Step};

use crate::config::ValidatorConfig;
use crate::error::{EngineError, Result};
use crate::host::HostGraph;
use crate::module::{LiveUpdate, ScanContext};
use crate::registry::ModuleRegistry;
use crate::session::{ScanMode, ScanSession};

/// Whether a session is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrchestratorState {
    /// No session
    Idle,

    /// A session is in flight
    Scanning,
}

/// Outcome of driving the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing to do
    Idle,

    /// The session stopped at a batch boundary
    Suspended,

    /// The session finished and its results are committed
    Finished,
}

/// Notification sent to listeners
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// Session started
    Started {
        /// Session generation
        generation: u64,
        /// How it was started
        mode: ScanMode,
    },

    /// Full scan is about to run a module
    Progress {
        /// Session generation
        generation: u64,
        /// Position of the module
        module_index: usize,
        /// Number of registered modules
        total: usize,
        /// Module about to run
        module: ModuleId,
    },

    /// A module completed and its records are visible
    ModuleCompleted {
        /// Session generation
        generation: u64,
        /// Completed module
        module: ModuleId,
        /// Records it produced
        records: usize,
    },

    /// The visible record list changed
    ResultsChanged {
        /// Visible record count
        total: usize,
    },

    /// Session was cancelled before finishing
    Cancelled {
        /// Session generation
        generation: u64,
    },

    /// Session finished and its results are committed
    Finished {
        /// Session generation
        generation: u64,
        /// Committed record count
        records: usize,
    },
}

impl ScanEvent {
    /// Completion fraction for progress events, never reaching 1.0
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> Option<f64> {
        match self {
            Self::Progress {
                module_index, total, ..
            } => Some((*module_index + 1) as f64 / (*total + 1) as f64),
            _ => None,
        }
    }
}

/// Handle returned by [`Orchestrator::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ScanEvent)>;

/// Owns the module registry, the visible record list and the aggregator
pub struct Orchestrator {
    registry: ModuleRegistry,
    config: ValidatorConfig,
    session: Option<ScanSession>,
    committed: Vec<Vec<DiagnosticRecord>>,
    records: Vec<DiagnosticRecord>,
    aggregator: DiagnosticAggregator,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    generation: u64,
}

impl Orchestrator {
    /// Create orchestrator; module ids are tracked for counting and filtering
    #[must_use]
    pub fn new(registry: ModuleRegistry, config: ValidatorConfig) -> Self {
        let mut orchestrator = Self {
            committed: vec![Vec::new(); registry.len()],
            registry,
            config,
            session: None,
            records: Vec::new(),
            aggregator: DiagnosticAggregator::new(),
            listeners: Vec::new(),
            next_listener: 0,
            generation: 0,
        };
        for id in orchestrator.registry.ids() {
            orchestrator.aggregator.track_module(&id);
            orchestrator.config.filters.register_module(id.as_str());
        }
        let prefixes: Vec<String> = orchestrator.config.filters.asset_paths.keys().cloned().collect();
        for prefix in &prefixes {
            orchestrator.aggregator.track_asset_path(prefix);
        }
        orchestrator
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> OrchestratorState {
        if self.session.is_some() {
            OrchestratorState::Scanning
        } else {
            OrchestratorState::Idle
        }
    }

    /// Generation of the most recently started session
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Registered modules
    #[inline]
    #[must_use]
    pub fn modules(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Mutable configuration (filters, autorun, batching)
    #[inline]
    pub fn config_mut(&mut self) -> &mut ValidatorConfig {
        &mut self.config
    }

    /// Start tracking an asset path prefix in counters and filters
    pub fn track_asset_path(&mut self, prefix: &str) {
        self.config.filters.add_asset_path(prefix);
        self.aggregator.track_asset_path(prefix);
        self.aggregator.recompute(&self.records);
    }

    /// Stop tracking an asset path prefix
    pub fn untrack_asset_path(&mut self, prefix: &str) -> bool {
        let removed = self.config.filters.remove_asset_path(prefix);
        self.aggregator.untrack_asset_path(prefix);
        self.aggregator.recompute(&self.records);
        removed
    }

    /// Visible records in module order
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[DiagnosticRecord] {
        &self.records
    }

    /// Counters over the visible records
    #[inline]
    #[must_use]
    pub fn counters(&self) -> &DiagnosticCounters {
        self.aggregator.counters()
    }

    /// Module, severity and scene filters from the current settings
    #[must_use]
    pub fn pipeline(&self) -> FilterPipeline {
        FilterPipeline::from_settings(&self.config.filters).with_scene_filter(&self.config.filters)
    }

    /// Visible records accepted by `pipeline`
    #[must_use]
    pub fn filtered(&self, pipeline: &FilterPipeline) -> Vec<&DiagnosticRecord> {
        self.aggregator.filtered(&self.records, pipeline)
    }

    /// Register a listener
    pub fn subscribe(&mut self, listener: impl FnMut(&ScanEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    /// Cancel any session and drop every listener
    pub fn dispose(&mut self) {
        self.cancel();
        self.listeners.clear();
        debug!("orchestrator disposed");
    }

    /// Start an explicit full scan without running it
    ///
    /// Any in-flight session is cancelled first. Returns the new generation.
    ///
    /// # Errors
    /// Fails with [`EngineError::NoModules`] or
    /// [`EngineError::RootSetUnavailable`]; the in-flight session is kept
    pub fn request_full_scan(&mut self, host: &dyn HostGraph) -> Result<u64> {
        self.start_session(host, ScanMode::Full)
    }

    /// Run an explicit full scan to completion
    ///
    /// # Errors
    /// Same preconditions as [`request_full_scan`](Self::request_full_scan)
    pub fn run_full_scan(&mut self, host: &dyn HostGraph) -> Result<u64> {
        let generation = self.request_full_scan(host)?;
        while self.drive(host) == SessionStatus::Suspended {}
        Ok(generation)
    }

    /// Advance by one slice; starts an autorun session when idle and enabled
    ///
    /// # Errors
    /// Fails if an autorun session cannot start
    pub fn tick(&mut self, host: &dyn HostGraph) -> Result<SessionStatus> {
        if self.session.is_none() {
            if !self.config.autorun {
                return Ok(SessionStatus::Idle);
            }
            self.start_session(host, ScanMode::Autorun)?;
        }
        Ok(self.drive(host))
    }

    /// Cancel the in-flight session; staged results are discarded
    pub fn cancel(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        info!(generation = session.generation, mode = %session.mode, "scan cancelled");
        self.publish(None);
        self.emit(&ScanEvent::Cancelled {
            generation: session.generation,
        });
        self.emit(&ScanEvent::ResultsChanged {
            total: self.records.len(),
        });
        true
    }

    /// Host reported a structural change (load, unload, edit mode switch)
    pub fn on_structural_change(&mut self) {
        if self.cancel() {
            debug!("structural change cancelled in-flight scan");
        }
    }

    /// Run the fix of a visible record
    ///
    /// # Errors
    /// Fails if there is no such record, it has no fix, or the fix fails
    pub fn apply_fix(&self, index: usize) -> Result<()> {
        let record = self.records.get(index).ok_or(EngineError::RecordIndex(index))?;
        let fix = record.fix().ok_or(vigil_diagnostics::RemediationError::NoFix)?;
        if let Err(err) = fix.run() {
            warn!(%err, fix = fix.label(), "fix failed");
            return Err(err.into());
        }
        info!(fix = fix.label(), module = %record.module(), "fix applied");
        Ok(())
    }

    /// Re-check watched fields of a component after its values changed
    #[must_use]
    pub fn reevaluate(&self, component: ComponentId, host: &dyn HostGraph) -> Vec<LiveUpdate> {
        let ctx = ScanContext::from_host(host);
        self.registry
            .iter()
            .flat_map(|m| m.reevaluate(component, &ctx))
            .collect()
    }

    fn start_session(&mut self, host: &dyn HostGraph, mode: ScanMode) -> Result<u64> {
        if self.registry.is_empty() {
            warn!(%mode, "scan aborted: no modules registered");
            return Err(EngineError::NoModules);
        }
        let Some(roots) = host.root_set() else {
            warn!(%mode, "scan aborted: root set unavailable");
            return Err(EngineError::RootSetUnavailable);
        };
        self.cancel();

        for group in host.graph().root_groups() {
            self.aggregator.track_scene(group);
            self.config.filters.register_scene(group);
        }
        let batch = match mode {
            ScanMode::Full => BatchSize::Unlimited,
            ScanMode::Autorun => self.config.batch_size(),
        };
        self.generation += 1;
        info!(generation = self.generation, %mode, %batch, roots = roots.len(), "scan started");
        self.session = Some(ScanSession::new(
            self.generation,
            mode,
            batch,
            roots,
            self.registry.len(),
        ));
        self.emit(&ScanEvent::Started {
            generation: self.generation,
            mode,
        });
        Ok(self.generation)
    }

    fn drive(&mut self, host: &dyn HostGraph) -> SessionStatus {
        let Some(mut session) = self.session.take() else {
            return SessionStatus::Idle;
        };
        let span = info_span!("scan", generation = session.generation, mode = %session.mode);
        let _guard = span.enter();
        let ctx = ScanContext::from_host(host);
        let total = self.registry.len();

        while session.module_index < total {
            let index = session.module_index;
            let Some(module) = self.registry.get_mut(index) else {
                break;
            };
            let id = module.id();
            if session.mode == ScanMode::Autorun && module.capabilities().full_scan_only {
                trace!(module = %id, "full-scan-only module skipped");
                session.skip_module();
                continue;
            }
            if !session.module_started {
                module.begin_scan(&session.roots, session.batch);
                session.module_started = true;
                if session.mode == ScanMode::Full {
                    self.emit(&ScanEvent::Progress {
                        generation: session.generation,
                        module_index: index,
                        total,
                        module: id.clone(),
                    });
                }
            }
            let Some(module) = self.registry.get_mut(index) else {
                break;
            };
            if module.resume(&ctx) == Step::Suspended {
                trace!(module = %id, "scan suspended");
                self.session = Some(session);
                return SessionStatus::Suspended;
            }
            let records = module.logs().to_vec();
            let count = records.len();
            debug!(module = %id, records = count, "module completed");
            session.complete_module(records);
            self.publish(Some(&session));
            self.emit(&ScanEvent::ModuleCompleted {
                generation: session.generation,
                module: id,
                records: count,
            });
            self.emit(&ScanEvent::ResultsChanged {
                total: self.records.len(),
            });
        }

        let generation = session.generation;
        self.committed = session.into_results();
        self.publish(None);
        info!(records = self.records.len(), "scan finished");
        self.emit(&ScanEvent::ResultsChanged {
            total: self.records.len(),
        });
        self.emit(&ScanEvent::Finished {
            generation,
            records: self.records.len(),
        });
        SessionStatus::Finished
    }

    /// Rebuild the visible list: staged results where a module already
    /// completed in this session, committed results elsewhere
    fn publish(&mut self, session: Option<&ScanSession>) {
        self.records = self
            .committed
            .iter()
            .enumerate()
            .flat_map(|(i, committed)| {
                session
                    .and_then(|s| s.staged(i))
                    .unwrap_or(committed.as_slice())
            })
            .cloned()
            .collect();
        self.aggregator.recompute(&self.records);
    }

    fn emit(&mut self, event: &ScanEvent) {
        trace!(?event, "scan event");
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("modules", &self.registry)
            .field("state", &self.state())
            .field("generation", &self.generation)
            .field("records", &self.records.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
