//! Runs the phase catalog against one session.

use crate::driver::Launcher;
use crate::phase::{self, CheckRecord, Phase, PhaseResult};
use crate::report::RunReport;
use crate::result::HarnessResult;
use crate::session::{Session, SessionConfig};

/// Receives progress while a run executes
pub trait RunObserver {
    /// A phase is about to run (`index` is 1-based)
    fn phase_started(&mut self, _index: usize, _total: usize, _title: &str) {}

    /// A check inside the current phase was decided
    fn check(&mut self, _check: &CheckRecord) {}

    /// The current phase recorded a note
    fn note(&mut self, _note: &str) {}

    /// A phase finished
    fn phase_finished(&mut self, _result: &PhaseResult) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

/// Ordered phase catalog
pub struct Orchestrator {
    phases: Vec<Box<dyn Phase>>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("phases", &self.phase_names())
            .finish()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// The eight core phases
    #[must_use]
    pub fn new() -> Self {
        Self::from_phases(phase::core_phases())
    }

    /// Core phases followed by the contract phases
    #[must_use]
    pub fn with_contracts() -> Self {
        let mut phases = phase::core_phases();
        phases.extend(phase::contract_phases());
        Self::from_phases(phases)
    }

    /// An explicit list of phases, run in the given order
    #[must_use]
    pub fn from_phases(phases: Vec<Box<dyn Phase>>) -> Self {
        Self { phases }
    }

    /// Phase names in execution order
    #[must_use]
    pub fn phase_names(&self) -> Vec<&'static str> {
        self.phases.iter().map(|p| p.name()).collect()
    }

    /// Run every phase against an open session. A failing phase never
    /// stops the ones after it.
    pub fn execute(
        &self,
        session: &mut Session,
        observer: &mut dyn RunObserver,
    ) -> Vec<PhaseResult> {
        let total = self.phases.len();
        let mut results = Vec::with_capacity(total);
        for (i, phase) in self.phases.iter().enumerate() {
            observer.phase_started(i + 1, total, phase.title());
            let result = phase::run_phase(phase.as_ref(), session, observer);
            observer.phase_finished(&result);
            results.push(result);
        }
        results
    }

    /// Acquire a session, run the catalog, release the session and build
    /// the report. Only acquisition errors are returned.
    pub fn run(
        &self,
        config: SessionConfig,
        launcher: &dyn Launcher,
        observer: &mut dyn RunObserver,
    ) -> HarnessResult<RunReport> {
        let url = config.url.clone();
        let mut session = Session::acquire(config, launcher)?;
        let results = self.execute(&mut session, observer);
        if let Err(e) = session.release() {
            tracing::warn!("failed to release session: {e}");
        }
        Ok(RunReport::new(url, results))
    }
}
