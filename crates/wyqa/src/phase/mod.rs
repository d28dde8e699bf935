//! Verification phases.
//!
//! Each phase drives the shared [`Session`] and records checks, issues and
//! notes into a [`PhaseRecorder`]. Phases never abort the run: an `Err` or a
//! panic escaping [`Phase::run`] becomes a single issue on that phase's
//! result.

mod contracts;
mod error_detection;
mod initialization;
mod integration;
mod interaction;
mod registration;
mod rendering;
mod state_machine;
mod visual;

pub use contracts::{ColorAccuracy, CssVariables, ReferenceColor};
pub use error_detection::ErrorDetection;
pub use initialization::Initialization;
pub use integration::Integration;
pub use interaction::Interaction;
pub use registration::Registration;
pub use rendering::Rendering;
pub use state_machine::StateMachine;
pub use visual::Visual;

use crate::driver::Probe;
use crate::manifest::Manifest;
use crate::orchestrator::RunObserver;
use crate::result::HarnessResult;
use crate::session::{SettlePoint, Session};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Outcome of one check inside a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Behaved as expected
    Pass,
    /// Did not behave as expected; carries an issue
    Fail,
    /// Could not be decided automatically
    Inconclusive,
}

/// A labelled check and its verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRecord {
    /// What was checked
    pub label: String,
    /// Outcome
    pub verdict: Verdict,
    /// Issue or caveat text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Result of one phase. `passed` is derived when the result is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResult {
    #[serde(rename = "test")]
    name: String,
    passed: bool,
    issues: Vec<String>,
    notes: Vec<String>,
    checks: Vec<CheckRecord>,
    artifacts: Vec<PathBuf>,
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl PhaseResult {
    /// Build a result; a phase fails when it has issues or faulted
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        issues: Vec<String>,
        notes: Vec<String>,
        checks: Vec<CheckRecord>,
        artifacts: Vec<PathBuf>,
        faulted: bool,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            passed: issues.is_empty() && !faulted,
            issues,
            notes,
            checks,
            artifacts,
            duration,
        }
    }

    /// Phase name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// No issues and no fault
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// Issues in the order they were found
    #[must_use]
    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    /// Non-failing audit output
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Every check with its verdict
    #[must_use]
    pub fn checks(&self) -> &[CheckRecord] {
        &self.checks
    }

    /// Files written by the phase
    #[must_use]
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Wall-clock time spent
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

/// Accumulates a phase's findings and forwards them to the observer
pub struct PhaseRecorder<'a> {
    issues: Vec<String>,
    notes: Vec<String>,
    checks: Vec<CheckRecord>,
    artifacts: Vec<PathBuf>,
    observer: &'a mut dyn RunObserver,
}

impl std::fmt::Debug for PhaseRecorder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseRecorder")
            .field("issues", &self.issues)
            .field("checks", &self.checks.len())
            .finish_non_exhaustive()
    }
}

impl<'a> PhaseRecorder<'a> {
    /// Create a recorder reporting to `observer`
    pub fn new(observer: &'a mut dyn RunObserver) -> Self {
        Self {
            issues: Vec::new(),
            notes: Vec::new(),
            checks: Vec::new(),
            artifacts: Vec::new(),
            observer,
        }
    }

    fn push(&mut self, label: &str, verdict: Verdict, detail: Option<String>) {
        let record = CheckRecord {
            label: label.to_string(),
            verdict,
            detail,
        };
        self.observer.check(&record);
        self.checks.push(record);
    }

    /// Record a passing check
    pub fn pass(&mut self, label: &str) {
        self.push(label, Verdict::Pass, None);
    }

    /// Record a failing check and its issue
    pub fn fail(&mut self, label: &str, issue: impl Into<String>) {
        let issue = issue.into();
        tracing::debug!(check = label, "{issue}");
        self.issues.push(issue.clone());
        self.push(label, Verdict::Fail, Some(issue));
    }

    /// Pass when `ok`, otherwise fail with `issue`
    pub fn expect(&mut self, ok: bool, label: &str, issue: impl FnOnce() -> String) {
        if ok {
            self.pass(label);
        } else {
            self.fail(label, issue());
        }
    }

    /// Record a check that could not be decided; it neither passes nor
    /// fails the phase
    pub fn inconclusive(&mut self, label: &str, caveat: impl Into<String>) {
        self.push(label, Verdict::Inconclusive, Some(caveat.into()));
    }

    /// Record non-failing audit output
    pub fn note(&mut self, note: impl Into<String>) {
        let note = note.into();
        self.observer.note(&note);
        self.notes.push(note);
    }

    /// Record a written file
    pub fn artifact(&mut self, path: PathBuf) {
        self.notes.push(format!("Screenshot saved: {}", path.display()));
        self.artifacts.push(path);
    }

    /// Issues recorded so far
    #[must_use]
    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    fn finish(mut self, name: &str, fault: Option<String>, duration: Duration) -> PhaseResult {
        let faulted = fault.is_some();
        if let Some(fault) = fault {
            self.issues.push(fault);
        }
        PhaseResult::new(
            name,
            self.issues,
            self.notes,
            self.checks,
            self.artifacts,
            faulted,
            duration,
        )
    }
}

/// One independent verification step
pub trait Phase {
    /// Identifier used in reports
    fn name(&self) -> &'static str;

    /// Heading shown on the console
    fn title(&self) -> &'static str;

    /// Drive the session and record findings
    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()>;
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Run a phase, trapping errors and panics into a single issue
pub fn run_phase(
    phase: &dyn Phase,
    session: &mut Session,
    observer: &mut dyn RunObserver,
) -> PhaseResult {
    let started = Instant::now();
    let mut rec = PhaseRecorder::new(observer);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| phase.run(session, &mut rec)));
    let fault = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(format!("Exception during {}: {e}", phase.name())),
        Err(payload) => Some(format!(
            "Exception during {}: panic: {}",
            phase.name(),
            panic_message(payload.as_ref())
        )),
    };
    if let Some(ref fault) = fault {
        tracing::warn!(phase = phase.name(), "{fault}");
    }
    let result = rec.finish(phase.name(), fault, started.elapsed());
    tracing::info!(
        phase = result.name(),
        passed = result.passed(),
        issues = result.issues().len(),
        "phase finished"
    );
    result
}

/// The eight core phases in execution order
#[must_use]
pub fn core_phases() -> Vec<Box<dyn Phase>> {
    vec![
        Box::new(Registration),
        Box::new(Initialization),
        Box::new(StateMachine),
        Box::new(Rendering),
        Box::new(Interaction),
        Box::new(Visual),
        Box::new(Integration),
        Box::new(ErrorDetection::default()),
    ]
}

/// Reference-palette and custom-property contract phases
#[must_use]
pub fn contract_phases() -> Vec<Box<dyn Phase>> {
    vec![
        Box::new(ColorAccuracy::default()),
        Box::new(CssVariables::default()),
    ]
}

/// Fetch the manifest, recording an issue when it cannot be loaded
pub(crate) fn load_manifest(
    session: &mut Session,
    rec: &mut PhaseRecorder<'_>,
) -> HarnessResult<Option<Manifest>> {
    let url = session.component().manifest_url.clone();
    let manifest: Option<Manifest> = session.query(Probe::FetchManifest)?;
    match manifest {
        Some(manifest) if !manifest.is_empty() => {
            rec.note(format!("Loaded {} categories from {url}", manifest.len()));
            Ok(Some(manifest))
        }
        _ => {
            rec.fail("manifest loaded", format!("Could not load {url}"));
            Ok(None)
        }
    }
}

/// Load the manifest, assign it to the instance and open it
pub(crate) fn open_with_manifest(
    session: &mut Session,
    rec: &mut PhaseRecorder<'_>,
) -> HarnessResult<Option<Manifest>> {
    let Some(manifest) = load_manifest(session, rec)? else {
        return Ok(None);
    };
    session.perform(Probe::AssignManifest {
        manifest: manifest.clone(),
        open: true,
    })?;
    session.settle(SettlePoint::Open);
    Ok(Some(manifest))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::driver::{MockLauncher, MockPage};
    use crate::orchestrator::SilentObserver;
    use crate::session::{SessionConfig, SettlePolicy};

    /// Acquire a session over a mock page writing into `dir`
    pub fn session(page: MockPage, dir: &std::path::Path) -> (Session, MockLauncher) {
        let launcher = MockLauncher::new(page);
        let config = SessionConfig::new("http://localhost:8000")
            .with_settle(SettlePolicy::fixed_ms(0))
            .with_output_dir(dir);
        let session = Session::acquire(config, &launcher).unwrap();
        (session, launcher)
    }

    /// Run one phase against a fresh mock session
    pub fn run(phase: &dyn Phase, page: MockPage) -> PhaseResult {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _launcher) = session(page, dir.path());
        run_phase(phase, &mut session, &mut SilentObserver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockPage;
    use crate::orchestrator::SilentObserver;

    struct Faulty;

    impl Phase for Faulty {
        fn name(&self) -> &'static str {
            "faulty"
        }

        fn title(&self) -> &'static str {
            "Faulty"
        }

        fn run(&self, _session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
            rec.fail("first", "first issue");
            Err(crate::result::HarnessError::Timeout { ms: 10 })
        }
    }

    struct Panicky;

    impl Phase for Panicky {
        fn name(&self) -> &'static str {
            "panicky"
        }

        fn title(&self) -> &'static str {
            "Panicky"
        }

        fn run(&self, _session: &mut Session, _rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
            panic!("boom");
        }
    }

    mod result_tests {
        use super::*;

        #[test]
        fn test_passed_is_derived() {
            let ok = PhaseResult::new("a", vec![], vec![], vec![], vec![], false, Duration::ZERO);
            let issue = PhaseResult::new(
                "b",
                vec!["x".to_string()],
                vec![],
                vec![],
                vec![],
                false,
                Duration::ZERO,
            );
            let fault = PhaseResult::new("c", vec![], vec![], vec![], vec![], true, Duration::ZERO);
            assert!(ok.passed());
            assert!(!issue.passed());
            assert!(!fault.passed());
        }

        #[test]
        fn test_serialized_shape() {
            let result = PhaseResult::new(
                "integration",
                vec![],
                vec!["n".to_string()],
                vec![],
                vec![],
                false,
                Duration::from_millis(12),
            );
            let json = serde_json::to_value(&result).unwrap();
            assert_eq!(json["test"], "integration");
            assert_eq!(json["passed"], true);
            assert_eq!(json["durationMs"], 12);
            assert_eq!(json["notes"][0], "n");
        }
    }

    mod fault_tests {
        use super::*;

        #[test]
        fn test_error_adds_one_issue_after_prior_ones() {
            let result = testing::run(&Faulty, MockPage::new());
            assert!(!result.passed());
            assert_eq!(result.issues().len(), 2);
            assert_eq!(result.issues()[0], "first issue");
            assert!(result.issues()[1].contains("timed out"));
        }

        #[test]
        fn test_panic_is_trapped() {
            let result = testing::run(&Panicky, MockPage::new());
            assert!(!result.passed());
            assert_eq!(result.issues().len(), 1);
            assert!(result.issues()[0].contains("panic: boom"));
        }
    }

    mod recorder_tests {
        use super::*;

        #[test]
        fn test_inconclusive_does_not_fail() {
            let mut observer = SilentObserver;
            let mut rec = PhaseRecorder::new(&mut observer);
            rec.pass("a");
            rec.inconclusive("b", "check manually");
            let result = rec.finish("x", None, Duration::ZERO);
            assert!(result.passed());
            assert_eq!(result.checks()[1].verdict, Verdict::Inconclusive);
        }

        #[test]
        fn test_expect_records_issue_lazily() {
            let mut observer = SilentObserver;
            let mut rec = PhaseRecorder::new(&mut observer);
            rec.expect(true, "ok", || unreachable!());
            rec.expect(false, "bad", || "went wrong".to_string());
            assert_eq!(rec.issues(), ["went wrong".to_string()]);
        }
    }

    #[test]
    fn test_catalog_order() {
        let names: Vec<_> = core_phases().iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            [
                "component_registration",
                "component_initialization",
                "modal_open_close",
                "link_rendering",
                "link_clicks",
                "visual_rendering",
                "integration",
                "error_detection",
            ]
        );
        let contracts: Vec<_> = contract_phases().iter().map(|p| p.name()).collect();
        assert_eq!(contracts, ["color_accuracy", "css_variables"]);
    }
}
