//! Command handlers - extracted from main.rs for testability
//!
//! Every handler takes the [`Launcher`] to use, so tests drive them with the
//! in-memory mock page and `main` with chromium.

pub mod capture;
pub mod contracts;
pub mod inspect;
pub mod run;

pub use capture::execute_capture;
pub use contracts::{execute_contract, ContractKind};
pub use inspect::{execute_inspect, InspectOutput};
pub use run::execute_run;

use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use std::path::Path;
use wyqa::{
    ComponentSpec, Launcher, Orchestrator, RunReport, Session, SessionConfig,
};

/// Load a component description, or the built-in links modal when none is given
pub fn load_component(path: Option<&Path>) -> CliResult<ComponentSpec> {
    match path {
        Some(path) => ComponentSpec::from_yaml_file(path)
            .map_err(|e| CliError::config(format!("{}: {e}", path.display()))),
        None => Ok(ComponentSpec::default()),
    }
}

/// Fail the command when any phase failed
pub fn ensure_passed(report: &RunReport) -> CliResult<()> {
    let summary = report.summary();
    if summary.failed > 0 {
        return Err(CliError::ChecksFailed {
            failed: summary.failed,
            total: summary.total,
        });
    }
    Ok(())
}

/// Launch and navigate behind a spinner
pub fn acquire(
    config: SessionConfig,
    launcher: &dyn Launcher,
    reporter: &mut ProgressReporter,
) -> CliResult<Session> {
    reporter.start_spinner(&format!("Loading {}", config.url));
    let session = Session::acquire(config, launcher);
    reporter.stop_spinner();
    Ok(session?)
}

/// Close the browser, logging instead of failing
pub fn release(session: Session) {
    if let Err(e) = session.release() {
        tracing::warn!("failed to release session: {e}");
    }
}

/// Run a phase catalog, write the report and print the summary
pub fn run_suite(
    orchestrator: &Orchestrator,
    config: SessionConfig,
    launcher: &dyn Launcher,
    reporter: &mut ProgressReporter,
) -> CliResult<RunReport> {
    let url = config.url.clone();
    let output_dir = config.output_dir.clone();

    let mut session = acquire(config, launcher, reporter)?;
    let results = orchestrator.execute(&mut session, reporter);
    release(session);

    let report = RunReport::new(url, results);
    let path = report.write_to(&output_dir)?;
    reporter.summary(&report, Some(&path));
    Ok(report)
}
