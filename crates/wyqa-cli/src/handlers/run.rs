//! Run command handler

use super::{load_component, run_suite};
use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use wyqa::{Launcher, Orchestrator, RunReport, SessionConfig, SettlePolicy, Viewport};

/// Session configuration for a suite run
pub fn session_config(args: &RunArgs) -> CliResult<SessionConfig> {
    let settle = if args.poll_settle {
        SettlePolicy::poll_ms(args.settle_ms)
    } else {
        SettlePolicy::fixed_ms(args.settle_ms)
    };
    Ok(SessionConfig::new(args.url.clone())
        .with_launch(args.browser.launch_options(Viewport::default()))
        .with_color_scheme(args.color_scheme.into())
        .with_settle(settle)
        .with_component(load_component(args.component.as_deref())?)
        .with_output_dir(args.output.clone()))
}

/// Execute the run command
pub fn execute_run(
    config: &CliConfig,
    args: &RunArgs,
    launcher: &dyn Launcher,
) -> CliResult<RunReport> {
    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let orchestrator = if args.contracts {
        Orchestrator::with_contracts()
    } else {
        Orchestrator::new()
    };
    tracing::info!(url = %args.url, phases = ?orchestrator.phase_names(), "starting run");
    run_suite(&orchestrator, session_config(args)?, launcher, &mut reporter)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Verbosity;
    use crate::error::CliError;
    use crate::handlers::ensure_passed;
    use clap::Parser;
    use wyqa::{MockLauncher, MockPage};

    fn args(dir: &std::path::Path, extra: &[&str]) -> RunArgs {
        let mut argv = vec![
            "run",
            "--url",
            "http://localhost:8000",
            "--settle-ms",
            "0",
            "--output",
            dir.to_str().unwrap(),
        ];
        argv.extend_from_slice(extra);
        RunArgs::parse_from(argv)
    }

    fn quiet() -> CliConfig {
        CliConfig::new().with_verbosity(Verbosity::Quiet)
    }

    #[test]
    fn test_healthy_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = MockLauncher::new(MockPage::new());
        let report = execute_run(&quiet(), &args(dir.path(), &[]), &launcher).unwrap();
        assert_eq!(report.summary().total, 8);
        assert!(ensure_passed(&report).is_ok());
        assert!(dir.path().join("test-report.json").exists());
        assert!(dir.path().join("modal-with-links.png").exists());
    }

    #[test]
    fn test_failed_phase_fails_command() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = MockLauncher::new(MockPage::new().failing("visibility"));
        let report = execute_run(&quiet(), &args(dir.path(), &[]), &launcher).unwrap();
        let err = ensure_passed(&report).unwrap_err();
        assert!(matches!(err, CliError::ChecksFailed { failed: 1, total: 8 }));
    }

    #[test]
    fn test_contracts_flag_adds_phases() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = MockLauncher::new(MockPage::new());
        let report =
            execute_run(&quiet(), &args(dir.path(), &["--contracts"]), &launcher).unwrap();
        assert_eq!(report.summary().total, 10);
    }

    #[test]
    fn test_launch_failure_writes_no_report() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = MockLauncher::unavailable("chromium not found");
        let err = execute_run(&quiet(), &args(dir.path(), &[]), &launcher).unwrap_err();
        assert!(matches!(err, CliError::Harness(_)));
        assert!(!dir.path().join("test-report.json").exists());
    }

    #[test]
    fn test_session_config_from_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = session_config(&args(
            dir.path(),
            &["--poll-settle", "--color-scheme", "dark", "--viewport-width", "1280"],
        ))
        .unwrap();
        assert!(matches!(config.settle, SettlePolicy::Poll { .. }));
        assert_eq!(config.color_scheme, wyqa::ColorScheme::Dark);
        assert_eq!(config.launch.viewport.width, 1280);
        assert_eq!(config.launch.viewport.height, 1080);
    }
}
