//! Capture command handler

use super::{acquire, release};
use crate::commands::CaptureArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use wyqa::inspect::{capture, CAPTURE_SETTLE, CAPTURE_VIEWPORT};
use wyqa::{CaptureOutcome, Launcher, SessionConfig};

/// Execute the capture command
pub fn execute_capture(
    config: &CliConfig,
    args: &CaptureArgs,
    launcher: &dyn Launcher,
) -> CliResult<CaptureOutcome> {
    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let session_config = SessionConfig::new(args.url.clone())
        .with_launch(args.browser.launch_options(CAPTURE_VIEWPORT))
        .with_settle(CAPTURE_SETTLE)
        .with_output_dir(args.output.clone());

    let mut session = acquire(session_config, launcher, &mut reporter)?;
    let outcome = capture(&mut session, args.quick);
    release(session);
    let outcome = outcome?;

    for path in &outcome.screenshots {
        reporter.success(&format!("Screenshot saved: {}", path.display()));
    }
    if let Some(path) = &outcome.report {
        reporter.success(&format!("Report saved: {}", path.display()));
    }
    Ok(outcome)
}
