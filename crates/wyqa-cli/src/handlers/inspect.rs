//! Inspect command handler

use super::{acquire, release};
use crate::commands::InspectArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use serde::Serialize;
use wyqa::inspect::{default_custom_properties, inspect, CAPTURE_SETTLE, CAPTURE_VIEWPORT};
use wyqa::{ContrastReport, ElementSnapshot, Launcher, SessionConfig};

/// What `inspect` prints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectOutput {
    /// Element snapshot
    pub element: ElementSnapshot,
    /// Contrast analysis, when requested and the colors parse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<ContrastReport>,
}

/// Execute the inspect command
pub fn execute_inspect(
    config: &CliConfig,
    args: &InspectArgs,
    launcher: &dyn Launcher,
) -> CliResult<InspectOutput> {
    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let session_config = SessionConfig::new(args.url.clone())
        .with_launch(args.browser.launch_options(CAPTURE_VIEWPORT))
        .with_color_scheme(args.color_scheme.into())
        .with_settle(CAPTURE_SETTLE);
    let properties = if args.properties.is_empty() {
        default_custom_properties()
    } else {
        args.properties.clone()
    };

    let mut session = acquire(session_config, launcher, &mut reporter)?;
    let element = inspect(
        &mut session,
        &args.selector,
        args.shadow_selector.as_deref(),
        &properties,
    );
    release(session);
    let element = element?;

    let contrast = if args.contrast {
        match element.contrast() {
            Ok(report) => Some(report),
            Err(e) => {
                reporter.warning(&format!("Could not calculate contrast: {e}"));
                None
            }
        }
    } else {
        None
    };
    Ok(InspectOutput { element, contrast })
}
