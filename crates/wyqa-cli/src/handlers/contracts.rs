//! Standalone color and design-token contract commands

use super::{load_component, run_suite};
use crate::commands::ContractArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use wyqa::phase::{ColorAccuracy, CssVariables};
use wyqa::{Launcher, Orchestrator, Phase, RunReport, SessionConfig, SettlePolicy, Viewport};

/// Which contract phase to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    /// Reference palette comparison
    Colors,
    /// Design-token resolution
    CssVars,
}

impl ContractKind {
    fn phase(self) -> Box<dyn Phase> {
        match self {
            Self::Colors => Box::new(ColorAccuracy::default()),
            Self::CssVars => Box::new(CssVariables::default()),
        }
    }
}

/// Execute `colors` or `css-vars`
pub fn execute_contract(
    config: &CliConfig,
    args: &ContractArgs,
    kind: ContractKind,
    launcher: &dyn Launcher,
) -> CliResult<RunReport> {
    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let session = SessionConfig::new(args.url.clone())
        .with_launch(args.browser.launch_options(Viewport::default()))
        .with_settle(SettlePolicy::fixed_ms(args.settle_ms))
        .with_component(load_component(args.component.as_deref())?)
        .with_output_dir(args.output.clone());
    let orchestrator = Orchestrator::from_phases(vec![kind.phase()]);
    run_suite(&orchestrator, session, launcher, &mut reporter)
}
