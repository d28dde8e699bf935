//! wyqa CLI: verify web components in a live browser
//!
//! ## Usage
//!
//! ```bash
//! wyqa run --url http://localhost:8000            # Eight-phase suite
//! wyqa run --contracts                            # Plus color and token contracts
//! wyqa capture --url http://localhost:8000 -o out # Light/dark screenshots
//! wyqa inspect --url http://localhost:8000 --selector wy-controls-bar --contrast
//! ```

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wyqa::Launcher;
use wyqa_cli::handlers::{self, ContractKind};
use wyqa_cli::{Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);
    let launcher = launcher()?;

    match cli.command {
        Commands::Run(args) => {
            let report = handlers::execute_run(&config, &args, launcher.as_ref())?;
            handlers::ensure_passed(&report)
        }
        Commands::Capture(args) => {
            handlers::execute_capture(&config, &args, launcher.as_ref())?;
            Ok(())
        }
        Commands::Inspect(args) => {
            let output = handlers::execute_inspect(&config, &args, launcher.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Commands::Colors(args) => {
            let report = handlers::execute_contract(
                &config,
                &args,
                ContractKind::Colors,
                launcher.as_ref(),
            )?;
            handlers::ensure_passed(&report)
        }
        Commands::CssVars(args) => {
            let report = handlers::execute_contract(
                &config,
                &args,
                ContractKind::CssVars,
                launcher.as_ref(),
            )?;
            handlers::ensure_passed(&report)
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
}

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(feature = "browser")]
fn launcher() -> CliResult<Box<dyn Launcher>> {
    Ok(Box::new(wyqa::ChromiumLauncher::new()))
}

#[cfg(not(feature = "browser"))]
fn launcher() -> CliResult<Box<dyn Launcher>> {
    Err(wyqa_cli::CliError::config(
        "browser support not enabled. Rebuild with --features browser",
    ))
}
