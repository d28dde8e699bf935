//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wyqa::{ColorScheme, LaunchOptions, Viewport};

/// Default target page
pub const DEFAULT_URL: &str = "http://localhost:8000";

/// Default directory for reports and screenshots
pub const DEFAULT_OUTPUT: &str = "/tmp/links-modal-test";

/// wyqa: verify web components in a live browser
#[derive(Parser, Debug)]
#[command(name = "wyqa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the verification suite against the component
    Run(RunArgs),

    /// Capture light/dark screenshots and an element inventory
    Capture(CaptureArgs),

    /// Inspect the computed styles of one element
    Inspect(InspectArgs),

    /// Compare computed colors against the reference palette
    Colors(ContractArgs),

    /// Check design-token resolution
    CssVars(ContractArgs),
}

/// Browser launch flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct BrowserArgs {
    /// Viewport width in CSS pixels
    #[arg(long)]
    pub viewport_width: Option<u32>,

    /// Viewport height in CSS pixels
    #[arg(long)]
    pub viewport_height: Option<u32>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Path to the chromium binary
    #[arg(long, env = "WYQA_CHROMIUM")]
    pub chromium: Option<String>,
}

impl BrowserArgs {
    /// Launch options with `fallback` for any viewport dimension not given
    #[must_use]
    pub fn launch_options(&self, fallback: Viewport) -> LaunchOptions {
        let mut options = LaunchOptions::default()
            .with_viewport(
                self.viewport_width.unwrap_or(fallback.width),
                self.viewport_height.unwrap_or(fallback.height),
            )
            .with_headless(!self.headed);
        if self.no_sandbox {
            options = options.with_no_sandbox();
        }
        if let Some(path) = &self.chromium {
            options = options.with_chromium_path(path.clone());
        }
        options
    }
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// URL of the page hosting the component
    #[arg(long, env = "WYQA_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Output directory for the report and screenshots
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Color scheme emulated for the run
    #[arg(long, default_value = "light")]
    pub color_scheme: SchemeArg,

    /// YAML description of the component under test
    #[arg(long)]
    pub component: Option<PathBuf>,

    /// Also run the color and design-token contract phases
    #[arg(long)]
    pub contracts: bool,

    /// Wait after opening the component in milliseconds (upper bound with --poll-settle)
    #[arg(long, default_value = "500")]
    pub settle_ms: u64,

    /// Poll for a stable render instead of waiting a fixed delay
    #[arg(long)]
    pub poll_settle: bool,

    /// Browser launch flags
    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Arguments for the capture command
#[derive(Parser, Debug)]
pub struct CaptureArgs {
    /// URL to capture
    #[arg(long)]
    pub url: String,

    /// Output directory
    #[arg(short, long)]
    pub output: PathBuf,

    /// Quick mode: dark only, no metadata
    #[arg(long)]
    pub quick: bool,

    /// Browser launch flags
    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Arguments for the inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// URL to inspect
    #[arg(long)]
    pub url: String,

    /// CSS selector for the element
    #[arg(long)]
    pub selector: String,

    /// Selector within the element's shadow root
    #[arg(long)]
    pub shadow_selector: Option<String>,

    /// Color scheme to emulate
    #[arg(long, default_value = "dark")]
    pub color_scheme: SchemeArg,

    /// Also calculate the contrast ratio
    #[arg(long)]
    pub contrast: bool,

    /// Custom property to resolve (repeatable; defaults to the design tokens)
    #[arg(long = "property", allow_hyphen_values = true)]
    pub properties: Vec<String>,

    /// Browser launch flags
    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Arguments for the standalone contract commands
#[derive(Parser, Debug)]
pub struct ContractArgs {
    /// URL of the page hosting the component
    #[arg(long, env = "WYQA_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Output directory for the report
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// YAML description of the component under test
    #[arg(long)]
    pub component: Option<PathBuf>,

    /// Fixed wait after opening the component, in milliseconds
    #[arg(long, default_value = "500")]
    pub settle_ms: u64,

    /// Browser launch flags
    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Emulated color scheme
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemeArg {
    /// Light mode
    #[default]
    Light,
    /// Dark mode
    Dark,
}

impl From<SchemeArg> for ColorScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Light => Self::Light,
            SchemeArg::Dark => Self::Dark,
        }
    }
}

/// Color output argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["wyqa", "run"]);
            if let Commands::Run(args) = cli.command {
                assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT));
                assert_eq!(args.color_scheme, SchemeArg::Light);
                assert_eq!(args.settle_ms, 500);
                assert!(!args.contracts);
                assert!(!args.poll_settle);
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_parse_run_flags() {
            let cli = Cli::parse_from([
                "wyqa",
                "run",
                "--url",
                "http://localhost:9000",
                "--contracts",
                "--color-scheme",
                "dark",
                "--viewport-width",
                "1280",
                "--poll-settle",
            ]);
            if let Commands::Run(args) = cli.command {
                assert_eq!(args.url, "http://localhost:9000");
                assert!(args.contracts);
                assert!(args.poll_settle);
                assert_eq!(args.color_scheme, SchemeArg::Dark);
                assert_eq!(args.browser.viewport_width, Some(1280));
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_parse_capture_requires_output() {
            assert!(Cli::try_parse_from(["wyqa", "capture", "--url", "http://x"]).is_err());
            let cli = Cli::parse_from(["wyqa", "capture", "--url", "http://x", "-o", "/tmp/c", "--quick"]);
            if let Commands::Capture(args) = cli.command {
                assert!(args.quick);
            } else {
                panic!("expected Capture command");
            }
        }

        #[test]
        fn test_parse_inspect() {
            let cli = Cli::parse_from([
                "wyqa",
                "inspect",
                "--url",
                "http://x",
                "--selector",
                "wy-controls-bar",
                "--shadow-selector",
                ".search-input",
                "--contrast",
                "--property",
                "--color-text-primary",
            ]);
            if let Commands::Inspect(args) = cli.command {
                assert_eq!(args.shadow_selector.as_deref(), Some(".search-input"));
                assert_eq!(args.color_scheme, SchemeArg::Dark);
                assert!(args.contrast);
                assert_eq!(args.properties, ["--color-text-primary"]);
            } else {
                panic!("expected Inspect command");
            }
        }

        #[test]
        fn test_parse_contract_commands() {
            let cli = Cli::parse_from(["wyqa", "colors"]);
            assert!(matches!(cli.command, Commands::Colors(_)));
            let cli = Cli::parse_from(["wyqa", "css-vars"]);
            assert!(matches!(cli.command, Commands::CssVars(_)));
        }

        #[test]
        fn test_global_verbose_flag() {
            let cli = Cli::parse_from(["wyqa", "-vv", "run"]);
            assert_eq!(cli.verbose, 2);
        }

        #[test]
        fn test_global_quiet_flag() {
            let cli = Cli::parse_from(["wyqa", "-q", "run"]);
            assert!(cli.quiet);
        }

        #[test]
        fn test_global_color_flag() {
            let cli = Cli::parse_from(["wyqa", "--color", "never", "run"]);
            assert!(matches!(cli.color, ColorArg::Never));
        }
    }

    mod launch_tests {
        use super::*;

        #[test]
        fn test_viewport_fallback() {
            let args = BrowserArgs {
                viewport_height: Some(700),
                ..BrowserArgs::default()
            };
            let options = args.launch_options(Viewport {
                width: 1440,
                height: 900,
            });
            assert_eq!(options.viewport.width, 1440);
            assert_eq!(options.viewport.height, 700);
            assert!(options.headless);
            assert!(options.sandbox);
        }

        #[test]
        fn test_headed_without_sandbox() {
            let args = BrowserArgs {
                headed: true,
                no_sandbox: true,
                chromium: Some("/usr/bin/chromium".to_string()),
                ..BrowserArgs::default()
            };
            let options = args.launch_options(Viewport::default());
            assert!(!options.headless);
            assert!(!options.sandbox);
            assert_eq!(options.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        }
    }
}
