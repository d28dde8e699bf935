//! Page driver abstraction.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  PageDriver (trait)                                           │
//! │  the only boundary touching the live render tree              │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────┐       │
//! │  │  ChromiumPage       │        │  MockPage           │       │
//! │  │  (feature browser)  │        │  simulated element  │       │
//! │  │  CDP via            │        │  for unit tests     │       │
//! │  │  chromiumoxide      │        │                     │       │
//! │  └─────────────────────┘        └─────────────────────┘       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All calls are synchronous from the caller's side: the CDP implementation
//! blocks on its own runtime until the page answers or the timeout elapses.

#[cfg(feature = "browser")]
mod chromium;
mod mock;
pub mod probe;

#[cfg(feature = "browser")]
pub use chromium::{ChromiumLauncher, ChromiumPage};
pub use mock::{element_snapshot, sample_manifest, MockFault, MockLauncher, MockPage};
pub use probe::{Probe, Script};

use crate::result::HarnessResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Preferred color scheme emulated on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// `prefers-color-scheme: light`
    #[default]
    Light,
    /// `prefers-color-scheme: dark`
    Dark,
}

impl ColorScheme {
    /// Media feature value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown color scheme `{other}`")),
        }
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Page viewport
    pub viewport: Viewport,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Upper bound for a single evaluation
    pub eval_timeout: Duration,
    /// Upper bound for navigation and reloads
    pub navigation_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            chromium_path: None,
            sandbox: true,
            eval_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

impl LaunchOptions {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Severity of a console message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    /// `console.error` or an uncaught exception
    Error,
    /// `console.warn`
    Warning,
    /// Anything else
    Other,
}

/// One entry captured while a scoped reload was in flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogEvent {
    /// Console message
    Console {
        /// Severity
        level: ConsoleLevel,
        /// Message text
        text: String,
    },
    /// Network response
    Response {
        /// Response URL
        url: String,
        /// HTTP status
        status: u16,
    },
}

/// Append-only log drained from one `reload_collecting` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<LogEvent>,
}

impl EventLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, event: LogEvent) {
        self.events.push(event);
    }

    /// All events in arrival order
    #[must_use]
    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    /// Text of every console error
    pub fn console_errors(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            LogEvent::Console {
                level: ConsoleLevel::Error,
                text,
            } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Responses with a 4xx/5xx status
    pub fn failed_responses(&self) -> impl Iterator<Item = (&str, u16)> {
        self.events.iter().filter_map(|e| match e {
            LogEvent::Response { url, status } if *status >= 400 => Some((url.as_str(), *status)),
            _ => None,
        })
    }
}

impl FromIterator<LogEvent> for EventLog {
    fn from_iter<I: IntoIterator<Item = LogEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

/// Synchronous page control
pub trait PageDriver: Send {
    /// Navigate to a URL and wait for the load event
    fn navigate(&mut self, url: &str) -> HarnessResult<()>;

    /// Evaluate a script, awaiting any promise it returns
    fn evaluate(&mut self, script: &Script) -> HarnessResult<serde_json::Value>;

    /// Emulate `prefers-color-scheme`
    fn set_color_scheme(&mut self, scheme: ColorScheme) -> HarnessResult<()>;

    /// Write a PNG capture to `path`
    fn screenshot(&mut self, path: &Path, full_page: bool) -> HarnessResult<()>;

    /// Reload the page
    fn reload(&mut self) -> HarnessResult<()>;

    /// Reload while recording console messages and responses; listeners
    /// live only for this call
    fn reload_collecting(&mut self, settle: Duration) -> HarnessResult<EventLog>;

    /// Press a key on the focused document
    fn press_key(&mut self, key: &str) -> HarnessResult<()>;

    /// Click the element matching a top-level selector
    fn click(&mut self, selector: &str) -> HarnessResult<()>;

    /// Let the page run for a fixed time
    fn pause(&mut self, duration: Duration);

    /// Tear down the browser
    fn close(&mut self) -> HarnessResult<()>;
}

/// Starts a browser and returns a page driver
pub trait Launcher {
    /// Launch the engine and open a page with the requested viewport
    fn launch(&self, options: &LaunchOptions) -> HarnessResult<Box<dyn PageDriver>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_scheme_parse() {
        assert_eq!("dark".parse::<ColorScheme>(), Ok(ColorScheme::Dark));
        assert_eq!("LIGHT".parse::<ColorScheme>(), Ok(ColorScheme::Light));
        assert!("sepia".parse::<ColorScheme>().is_err());
        assert_eq!(ColorScheme::Dark.to_string(), "dark");
    }

    #[test]
    fn test_launch_options_builders() {
        let options = LaunchOptions::default()
            .with_viewport(1440, 900)
            .with_headless(false)
            .with_no_sandbox()
            .with_chromium_path("/usr/bin/chromium");
        assert_eq!(options.viewport, Viewport { width: 1440, height: 900 });
        assert!(!options.headless);
        assert!(!options.sandbox);
        assert_eq!(options.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }

    #[test]
    fn test_event_log_filters() {
        let log: EventLog = vec![
            LogEvent::Console {
                level: ConsoleLevel::Error,
                text: "links failed".to_string(),
            },
            LogEvent::Console {
                level: ConsoleLevel::Warning,
                text: "deprecated".to_string(),
            },
            LogEvent::Response {
                url: "http://x/app.js".to_string(),
                status: 200,
            },
            LogEvent::Response {
                url: "http://x/web-components.js".to_string(),
                status: 404,
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(log.console_errors().collect::<Vec<_>>(), vec!["links failed"]);
        assert_eq!(
            log.failed_responses().collect::<Vec<_>>(),
            vec![("http://x/web-components.js", 404)]
        );
        assert_eq!(log.events().len(), 4);
    }
}
