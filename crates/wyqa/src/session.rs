//! One live browser session shared by every phase of a run.
//!
//! A [`Session`] owns the page driver for the whole run. It is released
//! exactly once: explicitly through [`Session::release`], or by `Drop` on
//! any other exit path.

use crate::component::ComponentSpec;
use crate::driver::{
    ColorScheme, EventLog, LaunchOptions, Launcher, PageDriver, Probe, Script, Viewport,
};
use crate::result::{HarnessError, HarnessResult};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Moment a settle wait follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlePoint {
    /// After opening the component or navigating
    Open,
    /// After switching the emulated color scheme
    SchemeSwitch,
}

/// How the harness waits for the page to finish rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlePolicy {
    /// Flat delays
    Fixed {
        /// Delay after opens and navigation
        open: Duration,
        /// Delay after color scheme switches
        scheme: Duration,
    },
    /// Poll the render-stability probe; on timeout, carry on
    Poll {
        /// Delay between polls
        interval: Duration,
        /// Upper bound for one settle
        timeout: Duration,
    },
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self::Fixed {
            open: Duration::from_millis(500),
            scheme: Duration::from_millis(300),
        }
    }
}

impl SettlePolicy {
    /// Flat delay after opens; scheme switches keep the default
    #[must_use]
    pub fn fixed_ms(open_ms: u64) -> Self {
        Self::Fixed {
            open: Duration::from_millis(open_ms),
            scheme: Duration::from_millis(300),
        }
    }

    /// Poll every 50ms for at most `timeout_ms`
    #[must_use]
    pub const fn poll_ms(timeout_ms: u64) -> Self {
        Self::Poll {
            interval: Duration::from_millis(50),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Delay used for reload listeners and other flat waits
    #[must_use]
    pub const fn baseline(&self) -> Duration {
        match self {
            Self::Fixed { open, .. } => *open,
            Self::Poll { timeout, .. } => *timeout,
        }
    }
}

/// Everything needed to open a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Page hosting the component
    pub url: String,
    /// Browser launch options
    pub launch: LaunchOptions,
    /// Color scheme applied after navigation
    pub color_scheme: ColorScheme,
    /// Settle policy
    pub settle: SettlePolicy,
    /// Component under test
    pub component: ComponentSpec,
    /// Directory receiving screenshots and reports
    pub output_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            launch: LaunchOptions::default(),
            color_scheme: ColorScheme::Light,
            settle: SettlePolicy::default(),
            component: ComponentSpec::default(),
            output_dir: PathBuf::from("/tmp/links-modal-test"),
        }
    }
}

impl SessionConfig {
    /// Create a config for a URL
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set launch options
    #[must_use]
    pub fn with_launch(mut self, launch: LaunchOptions) -> Self {
        self.launch = launch;
        self
    }

    /// Set the color scheme
    #[must_use]
    pub const fn with_color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = scheme;
        self
    }

    /// Set the settle policy
    #[must_use]
    pub const fn with_settle(mut self, settle: SettlePolicy) -> Self {
        self.settle = settle;
        self
    }

    /// Set the component under test
    #[must_use]
    pub fn with_component(mut self, component: ComponentSpec) -> Self {
        self.component = component;
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Live page plus the context phases need
pub struct Session {
    driver: Box<dyn PageDriver>,
    config: SessionConfig,
    scheme: ColorScheme,
    released: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("url", &self.config.url)
            .field("scheme", &self.scheme)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Launch the browser, navigate, settle and apply the color scheme.
    ///
    /// Launch and color-scheme failures surface as
    /// [`HarnessError::Environment`], navigation failures as
    /// [`HarnessError::Navigation`]. The browser is closed again
    /// if anything after launch fails.
    pub fn acquire(config: SessionConfig, launcher: &dyn Launcher) -> HarnessResult<Self> {
        let driver = launcher.launch(&config.launch).map_err(|e| match e {
            HarnessError::Environment { .. } => e,
            other => HarnessError::Environment {
                message: other.to_string(),
            },
        })?;
        tracing::info!(url = %config.url, "session acquired");

        let mut session = Self::from_driver(driver, config);
        let url = session.config.url.clone();
        session.driver.navigate(&url).map_err(|e| match e {
            HarnessError::Navigation { .. } => e,
            other => HarnessError::Navigation {
                url: url.clone(),
                message: other.to_string(),
            },
        })?;
        session.settle(SettlePoint::Open);

        let scheme = session.config.color_scheme;
        session
            .set_color_scheme(scheme)
            .map_err(|e| HarnessError::Environment {
                message: format!("could not emulate {scheme} color scheme: {e}"),
            })?;
        Ok(session)
    }

    /// Wrap an already launched driver
    #[must_use]
    pub fn from_driver(driver: Box<dyn PageDriver>, config: SessionConfig) -> Self {
        Self {
            driver,
            scheme: config.color_scheme,
            config,
            released: false,
        }
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Component under test
    #[must_use]
    pub const fn component(&self) -> &ComponentSpec {
        &self.config.component
    }

    /// Page viewport
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.config.launch.viewport
    }

    /// Active color scheme
    #[must_use]
    pub const fn color_scheme(&self) -> ColorScheme {
        self.scheme
    }

    /// Directory receiving artifacts
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    fn driver(&mut self) -> HarnessResult<&mut dyn PageDriver> {
        if self.released {
            return Err(HarnessError::Released);
        }
        Ok(self.driver.as_mut())
    }

    /// Evaluate a probe and return its raw JSON answer
    pub fn evaluate(&mut self, probe: Probe) -> HarnessResult<serde_json::Value> {
        let script = Script::render(probe, &self.config.component);
        self.driver()?.evaluate(&script)
    }

    /// Evaluate a probe and decode its answer
    pub fn query<T: DeserializeOwned>(&mut self, probe: Probe) -> HarnessResult<T> {
        let label = probe.label();
        let value = self.evaluate(probe)?;
        serde_json::from_value(value).map_err(|e| HarnessError::Decode {
            probe: label.to_string(),
            message: e.to_string(),
        })
    }

    /// Evaluate a probe for its side effect
    pub fn perform(&mut self, probe: Probe) -> HarnessResult<()> {
        self.evaluate(probe).map(drop)
    }

    /// Wait for rendering to settle according to the configured policy
    pub fn settle(&mut self, point: SettlePoint) {
        match self.config.settle {
            SettlePolicy::Fixed { open, scheme } => {
                let delay = match point {
                    SettlePoint::Open => open,
                    SettlePoint::SchemeSwitch => scheme,
                };
                if let Ok(driver) = self.driver() {
                    driver.pause(delay);
                }
            }
            SettlePolicy::Poll { interval, timeout } => {
                let started = Instant::now();
                let mut waited = Duration::ZERO;
                loop {
                    match self.query::<bool>(Probe::RenderStable) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => tracing::debug!("stability probe failed: {e}"),
                    }
                    // Stop once either the paused time or the wall clock reaches the timeout
                    if waited >= timeout || started.elapsed() >= timeout {
                        tracing::debug!(?point, "settle poll timed out");
                        break;
                    }
                    if let Ok(driver) = self.driver() {
                        driver.pause(interval);
                    }
                    waited += interval;
                }
            }
        }
    }

    /// Switch the emulated color scheme and settle
    pub fn set_color_scheme(&mut self, scheme: ColorScheme) -> HarnessResult<()> {
        self.driver()?.set_color_scheme(scheme)?;
        self.scheme = scheme;
        self.settle(SettlePoint::SchemeSwitch);
        Ok(())
    }

    /// Capture a full-page PNG into the output directory
    pub fn screenshot(&mut self, name: &str) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let path = self.config.output_dir.join(name);
        self.driver()?.screenshot(&path, true)?;
        Ok(path)
    }

    /// Press a key on the document
    pub fn press_key(&mut self, key: &str) -> HarnessResult<()> {
        self.driver()?.press_key(key)
    }

    /// Click a top-level element
    pub fn click(&mut self, selector: &str) -> HarnessResult<()> {
        self.driver()?.click(selector)
    }

    /// Reload the page
    pub fn reload(&mut self) -> HarnessResult<()> {
        self.driver()?.reload()
    }

    /// Reload while collecting console messages and responses
    pub fn reload_collecting(&mut self, settle: Duration) -> HarnessResult<EventLog> {
        self.driver()?.reload_collecting(settle)
    }

    /// Let the page run
    pub fn pause(&mut self, duration: Duration) {
        if let Ok(driver) = self.driver() {
            driver.pause(duration);
        }
    }

    fn close_driver(&mut self) -> HarnessResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        let result = self.driver.close();
        tracing::info!("session released");
        result
    }

    /// Tear down the browser
    pub fn release(mut self) -> HarnessResult<()> {
        self.close_driver()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close_driver() {
            tracing::warn!("failed to close browser: {e}");
        }
    }
}
