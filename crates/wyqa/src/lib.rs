//! wyqa: browser verification harness for custom web components
//!
//! Drives a live page hosting a web component (by default the
//! `wy-links-modal` links modal) through a fixed catalog of verification
//! phases and produces a structured report.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ Orchestrator │───►│   Session    │───►│  PageDriver  │
//! │ (phase list) │    │ (settle, io) │    │ CDP or mock  │
//! └──────┬───────┘    └──────────────┘    └──────────────┘
//!        │ PhaseResult
//!        ▼
//! ┌──────────────┐
//! │  RunReport   │──► test-report.json, exit status
//! └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use wyqa::{MockLauncher, MockPage, Orchestrator, SessionConfig, SilentObserver};
//!
//! let launcher = MockLauncher::new(MockPage::new());
//! let report = Orchestrator::new()
//!     .run(SessionConfig::default(), &launcher, &mut SilentObserver)
//!     .unwrap();
//! assert_eq!(report.summary().total, 8);
//! ```

#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Color parsing, distance and contrast grading
pub mod color;
pub mod component;
/// Design-token resolution checks
pub mod css;
pub mod driver;
pub mod inspect;
pub mod manifest;
pub mod orchestrator;
/// Verification phases
pub mod phase;
pub mod report;
mod result;
pub mod session;

pub use color::{Color, ColorVerdict, ComparisonRecord, ContrastReport};
pub use component::{ComponentSpec, ShadowParts};
#[cfg(feature = "browser")]
pub use driver::ChromiumLauncher;
pub use driver::{
    ColorScheme, LaunchOptions, Launcher, MockLauncher, MockPage, PageDriver, Viewport,
};
pub use inspect::{CaptureOutcome, CaptureReport, ElementSnapshot};
pub use manifest::Manifest;
pub use orchestrator::{Orchestrator, RunObserver, SilentObserver};
pub use phase::{CheckRecord, Phase, PhaseResult, Verdict};
pub use report::{RunReport, RunSummary};
pub use result::{HarnessError, HarnessResult};
pub use session::{Session, SessionConfig, SettlePolicy};
