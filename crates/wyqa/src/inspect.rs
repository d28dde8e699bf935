//! Single-element inspection and light/dark page capture.

use crate::color::{Color, ContrastReport, ParseColorError};
use crate::driver::{ColorScheme, Probe, Viewport};
use crate::result::{HarnessError, HarnessResult};
use crate::session::{Session, SettlePolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Design tokens resolved by default when inspecting an element
pub const DEFAULT_CUSTOM_PROPERTIES: &[&str] = &[
    "--md-sys-color-primary",
    "--md-sys-color-on-primary",
    "--md-sys-color-background",
    "--md-sys-color-on-background",
    "--md-sys-color-surface",
    "--md-sys-color-on-surface",
    "--md-sys-color-surface-variant",
    "--md-sys-color-on-surface-variant",
    "--md-sys-color-surface-container",
    "--md-sys-color-surface-container-low",
    "--md-sys-color-surface-container-high",
    "--md-sys-color-outline",
    "--md-sys-color-outline-variant",
    "--wy-controls-search-bg",
    "--wy-controls-toggle-bg",
    "--wy-filter-chip-active-bg",
    "--wy-filter-chip-active-fg",
    "--color-text-primary",
    "--color-text-secondary",
    "--color-border-subtle",
];

/// Selectors listed in the capture inventory
pub const INVENTORY_SELECTORS: &[&str] = &[
    "input[type=\"search\"]",
    ".search-input",
    ".search-icon",
    ".view-toggle",
    ".view-btn",
    "button",
    "[class*=\"icon\"]",
    "[class*=\"toggle\"]",
    "nav a",
    ".header",
    ".controls-bar",
    "wy-controls-bar",
    "wy-filter-chip",
];

/// Viewport used by `capture` unless overridden
pub const CAPTURE_VIEWPORT: Viewport = Viewport {
    width: 1440,
    height: 900,
};

/// Settle used by capture sessions: one 500ms wait per scheme switch
pub const CAPTURE_SETTLE: SettlePolicy = SettlePolicy::Fixed {
    open: Duration::from_millis(500),
    scheme: Duration::from_millis(500),
};

/// Report file written next to the capture screenshots
pub const CAPTURE_REPORT_FILE: &str = "report.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub left: f64,
}

/// Computed styles reported for an inspected element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyles {
    pub color: String,
    pub background_color: String,
    pub border_color: String,
    pub opacity: String,
    pub visibility: String,
    pub display: String,
    pub font_size: String,
    pub font_family: String,
    pub padding: String,
    pub margin: String,
}

/// Style snapshot of one element, optionally inside a shadow root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    /// Selector as requested, `host >> inner` for shadow lookups
    pub selector: String,
    pub tag_name: String,
    pub class_name: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub id: Option<String>,
    pub bounding_box: BoundingBox,
    pub computed_styles: ComputedStyles,
    /// Requested custom properties that resolved to a value
    pub custom_properties: BTreeMap<String, String>,
    /// Tag of the shadow host, when the element lives in a shadow root
    #[serde(deserialize_with = "Option::deserialize")]
    pub shadow_host: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub text: Option<String>,
}

impl ElementSnapshot {
    /// Contrast of the element's text color against its own background
    pub fn contrast(&self) -> Result<ContrastReport, ParseColorError> {
        let fg: Color = self.computed_styles.color.parse()?;
        let bg: Color = self.computed_styles.background_color.parse()?;
        Ok(ContrastReport::grade(fg, bg))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InspectAnswer {
    Missing { error: String },
    Found(ElementSnapshot),
}

/// Computed styles kept in the inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStyles {
    pub color: String,
    pub background_color: String,
    pub opacity: String,
    pub visibility: String,
    pub display: String,
}

/// One element found by an inventory selector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    /// Selector, indexed when it matched several elements
    pub selector: String,
    pub tag_name: String,
    pub class_name: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub id: Option<String>,
    /// Non-zero rendered box
    pub visible: bool,
    pub dimensions: BoundingBox,
    pub styles: InventoryStyles,
    #[serde(deserialize_with = "Option::deserialize")]
    pub shadow_host: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub text: Option<String>,
}

/// Registration status of one custom element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomElementStatus {
    pub name: String,
    pub defined: bool,
    pub instances: usize,
}

/// Metadata written by a full capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReport {
    pub url: String,
    pub viewport: Viewport,
    pub elements: Vec<InventoryEntry>,
    pub custom_elements: Vec<CustomElementStatus>,
}

/// Files produced by [`capture`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// Screenshots in capture order
    pub screenshots: Vec<PathBuf>,
    /// Metadata report, absent in quick mode
    pub report: Option<PathBuf>,
}

/// Default custom-property list as owned strings
#[must_use]
pub fn default_custom_properties() -> Vec<String> {
    DEFAULT_CUSTOM_PROPERTIES
        .iter()
        .map(|p| (*p).to_string())
        .collect()
}

/// Snapshot the element matched by `selector` (and `shadow_selector`
/// inside its shadow root).
pub fn inspect(
    session: &mut Session,
    selector: &str,
    shadow_selector: Option<&str>,
    custom_properties: &[String],
) -> HarnessResult<ElementSnapshot> {
    let answer: InspectAnswer = session.query(Probe::Inspect {
        selector: selector.to_string(),
        shadow_selector: shadow_selector.map(str::to_string),
        custom_properties: custom_properties.to_vec(),
    })?;
    match answer {
        InspectAnswer::Found(snapshot) => Ok(snapshot),
        InspectAnswer::Missing { error } => Err(HarnessError::ElementNotFound { message: error }),
    }
}

/// Element inventory and custom-element registration in the current scheme
pub fn collect_report(session: &mut Session) -> HarnessResult<CaptureReport> {
    let elements: Vec<InventoryEntry> = session.query(Probe::Inventory {
        selectors: INVENTORY_SELECTORS.iter().map(|s| (*s).to_string()).collect(),
    })?;
    let names = session.component().inventory_elements.clone();
    let custom_elements: Vec<CustomElementStatus> =
        session.query(Probe::CustomElements { names })?;
    Ok(CaptureReport {
        url: session.config().url.clone(),
        viewport: session.viewport(),
        elements,
        custom_elements,
    })
}

/// Screenshot the page in light and dark mode and write the inventory
/// report. Quick mode captures dark only and skips the report.
///
/// Each scheme switch waits once, for the session's scheme settle. The
/// inventory is collected in dark mode, the last scheme captured.
pub fn capture(session: &mut Session, quick: bool) -> HarnessResult<CaptureOutcome> {
    let schemes: &[ColorScheme] = if quick {
        &[ColorScheme::Dark]
    } else {
        &[ColorScheme::Light, ColorScheme::Dark]
    };

    let mut outcome = CaptureOutcome::default();
    for scheme in schemes {
        session.set_color_scheme(*scheme)?;
        let path = session.screenshot(&format!("{scheme}.png"))?;
        tracing::info!(path = %path.display(), "screenshot saved");
        outcome.screenshots.push(path);
    }

    if !quick {
        let report = collect_report(session)?;
        let path = session.output_dir().join(CAPTURE_REPORT_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(path = %path.display(), "capture report saved");
        outcome.report = Some(path);
    }
    Ok(outcome)
}
