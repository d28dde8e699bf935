//! In-memory page hosting a simulated links component.
//!
//! `MockPage` answers every [`Probe`] from a small state model of the
//! component (registration, open flag, links, shadow tree) instead of running
//! JavaScript. Behaviour switches and fault injection let tests drive each
//! phase into its failure paths.

use super::probe::Probe;
use super::{ColorScheme, EventLog, LaunchOptions, Launcher, PageDriver, Script};
use crate::manifest::{ExpectedCounts, Manifest};
use crate::result::{HarnessError, HarnessResult};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// How an injected fault manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    /// The call returns an evaluation error
    Fail,
    /// The call panics
    Panic,
}

/// Simulated page with one component instance
#[derive(Debug, Clone)]
pub struct MockPage {
    /// Element registered with `customElements`
    pub defined: bool,
    /// Instance present in the document
    pub instance_present: bool,
    /// `localName` reported for the instance
    pub local_name: String,
    /// Instance has a shadow root
    pub shadow: bool,
    /// Current `open` property
    pub open: bool,
    /// Current `links` property
    pub links: Manifest,
    /// JSON served at the manifest URL (None = fetch fails)
    pub served_manifest: Option<Value>,
    /// Escape closes an open component
    pub escape_closes: bool,
    /// Backdrop click closes an open component
    pub backdrop_closes: bool,
    /// Close control closes an open component
    pub close_control_closes: bool,
    /// Chip activation dispatches the notification event
    pub dispatches_event: bool,
    /// Counts rendered regardless of the assigned links
    pub rendered_counts: Option<ExpectedCounts>,
    /// Trigger selector present in the document
    pub trigger: Option<String>,
    /// Trigger click opens the component
    pub trigger_opens: bool,
    /// Trigger click assigns the served manifest
    pub trigger_populates: bool,
    /// Overlay opacity while open
    pub overlay_opacity: String,
    /// Container opacity while open
    pub container_opacity: String,
    /// Rendered font families (title, chip, icon)
    pub fonts: [Option<String>; 3],
    /// Resolved custom properties on the host
    pub host_properties: HashMap<String, String>,
    /// Computed styles inside the shadow root, keyed by (selector, property)
    pub shadow_styles: HashMap<(String, String), String>,
    /// Element snapshots answered to inspect probes, keyed by selector
    pub snapshots: HashMap<String, Value>,
    /// Inventory answer
    pub inventory: Value,
    /// Raw answers replacing the simulated ones, keyed by probe label
    pub overrides: HashMap<String, Value>,
    /// Custom element tags registered on the page
    pub registered: Vec<String>,
    /// Events returned from `reload_collecting`
    pub reload_log: EventLog,
    /// Navigation fails
    pub unreachable: bool,
    pub(crate) faults: HashMap<String, MockFault>,
    pub(crate) history: Arc<Mutex<Vec<String>>>,
    pub(crate) closes: Arc<AtomicUsize>,
    pub(crate) assignments: Arc<Mutex<Vec<Value>>>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self {
            defined: true,
            instance_present: true,
            local_name: "wy-links-modal".to_string(),
            shadow: true,
            open: false,
            links: Manifest::default(),
            served_manifest: Some(sample_manifest()),
            escape_closes: true,
            backdrop_closes: true,
            close_control_closes: true,
            dispatches_event: true,
            rendered_counts: None,
            trigger: Some("#openLinksModal".to_string()),
            trigger_opens: true,
            trigger_populates: true,
            overlay_opacity: "1".to_string(),
            container_opacity: "1".to_string(),
            fonts: [
                Some("\"Libre Baskerville\", serif".to_string()),
                Some("Inter, sans-serif".to_string()),
                Some("\"Material Symbols Outlined\"".to_string()),
            ],
            host_properties: HashMap::new(),
            shadow_styles: HashMap::new(),
            snapshots: HashMap::new(),
            inventory: Value::Array(Vec::new()),
            overrides: HashMap::new(),
            registered: vec!["wy-links-modal".to_string()],
            reload_log: EventLog::new(),
            unreachable: false,
            faults: HashMap::new(),
            history: Arc::new(Mutex::new(Vec::new())),
            closes: Arc::new(AtomicUsize::new(0)),
            assignments: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Two categories, three links, one active
#[must_use]
pub fn sample_manifest() -> Value {
    json!([
        {
            "name": "Tools",
            "icon": "build",
            "links": [
                {"label": "Editor", "active": true, "url": "https://example.com/editor"},
                {"label": "Terminal", "active": false, "url": "https://example.com/terminal"}
            ]
        },
        {
            "name": "Docs",
            "links": [
                {"label": "Guide", "active": false, "url": "https://example.com/guide"}
            ]
        }
    ])
}

/// Complete inspect answer for an element with the given text and
/// background colors
#[must_use]
pub fn element_snapshot(selector: &str, tag: &str, color: &str, background: &str) -> Value {
    json!({
        "selector": selector,
        "tagName": tag,
        "className": "",
        "id": null,
        "boundingBox": { "width": 0.0, "height": 0.0, "top": 0.0, "left": 0.0 },
        "computedStyles": {
            "color": color,
            "backgroundColor": background,
            "borderColor": "rgb(0, 0, 0)",
            "opacity": "1",
            "visibility": "visible",
            "display": "block",
            "fontSize": "16px",
            "fontFamily": "Inter, sans-serif",
            "padding": "0px",
            "margin": "0px"
        },
        "customProperties": {},
        "shadowHost": null,
        "text": null
    })
}

/// Visible text of a manifest entry
fn link_text(link: &Value) -> Option<&str> {
    ["label", "name", "title"]
        .iter()
        .find_map(|key| link.get(*key).and_then(Value::as_str))
}

impl MockPage {
    /// Create a page with a healthy component
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make calls with this probe or driver-operation label return an error
    #[must_use]
    pub fn failing(mut self, label: &str) -> Self {
        self.faults.insert(label.to_string(), MockFault::Fail);
        self
    }

    /// Make calls with this probe or driver-operation label panic
    #[must_use]
    pub fn panicking(mut self, label: &str) -> Self {
        self.faults.insert(label.to_string(), MockFault::Panic);
        self
    }

    /// Answer probes with this label with `answer` verbatim
    #[must_use]
    pub fn with_answer(mut self, label: &str, answer: Value) -> Self {
        self.overrides.insert(label.to_string(), answer);
        self
    }

    /// Set a resolved custom property on the host
    #[must_use]
    pub fn with_host_property(mut self, name: &str, value: &str) -> Self {
        self.host_properties
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Set a computed style inside the shadow root
    #[must_use]
    pub fn with_shadow_style(mut self, selector: &str, property: &str, value: &str) -> Self {
        self.shadow_styles
            .insert((selector.to_string(), property.to_string()), value.to_string());
        self
    }

    /// Calls recorded so far, shared with every clone
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Check if an operation was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(method))
    }

    /// Every value assigned to `links`, shared with every clone
    #[must_use]
    pub fn assigned_links(&self) -> Vec<Value> {
        self.assignments
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    /// Number of `close` calls, shared with every clone
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        if let Ok(mut history) = self.history.lock() {
            history.push(call);
        }
    }

    fn assign(&mut self, links: Manifest) {
        if let Ok(mut assignments) = self.assignments.lock() {
            assignments.push(links.as_json().clone());
        }
        self.links = links;
    }

    fn check_fault(&self, label: &str) -> HarnessResult<()> {
        match self.faults.get(label) {
            Some(MockFault::Fail) => Err(HarnessError::evaluation(label, "injected fault")),
            Some(MockFault::Panic) => panic!("injected panic in {label}"),
            None => Ok(()),
        }
    }

    fn require_instance(&self, label: &str) -> HarnessResult<()> {
        if self.instance_present {
            Ok(())
        } else {
            Err(HarnessError::evaluation(label, "instance not found"))
        }
    }

    fn style(&self, selector: &str, property: &str) -> Value {
        self.shadow_styles
            .get(&(selector.to_string(), property.to_string()))
            .map_or(Value::Null, |v| Value::String(v.clone()))
    }

    fn answer(&mut self, probe: &Probe) -> HarnessResult<Value> {
        let label = probe.label();
        let value = match probe {
            Probe::Registration => json!({
                "defined": self.defined,
                "found": self.instance_present,
                "localName": self.instance_present.then(|| self.local_name.clone()),
            }),
            Probe::IsOpen => {
                self.require_instance(label)?;
                Value::Bool(self.open)
            }
            Probe::Show => {
                self.require_instance(label)?;
                self.open = true;
                Value::Null
            }
            Probe::Close => {
                self.require_instance(label)?;
                self.open = false;
                Value::Null
            }
            Probe::SetOpen(open) => {
                self.require_instance(label)?;
                self.open = *open;
                Value::Null
            }
            Probe::FetchManifest => self.served_manifest.clone().unwrap_or(Value::Null),
            Probe::AssignManifest { manifest, open } => {
                self.require_instance(label)?;
                self.assign(manifest.clone());
                if *open {
                    self.open = true;
                }
                Value::Null
            }
            Probe::LinkCount => {
                let count = if self.instance_present { self.links.len() } else { 0 };
                json!(count)
            }
            Probe::HasShadowRoot => Value::Bool(self.instance_present && self.shadow),
            Probe::ClickBackdrop => {
                if !self.shadow {
                    return Ok(Value::Bool(false));
                }
                if self.open && self.backdrop_closes {
                    self.open = false;
                }
                Value::Bool(true)
            }
            Probe::ClickCloseControl => {
                if !self.shadow {
                    return Ok(Value::Bool(false));
                }
                if self.open && self.close_control_closes {
                    self.open = false;
                }
                Value::Bool(true)
            }
            Probe::RenderCounts => {
                if !self.shadow {
                    return Ok(json!({ "found": false }));
                }
                let counts = self
                    .rendered_counts
                    .unwrap_or_else(|| self.links.expected_counts());
                json!({
                    "found": true,
                    "sectionsCount": counts.sections_count,
                    "headersCount": counts.sections_count,
                    "chipsCount": counts.chips_count,
                    "activeChipsCount": counts.active_chips_count,
                    "hasTitle": true,
                    "hasContainer": true,
                    "hasOverlay": true,
                })
            }
            Probe::ActivateFirstChip => {
                if !self.shadow {
                    return Ok(json!({ "success": false, "error": "No shadow root" }));
                }
                match self.links.links().next() {
                    None => json!({ "success": false, "error": "No chips found" }),
                    Some(link) => json!({
                        "success": true,
                        "chipText": link_text(link).unwrap_or_default(),
                        "eventReceived": self.dispatches_event,
                        "eventDetail": self.dispatches_event.then(|| link.clone()),
                    }),
                }
            }
            Probe::Visibility => {
                if !self.shadow {
                    return Ok(json!({ "found": false }));
                }
                let (overlay, visibility, container) = if self.open {
                    (self.overlay_opacity.as_str(), "visible", self.container_opacity.as_str())
                } else {
                    ("0", "hidden", "0")
                };
                json!({
                    "found": true,
                    "overlayOpacity": overlay,
                    "overlayVisibility": visibility,
                    "overlayDisplay": "flex",
                    "containerOpacity": container,
                    "containerDisplay": "block",
                })
            }
            Probe::Fonts => json!({
                "found": self.shadow,
                "titleFont": self.fonts[0],
                "chipFont": self.fonts[1],
                "iconFont": self.fonts[2],
            }),
            Probe::HostProperty(name) => {
                if !self.instance_present {
                    return Ok(Value::Null);
                }
                Value::String(self.host_properties.get(name).cloned().unwrap_or_default())
            }
            Probe::ShadowStyle { selector, property } => {
                if !self.shadow {
                    return Ok(Value::Null);
                }
                self.style(selector, property)
            }
            Probe::RenderStable => Value::Bool(true),
            Probe::Inspect { selector, .. } => self
                .snapshots
                .get(selector)
                .cloned()
                .unwrap_or_else(|| json!({ "error": format!("Element not found: {selector}") })),
            Probe::Inventory { .. } => self.inventory.clone(),
            Probe::CustomElements { names } => Value::Array(
                names
                    .iter()
                    .map(|name| {
                        let defined = self.registered.contains(name);
                        let instances = usize::from(
                            defined && self.instance_present && *name == self.local_name,
                        );
                        json!({ "name": name, "defined": defined, "instances": instances })
                    })
                    .collect(),
            ),
        };
        Ok(value)
    }
}

impl PageDriver for MockPage {
    fn navigate(&mut self, url: &str) -> HarnessResult<()> {
        self.record(format!("navigate:{url}"));
        if self.unreachable {
            return Err(HarnessError::Navigation {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn evaluate(&mut self, script: &Script) -> HarnessResult<Value> {
        let label = script.label();
        self.record(format!("evaluate:{label}"));
        self.check_fault(label)?;
        if let Some(answer) = self.overrides.get(label) {
            return Ok(answer.clone());
        }
        self.answer(&script.probe)
    }

    fn set_color_scheme(&mut self, scheme: ColorScheme) -> HarnessResult<()> {
        self.record(format!("colorScheme:{scheme}"));
        self.check_fault("colorScheme")
    }

    fn screenshot(&mut self, path: &Path, full_page: bool) -> HarnessResult<()> {
        self.record(format!("screenshot:{}:{full_page}", path.display()));
        self.check_fault("screenshot")?;
        std::fs::write(path, PNG_SIGNATURE).map_err(|e| HarnessError::Screenshot {
            message: e.to_string(),
        })
    }

    fn reload(&mut self) -> HarnessResult<()> {
        self.record("reload".to_string());
        self.check_fault("reload")?;
        self.open = false;
        self.links = Manifest::default();
        Ok(())
    }

    fn reload_collecting(&mut self, settle: Duration) -> HarnessResult<EventLog> {
        self.record(format!("reloadCollecting:{}ms", settle.as_millis()));
        self.check_fault("reloadCollecting")?;
        self.open = false;
        self.links = Manifest::default();
        Ok(self.reload_log.clone())
    }

    fn press_key(&mut self, key: &str) -> HarnessResult<()> {
        self.record(format!("pressKey:{key}"));
        self.check_fault("pressKey")?;
        if key == "Escape" && self.open && self.escape_closes {
            self.open = false;
        }
        Ok(())
    }

    fn click(&mut self, selector: &str) -> HarnessResult<()> {
        self.record(format!("click:{selector}"));
        self.check_fault("click")?;
        if self.trigger.as_deref() != Some(selector) {
            return Err(HarnessError::input(format!("no element matches {selector}")));
        }
        if self.trigger_populates {
            if let Some(served) = self.served_manifest.clone() {
                self.assign(Manifest::from_value(served));
            }
        }
        if self.trigger_opens {
            self.open = true;
        }
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.record(format!("pause:{}ms", duration.as_millis()));
    }

    fn close(&mut self) -> HarnessResult<()> {
        self.record("close".to_string());
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Launcher handing out clones of a prepared [`MockPage`]
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    page: MockPage,
    launch_error: Option<String>,
}

impl MockLauncher {
    /// Launch pages cloned from `page`
    #[must_use]
    pub const fn new(page: MockPage) -> Self {
        Self {
            page,
            launch_error: None,
        }
    }

    /// Fail every launch with this message
    #[must_use]
    pub fn unavailable(message: &str) -> Self {
        Self {
            page: MockPage::default(),
            launch_error: Some(message.to_string()),
        }
    }

    /// The template page; its history and close counter are shared with
    /// every launched clone
    #[must_use]
    pub const fn page(&self) -> &MockPage {
        &self.page
    }
}

impl Launcher for MockLauncher {
    fn launch(&self, options: &LaunchOptions) -> HarnessResult<Box<dyn PageDriver>> {
        if let Some(message) = &self.launch_error {
            return Err(HarnessError::Environment {
                message: message.clone(),
            });
        }
        self.page.record(format!(
            "launch:{}x{}",
            options.viewport.width, options.viewport.height
        ));
        Ok(Box::new(self.page.clone()))
    }
}
