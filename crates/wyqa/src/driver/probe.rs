//! Typed page probes.
//!
//! Every script the harness evaluates is a [`Probe`]. A probe renders to a
//! JavaScript expression for a given [`ComponentSpec`], and its JSON answer
//! decodes into one of the records below. Drivers see both the typed probe
//! and the rendered source, so a simulated driver can answer without a
//! JavaScript engine.

use crate::component::ComponentSpec;
use crate::manifest::Manifest;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A question asked of, or an action performed on, the live page
#[derive(Debug, Clone, PartialEq)]
pub enum Probe {
    /// Element registration and live instance tag
    Registration,
    /// Current value of the `open` property
    IsOpen,
    /// Call `show()`
    Show,
    /// Call `close()`
    Close,
    /// Assign the `open` property
    SetOpen(bool),
    /// Fetch the manifest from the page's origin
    FetchManifest,
    /// Assign `links`, optionally opening afterwards
    AssignManifest {
        /// Data to assign
        manifest: Manifest,
        /// Set `open = true` after assigning
        open: bool,
    },
    /// Length of the instance's `links` property
    LinkCount,
    /// Whether the instance has a shadow root
    HasShadowRoot,
    /// Dispatch a click at the centre of the backdrop
    ClickBackdrop,
    /// Click the dedicated close control
    ClickCloseControl,
    /// Count rendered sections and chips
    RenderCounts,
    /// Click the first chip while listening for the notification event
    ActivateFirstChip,
    /// Computed opacity/visibility of overlay and container
    Visibility,
    /// Computed font families of title, chip and icon
    Fonts,
    /// Resolved custom property on the host
    HostProperty(String),
    /// Computed style of an element inside the shadow root
    ShadowStyle {
        /// Selector inside the shadow root
        selector: String,
        /// CSS property name
        property: String,
    },
    /// Two animation frames elapsed and no animation is running
    RenderStable,
    /// Detailed snapshot of one element
    Inspect {
        /// Top-level selector
        selector: String,
        /// Selector inside the element's shadow root
        shadow_selector: Option<String>,
        /// Custom properties to resolve
        custom_properties: Vec<String>,
    },
    /// Visibility inventory of every element matching the selectors
    Inventory {
        /// Top-level selectors
        selectors: Vec<String>,
    },
    /// Registration status of custom elements
    CustomElements {
        /// Tags to look up
        names: Vec<String>,
    },
}

impl Probe {
    /// Short name used in logs and errors
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::IsOpen => "isOpen",
            Self::Show => "show",
            Self::Close => "close",
            Self::SetOpen(_) => "setOpen",
            Self::FetchManifest => "fetchManifest",
            Self::AssignManifest { .. } => "assignManifest",
            Self::LinkCount => "linkCount",
            Self::HasShadowRoot => "hasShadowRoot",
            Self::ClickBackdrop => "clickBackdrop",
            Self::ClickCloseControl => "clickCloseControl",
            Self::RenderCounts => "renderCounts",
            Self::ActivateFirstChip => "activateFirstChip",
            Self::Visibility => "visibility",
            Self::Fonts => "fonts",
            Self::HostProperty(_) => "hostProperty",
            Self::ShadowStyle { .. } => "shadowStyle",
            Self::RenderStable => "renderStable",
            Self::Inspect { .. } => "inspect",
            Self::Inventory { .. } => "inventory",
            Self::CustomElements { .. } => "customElements",
        }
    }
}

/// A probe together with its rendered JavaScript source
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// Typed probe
    pub probe: Probe,
    /// Expression evaluated in the page
    pub source: String,
}

impl Script {
    /// Render a probe for a component
    #[must_use]
    pub fn render(probe: Probe, spec: &ComponentSpec) -> Self {
        let source = render_source(&probe, spec);
        Self { probe, source }
    }

    /// Probe label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.probe.label()
    }
}

/// JavaScript literal for any serializable value
fn lit<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn with_host(spec: &ComponentSpec, body: &str) -> String {
    format!(
        "(() => {{ const host = document.querySelector({sel}); \
         const root = host ? host.shadowRoot : null; {body} }})()",
        sel = lit(&spec.instance),
    )
}

fn require_host(spec: &ComponentSpec, body: &str) -> String {
    with_host(
        spec,
        &format!(
            "if (!host) {{ throw new Error({msg}); }} {body}",
            msg = lit(&format!("instance not found: {}", spec.instance)),
        ),
    )
}

#[allow(clippy::too_many_lines)]
fn render_source(probe: &Probe, spec: &ComponentSpec) -> String {
    let parts = &spec.parts;
    match probe {
        Probe::Registration => with_host(
            spec,
            &format!(
                "return {{ defined: customElements.get({tag}) !== undefined, \
                 found: !!host, localName: host ? host.localName : null }};",
                tag = lit(&spec.tag),
            ),
        ),
        Probe::IsOpen => require_host(spec, "return !!host.open;"),
        Probe::Show => require_host(spec, "host.show(); return null;"),
        Probe::Close => require_host(spec, "host.close(); return null;"),
        Probe::SetOpen(open) => require_host(spec, &format!("host.open = {open}; return null;")),
        Probe::FetchManifest => format!(
            "(async () => {{ try {{ const response = await fetch({url}); \
             return await response.json(); }} catch (e) {{ return null; }} }})()",
            url = lit(&spec.manifest_url),
        ),
        Probe::AssignManifest { manifest, open } => require_host(
            spec,
            &format!(
                "host.links = {data}; if ({open}) {{ host.open = true; }} return null;",
                data = lit(manifest),
            ),
        ),
        Probe::LinkCount => with_host(
            spec,
            "const links = host ? host.links : null; \
             return Array.isArray(links) ? links.length : 0;",
        ),
        Probe::HasShadowRoot => with_host(spec, "return root !== null;"),
        Probe::ClickBackdrop => with_host(
            spec,
            &format!(
                "if (!root) return false; const overlay = root.querySelector({sel}); \
                 if (!overlay) return false; const rect = overlay.getBoundingClientRect(); \
                 overlay.dispatchEvent(new MouseEvent('click', {{ bubbles: true, cancelable: true, \
                 view: window, clientX: rect.left + rect.width / 2, \
                 clientY: rect.top + rect.height / 2 }})); return true;",
                sel = lit(&parts.overlay),
            ),
        ),
        Probe::ClickCloseControl => with_host(
            spec,
            &format!(
                "if (!root) return false; const button = root.querySelector({sel}); \
                 if (!button) return false; button.click(); return true;",
                sel = lit(&parts.close_control),
            ),
        ),
        Probe::RenderCounts => with_host(
            spec,
            &format!(
                "if (!root) return {{ found: false }}; \
                 const count = (s) => root.querySelectorAll(s).length; \
                 return {{ found: true, sectionsCount: count({section}), \
                 headersCount: count({header}), chipsCount: count({chip}), \
                 activeChipsCount: count({active}), \
                 hasTitle: !!root.querySelector({title}), \
                 hasContainer: !!root.querySelector({container}), \
                 hasOverlay: !!root.querySelector({overlay}) }};",
                section = lit(&parts.section),
                header = lit(&parts.section_header),
                chip = lit(&parts.chip),
                active = lit(&parts.active_chip()),
                title = lit(&parts.title),
                container = lit(&parts.container),
                overlay = lit(&parts.overlay),
            ),
        ),
        Probe::ActivateFirstChip => with_host(
            spec,
            &format!(
                "if (!root) return {{ success: false, error: 'No shadow root' }}; \
                 const chip = root.querySelector({chip}); \
                 if (!chip) return {{ success: false, error: 'No chips found' }}; \
                 let received = false; let detail = null; \
                 const handler = (e) => {{ received = true; detail = e.detail === undefined ? null : e.detail; }}; \
                 host.addEventListener({event}, handler); \
                 try {{ chip.click(); }} finally {{ host.removeEventListener({event}, handler); }} \
                 return {{ success: true, chipText: chip.textContent.trim(), \
                 eventReceived: received, eventDetail: detail }};",
                chip = lit(&parts.chip),
                event = lit(&spec.event),
            ),
        ),
        Probe::Visibility => with_host(
            spec,
            &format!(
                "if (!root) return {{ found: false }}; \
                 const overlay = root.querySelector({overlay}); \
                 const container = root.querySelector({container}); \
                 if (!overlay || !container) return {{ found: false }}; \
                 const o = getComputedStyle(overlay); const c = getComputedStyle(container); \
                 return {{ found: true, overlayOpacity: o.opacity, overlayVisibility: o.visibility, \
                 overlayDisplay: o.display, containerOpacity: c.opacity, \
                 containerDisplay: c.display }};",
                overlay = lit(&parts.overlay),
                container = lit(&parts.container),
            ),
        ),
        Probe::Fonts => with_host(
            spec,
            &format!(
                "if (!root) return {{ found: false }}; \
                 const font = (s) => {{ const el = root.querySelector(s); \
                 return el ? getComputedStyle(el).fontFamily : null; }}; \
                 return {{ found: true, titleFont: font({title}), chipFont: font({chip}), \
                 iconFont: font({icon}) }};",
                title = lit(&parts.title),
                chip = lit(&parts.chip),
                icon = lit(&parts.icon),
            ),
        ),
        Probe::HostProperty(name) => with_host(
            spec,
            &format!(
                "if (!host) return null; \
                 return getComputedStyle(host).getPropertyValue({name}).trim();",
                name = lit(name),
            ),
        ),
        Probe::ShadowStyle { selector, property } => with_host(
            spec,
            &format!(
                "if (!root) return null; const el = root.querySelector({sel}); \
                 if (!el) return null; return getComputedStyle(el).getPropertyValue({prop});",
                sel = lit(selector),
                prop = lit(property),
            ),
        ),
        Probe::RenderStable => "(async () => { \
             await new Promise((r) => requestAnimationFrame(() => requestAnimationFrame(r))); \
             return document.getAnimations().every((a) => a.playState !== 'running'); })()"
            .to_string(),
        Probe::Inspect {
            selector,
            shadow_selector,
            custom_properties,
        } => format!(
            "(() => {{ const selector = {sel}; const shadowSelector = {shadow}; \
             let el = document.querySelector(selector); \
             if (!el) return {{ error: `Element not found: ${{selector}}` }}; \
             if (shadowSelector && el.shadowRoot) {{ el = el.shadowRoot.querySelector(shadowSelector); \
             if (!el) return {{ error: `Shadow element not found: ${{shadowSelector}}` }}; }} \
             const rect = el.getBoundingClientRect(); const s = getComputedStyle(el); \
             const customProperties = {{}}; \
             for (const p of {props}) {{ const v = s.getPropertyValue(p); \
             if (v) customProperties[p] = v.trim(); }} \
             const rootNode = el.getRootNode(); \
             return {{ selector: selector + (shadowSelector ? ` >> ${{shadowSelector}}` : ''), \
             tagName: el.tagName.toLowerCase(), className: (el.className && el.className.toString()) || '', \
             id: el.id || null, \
             boundingBox: {{ width: rect.width, height: rect.height, top: rect.top, left: rect.left }}, \
             computedStyles: {{ color: s.color, backgroundColor: s.backgroundColor, \
             borderColor: s.borderColor, opacity: s.opacity, visibility: s.visibility, \
             display: s.display, fontSize: s.fontSize, fontFamily: s.fontFamily, \
             padding: s.padding, margin: s.margin }}, \
             customProperties, \
             shadowHost: rootNode instanceof ShadowRoot ? rootNode.host.tagName.toLowerCase() : null, \
             text: el.textContent ? el.textContent.trim().substring(0, 50) : null }}; }})()",
            sel = lit(selector),
            shadow = lit(shadow_selector),
            props = lit(custom_properties),
        ),
        Probe::Inventory { selectors } => format!(
            "(() => {{ const out = []; \
             for (const selector of {sels}) {{ const els = document.querySelectorAll(selector); \
             els.forEach((el, index) => {{ const rect = el.getBoundingClientRect(); \
             const s = getComputedStyle(el); let host = null; let parent = el.parentElement; \
             while (parent) {{ if (parent.shadowRoot) {{ host = parent.tagName.toLowerCase(); break; }} \
             parent = parent.parentElement; }} \
             out.push({{ selector: selector + (els.length > 1 ? `[${{index}}]` : ''), \
             tagName: el.tagName.toLowerCase(), \
             className: (el.className && el.className.toString()) || '', id: el.id || null, \
             visible: rect.width > 0 && rect.height > 0, \
             dimensions: {{ width: rect.width, height: rect.height, top: rect.top, left: rect.left }}, \
             styles: {{ color: s.color, backgroundColor: s.backgroundColor, opacity: s.opacity, \
             visibility: s.visibility, display: s.display }}, \
             shadowHost: host, \
             text: el.textContent ? el.textContent.substring(0, 50) : null }}); }}); }} \
             return out; }})()",
            sels = lit(selectors),
        ),
        Probe::CustomElements { names } => format!(
            "{names}.map((name) => ({{ name, defined: customElements.get(name) !== undefined, \
             instances: document.querySelectorAll(name).length }}))",
            names = lit(names),
        ),
    }
}

/// Answer of a probe that reports `{ found: false }` when the elements it
/// reads are absent. Any other answer must carry every field of `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The elements were present and the record decoded in full
    Found(T),
    /// The probe reported `found: false`
    Missing,
}

impl<T> Lookup<T> {
    /// The record, if the elements were present
    #[must_use]
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(record) => Some(record),
            Self::Missing => None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lookup<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if value.get("found") == Some(&Value::Bool(false)) {
            return Ok(Self::Missing);
        }
        T::deserialize(value)
            .map(Self::Found)
            .map_err(de::Error::custom)
    }
}

/// Answer to [`Probe::Registration`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationState {
    /// `customElements.get(tag)` returned a constructor
    pub defined: bool,
    /// The instance selector matched
    pub found: bool,
    /// `localName` of the matched element
    #[serde(deserialize_with = "Option::deserialize")]
    pub local_name: Option<String>,
}

/// Answer to [`Probe::RenderCounts`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCounts {
    /// Rendered sections
    pub sections_count: usize,
    /// Rendered section headers
    pub headers_count: usize,
    /// Rendered chips
    pub chips_count: usize,
    /// Rendered active chips
    pub active_chips_count: usize,
    /// Title present
    pub has_title: bool,
    /// Container present
    pub has_container: bool,
    /// Overlay present
    pub has_overlay: bool,
}

/// Answer to [`Probe::ActivateFirstChip`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChipActivation {
    /// A chip was clicked
    Clicked {
        /// Text of the clicked chip
        #[serde(rename = "chipText")]
        chip_text: String,
        /// Notification event observed
        #[serde(rename = "eventReceived")]
        event_received: bool,
        /// `detail` of the event
        #[serde(rename = "eventDetail", deserialize_with = "Option::deserialize")]
        event_detail: Option<Value>,
    },
    /// No chip could be clicked
    Refused {
        /// Reason reported by the page
        error: String,
    },
}

/// Answer to [`Probe::Visibility`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityState {
    /// Computed overlay opacity
    pub overlay_opacity: String,
    /// Computed overlay visibility
    pub overlay_visibility: String,
    /// Computed overlay display
    pub overlay_display: String,
    /// Computed container opacity
    pub container_opacity: String,
    /// Computed container display
    pub container_display: String,
}

impl VisibilityState {
    /// Overlay is fully opaque and visible
    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.overlay_opacity == "1" && self.overlay_visibility == "visible"
    }

    /// Container is fully opaque
    #[must_use]
    pub fn container_visible(&self) -> bool {
        self.container_opacity == "1"
    }
}

/// Answer to [`Probe::Fonts`]. A font is `None` when its element is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontAudit {
    /// Title font family
    #[serde(deserialize_with = "Option::deserialize")]
    pub title_font: Option<String>,
    /// Chip font family
    #[serde(deserialize_with = "Option::deserialize")]
    pub chip_font: Option<String>,
    /// Icon font family
    #[serde(deserialize_with = "Option::deserialize")]
    pub icon_font: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ComponentSpec {
        ComponentSpec::default()
    }

    #[test]
    fn test_selectors_are_quoted() {
        let script = Script::render(Probe::IsOpen, &spec());
        assert!(script.source.contains(r##"document.querySelector("#linksModal")"##));
        assert_eq!(script.label(), "isOpen");
    }

    #[test]
    fn test_registration_uses_declared_tag() {
        let script = Script::render(Probe::Registration, &spec());
        assert!(script.source.contains(r#"customElements.get("wy-links-modal")"#));
        assert!(script.source.contains("localName"));
    }

    #[test]
    fn test_manifest_is_embedded_as_json() {
        let manifest = Manifest::from_json(
            r#"[{"category":"AI","links":[{"name":"A \"quoted\"","company":"X","title":"T"}]}]"#,
        )
        .unwrap();
        let data = serde_json::to_string(manifest.as_json()).unwrap();
        let script = Script::render(
            Probe::AssignManifest {
                manifest,
                open: true,
            },
            &spec(),
        );
        assert!(script.source.contains(&format!("host.links = {data};")));
        assert!(script.source.contains(r#""category":"AI""#));
        assert!(script.source.contains(r#""company":"X""#));
        assert!(script.source.contains(r#"A \"quoted\""#));
        assert!(script.source.contains("if (true)"));
    }

    #[test]
    fn test_render_counts_use_part_selectors() {
        let mut spec = spec();
        spec.parts.chip = ".chip".to_string();
        let script = Script::render(Probe::RenderCounts, &spec);
        assert!(script.source.contains(r#"count(".chip")"#));
        assert!(script.source.contains(r#"count(".chip.active")"#));
    }

    #[test]
    fn test_fetch_manifest_is_async() {
        let script = Script::render(Probe::FetchManifest, &spec());
        assert!(script.source.starts_with("(async () =>"));
        assert!(script.source.contains(r#"fetch("/links.json")"#));
    }

    #[test]
    fn test_inspect_without_shadow_selector() {
        let script = Script::render(
            Probe::Inspect {
                selector: ".search-input".to_string(),
                shadow_selector: None,
                custom_properties: vec!["--color-text-primary".to_string()],
            },
            &spec(),
        );
        assert!(script.source.contains("const shadowSelector = null;"));
        assert!(script.source.contains(r#"["--color-text-primary"]"#));
    }

    #[test]
    fn test_visibility_predicates() {
        let state = VisibilityState {
            overlay_opacity: "1".to_string(),
            overlay_visibility: "visible".to_string(),
            overlay_display: "flex".to_string(),
            container_opacity: "0.5".to_string(),
            container_display: "block".to_string(),
        };
        assert!(state.overlay_visible());
        assert!(!state.container_visible());
    }

    mod decode_tests {
        use super::*;
        use serde_json::json;

        #[test]
        fn test_found_false_is_missing() {
            let counts: Lookup<RenderCounts> = serde_json::from_value(json!({"found": false})).unwrap();
            assert_eq!(counts, Lookup::Missing);
            let fonts: Lookup<FontAudit> = serde_json::from_value(json!({
                "found": false,
                "titleFont": null
            }))
            .unwrap();
            assert!(fonts.found().is_none());
        }

        #[test]
        fn test_truncated_answer_is_rejected() {
            let truncated = serde_json::from_value::<Lookup<RenderCounts>>(json!({"found": true}));
            assert!(truncated.is_err());
            let misspelled = serde_json::from_value::<Lookup<RenderCounts>>(json!({
                "found": true,
                "sectionCount": 2,
                "headersCount": 2,
                "chipsCount": 3,
                "activeChipsCount": 1,
                "hasTitle": true,
                "hasContainer": true,
                "hasOverlay": true
            }));
            let err = misspelled.unwrap_err().to_string();
            assert!(err.contains("sectionsCount"), "{err}");
        }

        #[test]
        fn test_fonts_must_be_reported_even_when_null() {
            let partial = serde_json::from_value::<Lookup<FontAudit>>(json!({
                "found": true,
                "titleFont": "Inter"
            }));
            assert!(partial.is_err());
            let fonts: Lookup<FontAudit> = serde_json::from_value(json!({
                "found": true,
                "titleFont": "Inter",
                "chipFont": null,
                "iconFont": null
            }))
            .unwrap();
            let fonts = fonts.found().unwrap();
            assert_eq!(fonts.title_font.as_deref(), Some("Inter"));
            assert!(fonts.chip_font.is_none());
        }

        #[test]
        fn test_chip_activation_variants() {
            let refused: ChipActivation =
                serde_json::from_value(json!({"success": false, "error": "No chips found"})).unwrap();
            assert_eq!(
                refused,
                ChipActivation::Refused {
                    error: "No chips found".to_string()
                }
            );
            let clicked: ChipActivation = serde_json::from_value(json!({
                "success": true,
                "chipText": "Editor",
                "eventReceived": true,
                "eventDetail": null
            }))
            .unwrap();
            assert!(matches!(
                clicked,
                ChipActivation::Clicked { event_detail: None, .. }
            ));
            assert!(serde_json::from_value::<ChipActivation>(json!({"success": true})).is_err());
        }
    }
}
