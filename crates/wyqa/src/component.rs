//! Description of the component under test.
//!
//! Defaults describe the `wy-links-modal` element; other components with
//! the same overlay/chip structure can be described in YAML.

use crate::result::HarnessResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Selectors of the parts inside the component's shadow root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowParts {
    /// Backdrop that closes the component when clicked
    pub overlay: String,
    /// Dialog container
    pub container: String,
    /// Title element
    pub title: String,
    /// One per category
    pub section: String,
    /// Category heading
    pub section_header: String,
    /// One per link
    pub chip: String,
    /// Class marking an active chip
    pub active_class: String,
    /// Dedicated close control
    pub close_control: String,
    /// Icon glyph element
    pub icon: String,
}

impl Default for ShadowParts {
    fn default() -> Self {
        Self {
            overlay: ".modal-overlay".to_string(),
            container: ".modal-container".to_string(),
            title: ".modal-title".to_string(),
            section: ".section".to_string(),
            section_header: ".section-header".to_string(),
            chip: ".link-chip".to_string(),
            active_class: "active".to_string(),
            close_control: ".close-button".to_string(),
            icon: ".material-symbols-outlined".to_string(),
        }
    }
}

impl ShadowParts {
    /// Selector matching active chips
    #[must_use]
    pub fn active_chip(&self) -> String {
        format!("{}.{}", self.chip, self.active_class)
    }

    /// Selector matching inactive chips
    #[must_use]
    pub fn inactive_chip(&self) -> String {
        format!("{}:not(.{})", self.chip, self.active_class)
    }
}

/// The component under test and its surroundings on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentSpec {
    /// Custom element tag, as declared
    pub tag: String,
    /// Selector of the live instance
    pub instance: String,
    /// External control that opens the component
    pub trigger: String,
    /// URL of the manifest, relative to the page
    pub manifest_url: String,
    /// Event dispatched when a chip is activated
    pub event: String,
    /// Shadow part selectors
    pub parts: ShadowParts,
    /// URL fragments of resources the component depends on
    pub dependency_patterns: Vec<String>,
    /// Console error text considered relevant
    pub console_keywords: Vec<String>,
    /// Custom elements listed in capture inventories
    pub inventory_elements: Vec<String>,
}

impl Default for ComponentSpec {
    fn default() -> Self {
        Self {
            tag: "wy-links-modal".to_string(),
            instance: "#linksModal".to_string(),
            trigger: "#openLinksModal".to_string(),
            manifest_url: "/links.json".to_string(),
            event: "link-click".to_string(),
            parts: ShadowParts::default(),
            dependency_patterns: vec!["jsdelivr".to_string(), "web-components.js".to_string()],
            console_keywords: vec![
                "links".to_string(),
                "modal".to_string(),
                "wy-links".to_string(),
            ],
            inventory_elements: vec![
                "wy-controls-bar".to_string(),
                "wy-filter-chip".to_string(),
                "wy-modal".to_string(),
                "wy-prompt-modal".to_string(),
                "wy-links-modal".to_string(),
            ],
        }
    }
}

impl ComponentSpec {
    /// Load a component description from a YAML file; missing keys keep
    /// their defaults
    pub fn from_yaml_file(path: &Path) -> HarnessResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parse a component description from YAML text
    pub fn from_yaml(text: &str) -> HarnessResult<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Whether a response URL belongs to a declared dependency
    #[must_use]
    pub fn is_dependency(&self, url: &str) -> bool {
        self.dependency_patterns.iter().any(|p| url.contains(p.as_str()))
    }

    /// Whether console text mentions the component
    #[must_use]
    pub fn is_relevant_console_text(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.console_keywords
            .iter()
            .any(|k| lower.contains(&k.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let spec = ComponentSpec::default();
        assert_eq!(spec.tag, "wy-links-modal");
        assert_eq!(spec.parts.active_chip(), ".link-chip.active");
        assert_eq!(spec.parts.inactive_chip(), ".link-chip:not(.active)");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let spec = ComponentSpec::from_yaml("tag: wy-help-modal\ninstance: '#help'\n").unwrap();
        assert_eq!(spec.tag, "wy-help-modal");
        assert_eq!(spec.instance, "#help");
        assert_eq!(spec.manifest_url, "/links.json");
        assert_eq!(spec.parts.chip, ".link-chip");
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("component.yaml");
        std::fs::write(&path, "parts:\n  chip: .chip\n").unwrap();
        let spec = ComponentSpec::from_yaml_file(&path).unwrap();
        assert_eq!(spec.parts.chip, ".chip");
        assert_eq!(spec.parts.overlay, ".modal-overlay");
    }

    #[test]
    fn test_dependency_and_console_matching() {
        let spec = ComponentSpec::default();
        assert!(spec.is_dependency("https://cdn.jsdelivr.net/npm/x/web-components.js"));
        assert!(!spec.is_dependency("http://localhost:8000/app.js"));
        assert!(spec.is_relevant_console_text("Error loading LINKS: 404"));
        assert!(!spec.is_relevant_console_text("favicon missing"));
    }
}
