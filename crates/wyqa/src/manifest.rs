//! Links manifest: the categories and entries the component renders.
//!
//! The manifest is kept exactly as the page serves it and is handed back to
//! the component unchanged. Only the counts the rendered tree must
//! reproduce are derived from it: one section per category, one chip per
//! entry in its `links` array, one active chip per entry whose `active` is
//! `true`. Every other key belongs to the component.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered list of categories, as served
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    data: Value,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            data: Value::Array(Vec::new()),
        }
    }
}

/// Counts the rendered shadow tree must reproduce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedCounts {
    /// One section per category
    pub sections_count: usize,
    /// One chip per link
    pub chips_count: usize,
    /// One active chip per active link
    pub active_chips_count: usize,
}

fn links_of(category: &Value) -> &[Value] {
    category
        .get("links")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

impl Manifest {
    /// Wrap served JSON
    #[must_use]
    pub const fn from_value(data: Value) -> Self {
        Self { data }
    }

    /// Parse a manifest from JSON text
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// The manifest exactly as served
    #[must_use]
    pub const fn as_json(&self) -> &Value {
        &self.data
    }

    /// Categories in display order; empty unless the manifest is an array
    #[must_use]
    pub fn categories(&self) -> &[Value] {
        self.data.as_array().map_or(&[][..], Vec::as_slice)
    }

    /// Entries of every category in display order
    pub fn links(&self) -> impl Iterator<Item = &Value> {
        self.categories().iter().flat_map(links_of)
    }

    /// Whether there is nothing to render
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories().is_empty()
    }

    /// Number of categories
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories().len()
    }

    /// Counts expected in the rendered tree
    #[must_use]
    pub fn expected_counts(&self) -> ExpectedCounts {
        ExpectedCounts {
            sections_count: self.len(),
            chips_count: self.links().count(),
            active_chips_count: self
                .links()
                .filter(|l| l.get("active") == Some(&Value::Bool(true)))
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_counts_for_single_category() {
        let manifest = Manifest::from_json(
            r#"[{"name":"Tools","links":[{"label":"A","active":true},{"label":"B","active":false}]}]"#,
        )
        .unwrap();
        assert_eq!(
            manifest.expected_counts(),
            ExpectedCounts {
                sections_count: 1,
                chips_count: 2,
                active_chips_count: 1,
            }
        );
    }

    #[test]
    fn test_site_shaped_manifest_is_kept_verbatim() {
        let served = json!([
            {
                "category": "AI",
                "icon": "smart_toy",
                "links": [
                    {"name": "Claude", "company": "Anthropic", "url": "https://x"},
                    {"name": "Claude", "title": "Claude AI"}
                ]
            },
            {"category": "Docs", "links": []}
        ]);
        let manifest: Manifest = serde_json::from_value(served.clone()).unwrap();
        assert_eq!(manifest.as_json(), &served);
        assert_eq!(serde_json::to_value(&manifest).unwrap(), served);
        assert_eq!(
            manifest.expected_counts(),
            ExpectedCounts {
                sections_count: 2,
                chips_count: 2,
                active_chips_count: 0,
            }
        );
    }

    #[test]
    fn test_only_literal_true_is_active() {
        let manifest = Manifest::from_value(json!([
            {"links": [{"active": "yes"}, {"active": 1}, {"active": true}, {}]}
        ]));
        assert_eq!(manifest.expected_counts().active_chips_count, 1);
        assert_eq!(manifest.expected_counts().chips_count, 4);
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::from_json("[]").unwrap();
        assert!(manifest.is_empty());
        assert_eq!(manifest.expected_counts().chips_count, 0);
        assert_eq!(Manifest::default(), manifest);
    }

    #[test]
    fn test_non_array_has_no_categories() {
        let manifest = Manifest::from_value(json!({"error": "not found"}));
        assert!(manifest.is_empty());
        assert_eq!(manifest.expected_counts().sections_count, 0);
    }
}
