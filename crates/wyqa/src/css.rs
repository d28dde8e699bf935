//! CSS custom-property contract checks.
//!
//! A component declares design tokens as custom properties on its host
//! (`--spacing-2xl: 3rem`). The checker confirms each token resolves to the
//! expected literal and that computed styles which should derive from a
//! token actually carry its value.

use crate::color::{color_delta, Color, MATCH_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixels per `rem`/`em`
pub const ROOT_FONT_SIZE_PX: f64 = 16.0;

/// Value a custom property is expected to resolve to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExpectedValue {
    /// A length in pixels
    Length(f64),
    /// A color, compared case-insensitively after parsing
    Color(String),
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(px) => write!(f, "{px}px"),
            Self::Color(c) => write!(f, "{}", c.to_ascii_lowercase()),
        }
    }
}

/// A custom property and the value it must resolve to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyExpectation {
    /// Property name including the leading `--`
    pub name: String,
    /// Expected resolution
    pub expected: ExpectedValue,
}

impl PropertyExpectation {
    /// Expect a length token
    #[must_use]
    pub fn length(name: impl Into<String>, px: f64) -> Self {
        Self {
            name: name.into(),
            expected: ExpectedValue::Length(px),
        }
    }

    /// Expect a color token
    #[must_use]
    pub fn color(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: ExpectedValue::Color(value.into()),
        }
    }
}

/// A computed style that must carry the value of a custom property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentStyle {
    /// Selector inside the component's shadow root
    pub selector: String,
    /// Computed style property (CSS name, e.g. `margin-bottom`)
    pub property: String,
    /// Custom property the style derives from
    pub variable: String,
}

impl DependentStyle {
    /// Create a dependent style expectation
    #[must_use]
    pub fn new(
        selector: impl Into<String>,
        property: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            property: property.into(),
            variable: variable.into(),
        }
    }
}

/// Contract violation
#[derive(Debug, Clone, PartialEq)]
pub enum ContractIssue {
    /// Property resolved to nothing
    Unresolved {
        /// Property or style name
        name: String,
    },
    /// Property resolved, but to the wrong literal
    WrongValue {
        /// Property or style name
        name: String,
        /// Resolved literal
        actual: String,
        /// Expected literal
        expected: String,
    },
}

impl fmt::Display for ContractIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { name } => write!(f, "{name} is unresolved (empty value)"),
            Self::WrongValue {
                name,
                actual,
                expected,
            } => write!(f, "{name} resolved to {actual}, expected {expected}"),
        }
    }
}

/// Convert a CSS length literal to pixels. Accepts `px`, `rem`, `em` and
/// unitless zero.
#[must_use]
pub fn length_to_px(literal: &str) -> Option<f64> {
    let value = literal.trim().to_ascii_lowercase();
    if value == "0" {
        return Some(0.0);
    }
    if let Some(n) = value.strip_suffix("rem").or_else(|| value.strip_suffix("em")) {
        return n.trim().parse::<f64>().ok().map(|v| v * ROOT_FONT_SIZE_PX);
    }
    value.strip_suffix("px")?.trim().parse::<f64>().ok()
}

fn same_px(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.5
}

fn same_color(actual: &str, expected: &str) -> bool {
    if actual.trim().eq_ignore_ascii_case(expected.trim()) {
        return true;
    }
    match (actual.parse::<Color>(), expected.parse::<Color>()) {
        (Ok(a), Ok(e)) => color_delta(a, e) < MATCH_THRESHOLD,
        _ => false,
    }
}

/// Check one custom property against its expectation.
///
/// `resolved` is the trimmed value of `getPropertyValue(name)` on the host.
pub fn check_property(
    expectation: &PropertyExpectation,
    resolved: Option<&str>,
) -> Result<(), ContractIssue> {
    let name = expectation.name.clone();
    let actual = match resolved.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ContractIssue::Unresolved { name }),
    };

    let ok = match &expectation.expected {
        ExpectedValue::Length(px) => length_to_px(actual).is_some_and(|v| same_px(v, *px)),
        ExpectedValue::Color(c) => same_color(actual, c),
    };

    if ok {
        Ok(())
    } else {
        Err(ContractIssue::WrongValue {
            name,
            actual: actual.to_string(),
            expected: expectation.expected.to_string(),
        })
    }
}

/// Check that a computed style carries the value implied by a token.
///
/// Longhand values must match exactly; a shorthand (`padding: 32px 24px`)
/// matches when any of its components does. Colors match within the
/// comparator's match band.
pub fn check_dependent(
    style: &DependentStyle,
    token: &ExpectedValue,
    computed: Option<&str>,
) -> Result<(), ContractIssue> {
    let name = format!("{} {}", style.selector, style.property);
    let actual = match computed.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ContractIssue::Unresolved { name }),
    };

    let ok = match token {
        ExpectedValue::Length(px) => actual
            .split_whitespace()
            .filter_map(length_to_px)
            .any(|v| same_px(v, *px)),
        ExpectedValue::Color(c) => same_color(actual, c),
    };

    if ok {
        Ok(())
    } else {
        Err(ContractIssue::WrongValue {
            name,
            actual: actual.to_string(),
            expected: token.to_string(),
        })
    }
}

/// Tokens the links modal declares on its host
#[must_use]
pub fn default_properties() -> Vec<PropertyExpectation> {
    vec![
        PropertyExpectation::length("--spacing-sm", 8.0),
        PropertyExpectation::length("--spacing-lg", 24.0),
        PropertyExpectation::length("--spacing-xl", 32.0),
        PropertyExpectation::length("--spacing-2xl", 48.0),
        PropertyExpectation::color("--wy-links-modal-text-muted", "#6b685f"),
        PropertyExpectation::color("--wy-links-modal-chip-border", "#d9d4c7"),
    ]
}

/// Computed styles that must derive from the tokens above
#[must_use]
pub fn default_dependents() -> Vec<DependentStyle> {
    vec![
        DependentStyle::new(".title-wrapper", "margin-bottom", "--spacing-2xl"),
        DependentStyle::new(".modal-content", "padding", "--spacing-xl"),
        DependentStyle::new(".close-button", "color", "--wy-links-modal-text-muted"),
        DependentStyle::new(
            ".link-chip:not(.active)",
            "border-color",
            "--wy-links-modal-chip-border",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    mod length_tests {
        use super::*;

        #[test]
        fn test_rem_is_sixteen_px() {
            assert_eq!(length_to_px("3rem"), Some(48.0));
            assert_eq!(length_to_px("0.5rem"), Some(8.0));
        }

        #[test]
        fn test_px_and_zero() {
            assert_eq!(length_to_px("32px"), Some(32.0));
            assert_eq!(length_to_px(" 24px "), Some(24.0));
            assert_eq!(length_to_px("0"), Some(0.0));
        }

        #[test]
        fn test_unknown_units() {
            assert_eq!(length_to_px("10vh"), None);
            assert_eq!(length_to_px("auto"), None);
        }
    }

    mod property_tests {
        use super::*;

        #[test]
        fn test_spacing_2xl_resolves_to_48px() {
            let exp = PropertyExpectation::length("--spacing-2xl", 48.0);
            assert_eq!(check_property(&exp, Some("3rem")), Ok(()));
            assert_eq!(check_property(&exp, Some("48px")), Ok(()));
        }

        #[test]
        fn test_empty_is_unresolved_not_wrong() {
            let exp = PropertyExpectation::length("--spacing-2xl", 48.0);
            let issue = check_property(&exp, Some("  ")).unwrap_err();
            assert!(matches!(issue, ContractIssue::Unresolved { .. }));
            let issue = check_property(&exp, None).unwrap_err();
            assert!(matches!(issue, ContractIssue::Unresolved { .. }));
        }

        #[test]
        fn test_wrong_length() {
            let exp = PropertyExpectation::length("--spacing-xl", 32.0);
            let issue = check_property(&exp, Some("1.5rem")).unwrap_err();
            assert_eq!(
                issue,
                ContractIssue::WrongValue {
                    name: "--spacing-xl".to_string(),
                    actual: "1.5rem".to_string(),
                    expected: "32px".to_string(),
                }
            );
        }

        #[test]
        fn test_color_case_insensitive() {
            let exp = PropertyExpectation::color("--wy-links-modal-chip-border", "#D9D4C7");
            assert_eq!(check_property(&exp, Some("#d9d4c7")), Ok(()));
            assert_eq!(check_property(&exp, Some("rgb(217, 212, 199)")), Ok(()));
            assert!(check_property(&exp, Some("#000000")).is_err());
        }
    }

    mod dependent_tests {
        use super::*;

        #[test]
        fn test_margin_matches_token() {
            let style = DependentStyle::new(".title-wrapper", "margin-bottom", "--spacing-2xl");
            assert_eq!(
                check_dependent(&style, &ExpectedValue::Length(48.0), Some("48px")),
                Ok(())
            );
            assert!(check_dependent(&style, &ExpectedValue::Length(48.0), Some("40px")).is_err());
        }

        #[test]
        fn test_shorthand_padding() {
            let style = DependentStyle::new(".modal-content", "padding", "--spacing-xl");
            assert_eq!(
                check_dependent(&style, &ExpectedValue::Length(32.0), Some("32px 24px")),
                Ok(())
            );
        }

        #[test]
        fn test_computed_color_against_hex_token() {
            let style = DependentStyle::new(".close-button", "color", "--x");
            let token = ExpectedValue::Color("#6b685f".to_string());
            assert_eq!(check_dependent(&style, &token, Some("rgb(107, 104, 95)")), Ok(()));
        }

        #[test]
        fn test_missing_computed_style() {
            let style = DependentStyle::new(".modal-content", "padding", "--spacing-xl");
            let issue = check_dependent(&style, &ExpectedValue::Length(32.0), None).unwrap_err();
            assert_eq!(issue.to_string(), ".modal-content padding is unresolved (empty value)");
        }
    }

    #[test]
    fn test_defaults_reference_declared_tokens() {
        let names: Vec<_> = default_properties().into_iter().map(|p| p.name).collect();
        for dep in default_dependents() {
            assert!(names.contains(&dep.variable), "{} not declared", dep.variable);
        }
    }
}
