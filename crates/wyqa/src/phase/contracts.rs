//! Visual contract phases: reference palette and design-token resolution.

use super::{open_with_manifest, Phase, PhaseRecorder};
use crate::color::{Color, ComparisonRecord};
use crate::component::ShadowParts;
use crate::css::{
    check_dependent, check_property, default_dependents, default_properties, DependentStyle,
    PropertyExpectation,
};
use crate::driver::Probe;
use crate::result::HarnessResult;
use crate::session::Session;

/// A computed color that must match the reference design
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceColor {
    /// Element key used in reports
    pub key: String,
    /// Selector inside the shadow root
    pub selector: String,
    /// CSS property read from the computed style
    pub property: String,
    /// Reference value
    pub expected: Color,
}

impl ReferenceColor {
    /// Create a reference entry
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        selector: impl Into<String>,
        property: impl Into<String>,
        expected: Color,
    ) -> Self {
        Self {
            key: key.into(),
            selector: selector.into(),
            property: property.into(),
            expected,
        }
    }

    /// Stone palette of the links modal design
    #[must_use]
    pub fn links_modal_palette(parts: &ShadowParts) -> Vec<Self> {
        vec![
            Self::new("title", &parts.title, "color", Color::from_hex(0x1C1917)),
            Self::new(
                "section_header",
                &parts.section_header,
                "color",
                Color::from_hex(0x292524),
            ),
            Self::new(
                "chip_text",
                parts.inactive_chip(),
                "color",
                Color::from_hex(0x44403C),
            ),
            Self::new(
                "close_button",
                &parts.close_control,
                "color",
                Color::from_hex(0xA8A29E),
            ),
            Self::new(
                "chip_border",
                parts.inactive_chip(),
                "border-color",
                Color::from_hex(0xD9D4C7),
            ),
        ]
    }
}

/// Computed colors match the reference palette within the match band
#[derive(Debug, Clone, Default)]
pub struct ColorAccuracy {
    references: Option<Vec<ReferenceColor>>,
}

impl ColorAccuracy {
    /// Compare against explicit references instead of the default palette
    #[must_use]
    pub fn with_references(references: Vec<ReferenceColor>) -> Self {
        Self {
            references: Some(references),
        }
    }
}

impl Phase for ColorAccuracy {
    fn name(&self) -> &'static str {
        "color_accuracy"
    }

    fn title(&self) -> &'static str {
        "Color Accuracy"
    }

    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
        if open_with_manifest(session, rec)?.is_none() {
            return Ok(());
        }
        let references = self
            .references
            .clone()
            .unwrap_or_else(|| ReferenceColor::links_modal_palette(&session.component().parts));

        for reference in references {
            let computed: Option<String> = session.query(Probe::ShadowStyle {
                selector: reference.selector.clone(),
                property: reference.property.clone(),
            })?;
            let Some(computed) = computed.filter(|c| !c.trim().is_empty()) else {
                rec.fail(
                    &reference.key,
                    format!("{}: element {} not found", reference.key, reference.selector),
                );
                continue;
            };
            let actual = match computed.parse::<Color>() {
                Ok(color) => color,
                Err(e) => {
                    rec.fail(&reference.key, format!("{}: {e}", reference.key));
                    continue;
                }
            };
            let record = ComparisonRecord::compare(&reference.key, actual, reference.expected);
            if record.passes() {
                rec.pass(&reference.key);
            } else {
                rec.fail(&reference.key, record.to_string());
            }
        }

        session.perform(Probe::Close)
    }
}

/// Design tokens resolve and dependent styles carry their values
#[derive(Debug, Clone)]
pub struct CssVariables {
    properties: Vec<PropertyExpectation>,
    dependents: Vec<DependentStyle>,
}

impl Default for CssVariables {
    fn default() -> Self {
        Self {
            properties: default_properties(),
            dependents: default_dependents(),
        }
    }
}

impl CssVariables {
    /// Check a custom set of tokens and dependent styles
    #[must_use]
    pub fn new(properties: Vec<PropertyExpectation>, dependents: Vec<DependentStyle>) -> Self {
        Self {
            properties,
            dependents,
        }
    }
}

impl Phase for CssVariables {
    fn name(&self) -> &'static str {
        "css_variables"
    }

    fn title(&self) -> &'static str {
        "CSS Variables"
    }

    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
        if open_with_manifest(session, rec)?.is_none() {
            return Ok(());
        }

        for expectation in &self.properties {
            let resolved: Option<String> =
                session.query(Probe::HostProperty(expectation.name.clone()))?;
            match check_property(expectation, resolved.as_deref()) {
                Ok(()) => rec.pass(&expectation.name),
                Err(issue) => rec.fail(&expectation.name, issue.to_string()),
            }
        }

        for style in &self.dependents {
            let label = format!("{} {}", style.selector, style.property);
            let Some(token) = self.properties.iter().find(|p| p.name == style.variable) else {
                rec.fail(&label, format!("{label}: no expectation for {}", style.variable));
                continue;
            };
            let computed: Option<String> = session.query(Probe::ShadowStyle {
                selector: style.selector.clone(),
                property: style.property.clone(),
            })?;
            match check_dependent(style, &token.expected, computed.as_deref()) {
                Ok(()) => rec.pass(&label),
                Err(issue) => rec.fail(&label, issue.to_string()),
            }
        }

        session.perform(Probe::Close)
    }
}
