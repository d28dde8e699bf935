//! Color comparison and contrast analysis.
//!
//! Computed colors read back from the page are compared against reference
//! design colors by Euclidean distance in RGB space, and text/background pairs
//! are graded by WCAG 2.1 contrast ratio.
//!
//! ```text
//!   delta < 2.0          match   (imperceptible)
//!   2.0 <= delta < 5.0   minor   (noticeable)
//!   delta >= 5.0         major   (clearly visible)
//! ```

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Upper bound (exclusive) of the imperceptible band
pub const MATCH_THRESHOLD: f64 = 2.0;

/// Upper bound (exclusive) of the minor-mismatch band
pub const MINOR_THRESHOLD: f64 = 5.0;

/// Minimum contrast ratio for normal text (WCAG 2.1 AA)
pub const MIN_CONTRAST_NORMAL: f64 = 4.5;

/// Minimum contrast ratio for large text (WCAG 2.1 AA)
pub const MIN_CONTRAST_LARGE: f64 = 3.0;

/// Minimum contrast ratio for enhanced contrast (WCAG 2.1 AAA)
pub const MIN_CONTRAST_ENHANCED: f64 = 7.0;

/// Color represented as RGB values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl Color {
    /// Create a new color
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create from hex value (e.g., 0x1C1917)
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Get the relative luminance (per WCAG 2.1)
    #[must_use]
    pub fn relative_luminance(&self) -> f64 {
        let r = srgb_to_linear(f64::from(self.r) / 255.0);
        let g = srgb_to_linear(f64::from(self.g) / 255.0);
        let b = srgb_to_linear(f64::from(self.b) / 255.0);

        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// Lowercase `#rrggbb` form
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error returned when a CSS color string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported color value `{0}`")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parses `rgb(r, g, b)`, `rgba(r, g, b, a)`, `#rgb` and `#rrggbb`.
    /// Alpha is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let err = || ParseColorError(s.trim().to_string());

        if let Some(hex) = raw.strip_prefix('#') {
            let expanded: String = match hex.len() {
                3 => hex.chars().flat_map(|c| [c, c]).collect(),
                6 => hex.to_string(),
                _ => return Err(err()),
            };
            let value = u32::from_str_radix(&expanded, 16).map_err(|_| err())?;
            return Ok(Self::from_hex(value));
        }

        let inner = raw
            .strip_prefix("rgba(")
            .or_else(|| raw.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;

        let channels: Vec<u8> = inner
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .take(3)
            .map(|part| {
                part.parse::<f64>()
                    .ok()
                    .filter(|v| (0.0..=255.0).contains(v))
                    .map(|v| v.round() as u8)
            })
            .collect::<Option<_>>()
            .ok_or_else(err)?;

        match channels.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Convert sRGB to linear RGB (per WCAG 2.1)
fn srgb_to_linear(value: f64) -> f64 {
    if value <= 0.03928 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Euclidean distance between two colors in RGB space
#[must_use]
pub fn color_delta(a: Color, b: Color) -> f64 {
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Contrast ratio between two colors, symmetric in its arguments
#[must_use]
pub fn contrast_ratio(fg: Color, bg: Color) -> f64 {
    let l1 = fg.relative_luminance();
    let l2 = bg.relative_luminance();
    (l1.max(l2) + 0.05) / (l1.min(l2) + 0.05)
}

/// Tolerance band a color delta falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorVerdict {
    /// Imperceptible difference
    Match,
    /// Noticeable but small difference
    Minor,
    /// Clearly visible difference
    Major,
}

impl ColorVerdict {
    /// Classify a delta
    #[must_use]
    pub fn from_delta(delta: f64) -> Self {
        if delta < MATCH_THRESHOLD {
            Self::Match
        } else if delta < MINOR_THRESHOLD {
            Self::Minor
        } else {
            Self::Major
        }
    }

    /// Only an exact-band match passes
    #[must_use]
    pub const fn passes(self) -> bool {
        matches!(self, Self::Match)
    }
}

/// One actual-vs-expected color comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    /// Element key (e.g. `title`)
    pub key: String,
    /// Color read from the page
    pub actual: Color,
    /// Reference color
    pub expected: Color,
    /// Euclidean distance
    pub delta: f64,
    /// Tolerance band
    pub verdict: ColorVerdict,
}

impl ComparisonRecord {
    /// Compare an actual color with its reference
    #[must_use]
    pub fn compare(key: impl Into<String>, actual: Color, expected: Color) -> Self {
        let delta = color_delta(actual, expected);
        Self {
            key: key.into(),
            actual,
            expected,
            delta,
            verdict: ColorVerdict::from_delta(delta),
        }
    }

    /// Whether the comparison is within the match band
    #[must_use]
    pub const fn passes(&self) -> bool {
        self.verdict.passes()
    }
}

impl fmt::Display for ComparisonRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} vs expected {} (delta={:.2}, {:?})",
            self.key, self.actual, self.expected, self.delta, self.verdict
        )
    }
}

/// Contrast grading of a foreground/background pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastReport {
    /// Foreground color
    pub foreground: Color,
    /// Background color
    pub background: Color,
    /// Ratio rounded to two decimals
    pub contrast_ratio: f64,
    /// Normal text, WCAG AA
    #[serde(rename = "passesAA")]
    pub passes_aa: bool,
    /// Large text, WCAG AA
    #[serde(rename = "passesAALarge")]
    pub passes_aa_large: bool,
    /// Enhanced, WCAG AAA
    #[serde(rename = "passesAAA")]
    pub passes_aaa: bool,
}

impl ContrastReport {
    /// Grade a color pair
    #[must_use]
    pub fn grade(foreground: Color, background: Color) -> Self {
        let ratio = contrast_ratio(foreground, background);
        Self {
            foreground,
            background,
            contrast_ratio: (ratio * 100.0).round() / 100.0,
            passes_aa: ratio >= MIN_CONTRAST_NORMAL,
            passes_aa_large: ratio >= MIN_CONTRAST_LARGE,
            passes_aaa: ratio >= MIN_CONTRAST_ENHANCED,
        }
    }
}
