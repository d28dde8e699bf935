use super::{open_with_manifest, Phase, PhaseRecorder};
use crate::driver::probe::{Lookup, RenderCounts};
use crate::driver::Probe;
use crate::result::HarnessResult;
use crate::session::Session;

/// Rendered sections and chips mirror the manifest
#[derive(Debug, Clone, Copy, Default)]
pub struct Rendering;

/// Screenshot of the open component with its links
pub const RENDERING_SCREENSHOT: &str = "modal-with-links.png";

impl Phase for Rendering {
    fn name(&self) -> &'static str {
        "link_rendering"
    }

    fn title(&self) -> &'static str {
        "Link Rendering"
    }

    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
        let Some(manifest) = open_with_manifest(session, rec)? else {
            return Ok(());
        };
        let expected = manifest.expected_counts();
        let Lookup::Found(counts) = session.query::<Lookup<RenderCounts>>(Probe::RenderCounts)?
        else {
            rec.fail("shadow tree reachable", "Could not access shadow DOM");
            return Ok(());
        };
        rec.note(format!(
            "Found {} sections, {} section headers, {} chips, {} active chips",
            counts.sections_count,
            counts.headers_count,
            counts.chips_count,
            counts.active_chips_count
        ));

        rec.expect(
            counts.sections_count == expected.sections_count,
            "section count",
            || {
                format!(
                    "Expected {} sections, found {}",
                    expected.sections_count, counts.sections_count
                )
            },
        );
        rec.expect(counts.chips_count == expected.chips_count, "chip count", || {
            format!(
                "Expected {} chips, found {}",
                expected.chips_count, counts.chips_count
            )
        });
        rec.expect(
            counts.active_chips_count == expected.active_chips_count,
            "active chip count",
            || {
                format!(
                    "Expected {} active chips, found {}",
                    expected.active_chips_count, counts.active_chips_count
                )
            },
        );

        let path = session.screenshot(RENDERING_SCREENSHOT)?;
        rec.artifact(path);

        session.perform(Probe::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockPage;
    use crate::manifest::ExpectedCounts;
    use crate::phase::testing;
    use serde_json::json;

    #[test]
    fn test_counts_match_and_screenshot_saved() {
        let result = testing::run(&Rendering, MockPage::new());
        assert!(result.passed(), "{:?}", result.issues());
        assert_eq!(result.artifacts().len(), 1);
        assert!(result.artifacts()[0].ends_with(RENDERING_SCREENSHOT));
        assert!(result.notes().iter().any(|n| n.contains("Found 2 sections")));
    }

    #[test]
    fn test_count_mismatch_reports_expected_and_actual() {
        let page = MockPage {
            rendered_counts: Some(ExpectedCounts {
                sections_count: 2,
                chips_count: 2,
                active_chips_count: 0,
            }),
            ..MockPage::default()
        };
        let result = testing::run(&Rendering, page);
        assert_eq!(
            result.issues(),
            ["Expected 3 chips, found 2", "Expected 1 active chips, found 0"]
        );
        assert_eq!(result.artifacts().len(), 1);
    }

    #[test]
    fn test_no_shadow_tree() {
        let page = MockPage {
            shadow: false,
            ..MockPage::default()
        };
        let result = testing::run(&Rendering, page);
        assert_eq!(result.issues(), ["Could not access shadow DOM"]);
        assert!(result.artifacts().is_empty());
    }

    #[test]
    fn test_misspelled_count_is_a_decode_fault() {
        let page = MockPage::new().with_answer(
            "renderCounts",
            json!({
                "found": true,
                "sectionCount": 2,
                "headersCount": 2,
                "chipsCount": 3,
                "activeChipsCount": 1,
                "hasTitle": true,
                "hasContainer": true,
                "hasOverlay": true
            }),
        );
        let result = testing::run(&Rendering, page);
        assert_eq!(result.issues().len(), 1);
        assert!(result.issues()[0].contains("Unexpected result shape from `renderCounts`"));
        assert!(!result.issues()[0].contains("Expected 2 sections"));
    }

    #[test]
    fn test_screenshot_failure_is_a_fault() {
        let result = testing::run(&Rendering, MockPage::new().failing("screenshot"));
        assert!(!result.passed());
        assert_eq!(result.issues().len(), 1);
        assert!(result.issues()[0].starts_with("Exception during link_rendering"));
    }
}
