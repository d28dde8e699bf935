use super::{open_with_manifest, Phase, PhaseRecorder};
use crate::driver::probe::{FontAudit, Lookup, VisibilityState};
use crate::driver::{ColorScheme, Probe};
use crate::result::HarnessResult;
use crate::session::Session;

/// Screenshot of the open component in `scheme`
#[must_use]
pub fn visual_screenshot(scheme: ColorScheme) -> String {
    format!("modal-visual-{scheme}.png")
}

/// The open component is actually visible; fonts are recorded
#[derive(Debug, Clone, Copy, Default)]
pub struct Visual;

impl Phase for Visual {
    fn name(&self) -> &'static str {
        "visual_rendering"
    }

    fn title(&self) -> &'static str {
        "Visual Rendering"
    }

    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
        if open_with_manifest(session, rec)?.is_none() {
            return Ok(());
        }

        if let Lookup::Found(visibility) =
            session.query::<Lookup<VisibilityState>>(Probe::Visibility)?
        {
            rec.expect(visibility.overlay_visible(), "overlay visible", || {
                format!(
                    "Modal overlay not visible (opacity {}, visibility {}, display {})",
                    visibility.overlay_opacity,
                    visibility.overlay_visibility,
                    visibility.overlay_display
                )
            });
            rec.expect(visibility.container_visible(), "container visible", || {
                format!(
                    "Modal container opacity is {}, expected 1",
                    visibility.container_opacity
                )
            });
        } else {
            rec.fail("overlay visible", "Could not check visibility");
        }

        if let Lookup::Found(fonts) = session.query::<Lookup<FontAudit>>(Probe::Fonts)? {
            let show = |f: &Option<String>| f.clone().unwrap_or_else(|| "none".to_string());
            rec.note(format!("Title font: {}", show(&fonts.title_font)));
            rec.note(format!("Chip font: {}", show(&fonts.chip_font)));
            rec.note(format!("Icon font: {}", show(&fonts.icon_font)));
        } else {
            rec.fail("fonts resolved", "Could not check fonts");
        }

        let name = visual_screenshot(session.color_scheme());
        let path = session.screenshot(&name)?;
        rec.artifact(path);

        session.perform(Probe::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockPage;
    use crate::orchestrator::SilentObserver;
    use crate::phase::{run_phase, testing};
    use serde_json::json;

    #[test]
    fn test_visible_component_passes() {
        let result = testing::run(&Visual, MockPage::new());
        assert!(result.passed(), "{:?}", result.issues());
        assert!(result.notes().iter().any(|n| n.starts_with("Icon font:")));
        assert!(result.artifacts()[0].ends_with("modal-visual-light.png"));
    }

    #[test]
    fn test_screenshot_named_after_active_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _launcher) = testing::session(MockPage::new(), dir.path());
        session.set_color_scheme(ColorScheme::Dark).unwrap();
        let result = run_phase(&Visual, &mut session, &mut SilentObserver);
        assert!(result.passed(), "{:?}", result.issues());
        assert_eq!(result.artifacts(), [dir.path().join("modal-visual-dark.png")]);
        assert!(dir.path().join("modal-visual-dark.png").exists());
    }

    #[test]
    fn test_truncated_visibility_answer_is_a_fault() {
        let page = MockPage::new().with_answer("visibility", json!({"found": true}));
        let result = testing::run(&Visual, page);
        assert_eq!(result.issues().len(), 1);
        assert!(
            result.issues()[0].contains("Unexpected result shape from `visibility`"),
            "{:?}",
            result.issues()
        );
    }

    #[test]
    fn test_translucent_container() {
        let page = MockPage {
            container_opacity: "0.5".to_string(),
            ..MockPage::default()
        };
        let result = testing::run(&Visual, page);
        assert_eq!(result.issues(), ["Modal container opacity is 0.5, expected 1"]);
    }

    #[test]
    fn test_fault_yields_exactly_one_issue() {
        let result = testing::run(&Visual, MockPage::new().failing("visibility"));
        assert!(!result.passed());
        assert_eq!(result.issues().len(), 1);
        assert!(result.artifacts().is_empty());
    }
}
