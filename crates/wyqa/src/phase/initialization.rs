use super::{load_manifest, Phase, PhaseRecorder};
use crate::driver::Probe;
use crate::result::HarnessResult;
use crate::session::{Session, SettlePoint};

/// Default state is closed and assigning the manifest populates the instance
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialization;

impl Phase for Initialization {
    fn name(&self) -> &'static str {
        "component_initialization"
    }

    fn title(&self) -> &'static str {
        "Component Initialization"
    }

    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
        let open: bool = session.query(Probe::IsOpen)?;
        rec.expect(!open, "closed initially", || {
            "Modal should be closed initially".to_string()
        });

        let Some(manifest) = load_manifest(session, rec)? else {
            return Ok(());
        };

        session.perform(Probe::AssignManifest {
            manifest,
            open: false,
        })?;
        session.settle(SettlePoint::Open);

        let count: usize = session.query(Probe::LinkCount)?;
        if count == 0 {
            rec.fail("links assigned", "Links not set on component");
        } else {
            rec.pass("links assigned");
            rec.note(format!("Links set on component: {count} categories"));
        }

        let shadow: bool = session.query(Probe::HasShadowRoot)?;
        rec.expect(shadow, "shadow root attached", || {
            "Component does not have shadow root".to_string()
        });
        Ok(())
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
    fn test_healthy_component_passes() {
        let result = testing::run(&Initialization, MockPage::new());
        assert!(result.passed(), "{:?}", result.issues());
        assert!(result.notes().iter().any(|n| n.contains("2 categories")));
    }

    #[test]
    fn test_open_initially() {
        let page = MockPage {
            open: true,
            ..MockPage::default()
        };
        let result = testing::run(&Initialization, page);
        assert_eq!(result.issues(), ["Modal should be closed initially"]);
    }

    #[test]
    fn test_manifest_unavailable() {
        let page = MockPage {
            served_manifest: None,
            ..MockPage::default()
        };
        let result = testing::run(&Initialization, page);
        assert_eq!(result.issues(), ["Could not load /links.json"]);
    }

    #[test]
    fn test_served_manifest_is_assigned_verbatim() {
        let served = json!([
            {
                "category": "AI",
                "icon": "smart_toy",
                "links": [
                    {"name": "Claude", "company": "Anthropic", "url": "https://x"},
                    {"name": "Claude", "title": "Claude AI"}
                ]
            }
        ]);
        let page = MockPage {
            served_manifest: Some(served.clone()),
            ..MockPage::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let (mut session, launcher) = testing::session(page, dir.path());
        let result = run_phase(&Initialization, &mut session, &mut SilentObserver);
        assert!(result.passed(), "{:?}", result.issues());
        assert_eq!(launcher.page().assigned_links(), [served]);
    }

    #[test]
    fn test_missing_shadow_root() {
        let page = MockPage {
            shadow: false,
            ..MockPage::default()
        };
        let result = testing::run(&Initialization, page);
        assert_eq!(result.issues(), ["Component does not have shadow root"]);
    }
}
