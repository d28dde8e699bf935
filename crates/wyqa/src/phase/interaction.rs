use super::{open_with_manifest, Phase, PhaseRecorder};
use crate::driver::probe::ChipActivation;
use crate::driver::Probe;
use crate::result::HarnessResult;
use crate::session::Session;

/// Activating a chip dispatches the notification event with a payload
#[derive(Debug, Clone, Copy, Default)]
pub struct Interaction;

impl Phase for Interaction {
    fn name(&self) -> &'static str {
        "link_clicks"
    }

    fn title(&self) -> &'static str {
        "Link Click Functionality"
    }

    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
        if open_with_manifest(session, rec)?.is_none() {
            return Ok(());
        }
        let event = session.component().event.clone();
        let activation: ChipActivation = session.query(Probe::ActivateFirstChip)?;
        let (event_received, event_detail) = match activation {
            ChipActivation::Refused { error } => {
                rec.fail("chip clicked", format!("Could not click chip: {error}"));
                return session.perform(Probe::Close);
            }
            ChipActivation::Clicked {
                chip_text,
                event_received,
                event_detail,
            } => {
                rec.pass("chip clicked");
                rec.note(format!("Clicked chip: {chip_text}"));
                (event_received, event_detail)
            }
        };

        if !event_received {
            rec.fail("event dispatched", format!("{event} event not dispatched"));
        } else if event_detail.is_none() {
            rec.fail(
                "event dispatched",
                format!("{event} event dispatched without a detail payload"),
            );
        } else {
            rec.pass("event dispatched");
        }

        session.perform(Probe::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockPage;
    use crate::phase::testing;
    use serde_json::json;

    #[test]
    fn test_event_with_payload_passes() {
        let result = testing::run(&Interaction, MockPage::new());
        assert!(result.passed(), "{:?}", result.issues());
        assert!(result.notes().iter().any(|n| n == "Clicked chip: Editor"));
    }

    #[test]
    fn test_missing_event() {
        let page = MockPage {
            dispatches_event: false,
            ..MockPage::default()
        };
        let result = testing::run(&Interaction, page);
        assert_eq!(result.issues(), ["link-click event not dispatched"]);
    }

    #[test]
    fn test_no_chips_rendered() {
        let page = MockPage {
            served_manifest: Some(json!([{"name": "Empty", "links": []}])),
            ..MockPage::default()
        };
        let result = testing::run(&Interaction, page);
        assert_eq!(result.issues(), ["Could not click chip: No chips found"]);
    }

    #[test]
    fn test_truncated_activation_is_a_fault() {
        let page = MockPage::new().with_answer("activateFirstChip", json!({"success": true}));
        let result = testing::run(&Interaction, page);
        assert_eq!(result.issues().len(), 1);
        assert!(result.issues()[0].starts_with("Exception during link_clicks"));
    }

    #[test]
    fn test_site_shaped_entries_are_clickable() {
        let page = MockPage {
            served_manifest: Some(json!([
                {"category": "AI", "links": [{"name": "Claude", "title": "Claude AI"}]}
            ])),
            ..MockPage::default()
        };
        let result = testing::run(&Interaction, page);
        assert!(result.passed(), "{:?}", result.issues());
        assert!(result.notes().iter().any(|n| n == "Clicked chip: Claude"));
    }
}
