use super::{Phase, PhaseRecorder};
use crate::driver::probe::RegistrationState;
use crate::driver::Probe;
use crate::result::HarnessResult;
use crate::session::Session;

/// The element is registered and a live instance carries the declared tag
#[derive(Debug, Clone, Copy, Default)]
pub struct Registration;

impl Phase for Registration {
    fn name(&self) -> &'static str {
        "component_registration"
    }

    fn title(&self) -> &'static str {
        "Component Registration"
    }

    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
        let tag = session.component().tag.clone();
        let instance = session.component().instance.clone();
        let state: RegistrationState = session.query(Probe::Registration)?;

        rec.expect(state.defined, "registered as custom element", || {
            format!("Custom element '{tag}' not registered")
        });

        if !state.found {
            rec.fail(
                "instance in document",
                format!("Element {instance} not found in DOM"),
            );
            return Ok(());
        }
        rec.pass("instance in document");

        let actual = state.local_name.unwrap_or_default();
        rec.expect(actual == tag, "instance tag matches", || {
            format!("Element tag name is {actual}, expected {tag}")
        });
        Ok(())
    }
}
