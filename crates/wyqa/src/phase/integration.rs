use super::{Phase, PhaseRecorder};
use crate::driver::Probe;
use crate::result::HarnessResult;
use crate::session::{Session, SettlePoint};

/// The page's own trigger opens and populates the component
#[derive(Debug, Clone, Copy, Default)]
pub struct Integration;

impl Phase for Integration {
    fn name(&self) -> &'static str {
        "integration"
    }

    fn title(&self) -> &'static str {
        "Integration Test"
    }

    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
        let trigger = session.component().trigger.clone();

        session.perform(Probe::SetOpen(false))?;
        session.settle(SettlePoint::Open);

        if let Err(e) = session.click(&trigger) {
            rec.fail("trigger clicked", format!("Trigger {trigger} not clickable: {e}"));
            return Ok(());
        }
        rec.pass("trigger clicked");
        session.settle(SettlePoint::Open);

        let open: bool = session.query(Probe::IsOpen)?;
        rec.expect(open, "trigger opens", || {
            "Modal did not open when button clicked".to_string()
        });

        let count: usize = session.query(Probe::LinkCount)?;
        if count == 0 {
            rec.fail("trigger populates", "Links not set when button clicked");
        } else {
            rec.pass("trigger populates");
            rec.note(format!("Links set: {count} categories"));
        }

        session.perform(Probe::Close)?;
        session.settle(SettlePoint::Open);
        Ok(())
    }
}
