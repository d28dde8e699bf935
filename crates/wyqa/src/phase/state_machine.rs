use super::{Phase, PhaseRecorder};
use crate::driver::Probe;
use crate::result::HarnessResult;
use crate::session::{Session, SettlePoint};

/// Every Closed/Open transition, each driven from a known state
#[derive(Debug, Clone, Copy, Default)]
pub struct StateMachine;

impl StateMachine {
    fn is_open(session: &mut Session) -> HarnessResult<bool> {
        session.query(Probe::IsOpen)
    }

    fn force(session: &mut Session, open: bool) -> HarnessResult<()> {
        session.perform(Probe::SetOpen(open))?;
        session.settle(SettlePoint::Open);
        Ok(())
    }
}

impl Phase for StateMachine {
    fn name(&self) -> &'static str {
        "modal_open_close"
    }

    fn title(&self) -> &'static str {
        "Modal Open/Close Functionality"
    }

    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
        // Closed -> show() -> Open
        Self::force(session, false)?;
        session.perform(Probe::Show)?;
        session.settle(SettlePoint::Open);
        let open = Self::is_open(session)?;
        rec.expect(open, "show() opens", || {
            "show() method did not open modal".to_string()
        });

        // Open -> close() -> Closed
        Self::force(session, true)?;
        session.perform(Probe::Close)?;
        session.settle(SettlePoint::Open);
        let open = Self::is_open(session)?;
        rec.expect(!open, "close() closes", || {
            "close() method did not close modal".to_string()
        });

        // Closed -> open = true -> Open
        Self::force(session, false)?;
        session.perform(Probe::SetOpen(true))?;
        session.settle(SettlePoint::Open);
        let open = Self::is_open(session)?;
        rec.expect(open, "open=true opens", || {
            "Setting open=true did not open modal".to_string()
        });

        // Open -> Escape -> Closed
        Self::force(session, true)?;
        session.press_key("Escape")?;
        session.settle(SettlePoint::Open);
        let open = Self::is_open(session)?;
        rec.expect(!open, "Escape closes", || {
            "ESC key did not close modal".to_string()
        });

        // Closed -> Escape -> Closed
        Self::force(session, false)?;
        session.press_key("Escape")?;
        session.settle(SettlePoint::Open);
        let open = Self::is_open(session)?;
        rec.expect(!open, "Escape while closed is a no-op", || {
            "ESC key opened a closed modal".to_string()
        });

        // Open -> backdrop -> Closed
        Self::force(session, true)?;
        let clicked: bool = session.query(Probe::ClickBackdrop)?;
        session.settle(SettlePoint::Open);
        let open = Self::is_open(session)?;
        match (clicked, open) {
            (true, true) => rec.inconclusive(
                "backdrop closes",
                "Overlay click may not be working (check manually)",
            ),
            (false, _) => rec.fail("backdrop closes", "Overlay not found in shadow root"),
            (true, false) => rec.pass("backdrop closes"),
        }

        // Open -> close control -> Closed
        Self::force(session, true)?;
        let clicked: bool = session.query(Probe::ClickCloseControl)?;
        session.settle(SettlePoint::Open);
        let open = Self::is_open(session)?;
        match (clicked, open) {
            (false, _) => rec.fail("close control closes", "Close button not found"),
            (true, true) => rec.fail("close control closes", "Close button did not close modal"),
            (true, false) => rec.pass("close control closes"),
        }

        Self::force(session, false)
    }
}
