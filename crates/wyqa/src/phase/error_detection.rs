use super::{Phase, PhaseRecorder};
use crate::result::HarnessResult;
use crate::session::Session;
use std::time::Duration;

/// Listener window kept open after the reload
const COLLECT_WINDOW: Duration = Duration::from_secs(3);

/// Reload once while listening for dependency failures and console errors
#[derive(Debug, Clone, Copy)]
pub struct ErrorDetection {
    window: Duration,
}

impl Default for ErrorDetection {
    fn default() -> Self {
        Self {
            window: COLLECT_WINDOW,
        }
    }
}

impl ErrorDetection {
    /// Use a different listener window
    #[must_use]
    pub const fn with_window(window: Duration) -> Self {
        Self { window }
    }
}

impl Phase for ErrorDetection {
    fn name(&self) -> &'static str {
        "error_detection"
    }

    fn title(&self) -> &'static str {
        "Error Detection"
    }

    fn run(&self, session: &mut Session, rec: &mut PhaseRecorder<'_>) -> HarnessResult<()> {
        let log = session.reload_collecting(self.window)?;
        let component = session.component().clone();

        let relevant: Vec<&str> = log
            .console_errors()
            .filter(|text| component.is_relevant_console_text(text))
            .collect();
        if relevant.is_empty() {
            rec.pass("no relevant console errors");
        } else {
            for text in relevant {
                rec.note(format!("Console error: {text}"));
            }
        }

        let failures: Vec<(&str, u16)> = log
            .failed_responses()
            .filter(|(url, _)| component.is_dependency(url))
            .collect();
        if failures.is_empty() {
            rec.pass("dependencies loaded");
        } else {
            for (url, status) in failures {
                rec.fail(
                    "dependencies loaded",
                    format!("Network error loading {url}: {status}"),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ConsoleLevel, LogEvent, MockPage};
    use crate::phase::testing;

    fn page_with(events: Vec<LogEvent>) -> MockPage {
        MockPage {
            reload_log: events.into_iter().collect(),
            ..MockPage::default()
        }
    }

    #[test]
    fn test_clean_reload() {
        let result = testing::run(&ErrorDetection::default(), MockPage::new());
        assert!(result.passed());
        assert!(result.notes().is_empty());
    }

    #[test]
    fn test_dependency_failure_fails_phase() {
        let page = page_with(vec![
            LogEvent::Response {
                url: "https://cdn.jsdelivr.net/npm/@wy/web-components.js".to_string(),
                status: 404,
            },
            LogEvent::Response {
                url: "http://localhost:8000/favicon.ico".to_string(),
                status: 404,
            },
        ]);
        let result = testing::run(&ErrorDetection::default(), page);
        assert_eq!(
            result.issues(),
            ["Network error loading https://cdn.jsdelivr.net/npm/@wy/web-components.js: 404"]
        );
    }

    #[test]
    fn test_console_errors_are_notes() {
        let page = page_with(vec![
            LogEvent::Console {
                level: ConsoleLevel::Error,
                text: "Failed to load links.json".to_string(),
            },
            LogEvent::Console {
                level: ConsoleLevel::Error,
                text: "analytics blocked".to_string(),
            },
        ]);
        let result = testing::run(&ErrorDetection::default(), page);
        assert!(result.passed());
        assert_eq!(result.notes(), ["Console error: Failed to load links.json"]);
    }

    #[test]
    fn test_reload_window_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, launcher) = testing::session(MockPage::new(), dir.path());
        let phase = ErrorDetection::with_window(Duration::from_millis(250));
        let result =
            crate::phase::run_phase(&phase, &mut session, &mut crate::orchestrator::SilentObserver);
        assert!(result.passed());
        assert!(launcher.page().was_called("reloadCollecting:250ms"));
    }
}
