//! Console markers and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use wyqa::{CheckRecord, PhaseResult, RunObserver, RunReport, Verdict};

/// Prints phase progress and check markers to stderr
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner while a slow step (browser launch, navigation) runs
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    /// Remove the spinner
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("  {prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("  {prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        let _ = self.term.write_line(&format!("  {prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("  {prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print the run summary and where the report went
    pub fn summary(&self, report: &RunReport, written_to: Option<&Path>) {
        let summary = report.summary();
        if self.quiet && summary.failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();

            let status = if summary.failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} phases ({} passed, {} failed, {} issues)",
                status,
                summary.total,
                passed_style.apply_to(summary.passed),
                if summary.failed > 0 {
                    failed_style.apply_to(summary.failed).to_string()
                } else {
                    summary.failed.to_string()
                },
                summary.total_issues,
            ));
        } else {
            let status = if summary.failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {} phases ({} passed, {} failed, {} issues)",
                summary.total, summary.passed, summary.failed, summary.total_issues
            ));
        }

        for phase in report.failed_phases() {
            let _ = self.term.write_line(&format!("  {}:", phase.name()));
            for issue in phase.issues() {
                let _ = self.term.write_line(&format!("    - {issue}"));
            }
        }

        if let Some(path) = written_to {
            let _ = self
                .term
                .write_line(&format!("Report saved to {}", path.display()));
        }
    }
}

impl RunObserver for ProgressReporter {
    fn phase_started(&mut self, index: usize, total: usize, title: &str) {
        self.header(&format!("[{index}/{total}] {title}"));
    }

    fn check(&mut self, check: &CheckRecord) {
        let message = check.detail.as_deref().unwrap_or(&check.label);
        match check.verdict {
            Verdict::Pass => self.success(&check.label),
            Verdict::Fail => self.failure(message),
            Verdict::Inconclusive => self.warning(message),
        }
    }

    fn note(&mut self, note: &str) {
        self.info(note);
    }

    fn phase_finished(&mut self, result: &PhaseResult) {
        if !result.passed() {
            self.failure(&format!(
                "{} failed with {} issue(s)",
                result.name(),
                result.issues().len()
            ));
        }
    }
}
