//! Run report and its summary.

use crate::phase::PhaseResult;
use crate::result::HarnessResult;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// File name of the report inside the output directory
pub const REPORT_FILE: &str = "test-report.json";

/// Counts derived from a list of phase results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Phases run
    pub total: usize,
    /// Phases passed
    pub passed: usize,
    /// Phases failed
    pub failed: usize,
    /// Issues across all phases
    pub total_issues: usize,
}

impl RunSummary {
    /// Derive the summary from phase results
    #[must_use]
    pub fn from_results(results: &[PhaseResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed()).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            total_issues: results.iter().map(|r| r.issues().len()).sum(),
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    url: String,
    timestamp: DateTime<Utc>,
    tests: Vec<PhaseResult>,
}

impl RunReport {
    /// Build a report stamped with the current time
    #[must_use]
    pub fn new(url: impl Into<String>, tests: Vec<PhaseResult>) -> Self {
        Self {
            url: url.into(),
            timestamp: Utc::now(),
            tests,
        }
    }

    /// Target page
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// When the run finished
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Phase results in execution order
    #[must_use]
    pub fn tests(&self) -> &[PhaseResult] {
        &self.tests
    }

    /// Summary derived from [`Self::tests`]
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.tests)
    }

    /// Phases that did not pass
    pub fn failed_phases(&self) -> impl Iterator<Item = &PhaseResult> {
        self.tests.iter().filter(|r| !r.passed())
    }

    /// Every phase passed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.summary().failed == 0
    }

    /// Process exit status: 1 iff any phase failed
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_success())
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> HarnessResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report into `dir`, creating it if needed
    pub fn write_to(&self, dir: &Path) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE);
        std::fs::write(&path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "report written");
        Ok(path)
    }
}

impl Serialize for RunReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RunReport", 4)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("timestamp", &self.timestamp.to_rfc3339())?;
        state.serialize_field("tests", &self.tests)?;
        state.serialize_field("summary", &self.summary())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn phase(name: &str, issues: &[&str]) -> PhaseResult {
        PhaseResult::new(
            name,
            issues.iter().map(|s| (*s).to_string()).collect(),
            vec![],
            vec![],
            vec![],
            false,
            Duration::ZERO,
        )
    }

    #[test]
    fn test_summary_is_derived() {
        let report = RunReport::new(
            "http://localhost:8000",
            vec![phase("a", &[]), phase("b", &["x", "y"]), phase("c", &[])],
        );
        assert_eq!(
            report.summary(),
            RunSummary {
                total: 3,
                passed: 2,
                failed: 1,
                total_issues: 2,
            }
        );
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failed_phases().count(), 1);
    }

    #[test]
    fn test_all_passed_exits_zero() {
        let report = RunReport::new("http://x", vec![phase("a", &[])]);
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_json_shape() {
        let report = RunReport::new("http://x", vec![phase("a", &["boom"])]);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["url"], "http://x");
        assert_eq!(json["summary"]["totalIssues"], 1);
        assert_eq!(json["tests"][0]["test"], "a");
        assert!(DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let report = RunReport::new("http://x", vec![]);
        let path = report.write_to(&target).unwrap();
        assert_eq!(path, target.join(REPORT_FILE));
        assert!(path.exists());
    }
}
