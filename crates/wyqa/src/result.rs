//! Result and error types for wyqa.

use thiserror::Error;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving a component under test
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Browser engine could not be started
    #[error("Failed to launch browser: {message}")]
    Environment {
        /// Error message
        message: String,
    },

    /// Target page unreachable or did not settle in time
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Script evaluation failed inside the page
    #[error("Evaluation of `{probe}` failed: {message}")]
    Evaluation {
        /// Probe label
        probe: String,
        /// Error message
        message: String,
    },

    /// Probe returned a value of the wrong shape
    #[error("Unexpected result shape from `{probe}`: {message}")]
    Decode {
        /// Probe label
        probe: String,
        /// Error message
        message: String,
    },

    /// Input simulation error (click, key press)
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Inspected element missing from the page
    #[error("{message}")]
    ElementNotFound {
        /// Message reported by the page
        message: String,
    },

    /// Session already released
    #[error("Session has been released")]
    Released,

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl HarnessError {
    /// Whether this error must abort the whole run
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Environment { .. } | Self::Navigation { .. })
    }

    /// Create an evaluation error
    #[must_use]
    pub fn evaluation(probe: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Evaluation {
            probe: probe.into(),
            message: message.into(),
        }
    }

    /// Create an input error
    #[must_use]
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let launch = HarnessError::Environment {
            message: "no chromium".to_string(),
        };
        let nav = HarnessError::Navigation {
            url: "http://localhost:8000".to_string(),
            message: "timeout".to_string(),
        };
        assert!(launch.is_fatal());
        assert!(nav.is_fatal());
        assert!(!HarnessError::Timeout { ms: 10 }.is_fatal());
        assert!(!HarnessError::evaluation("isOpen", "boom").is_fatal());
    }

    #[test]
    fn test_messages() {
        let err = HarnessError::evaluation("isOpen", "ReferenceError");
        assert!(err.to_string().contains("isOpen"));
        assert!(err.to_string().contains("ReferenceError"));
        let err = HarnessError::Navigation {
            url: "http://x".to_string(),
            message: "refused".to_string(),
        };
        assert_eq!(err.to_string(), "Navigation to http://x failed: refused");
    }
}
