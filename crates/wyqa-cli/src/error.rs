//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// At least one phase failed
    #[error("{failed} of {total} phases failed")]
    ChecksFailed {
        /// Failed phases
        failed: usize,
        /// Phases run
        total: usize,
    },

    /// Harness error
    #[error("{0}")]
    Harness(#[from] wyqa::HarnessError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad component file");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad component file"));
    }

    #[test]
    fn test_checks_failed() {
        let err = CliError::ChecksFailed {
            failed: 1,
            total: 8,
        };
        assert_eq!(err.to_string(), "1 of 8 phases failed");
    }

    #[test]
    fn test_harness_error_from() {
        let err: CliError = wyqa::HarnessError::Environment {
            message: "chromium not found".to_string(),
        }
        .into();
        assert!(err.to_string().contains("Failed to launch browser"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
