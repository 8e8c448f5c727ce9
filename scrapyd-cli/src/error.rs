//! CLI error types and exit codes.

use std::path::PathBuf;

use thiserror::Error;

use scrapyd_config::ConfigError;
use scrapyd_domain::{ApiError, JobArgError, PatternError};

/// Where unexpected daemon behaviour should be reported.
pub const ISSUE_TRACKER_URL: &str = "https://github.com/scrapy/scrapyd-client/issues";

/// Exit code for handled failures.
pub const EXIT_FAILURE: u8 = 1;

/// Exit code for protocol surprises.
pub const EXIT_UNHANDLED: u8 = 3;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Daemon call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Configuration could not be read or a target could not be resolved
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid wildcard pattern
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Invalid `--arg`
    #[error(transparent)]
    JobArg(#[from] JobArgError),

    /// No project given and none configured
    #[error("Missing project")]
    MissingProject,

    /// Invalid argument value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Helper program failed (version control lookups)
    #[error("{program} failed: {message}")]
    Command {
        /// Program that was run
        program: String,
        /// What went wrong
        message: String,
    },

    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    File {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Output could not be written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Api(e) if e.is_fatal() => EXIT_UNHANDLED,
            _ => EXIT_FAILURE,
        }
    }

    /// Message shown to the user.
    pub fn report(&self) -> String {
        match self {
            Self::Api(ApiError::DomainError(message)) => {
                format!("Scrapyd responded with an error: {}", message)
            }
            Self::Api(e @ ApiError::UnhandledStatus(_)) => format!(
                "Caught unhandled exception, please report at {}\n{}",
                ISSUE_TRACKER_URL, e
            ),
            Self::Api(e @ (ApiError::ConnectionFailure { .. } | ApiError::MalformedResponse { .. })) => {
                e.to_string()
            }
            other => format!("Error: {}", other),
        }
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
