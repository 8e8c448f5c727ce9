//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading configuration or resolving targets.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `[deploy:NAME]` section (nor the implicit default) has this name
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    /// Target exists but defines no `url`, even after merging `[deploy]`
    #[error("Missing url for target {0}")]
    MissingUrl(String),

    /// Line could not be parsed
    #[error("{file}:{line}: {message}")]
    Parse {
        /// File (or label) being parsed
        file: String,
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },

    /// `%(name)s` reference could not be expanded
    #[error("Bad interpolation in [{section}] {key}: {message}")]
    Interpolation {
        /// Section holding the value
        section: String,
        /// Key holding the value
        key: String,
        /// What was wrong
        message: String,
    },

    /// File exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
