//! Error taxonomy shared by every layer that talks to the daemon.

use thiserror::Error;

/// Bodies longer than this are shown as a head/tail preview.
pub const MAX_PREVIEW_CHARS: usize = 120;

/// Number of characters kept at each end of a truncated preview.
const PREVIEW_EDGE_CHARS: usize = 50;

/// Errors that can occur while talking to the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport could not reach the daemon (refused, DNS, TLS, timeout)
    #[error("Failed to connect to target ({url}): {reason}")]
    ConnectionFailure {
        /// URL of the attempted request
        url: String,
        /// Underlying transport error
        reason: String,
    },

    /// Body is not a valid envelope or lacks a required field
    #[error("Received a malformed response ({reason}): {preview}")]
    MalformedResponse {
        /// What was wrong with the body
        reason: String,
        /// Bounded preview of the raw body
        preview: String,
    },

    /// Daemon answered with `status: "error"`
    #[error("{0}")]
    DomainError(String),

    /// Client-side existence check failed before any destructive call
    #[error("{0}")]
    PreconditionFailed(String),

    /// Envelope status is neither `ok` nor `error`
    #[error("Unhandled response status: {0}")]
    UnhandledStatus(String),
}

impl ApiError {
    /// Create a connection failure for the given URL.
    pub fn connection(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::ConnectionFailure {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a malformed-response error, keeping only a preview of `body`.
    pub fn malformed(reason: impl Into<String>, body: &str) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            preview: preview(body),
        }
    }

    /// True for errors that indicate a protocol mismatch rather than a user mistake.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnhandledStatus(_))
    }
}

/// Result type for daemon operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Shorten `body` to `first 50 [...] last 50` characters when it is too long.
pub fn preview(body: &str) -> String {
    let total = body.chars().count();
    if total <= MAX_PREVIEW_CHARS {
        return body.to_string();
    }

    let head: String = body.chars().take(PREVIEW_EDGE_CHARS).collect();
    let tail: String = body.chars().skip(total - PREVIEW_EDGE_CHARS).collect();
    format!("{} [...] {}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_short_bodies() {
        assert_eq!(preview("<html>"), "<html>");
        assert_eq!(preview(&"x".repeat(120)), "x".repeat(120));
    }

    #[test]
    fn test_preview_truncates_long_bodies() {
        let body = format!("{}{}{}", "a".repeat(50), "b".repeat(100), "c".repeat(50));
        let shown = preview(&body);

        assert_eq!(shown, format!("{} [...] {}", "a".repeat(50), "c".repeat(50)));
    }

    #[test]
    fn test_preview_is_char_based() {
        let body = "é".repeat(200);
        let shown = preview(&body);

        assert_eq!(shown.chars().count(), 50 + 7 + 50);
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::connection("http://localhost:6800", "Connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to connect to target (http://localhost:6800): Connection refused"
        );

        let err = ApiError::DomainError("boom".to_string());
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_only_unhandled_status_is_fatal() {
        assert!(ApiError::UnhandledStatus("pending".to_string()).is_fatal());
        assert!(!ApiError::DomainError("boom".to_string()).is_fatal());
        assert!(!ApiError::malformed("not json", "<html>").is_fatal());
    }
}
