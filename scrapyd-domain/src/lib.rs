//! Scrapyd Client Domain Layer
//!
//! Pure types with zero I/O: targets, credentials, job arguments, response
//! envelopes and their classification, and name patterns.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod job_args;
pub mod pattern;
pub mod target;

// Re-export commonly used types
pub use credentials::{Credential, CredentialStore, NoCredentials, StaticCredentials};
pub use envelope::{classify, process, Classified, Envelope, RawResponse};
pub use error::{preview, ApiError, ApiResult};
pub use job_args::{JobArgError, JobArgs};
pub use pattern::{Pattern, PatternError};
pub use target::{Target, DEFAULT_TARGET_NAME, DEFAULT_TARGET_URL};
