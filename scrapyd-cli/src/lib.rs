//! Scrapyd command-line interface library.
//!
//! Exposes the argument definitions, commands and error reporting used by
//! the `scrapyd-client` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod cli;
pub mod commands;
pub mod deploy;
pub mod error;
pub mod logging;
pub mod output;
pub mod session;

pub use app::{execute, run};
pub use error::{CliError, CliResult, EXIT_FAILURE, EXIT_UNHANDLED, ISSUE_TRACKER_URL};
pub use session::Session;
