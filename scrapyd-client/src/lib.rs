//! Scrapyd Client
//!
//! Talks to a Scrapyd daemon over its JSON API.
//!
//! # Architecture
//!
//! ```text
//! ScrapydClient ──▶ operations ──▶ Transport (port)
//!                                    ├── HttpTransport (reqwest)
//!                                    └── StubTransport (tests)
//! ```
//!
//! Operations never touch the network directly; every request goes through
//! the [`Transport`] port and every response through
//! [`scrapyd_domain::process`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod http;
pub mod operations;
pub mod ports;
pub mod stub;

pub use client::{ClientOptions, ScrapydClient};
pub use http::{HttpTransport, USER_AGENT};
pub use operations::{Selection, EGG_FIELD, EGG_FILE_NAME};
pub use ports::{Action, Transport, Upload};
pub use stub::{Call, Method, StubTransport};
