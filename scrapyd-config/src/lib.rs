//! Scrapyd Client Configuration
//!
//! Reads `scrapy.cfg` files from their standard locations, turns the
//! `[deploy]` sections into [`Target`](scrapyd_domain::Target)s, and provides
//! the `.netrc` credential store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod ini;
pub mod netrc;
pub mod sources;
pub mod targets;

pub use error::{ConfigError, ConfigResult};
pub use ini::{expand_vars, Config, DEFAULT_SECTION};
pub use netrc::{NetrcStore, NETRC_ENV};
pub use sources::{closest_config, load_from_env, ConfigSources, CONFIG_FILE_NAME};
pub use targets::{Targets, DEPLOY_SECTION, TARGET_PREFIX};
