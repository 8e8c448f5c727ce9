//! Configuration and credentials shared by every command.

use std::time::Duration;

use tracing::debug;

use scrapyd_client::ClientOptions;
use scrapyd_config::{load_from_env, NetrcStore, Targets};
use scrapyd_domain::{Pattern, Target, DEFAULT_TARGET_NAME, DEFAULT_TARGET_URL};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

/// Loaded targets plus the credential store.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Targets from `scrapy.cfg`
    pub targets: Targets,
    /// `.netrc` credentials
    pub credentials: NetrcStore,
}

impl Session {
    /// Build a session from already-loaded parts.
    pub fn new(targets: Targets, credentials: NetrcStore) -> Self {
        Self {
            targets,
            credentials,
        }
    }

    /// Read `.env`, `scrapy.cfg` files and `.netrc`.
    pub fn load() -> CliResult<Self> {
        let config = load_from_env()?;
        let targets = Targets::from_config(&config)?;
        Ok(Self::new(targets, NetrcStore::load()))
    }

    /// Target named (or addressed) by `requested`.
    ///
    /// A value containing `://` is used as a URL. Without a request the
    /// `default` target is used, falling back to a local daemon. Targets built
    /// here inherit project and credentials from `[deploy]`.
    pub fn select(&self, requested: Option<&str>) -> CliResult<Target> {
        let target = match requested {
            Some(url) if url.contains("://") => self.with_base(Target::from_url(url)),
            Some(name) => self.targets.resolve(name)?,
            None => match self.targets.resolve(DEFAULT_TARGET_NAME) {
                Ok(target) => target,
                Err(_) => self.with_base(Target::new(DEFAULT_TARGET_NAME, DEFAULT_TARGET_URL)),
            },
        };

        debug!(target = %target.name, url = %target.url, "selected target");
        Ok(target)
    }

    fn with_base(&self, mut target: Target) -> Target {
        let base = |key: &str| self.targets.base_value(key).map(str::to_string);
        target.project = target.project.or_else(|| base("project"));
        target.username = target.username.or_else(|| base("username"));
        target.password = target.password.or_else(|| base("password").map(Into::into));
        target.version = target.version.or_else(|| base("version"));
        target
    }
}

/// Client options from the global flags.
pub fn client_options(cli: &Cli) -> CliResult<ClientOptions> {
    let timeout = match cli.timeout {
        Some(seconds) if seconds > 0.0 => match Duration::try_from_secs_f64(seconds) {
            Ok(timeout) => Some(timeout),
            Err(e) => {
                return Err(CliError::InvalidArgument(format!(
                    "timeout of {} seconds is out of range: {}",
                    seconds, e
                )))
            }
        },
        Some(seconds) => {
            return Err(CliError::InvalidArgument(format!(
                "timeout must be a positive number of seconds, got {}",
                seconds
            )))
        }
        None => None,
    };

    Ok(ClientOptions {
        timeout,
        username: cli.username.clone(),
        password: cli.password.clone(),
    })
}

/// Pattern from `-p`, else the target's project, else everything.
pub fn project_pattern(requested: Option<&str>, target: &Target) -> CliResult<Pattern> {
    match requested.or(target.project.as_deref()) {
        Some(pattern) => Ok(Pattern::new(pattern)?),
        None => Ok(Pattern::any()),
    }
}

/// Project from `-p`, else the target's project.
pub fn require_project(requested: Option<&str>, target: &Target) -> CliResult<String> {
    requested
        .or(target.project.as_deref())
        .filter(|project| !project.is_empty())
        .map(str::to_string)
        .ok_or(CliError::MissingProject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use scrapyd_config::Config;

    fn session(text: &str) -> Session {
        let config = Config::parse("scrapy.cfg", text).unwrap();
        Session::new(Targets::from_config(&config).unwrap(), NetrcStore::default())
    }

    #[test]
    fn session_defaults_to_local_daemon() {
        let target = session("").select(None).unwrap();

        assert_eq!(target.name, "default");
        assert_eq!(target.url, DEFAULT_TARGET_URL);
        assert_eq!(target.project, None);
    }

    #[test]
    fn session_uses_configured_default() {
        let session = session("[deploy]\nurl = http://scrapyd:6800/\nproject = demo\n");

        let target = session.select(None).unwrap();
        assert_eq!(target.url, "http://scrapyd:6800/");
        assert_eq!(target.project.as_deref(), Some("demo"));
    }

    #[test]
    fn session_url_inherits_base_defaults() {
        let session = session("[deploy]\nproject = demo\nusername = ops\n");

        let target = session.select(Some("http://other:6800")).unwrap();
        assert_eq!(target.url, "http://other:6800");
        assert_eq!(target.project.as_deref(), Some("demo"));
        assert_eq!(target.username.as_deref(), Some("ops"));

        let target = session.select(None).unwrap();
        assert_eq!(target.url, DEFAULT_TARGET_URL);
        assert_eq!(target.project.as_deref(), Some("demo"));
    }

    #[test]
    fn session_named_target() {
        let session = session("[deploy:prod]\nurl = https://prod/\n");

        assert_eq!(session.select(Some("prod")).unwrap().url, "https://prod/");
        assert!(matches!(
            session.select(Some("staging")),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn session_project_helpers() {
        let bare = Target::new("default", DEFAULT_TARGET_URL);
        let configured = bare.clone().with_project("demo");

        assert_eq!(project_pattern(None, &bare).unwrap().as_str(), "*");
        assert_eq!(project_pattern(None, &configured).unwrap().as_str(), "demo");
        assert_eq!(project_pattern(Some("d*"), &configured).unwrap().as_str(), "d*");
        assert!(project_pattern(Some("[abc"), &bare).unwrap().matches("[abc"));

        assert_eq!(require_project(None, &configured).unwrap(), "demo");
        assert!(matches!(require_project(None, &bare), Err(CliError::MissingProject)));
    }

    #[test]
    fn session_client_options() {
        let cli = Cli::parse_from(["scrapyd-client", "--timeout", "1.5", "-u", "u", "projects"]);
        let options = client_options(&cli).unwrap();
        assert_eq!(options.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(options.username.as_deref(), Some("u"));

        for timeout in ["0", "1e300", "inf", "NaN"] {
            let cli = Cli::parse_from(["scrapyd-client", "--timeout", timeout, "projects"]);
            assert!(
                matches!(client_options(&cli), Err(CliError::InvalidArgument(_))),
                "timeout {} should be rejected",
                timeout
            );
        }
    }
}
