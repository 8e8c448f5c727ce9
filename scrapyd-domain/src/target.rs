//! Deploy targets: named daemon endpoints with their defaults.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::credentials::{Credential, CredentialStore};

/// Name of the implicit target.
pub const DEFAULT_TARGET_NAME: &str = "default";

/// URL used when no target defines one.
pub const DEFAULT_TARGET_URL: &str = "http://localhost:6800";

/// A named daemon endpoint.
///
/// # Invariants
/// - `url` is always present; targets without one are rejected at resolution
/// - `password` is zeroized on drop and redacted from `Debug`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Unique name (`default` for the base `[deploy]` section)
    pub name: String,
    /// Base URL of the daemon
    pub url: String,
    /// Explicit basic-auth username
    pub username: Option<String>,
    /// Explicit basic-auth password
    pub password: Option<Zeroizing<String>>,
    /// Default project name
    pub project: Option<String>,
    /// Default version to deploy
    pub version: Option<String>,
}

impl Target {
    /// Create a target with only a name and URL.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            username: None,
            password: None,
            project: None,
            version: None,
        }
    }

    /// Target for an ad-hoc URL given on the command line.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::new(url.clone(), url)
    }

    /// Set the default project.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set explicit credentials.
    pub fn with_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password.map(Zeroizing::new);
        self
    }

    /// Set the password, keeping the username.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Hostname part of the URL, if it parses.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }

    /// Resolve the credential for this target.
    ///
    /// An explicit, non-empty username wins (a missing password becomes
    /// empty); otherwise the store is asked for the URL's host.
    pub fn credential(&self, store: &dyn CredentialStore) -> Option<Credential> {
        match self.username.as_deref() {
            Some(username) if !username.is_empty() => Some(Credential::new(
                username,
                self.password.as_deref().map_or("", String::as_str),
            )),
            _ => self.host().and_then(|host| store.lookup(&host)),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("project", &self.project)
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{NoCredentials, StaticCredentials};

    #[test]
    fn test_host_extraction() {
        assert_eq!(
            Target::new("default", "http://localhost:6800/").host().as_deref(),
            Some("localhost")
        );
        assert_eq!(
            Target::new("prod", "https://user@scrapyd.example.com:443/api").host().as_deref(),
            Some("scrapyd.example.com")
        );
        assert_eq!(Target::new("broken", "not a url").host(), None);
    }

    #[test]
    fn test_explicit_credentials_win() {
        let store = StaticCredentials::new().with("localhost", Credential::new("netrc", "secret"));
        let target = Target::new("default", "http://localhost:6800").with_auth("user", Some("pass".to_string()));

        let credential = target.credential(&store).unwrap();
        assert_eq!(credential.username, "user");
        assert_eq!(credential.password(), "pass");
    }

    #[test]
    fn test_missing_password_is_empty() {
        let target = Target::new("default", "http://localhost:6800").with_auth("user", None);

        let credential = target.credential(&NoCredentials).unwrap();
        assert_eq!(credential.password(), "");
    }

    #[test]
    fn test_store_is_consulted_by_host() {
        let store = StaticCredentials::new().with("localhost", Credential::new("netrc", "secret"));
        let target = Target::new("default", "http://localhost:6800");

        let credential = target.credential(&store).unwrap();
        assert_eq!(credential.username, "netrc");
    }

    #[test]
    fn test_empty_username_falls_back_to_store() {
        let store = StaticCredentials::new().with("localhost", Credential::new("netrc", "secret"));
        let target = Target::new("default", "http://localhost:6800").with_auth("", None);

        assert_eq!(target.credential(&store).unwrap().username, "netrc");
    }

    #[test]
    fn test_password_is_redacted_from_debug() {
        let target = Target::new("prod", "https://prod/").with_auth("ops", Some("hunter2".to_string()));

        let printed = format!("{:?}", target);
        assert!(!printed.contains("hunter2"), "{}", printed);
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("ops"));
        assert_eq!(target.password.as_deref().map(String::as_str), Some("hunter2"));

        let target = target.with_password("rotated");
        assert_eq!(target.username.as_deref(), Some("ops"));
        assert_eq!(target.credential(&NoCredentials).unwrap().password(), "rotated");
    }

    #[test]
    fn test_no_credentials_anywhere() {
        let target = Target::new("default", "http://localhost:6800");
        assert!(target.credential(&NoCredentials).is_none());
    }
}
