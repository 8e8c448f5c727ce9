//! Basic-auth credentials and the port used to look them up by host.
//!
//! Credentials come either from the target definition itself or from a
//! machine-local store keyed by hostname (a `.netrc` file in practice).
//! The store is injected, so tests never touch the filesystem.

use std::collections::HashMap;
use std::fmt;

use zeroize::{Zeroize, Zeroizing};

// =============================================================================
// Credential
// =============================================================================

/// Username/password pair for HTTP Basic authentication.
///
/// The password is zeroized when the credential is dropped and is never
/// printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Login name
    pub username: String,
    /// Password (may be empty)
    pub password: Zeroizing<String>,
}

impl Credential {
    /// Create a credential.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Password as a plain string slice.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Zeroize for Credential {
    fn zeroize(&mut self) {
        self.username.zeroize();
        self.password.zeroize();
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// =============================================================================
// Credential Store Port
// =============================================================================

/// Machine-local credential lookup keyed by hostname.
///
/// Implementations:
/// - `NetrcStore` (scrapyd-config) - reads `~/.netrc`
/// - `NoCredentials` - never finds anything
/// - `StaticCredentials` - fixed host map, for tests
pub trait CredentialStore: Send + Sync {
    /// Credential for `host`, if the store knows one.
    fn lookup(&self, host: &str) -> Option<Credential>;
}

/// Store that never has credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialStore for NoCredentials {
    fn lookup(&self, _host: &str) -> Option<Credential> {
        None
    }
}

/// In-memory store with a fixed host → credential map.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    entries: HashMap<String, Credential>,
}

impl StaticCredentials {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a credential for `host`.
    pub fn with(mut self, host: impl Into<String>, credential: Credential) -> Self {
        self.entries.insert(host.into(), credential);
        self
    }
}

impl CredentialStore for StaticCredentials {
    fn lookup(&self, host: &str) -> Option<Credential> {
        self.entries.get(host).cloned()
    }
}

// =============================================================================
// Tests
// =============================================================================
