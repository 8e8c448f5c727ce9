//! `.netrc` credential store.
//!
//! Recognised tokens: `machine NAME`, `default`, `login` (or `user`),
//! `password`, `account` and `macdef NAME` (whose body runs to the next
//! blank line and is ignored). Tokens may be double-quoted.

use std::collections::{HashMap, VecDeque};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::Lines;

use tracing::debug;

use scrapyd_domain::{Credential, CredentialStore};

/// Environment variable overriding the `.netrc` location.
pub const NETRC_ENV: &str = "NETRC";

#[derive(Debug, Default)]
struct Entry {
    login: Option<String>,
    password: Option<String>,
}

impl Entry {
    fn credential(&self) -> Credential {
        Credential::new(
            self.login.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
    }
}

/// Credentials keyed by host, with an optional fallback.
#[derive(Debug, Clone, Default)]
pub struct NetrcStore {
    machines: HashMap<String, Credential>,
    default: Option<Credential>,
}

impl NetrcStore {
    /// Load `$NETRC`, or `~/.netrc` when unset.
    ///
    /// A missing or unreadable file gives an empty store.
    pub fn load() -> Self {
        let path = env::var_os(NETRC_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".netrc")));

        match path {
            Some(path) => Self::from_path(&path),
            None => Self::default(),
        }
    }

    /// Load the file at `path`; a missing or unreadable file gives an empty store.
    pub fn from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                let store = Self::parse(&text);
                debug!(path = %path.display(), machines = store.machines.len(), "loaded netrc");
                store
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "netrc not available");
                Self::default()
            }
        }
    }

    /// Parse netrc text. Unknown tokens are skipped.
    pub fn parse(text: &str) -> Self {
        let mut store = Self::default();
        let mut tokens = Tokens::new(text);
        let mut host: Option<Option<String>> = None;
        let mut entry = Entry::default();

        while let Some(token) = tokens.next() {
            match token.as_str() {
                "machine" | "default" | "macdef" => {
                    if let Some(host) = host.take() {
                        store.insert(host, &entry);
                    }
                    entry = Entry::default();
                    match token.as_str() {
                        "machine" => host = tokens.next().map(Some),
                        "default" => host = Some(None),
                        _ => tokens.skip_macro(),
                    }
                }
                "login" | "user" => entry.login = tokens.next(),
                "password" => entry.password = tokens.next(),
                "account" => {
                    tokens.next();
                }
                other => debug!(token = other, "ignoring netrc token"),
            }
        }
        if let Some(host) = host {
            store.insert(host, &entry);
        }

        store
    }

    fn insert(&mut self, host: Option<String>, entry: &Entry) {
        match host {
            Some(host) => {
                self.machines.insert(host, entry.credential());
            }
            None => self.default = Some(entry.credential()),
        }
    }
}

impl CredentialStore for NetrcStore {
    fn lookup(&self, host: &str) -> Option<Credential> {
        self.machines
            .get(host)
            .or(self.default.as_ref())
            .cloned()
    }
}

// =============================================================================
// Tokenizer
// =============================================================================

struct Tokens<'a> {
    lines: Lines<'a>,
    pending: VecDeque<String>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            pending: VecDeque::new(),
        }
    }

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            let line = self.lines.next()?;
            self.pending.extend(split_line(line));
        }
    }

    /// Skip a macro name and its body (up to and including a blank line).
    fn skip_macro(&mut self) {
        self.pending.clear();
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                break;
            }
        }
    }
}

fn split_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '#' && tokens.is_empty() {
            break;
        } else if c == '"' {
            chars.next();
            let mut token = String::new();
            while let Some(c) = chars.next() {
                match c {
                    '"' => break,
                    '\\' => token.extend(chars.next()),
                    _ => token.push(c),
                }
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(token);
        }
    }

    tokens
}
