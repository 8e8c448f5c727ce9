//! INI files in the `scrapy.cfg` dialect.
//!
//! - `[section]` headers; `[DEFAULT]` supplies fallback keys for every section
//! - `key = value` or `key: value`; keys are case-insensitive
//! - full-line `#` / `;` comments
//! - indented lines continue the previous value
//!
//! Values are expanded when read: `%(name)s` references another key of the
//! same section (or `[DEFAULT]`), `%%` is a literal `%`, and `$NAME` /
//! `${NAME}` are replaced from the environment when set.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{ConfigError, ConfigResult};

/// Name of the fallback section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Nested `%(name)s` references deeper than this are rejected.
const MAX_INTERPOLATION_DEPTH: usize = 10;

// =============================================================================
// Section
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut String> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    fn set(&mut self, key: String, value: String) {
        match self.get_mut(&key) {
            Some(existing) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }
}

// =============================================================================
// Config
// =============================================================================

/// Parsed configuration, possibly merged from several files.
///
/// Section order is the order in which sections were first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    defaults: Section,
    sections: Vec<Section>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Empty configuration.
    pub fn new() -> Self {
        Self {
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
        }
    }

    /// Parse `text`; `file` labels parse errors.
    pub fn parse(file: &str, text: &str) -> ConfigResult<Self> {
        let mut config = Config::new();
        let mut section: Option<String> = None;
        let mut last_key: Option<String> = None;

        for (index, line) in text.lines().enumerate() {
            let error = |message: &str| ConfigError::Parse {
                file: file.to_string(),
                line: index + 1,
                message: message.to_string(),
            };
            let trimmed = line.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if line.starts_with(char::is_whitespace) {
                if let (Some(name), Some(key)) = (&section, &last_key) {
                    if let Some(value) = config.section_mut(name).get_mut(key) {
                        value.push('\n');
                        value.push_str(trimmed);
                    }
                    continue;
                }
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .split_once(']')
                    .map(|(name, _)| name.trim())
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| error("invalid section header"))?;
                config.section_mut(name);
                section = Some(name.to_string());
                last_key = None;
                continue;
            }

            let name = section
                .as_deref()
                .ok_or_else(|| error("key outside of any section"))?;
            let (key, value) =
                split_option(trimmed).ok_or_else(|| error("expected 'key = value'"))?;
            config.section_mut(name).set(key.clone(), value);
            last_key = Some(key);
        }

        Ok(config)
    }

    /// Read and merge the file at `path`.
    ///
    /// Returns `false` when the file does not exist.
    pub fn read(&mut self, path: &Path) -> ConfigResult<bool> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(path = %path.display(), "config file not found");
                return Ok(false);
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let parsed = Config::parse(&path.display().to_string(), &text)?;
        self.merge(parsed);
        debug!(path = %path.display(), "read config file");
        Ok(true)
    }

    /// Merge `other` into this configuration; its values win.
    pub fn merge(&mut self, other: Config) {
        for (key, value) in other.defaults.entries {
            self.defaults.set(key, value);
        }
        for section in other.sections {
            let target = self.section_mut(&section.name);
            for (key, value) in section.entries {
                target.set(key, value);
            }
        }
    }

    /// Section names in first-seen order, excluding `[DEFAULT]`.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// True if the section was declared.
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Unexpanded value, falling back to `[DEFAULT]`.
    pub fn get_raw(&self, section: &str, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        let own = self.section(section)?.get(&key);
        own.or_else(|| self.defaults.get(&key))
    }

    /// Expanded value, falling back to `[DEFAULT]`.
    pub fn get(&self, section: &str, key: &str) -> ConfigResult<Option<String>> {
        let key = key.to_lowercase();
        match self.get_raw(section, &key) {
            Some(raw) => self.expand(section, &key, raw).map(Some),
            None => Ok(None),
        }
    }

    /// All expanded key/value pairs of a section, `[DEFAULT]` keys included.
    ///
    /// Keys from `[DEFAULT]` come first; an unknown section yields nothing.
    pub fn items(&self, section: &str) -> ConfigResult<Vec<(String, String)>> {
        let Some(own) = self.section(section) else {
            return Ok(Vec::new());
        };

        let mut merged = self.defaults.clone();
        for (key, value) in &own.entries {
            merged.set(key.clone(), value.clone());
        }

        merged
            .entries
            .iter()
            .map(|(key, raw)| Ok((key.clone(), self.expand(section, key, raw)?)))
            .collect()
    }

    fn section(&self, name: &str) -> Option<&Section> {
        if name == DEFAULT_SECTION {
            return Some(&self.defaults);
        }
        self.sections.iter().find(|s| s.name == name)
    }

    fn section_mut(&mut self, name: &str) -> &mut Section {
        if name == DEFAULT_SECTION {
            return &mut self.defaults;
        }
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    fn expand(&self, section: &str, key: &str, raw: &str) -> ConfigResult<String> {
        let value = self.interpolate(section, key, raw, 0)?;
        Ok(expand_vars(&value, |name| std::env::var(name).ok()))
    }

    fn interpolate(&self, section: &str, key: &str, raw: &str, depth: usize) -> ConfigResult<String> {
        let error = |message: String| ConfigError::Interpolation {
            section: section.to_string(),
            key: key.to_string(),
            message,
        };
        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(error("recursion limit exceeded".to_string()));
        }

        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];

            if let Some(after) = tail.strip_prefix('%') {
                out.push('%');
                rest = after;
            } else if let Some(reference) = tail.strip_prefix('(') {
                let (name, after) = reference
                    .split_once(")s")
                    .ok_or_else(|| error(format!("bad reference '%{}'", tail)))?;
                let name = name.to_lowercase();
                let target = self
                    .get_raw(section, &name)
                    .ok_or_else(|| error(format!("no option '{}'", name)))?;
                out.push_str(&self.interpolate(section, key, target, depth + 1)?);
                rest = after;
            } else {
                return Err(error(format!("'%' must be followed by '%' or '(', found '%{}'", tail)));
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Split `key = value` / `key: value` at the first delimiter.
fn split_option(line: &str) -> Option<(String, String)> {
    let pos = line.find(['=', ':'])?;
    let key = line[..pos].trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    Some((key, line[pos + 1..].trim().to_string()))
}

/// Replace `$NAME` and `${NAME}` using `lookup`; unknown names are kept.
pub fn expand_vars<F>(value: &str, lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    shellexpand::env_with_context_no_errors(value, lookup).into_owned()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Automatically created by: scrapy startproject

[settings]
default = demo.settings

[deploy]
url = http://localhost:6800/
project = anotherproject

[deploy:target1]
URL: http://localhost:6801/
project = scrapydproject
";

    #[test]
    fn test_parse_sections_in_order() {
        let config = Config::parse("scrapy.cfg", SAMPLE).unwrap();

        let sections: Vec<_> = config.sections().collect();
        assert_eq!(sections, vec!["settings", "deploy", "deploy:target1"]);
        assert_eq!(config.get_raw("deploy", "url"), Some("http://localhost:6800/"));
        assert_eq!(config.get_raw("deploy:target1", "url"), Some("http://localhost:6801/"));
        assert_eq!(config.get_raw("deploy:target1", "URL"), Some("http://localhost:6801/"));
    }

    #[test]
    fn test_continuation_lines() {
        let config = Config::parse("t", "[s]\nkey = first\n    second\n\tthird\nother = x\n").unwrap();

        assert_eq!(config.get_raw("s", "key"), Some("first\nsecond\nthird"));
        assert_eq!(config.get_raw("s", "other"), Some("x"));
    }

    #[test]
    fn test_parse_errors_carry_line() {
        match Config::parse("scrapy.cfg", "url = x\n") {
            Err(ConfigError::Parse { file, line, .. }) => {
                assert_eq!(file, "scrapy.cfg");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(matches!(
            Config::parse("t", "[s]\n; comment\nno delimiter here\n"),
            Err(ConfigError::Parse { line: 3, .. })
        ));
        assert!(matches!(
            Config::parse("t", "[unterminated\n"),
            Err(ConfigError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_defaults_fall_through() {
        let config = Config::parse("t", "[DEFAULT]\nuser = bob\n[deploy]\nurl = u\n").unwrap();

        assert_eq!(config.get("deploy", "user").unwrap().as_deref(), Some("bob"));
        assert_eq!(
            config.items("deploy").unwrap(),
            vec![
                ("user".to_string(), "bob".to_string()),
                ("url".to_string(), "u".to_string()),
            ]
        );
        assert!(config.sections().all(|s| s != DEFAULT_SECTION));
    }

    #[test]
    fn test_interpolation() {
        let text = "\
[DEFAULT]
host = example.com
[deploy]
port = 6800
url = http://%(host)s:%(port)s/
discount = 50%%
broken = %(nope)s
bare = 100%
";
        let config = Config::parse("t", text).unwrap();

        assert_eq!(
            config.get("deploy", "url").unwrap().as_deref(),
            Some("http://example.com:6800/")
        );
        assert_eq!(config.get("deploy", "discount").unwrap().as_deref(), Some("50%"));
        assert!(matches!(
            config.get("deploy", "broken"),
            Err(ConfigError::Interpolation { .. })
        ));
        assert!(config.get("deploy", "bare").is_err());
    }

    #[test]
    fn test_interpolation_loop_is_rejected() {
        let config = Config::parse("t", "[s]\na = %(b)s\nb = %(a)s\n").unwrap();

        match config.get("s", "a") {
            Err(ConfigError::Interpolation { message, .. }) => {
                assert!(message.contains("recursion"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_expand_vars() {
        let lookup = |name: &str| match name {
            "USER" => Some("alice".to_string()),
            "PASS_1" => Some("s3cret".to_string()),
            _ => None,
        };

        assert_eq!(expand_vars("$USER:${PASS_1}", lookup), "alice:s3cret");
        assert_eq!(expand_vars("$MISSING and ${ALSO}", lookup), "$MISSING and ${ALSO}");
        assert_eq!(expand_vars("cost $ 5", lookup), "cost $ 5");
        assert_eq!(expand_vars("${USER}name", lookup), "alicename");
    }

    #[test]
    fn test_merge_keeps_order_and_overrides() {
        let mut base = Config::parse("a", "[deploy]\nurl = a\nproject = p\n[deploy:x]\nurl = x\n").unwrap();
        let later = Config::parse("b", "[deploy:y]\nurl = y\n[deploy]\nurl = b\n").unwrap();

        base.merge(later);

        let sections: Vec<_> = base.sections().collect();
        assert_eq!(sections, vec!["deploy", "deploy:x", "deploy:y"]);
        assert_eq!(base.get_raw("deploy", "url"), Some("b"));
        assert_eq!(base.get_raw("deploy", "project"), Some("p"));
    }

    #[test]
    fn test_read_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();

        assert!(!config.read(&dir.path().join("scrapy.cfg")).unwrap());

        let path = dir.path().join("scrapy.cfg");
        fs::write(&path, SAMPLE).unwrap();
        assert!(config.read(&path).unwrap());
        assert!(config.has_section("deploy:target1"));
    }
}
