//! Deploy targets from `[deploy]` and `[deploy:NAME]` sections.
//!
//! `[deploy]` holds defaults shared by every target and, when it has a
//! `url`, is itself the target `default`. Each `[deploy:NAME]` section is
//! layered over `[deploy]`.

use tracing::debug;

use scrapyd_domain::{Target, DEFAULT_TARGET_NAME};

use crate::error::{ConfigError, ConfigResult};
use crate::ini::Config;

/// Base section name.
pub const DEPLOY_SECTION: &str = "deploy";

/// Prefix of named target sections.
pub const TARGET_PREFIX: &str = "deploy:";

/// Merged settings of one target, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TargetSettings {
    name: String,
    values: Vec<(String, String)>,
}

impl TargetSettings {
    fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn to_target(&self) -> ConfigResult<Target> {
        let url = self
            .get("url")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ConfigError::MissingUrl(self.name.clone()))?;

        let owned = |key: &str| self.get(key).map(str::to_string);
        Ok(Target {
            name: self.name.clone(),
            url: url.to_string(),
            username: owned("username"),
            password: owned("password").map(Into::into),
            project: owned("project"),
            version: owned("version"),
        })
    }
}

/// Targets in resolution order: `default` first, then declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    base: Vec<(String, String)>,
    settings: Vec<TargetSettings>,
}

impl Targets {
    /// Collect targets from a parsed configuration.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let base = if config.has_section(DEPLOY_SECTION) {
            config.items(DEPLOY_SECTION)?
        } else {
            Vec::new()
        };

        let mut targets = Targets {
            base: base.clone(),
            settings: Vec::new(),
        };
        if base.iter().any(|(key, _)| key == "url") {
            targets.upsert(DEFAULT_TARGET_NAME, base.clone());
        }

        for section in config.sections() {
            let Some(name) = section.strip_prefix(TARGET_PREFIX) else {
                continue;
            };
            let mut values = base.clone();
            for (key, value) in config.items(section)? {
                match values.iter_mut().find(|(k, _)| *k == key) {
                    Some(existing) => existing.1 = value,
                    None => values.push((key, value)),
                }
            }
            targets.upsert(name, values);
        }

        debug!(count = targets.settings.len(), "collected deploy targets");
        Ok(targets)
    }

    fn upsert(&mut self, name: &str, values: Vec<(String, String)>) {
        let settings = TargetSettings {
            name: name.to_string(),
            values,
        };
        match self.settings.iter_mut().find(|s| s.name == name) {
            Some(existing) => *existing = settings,
            None => self.settings.push(settings),
        }
    }

    /// Value from the base `[deploy]` section.
    pub fn base_value(&self, key: &str) -> Option<&str> {
        self.base
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Names of all declared targets, including ones without a URL.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.settings.iter().map(|s| s.name.as_str())
    }

    /// True if no target is declared.
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Look up a target by name.
    pub fn resolve(&self, name: &str) -> ConfigResult<Target> {
        self.settings
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownTarget(name.to_string()))?
            .to_target()
    }

    /// Usable targets in resolution order; targets without a URL are skipped.
    pub fn iter(&self) -> impl Iterator<Item = Target> + '_ {
        self.settings.iter().filter_map(|settings| match settings.to_target() {
            Ok(target) => Some(target),
            Err(e) => {
                debug!(target = %settings.name, error = %e, "skipping target");
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(text: &str) -> Targets {
        Targets::from_config(&Config::parse("scrapy.cfg", text).unwrap()).unwrap()
    }

    #[test]
    fn test_default_then_named_in_order() {
        let targets = targets(
            "\
[deploy]
url = http://localhost:6800/
project = anotherproject

[deploy:target1]
url = http://localhost:6801/
project = scrapydproject
",
        );

        let resolved: Vec<_> = targets.iter().collect();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "default");
        assert_eq!(resolved[0].url, "http://localhost:6800/");
        assert_eq!(resolved[0].project.as_deref(), Some("anotherproject"));
        assert_eq!(resolved[1].name, "target1");
        assert_eq!(resolved[1].url, "http://localhost:6801/");
        assert_eq!(resolved[1].project.as_deref(), Some("scrapydproject"));
    }

    #[test]
    fn test_declaration_order_not_alphabetical() {
        let targets = targets("[deploy:zeta]\nurl = z\n[deploy:alpha]\nurl = a\n");

        let names: Vec<_> = targets.names().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_named_target_inherits_base() {
        let targets = targets(
            "[deploy]\nproject = shared\nusername = ops\n[deploy:prod]\nurl = https://prod/\n",
        );

        let prod = targets.resolve("prod").unwrap();
        assert_eq!(prod.project.as_deref(), Some("shared"));
        assert_eq!(prod.username.as_deref(), Some("ops"));
        assert!(matches!(targets.resolve("default"), Err(ConfigError::UnknownTarget(_))));
        assert_eq!(targets.base_value("project"), Some("shared"));
    }

    #[test]
    fn test_missing_url() {
        let targets = targets("[deploy:nourl]\nproject = p\n[deploy:ok]\nurl = http://ok/\n");

        assert!(matches!(
            targets.resolve("nourl"),
            Err(ConfigError::MissingUrl(name)) if name == "nourl"
        ));
        let usable: Vec<_> = targets.iter().map(|t| t.name).collect();
        assert_eq!(usable, vec!["ok"]);
    }

    #[test]
    fn test_unknown_target() {
        let targets = targets("[deploy]\nurl = http://localhost:6800/\n");

        let err = targets.resolve("staging").unwrap_err();
        assert_eq!(err.to_string(), "Unknown target: staging");
    }

    #[test]
    fn test_no_deploy_sections() {
        let targets = targets("[settings]\ndefault = demo.settings\n");

        assert!(targets.is_empty());
        assert_eq!(targets.iter().count(), 0);
    }
}
