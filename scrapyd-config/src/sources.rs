//! Where configuration files are looked for.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigResult;
use crate::ini::Config;

/// Project configuration file name.
pub const CONFIG_FILE_NAME: &str = "scrapy.cfg";

/// Environment variable naming one extra configuration file.
pub const EXTRA_CONFIG_ENV: &str = "SCRAPY_CONFIG";

/// Candidate configuration files, lowest precedence first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSources {
    /// Home directory, if known
    pub home: Option<PathBuf>,
    /// `$XDG_CONFIG_HOME`, if set
    pub xdg_config_home: Option<PathBuf>,
    /// Extra file from `$SCRAPY_CONFIG`
    pub extra: Option<PathBuf>,
    /// Directory the upward search for `scrapy.cfg` starts from
    pub cwd: PathBuf,
}

impl ConfigSources {
    /// Sources for the current process environment.
    pub fn from_env(cwd: impl Into<PathBuf>) -> Self {
        Self {
            home: dirs::home_dir(),
            xdg_config_home: env::var_os("XDG_CONFIG_HOME")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            extra: env::var_os(EXTRA_CONFIG_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            cwd: cwd.into(),
        }
    }

    /// System-wide files plus the upward search from `cwd`; no per-user files.
    pub fn project_only(cwd: impl Into<PathBuf>) -> Self {
        Self {
            home: None,
            xdg_config_home: None,
            extra: None,
            cwd: cwd.into(),
        }
    }

    /// Candidate paths, lowest precedence first. Some may not exist.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("/etc/scrapy.cfg"),
            PathBuf::from(r"c:\scrapy\scrapy.cfg"),
        ];

        let xdg = self
            .xdg_config_home
            .clone()
            .or_else(|| self.home.as_ref().map(|home| home.join(".config")));
        if let Some(xdg) = xdg {
            paths.push(xdg.join(CONFIG_FILE_NAME));
        }
        if let Some(home) = &self.home {
            paths.push(home.join(".scrapy.cfg"));
        }
        if let Some(extra) = &self.extra {
            paths.push(extra.clone());
        }
        if let Some(closest) = closest_config(&self.cwd) {
            paths.push(closest);
        }

        paths
    }

    /// Read every existing source into one configuration.
    pub fn load(&self) -> ConfigResult<Config> {
        let mut config = Config::new();
        let mut read = 0;
        for path in self.paths() {
            if config.read(&path)? {
                read += 1;
            }
        }

        debug!(files = read, sections = config.sections().count(), "loaded configuration");
        Ok(config)
    }
}

/// Closest `scrapy.cfg` in `start` or any of its ancestors.
pub fn closest_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Load `.env` (if any), then configuration for the current directory.
pub fn load_from_env() -> ConfigResult<Config> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    ConfigSources::from_env(cwd).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_paths_in_precedence_order() {
        let sources = ConfigSources {
            home: Some(PathBuf::from("/home/u")),
            xdg_config_home: None,
            extra: Some(PathBuf::from("/srv/extra.cfg")),
            cwd: PathBuf::from("/nonexistent/dir"),
        };

        assert_eq!(
            sources.paths(),
            vec![
                PathBuf::from("/etc/scrapy.cfg"),
                PathBuf::from(r"c:\scrapy\scrapy.cfg"),
                PathBuf::from("/home/u/.config/scrapy.cfg"),
                PathBuf::from("/home/u/.scrapy.cfg"),
                PathBuf::from("/srv/extra.cfg"),
            ]
        );
    }

    #[test]
    fn test_xdg_overrides_home_config_dir() {
        let sources = ConfigSources {
            home: Some(PathBuf::from("/home/u")),
            xdg_config_home: Some(PathBuf::from("/xdg")),
            extra: None,
            cwd: PathBuf::from("/nonexistent/dir"),
        };

        assert!(sources.paths().contains(&PathBuf::from("/xdg/scrapy.cfg")));
        assert!(!sources.paths().contains(&PathBuf::from("/home/u/.config/scrapy.cfg")));
    }

    #[test]
    fn test_closest_config_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("project").join("spiders");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.path().join("project").join(CONFIG_FILE_NAME), "[deploy]\n").unwrap();

        assert_eq!(
            closest_config(&nested),
            Some(root.path().join("project").join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn test_project_file_wins_over_home() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        fs::write(home.path().join(".scrapy.cfg"), "[deploy]\nurl = http://home:6800/\nproject = p\n").unwrap();
        fs::write(project.path().join(CONFIG_FILE_NAME), "[deploy]\nurl = http://project:6800/\n").unwrap();

        let sources = ConfigSources {
            home: Some(home.path().to_path_buf()),
            xdg_config_home: None,
            extra: None,
            cwd: project.path().to_path_buf(),
        };
        let config = sources.load().unwrap();

        assert_eq!(config.get_raw("deploy", "url"), Some("http://project:6800/"));
        assert_eq!(config.get_raw("deploy", "project"), Some("p"));
    }
}
