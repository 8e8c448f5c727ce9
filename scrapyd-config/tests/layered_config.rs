//! Layered configuration: user file + project file + environment.

use std::fs;

use scrapyd_config::{ConfigError, ConfigSources, Targets};

#[test]
fn test_targets_from_user_and_project_files() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let project = tempfile::tempdir()?;
    let nested = project.path().join("demo").join("spiders");
    fs::create_dir_all(&nested)?;

    std::env::set_var("SCRAPYD_CONFIG_TEST_PASSWORD", "from-env");
    fs::write(
        home.path().join(".scrapy.cfg"),
        "\
[deploy]
username = ops
password = ${SCRAPYD_CONFIG_TEST_PASSWORD}

[deploy:staging]
url = http://staging:6800/
",
    )?;
    fs::write(
        project.path().join("scrapy.cfg"),
        "\
[settings]
default = demo.settings

[deploy]
url = http://localhost:6800/
project = demo

[deploy:production]
host = scrapyd.example.com
url = https://%(host)s/
version = GIT
",
    )?;

    let sources = ConfigSources {
        home: Some(home.path().to_path_buf()),
        xdg_config_home: None,
        extra: None,
        cwd: nested,
    };
    let targets = Targets::from_config(&sources.load()?)?;

    let names: Vec<_> = targets.iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["default", "staging", "production"]);

    let production = targets.resolve("production")?;
    assert_eq!(production.url, "https://scrapyd.example.com/");
    assert_eq!(production.project.as_deref(), Some("demo"));
    assert_eq!(production.username.as_deref(), Some("ops"));
    assert_eq!(production.password.as_deref().map(String::as_str), Some("from-env"));
    assert_eq!(production.version.as_deref(), Some("GIT"));

    assert!(matches!(
        targets.resolve("missing"),
        Err(ConfigError::UnknownTarget(_))
    ));
    Ok(())
}

#[test]
fn test_broken_project_file_is_reported() {
    let project = tempfile::tempdir().unwrap();
    fs::write(project.path().join("scrapy.cfg"), "[deploy\nurl = x\n").unwrap();

    let err = ConfigSources::project_only(project.path()).load().unwrap_err();

    assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    assert!(err.to_string().contains("scrapy.cfg:1:"));
}
