//! Deploy an already packaged project to one or all targets.
//!
//! Version labels:
//! - `GIT`: `git describe` (or `r<commit count>` without tags), then `-<branch>`
//! - `HG`: `r<tip revision>-<branch>`
//! - anything else is used as given
//! - nothing at all: the current Unix timestamp

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use scrapyd_client::{Action, ClientOptions, ScrapydClient};
use scrapyd_domain::Target;

use crate::cli::DeployArgs;
use crate::error::{CliError, CliResult};
use crate::output::write_compact;
use crate::session::{require_project, Session};

/// Upload `args.egg` to the selected target(s).
///
/// `fallback_target` is the global `--target`, used when no positional
/// target is given.
pub async fn deploy<W: Write, E: Write>(
    args: &DeployArgs,
    fallback_target: Option<&str>,
    session: &Session,
    options: &ClientOptions,
    out: &mut W,
    err: &mut E,
) -> CliResult<()> {
    let targets: Vec<Target> = if args.all_targets {
        session.targets.iter().collect()
    } else {
        vec![session.select(args.target.as_deref().or(fallback_target))?]
    };

    let Some(first) = targets.first() else {
        writeln!(err, "No targets to deploy to")?;
        return Ok(());
    };
    let version = resolve_version(args.version.as_deref(), first)?;
    let egg = read_egg(&args.egg)?;
    writeln!(err, "Using egg: {}", args.egg.display())?;

    for target in &targets {
        let project = require_project(args.project.as_deref(), target)?;
        writeln!(
            err,
            "Deploying to project \"{}\" in {}",
            project,
            Action::AddVersion.url(&target.url)
        )?;

        let client = ScrapydClient::connect(target, &session.credentials, options.clone())?;
        let envelope = client.add_version(&project, &version, egg.clone()).await?;
        client.close();

        info!(target = %target.name, project = %project, version = %version, "deployed");
        write_compact(out, &envelope)?;
    }

    Ok(())
}

fn read_egg(path: &Path) -> CliResult<Vec<u8>> {
    fs::read(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Version label to deploy under.
pub fn resolve_version(requested: Option<&str>, target: &Target) -> CliResult<String> {
    match requested.or(target.version.as_deref()) {
        Some("GIT") => git_version(),
        Some("HG") => hg_version(),
        Some(version) => Ok(version.to_string()),
        None => Ok(chrono::Utc::now().timestamp().to_string()),
    }
}

fn git_version() -> CliResult<String> {
    let descriptor = match capture("git", &["describe"])? {
        Some(descriptor) => descriptor,
        None => format!("r{}", capture_required("git", &["rev-list", "--count", "HEAD"])?),
    };
    let branch = capture_required("git", &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(vcs_version(&descriptor, &branch))
}

fn hg_version() -> CliResult<String> {
    let revision = capture_required("hg", &["tip", "--template", "{rev}"])?;
    let branch = capture_required("hg", &["branch"])?;
    Ok(vcs_version(&format!("r{}", revision), &branch))
}

fn vcs_version(descriptor: &str, branch: &str) -> String {
    format!("{}-{}", descriptor, branch)
}

/// Run `program`; `None` if it exits unsuccessfully.
fn capture(program: &str, args: &[&str]) -> CliResult<Option<String>> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| CliError::Command {
            program: program.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        debug!(program, ?args, status = %output.status, "command failed");
        return Ok(None);
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(Some(stdout.trim_end_matches(['\n', '\r']).to_string()))
}

fn capture_required(program: &str, args: &[&str]) -> CliResult<String> {
    capture(program, args)?.ok_or_else(|| CliError::Command {
        program: program.to_string(),
        message: format!("`{} {}` exited unsuccessfully", program, args.join(" ")),
    })
}
