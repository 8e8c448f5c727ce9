//! CLI command implementations.
//!
//! Every command talks to the daemon through a [`ScrapydClient`] and writes
//! its results to the given writer.

use std::io::Write;

use scrapyd_client::{ScrapydClient, Selection, Transport};
use scrapyd_config::Targets;
use scrapyd_domain::{JobArgs, Pattern};

use crate::error::CliResult;
use crate::output::{write_compact, write_lines, write_pretty, write_project_spiders, write_target};

/// List usable targets in resolution order.
pub fn targets<W: Write>(out: &mut W, targets: &Targets) -> CliResult<()> {
    for target in targets.iter() {
        write_target(out, &target)?;
    }
    Ok(())
}

/// List projects matching `pattern`.
pub async fn projects<T: Transport, W: Write>(
    client: &ScrapydClient<T>,
    out: &mut W,
    pattern: &Pattern,
) -> CliResult<()> {
    let projects = client.projects(pattern).await?;
    write_lines(out, &projects)
}

/// List the spiders of every project matching `projects`.
pub async fn spiders<T: Transport, W: Write>(
    client: &ScrapydClient<T>,
    out: &mut W,
    projects: &Pattern,
    verbose: bool,
) -> CliResult<()> {
    for project in client.projects(projects).await? {
        let spiders = client.spiders(&project, &Pattern::any()).await?;
        if verbose {
            write_lines(out, spiders.iter().map(|spider| format!("{} {}", project, spider)))?;
        } else {
            write_project_spiders(out, &project, &spiders)?;
        }
    }
    Ok(())
}

/// Schedule every matching spider of every matching project.
pub async fn schedule<T: Transport, W: Write>(
    client: &ScrapydClient<T>,
    out: &mut W,
    projects: &Pattern,
    spiders: &Pattern,
    args: &JobArgs,
) -> CliResult<()> {
    for project in client.projects(projects).await? {
        for spider in client.spiders(&project, spiders).await? {
            let job_id = client.schedule(&project, &spider, args).await?;
            writeln!(out, "{} / {} => {}", project, spider, job_id)?;
        }
    }
    Ok(())
}

/// Print the jobs of `project`.
pub async fn jobs<T: Transport, W: Write>(client: &ScrapydClient<T>, out: &mut W, project: &str) -> CliResult<()> {
    write_pretty(out, &client.jobs(project).await?)
}

/// Print the state of `job`.
pub async fn status<T: Transport, W: Write>(
    client: &ScrapydClient<T>,
    out: &mut W,
    job: &str,
    project: Option<&str>,
) -> CliResult<()> {
    write_pretty(out, &client.job_status(job, project).await?)
}

/// Print the daemon load.
pub async fn daemon_status<T: Transport, W: Write>(client: &ScrapydClient<T>, out: &mut W) -> CliResult<()> {
    write_pretty(out, &client.daemon_status().await?)
}

/// List the versions of `project`.
pub async fn versions<T: Transport, W: Write>(client: &ScrapydClient<T>, out: &mut W, project: &str) -> CliResult<()> {
    write_lines(out, client.versions(project).await?)
}

/// Delete one or all versions of `project`.
pub async fn delete_version<T: Transport, W: Write>(
    client: &ScrapydClient<T>,
    out: &mut W,
    project: &str,
    version: &Selection,
) -> CliResult<()> {
    for envelope in client.delete_version(project, version).await? {
        write_compact(out, &envelope)?;
    }
    Ok(())
}

/// Delete `project`.
pub async fn delete_project<T: Transport, W: Write>(
    client: &ScrapydClient<T>,
    out: &mut W,
    project: &str,
) -> CliResult<()> {
    write_compact(out, &client.delete_project(project).await?)
}

/// Cancel one or all running jobs of `project`.
pub async fn cancel<T: Transport, W: Write>(
    client: &ScrapydClient<T>,
    out: &mut W,
    project: &str,
    job: &Selection,
) -> CliResult<()> {
    for envelope in client.cancel(project, job).await? {
        write_compact(out, &envelope)?;
    }
    Ok(())
}
