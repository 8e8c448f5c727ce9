//! Domain operations: one function per daemon capability.
//!
//! Each operation sends its request(s) through a [`Transport`], classifies
//! the response, and applies the client-side rules (pattern filtering,
//! existence checks before destructive calls). Requests inside one operation
//! are issued strictly one after another.

use std::fmt;

use tracing::{debug, info};

use scrapyd_domain::{process, ApiError, ApiResult, Envelope, JobArgs, Pattern};

use crate::ports::{Action, Transport, Upload};

/// Form field carrying the uploaded archive.
pub const EGG_FIELD: &str = "egg";

/// File name reported for uploaded archives.
pub const EGG_FILE_NAME: &str = "project.egg";

// =============================================================================
// Selection
// =============================================================================

/// One named item, or every item (`"all"` on the command line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every item currently listed by the daemon
    All,
    /// A single item
    One(String),
}

impl Selection {
    /// Interpret a user argument; the literal `all` selects everything.
    pub fn parse(value: &str) -> Self {
        if value == "all" {
            Selection::All
        } else {
            Selection::One(value.to_string())
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::One(name) => f.write_str(name),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

async fn get(transport: &dyn Transport, action: Action, query: &[(&str, &str)]) -> ApiResult<Envelope> {
    let raw = transport.get(action, &pairs(query)).await?;
    process(&raw)
}

async fn post(transport: &dyn Transport, action: Action, form: &[(String, String)]) -> ApiResult<Envelope> {
    let raw = transport.post(action, form).await?;
    process(&raw)
}

async fn require_project(transport: &dyn Transport, project: &str) -> ApiResult<()> {
    let projects = list_projects(transport, &Pattern::any()).await?;
    if projects.iter().any(|p| p == project) {
        Ok(())
    } else {
        Err(ApiError::PreconditionFailed(format!("Project {} not found.", project)))
    }
}

// =============================================================================
// Read operations
// =============================================================================

/// Projects deployed on the daemon whose names match `pattern`.
pub async fn list_projects(transport: &dyn Transport, pattern: &Pattern) -> ApiResult<Vec<String>> {
    let envelope = get(transport, Action::ListProjects, &[]).await?;
    let projects = pattern.filter(envelope.string_list("projects")?);

    debug!(pattern = %pattern, count = projects.len(), "listed projects");
    Ok(projects)
}

/// Spiders of `project` whose names match `pattern`.
pub async fn list_spiders(
    transport: &dyn Transport,
    project: &str,
    pattern: &Pattern,
) -> ApiResult<Vec<String>> {
    let envelope = get(transport, Action::ListSpiders, &[("project", project)]).await?;
    let spiders = pattern.filter(envelope.string_list("spiders")?);

    debug!(project, pattern = %pattern, count = spiders.len(), "listed spiders");
    Ok(spiders)
}

/// Pending, running and finished jobs of `project`, as returned by the daemon.
pub async fn list_jobs(transport: &dyn Transport, project: &str) -> ApiResult<Envelope> {
    get(transport, Action::ListJobs, &[("project", project)]).await
}

/// Versions of `project`, oldest first.
pub async fn list_versions(transport: &dyn Transport, project: &str) -> ApiResult<Vec<String>> {
    let envelope = get(transport, Action::ListVersions, &[("project", project)]).await?;
    envelope.string_list("versions")
}

/// State of one job.
pub async fn job_status(
    transport: &dyn Transport,
    job: &str,
    project: Option<&str>,
) -> ApiResult<Envelope> {
    let mut query = vec![("job", job)];
    if let Some(project) = project {
        query.push(("project", project));
    }
    get(transport, Action::Status, &query).await
}

/// Load of the daemon (pending/running/finished counts).
pub async fn daemon_status(transport: &dyn Transport) -> ApiResult<Envelope> {
    get(transport, Action::DaemonStatus, &[]).await
}

// =============================================================================
// Write operations
// =============================================================================

/// Submit one job and return its id.
///
/// The form is the extra arguments in order, then `project` and `spider`.
pub async fn schedule(
    transport: &dyn Transport,
    project: &str,
    spider: &str,
    args: &JobArgs,
) -> ApiResult<String> {
    let envelope = post(transport, Action::Schedule, &args.schedule_form(project, spider)).await?;
    let job_id = envelope.string("jobid")?;

    info!(project, spider, job_id = %job_id, "scheduled job");
    Ok(job_id)
}

/// Delete one version of `project`, or all of them.
///
/// The project must exist, and a single version must be listed, before
/// anything is deleted. Returns one response per deletion, in order; with
/// `Selection::All` and no versions nothing is sent.
pub async fn delete_version(
    transport: &dyn Transport,
    project: &str,
    version: &Selection,
) -> ApiResult<Vec<Envelope>> {
    require_project(transport, project).await?;
    let versions = list_versions(transport, project).await?;

    let targets = match version {
        Selection::All => versions,
        Selection::One(version) => {
            if !versions.contains(version) {
                return Err(ApiError::PreconditionFailed(format!(
                    "Version {} not found in project {}.",
                    version, project
                )));
            }
            vec![version.clone()]
        }
    };

    let mut responses = Vec::with_capacity(targets.len());
    for version in &targets {
        let form = pairs(&[("project", project), ("version", version.as_str())]);
        responses.push(post(transport, Action::DelVersion, &form).await?);
        info!(project, version = %version, "deleted version");
    }
    Ok(responses)
}

/// Delete `project` after checking the daemon lists it.
pub async fn delete_project(transport: &dyn Transport, project: &str) -> ApiResult<Envelope> {
    require_project(transport, project).await?;

    let envelope = post(transport, Action::DelProject, &pairs(&[("project", project)])).await?;
    info!(project, "deleted project");
    Ok(envelope)
}

/// Cancel one running job of `project`, or all of them.
///
/// Only jobs in the daemon's `running` list are considered. Cancellations
/// are sent one at a time; a failure stops the loop but does not undo the
/// jobs already cancelled.
pub async fn cancel(
    transport: &dyn Transport,
    project: &str,
    job: &Selection,
) -> ApiResult<Vec<Envelope>> {
    require_project(transport, project).await?;
    let running = list_jobs(transport, project).await?.job_ids("running")?;

    let targets = match job {
        Selection::All => running,
        Selection::One(job) => {
            if !running.contains(job) {
                return Err(ApiError::PreconditionFailed(format!(
                    "Job {} not found in project {}.",
                    job, project
                )));
            }
            vec![job.clone()]
        }
    };

    let mut responses = Vec::with_capacity(targets.len());
    for job in &targets {
        let form = pairs(&[("project", project), ("job", job.as_str())]);
        responses.push(post(transport, Action::Cancel, &form).await?);
        info!(project, job = %job, "cancelled job");
    }
    Ok(responses)
}

/// Upload a packaged project as `version` of `project`.
pub async fn add_version(
    transport: &dyn Transport,
    project: &str,
    version: &str,
    egg: Vec<u8>,
) -> ApiResult<Envelope> {
    let form = pairs(&[("project", project), ("version", version)]);
    let file = Upload {
        field: EGG_FIELD.to_string(),
        file_name: EGG_FILE_NAME.to_string(),
        bytes: egg,
    };

    let raw = transport.upload(Action::AddVersion, &form, file).await?;
    let envelope = process(&raw)?;
    info!(project, version, "uploaded version");
    Ok(envelope)
}

// =============================================================================
// Tests
// =============================================================================
