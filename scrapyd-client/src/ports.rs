//! Transport port definition.
//!
//! The transport is the only part of the client that performs I/O.
//! Adapters implement it for real HTTP (`HttpTransport`) and for tests
//! (`StubTransport`).

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use scrapyd_domain::{ApiResult, RawResponse};

// =============================================================================
// Actions
// =============================================================================

/// Daemon actions, one per `/{action}.json` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// GET, lists deployed projects
    ListProjects,
    /// GET, lists spiders of a project
    ListSpiders,
    /// GET, lists pending/running/finished jobs of a project
    ListJobs,
    /// GET, lists versions of a project
    ListVersions,
    /// GET, state of one job
    Status,
    /// GET, load of the daemon
    DaemonStatus,
    /// POST, submits a job
    Schedule,
    /// POST, cancels a job
    Cancel,
    /// POST, removes a project
    DelProject,
    /// POST, removes a project version
    DelVersion,
    /// POST (multipart), uploads a project version
    AddVersion,
}

impl Action {
    /// Action name as used in the URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ListProjects => "listprojects",
            Action::ListSpiders => "listspiders",
            Action::ListJobs => "listjobs",
            Action::ListVersions => "listversions",
            Action::Status => "status",
            Action::DaemonStatus => "daemonstatus",
            Action::Schedule => "schedule",
            Action::Cancel => "cancel",
            Action::DelProject => "delproject",
            Action::DelVersion => "delversion",
            Action::AddVersion => "addversion",
        }
    }

    /// Full endpoint URL below `base_url`.
    ///
    /// A trailing `/` on the base URL is ignored.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}.json", base_url.trim_end_matches('/'), self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Transport Port
// =============================================================================

/// A file sent along with a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Form field name
    pub field: String,
    /// File name reported to the daemon
    pub file_name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Port for talking HTTP to the daemon.
///
/// Implementations must not retry and must not interpret the body; network
/// failures become `ApiError::ConnectionFailure` naming the attempted URL.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Base URL requests are sent to.
    fn base_url(&self) -> &str;

    /// GET `{base_url}/{action}.json?query`.
    async fn get(&self, action: Action, query: &[(String, String)]) -> ApiResult<RawResponse>;

    /// POST a url-encoded form. Pairs are sent in order, duplicates included.
    async fn post(&self, action: Action, form: &[(String, String)]) -> ApiResult<RawResponse>;

    /// POST a multipart form with one attached file.
    async fn upload(
        &self,
        action: Action,
        form: &[(String, String)],
        file: Upload,
    ) -> ApiResult<RawResponse>;
}
