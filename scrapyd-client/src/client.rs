//! Client facade bound to one daemon.

use std::time::Duration;

use tracing::debug;

use scrapyd_domain::{ApiResult, CredentialStore, Envelope, JobArgs, Pattern, Target};

use crate::http::HttpTransport;
use crate::operations::{self, Selection};
use crate::ports::Transport;

/// Connection settings that override what the target carries.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Username overriding the target's
    pub username: Option<String>,
    /// Password overriding the target's
    pub password: Option<String>,
}

/// Client for one daemon.
///
/// Generic over the transport so tests can swap in a stub. Dropping (or
/// [`close`](Self::close)-ing) the client releases its connections.
///
/// Every call takes `&self` and the client is `Send + Sync`, so one client
/// may serve concurrent tasks. It does not serialize requests; callers that
/// need ordering between calls (such as deploying a version before
/// scheduling it) must await one before issuing the next.
pub struct ScrapydClient<T: Transport = HttpTransport> {
    transport: T,
}

impl ScrapydClient<HttpTransport> {
    /// Build an HTTP client for `target`.
    ///
    /// Credentials come from the options, then the target, then `store`
    /// (looked up by the target's host).
    pub fn connect(
        target: &Target,
        store: &dyn CredentialStore,
        options: ClientOptions,
    ) -> ApiResult<Self> {
        let mut target = target.clone();
        if let Some(username) = options.username {
            target.username = Some(username);
        }
        if let Some(password) = options.password {
            target = target.with_password(password);
        }

        let credential = target.credential(store);
        debug!(
            target = %target.name,
            url = %target.url,
            authenticated = credential.is_some(),
            "connecting"
        );

        let transport = HttpTransport::new(target.url.clone(), credential, options.timeout)?;
        Ok(Self { transport })
    }
}

impl<T: Transport> ScrapydClient<T> {
    /// Wrap an existing transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Base URL of the daemon.
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the client and its connections.
    pub fn close(self) {
        debug!(url = %self.transport.base_url(), "closing client");
    }

    /// See [`operations::list_projects`].
    pub async fn projects(&self, pattern: &Pattern) -> ApiResult<Vec<String>> {
        operations::list_projects(&self.transport, pattern).await
    }

    /// See [`operations::list_spiders`].
    pub async fn spiders(&self, project: &str, pattern: &Pattern) -> ApiResult<Vec<String>> {
        operations::list_spiders(&self.transport, project, pattern).await
    }

    /// See [`operations::list_jobs`].
    pub async fn jobs(&self, project: &str) -> ApiResult<Envelope> {
        operations::list_jobs(&self.transport, project).await
    }

    /// See [`operations::list_versions`].
    pub async fn versions(&self, project: &str) -> ApiResult<Vec<String>> {
        operations::list_versions(&self.transport, project).await
    }

    /// See [`operations::job_status`].
    pub async fn job_status(&self, job: &str, project: Option<&str>) -> ApiResult<Envelope> {
        operations::job_status(&self.transport, job, project).await
    }

    /// See [`operations::daemon_status`].
    pub async fn daemon_status(&self) -> ApiResult<Envelope> {
        operations::daemon_status(&self.transport).await
    }

    /// See [`operations::schedule`].
    pub async fn schedule(&self, project: &str, spider: &str, args: &JobArgs) -> ApiResult<String> {
        operations::schedule(&self.transport, project, spider, args).await
    }

    /// See [`operations::delete_version`].
    pub async fn delete_version(
        &self,
        project: &str,
        version: &Selection,
    ) -> ApiResult<Vec<Envelope>> {
        operations::delete_version(&self.transport, project, version).await
    }

    /// See [`operations::delete_project`].
    pub async fn delete_project(&self, project: &str) -> ApiResult<Envelope> {
        operations::delete_project(&self.transport, project).await
    }

    /// See [`operations::cancel`].
    pub async fn cancel(&self, project: &str, job: &Selection) -> ApiResult<Vec<Envelope>> {
        operations::cancel(&self.transport, project, job).await
    }

    /// See [`operations::add_version`].
    pub async fn add_version(&self, project: &str, version: &str, egg: Vec<u8>) -> ApiResult<Envelope> {
        operations::add_version(&self.transport, project, version, egg).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Action;
    use crate::stub::StubTransport;
    use scrapyd_domain::{Credential, NoCredentials, StaticCredentials};
    use serde_json::json;

    #[test]
    fn test_connect_uses_store_credentials() {
        let store = StaticCredentials::new().with("localhost", Credential::new("netrc", "secret"));
        let target = Target::new("default", "http://localhost:6800");

        let client = ScrapydClient::connect(&target, &store, ClientOptions::default()).unwrap();

        assert_eq!(client.base_url(), "http://localhost:6800");
        assert_eq!(client.transport().credential().unwrap().username, "netrc");
    }

    #[test]
    fn test_connect_options_override_target() {
        let target = Target::new("default", "http://localhost:6800")
            .with_auth("target-user", Some("target-pass".to_string()));
        let options = ClientOptions {
            timeout: Some(Duration::from_secs(3)),
            username: Some("cli-user".to_string()),
            password: None,
        };

        let client = ScrapydClient::connect(&target, &NoCredentials, options).unwrap();
        let credential = client.transport().credential().unwrap();

        assert_eq!(credential.username, "cli-user");
        assert_eq!(credential.password(), "target-pass");
        assert_eq!(client.transport().timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_connect_without_credentials() {
        let target = Target::new("default", "http://localhost:6800");
        let client = ScrapydClient::connect(&target, &NoCredentials, ClientOptions::default()).unwrap();

        assert!(client.transport().credential().is_none());
        client.close();
    }

    #[test]
    fn test_connect_password_option_keeps_target_username() {
        let target = Target::new("default", "http://localhost:6800")
            .with_auth("target-user", Some("target-pass".to_string()));
        let options = ClientOptions {
            password: Some("cli-pass".to_string()),
            ..ClientOptions::default()
        };

        let client = ScrapydClient::connect(&target, &NoCredentials, options).unwrap();
        let credential = client.transport().credential().unwrap();

        assert_eq!(credential.username, "target-user");
        assert_eq!(credential.password(), "cli-pass");
    }

    #[tokio::test]
    async fn test_client_is_shared_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScrapydClient>();

        let stub = StubTransport::new("http://localhost:6800");
        stub.respond(Action::ListProjects, json!({"status": "ok", "projects": ["demo"]}))
            .respond(Action::ListVersions, json!({"status": "ok", "versions": ["r1"]}));
        let client = std::sync::Arc::new(ScrapydClient::with_transport(stub));

        let projects = tokio::spawn({
            let client = client.clone();
            async move { client.projects(&Pattern::any()).await }
        });
        let versions = tokio::spawn({
            let client = client.clone();
            async move { client.versions("demo").await }
        });

        assert_eq!(projects.await.unwrap().unwrap(), vec!["demo"]);
        assert_eq!(versions.await.unwrap().unwrap(), vec!["r1"]);
    }

    #[tokio::test]
    async fn test_facade_delegates_to_operations() {
        let stub = StubTransport::new("http://localhost:6800");
        stub.respond(Action::ListProjects, json!({"status": "ok", "projects": ["demo"]}))
            .respond(Action::Schedule, json!({"status": "ok", "jobid": "abc"}));
        let client = ScrapydClient::with_transport(stub);

        assert_eq!(client.projects(&Pattern::any()).await.unwrap(), vec!["demo"]);
        assert_eq!(
            client.schedule("demo", "quotes", &JobArgs::new()).await.unwrap(),
            "abc"
        );
        assert_eq!(client.transport().posts().len(), 1);
    }
}
