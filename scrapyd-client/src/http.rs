//! HTTP transport backed by `reqwest`.
//!
//! Sends every request to `{base_url}/{action}.json` with:
//! - a fixed `User-Agent` header identifying this client
//! - HTTP Basic credentials, when the target has any
//! - an optional per-request timeout (no retries)

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use tokio::time::timeout;
use tracing::{debug, trace};

use scrapyd_domain::{ApiError, ApiResult, Credential, RawResponse};

use crate::ports::{Action, Transport, Upload};

// =============================================================================
// Constants
// =============================================================================

/// Value of the `User-Agent` header sent on every request.
pub const USER_AGENT: &str = concat!("scrapyd-client/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// HTTP Transport
// =============================================================================

/// Transport that talks to a real daemon.
///
/// The underlying connection pool is shared by all requests made through one
/// transport and released when the transport is dropped.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client (connection pool)
    client: Client,
    /// Base URL of the daemon
    base_url: String,
    /// Basic-auth credentials
    credential: Option<Credential>,
    /// Per-request ceiling
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Create a transport for `base_url`.
    ///
    /// # Errors
    /// Returns `ConnectionFailure` if the HTTP client cannot be initialised
    /// (for example when no TLS backend is available).
    pub fn new(
        base_url: impl Into<String>,
        credential: Option<Credential>,
        timeout: Option<Duration>,
    ) -> ApiResult<Self> {
        let base_url = base_url.into();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::connection(&base_url, describe(&e)))?;

        Ok(Self {
            client,
            base_url,
            credential,
            timeout,
        })
    }

    /// Credential attached to requests, if any.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credential {
            Some(credential) => {
                request.basic_auth(&credential.username, Some(credential.password()))
            }
            None => request,
        }
    }

    /// Send a request and read the whole body, under the timeout if any.
    async fn send(&self, action: Action, url: &str, request: RequestBuilder) -> ApiResult<RawResponse> {
        let request = self.authorize(request);
        let exchange = async {
            let response = request.send().await.map_err(|e| ApiError::connection(url, describe(&e)))?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| ApiError::connection(url, describe(&e)))?;
            Ok::<_, ApiError>(RawResponse::new(status, body))
        };

        let raw = match self.timeout {
            Some(limit) => timeout(limit, exchange).await.map_err(|_| {
                ApiError::connection(url, format!("Request timed out after {}s", limit.as_secs_f64()))
            })?,
            None => exchange.await,
        }?;

        trace!(%action, url, status = raw.status, bytes = raw.body.len(), "daemon responded");
        Ok(raw)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, action: Action, query: &[(String, String)]) -> ApiResult<RawResponse> {
        let url = action.url(&self.base_url);
        debug!(%action, url = %url, "GET");

        let request = self.client.get(&url).query(query);
        self.send(action, &url, request).await
    }

    async fn post(&self, action: Action, form: &[(String, String)]) -> ApiResult<RawResponse> {
        let url = action.url(&self.base_url);
        debug!(%action, url = %url, fields = form.len(), "POST");

        let request = self.client.post(&url).form(form);
        self.send(action, &url, request).await
    }

    async fn upload(
        &self,
        action: Action,
        form: &[(String, String)],
        file: Upload,
    ) -> ApiResult<RawResponse> {
        let url = action.url(&self.base_url);
        debug!(%action, url = %url, file = %file.file_name, bytes = file.bytes.len(), "POST multipart");

        let mut body = multipart::Form::new();
        for (key, value) in form {
            body = body.text(key.clone(), value.clone());
        }
        let part = multipart::Part::bytes(file.bytes).file_name(file.file_name);
        body = body.part(file.field, part);

        let request = self.client.post(&url).multipart(body);
        self.send(action, &url, request).await
    }
}

/// Flatten an error and its sources into one line.
///
/// `reqwest` hides the useful part ("Connection refused", DNS failures)
/// in the source chain.
fn describe(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "error sending request")
        }
    }

    impl std::fmt::Display for Inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Connection refused")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    impl StdError for Inner {}

    #[test]
    fn test_describe_includes_sources() {
        assert_eq!(describe(&Outer(Inner)), "error sending request: Connection refused");
    }

    #[test]
    fn test_user_agent_names_client() {
        assert!(USER_AGENT.starts_with("scrapyd-client/"));
    }

    #[test]
    fn test_new_keeps_settings() {
        let transport = HttpTransport::new(
            "http://localhost:6800",
            Some(Credential::new("user", "pass")),
            Some(Duration::from_secs(5)),
        )
        .unwrap();

        assert_eq!(transport.base_url(), "http://localhost:6800");
        assert_eq!(transport.credential().unwrap().username, "user");
        assert_eq!(transport.timeout(), Some(Duration::from_secs(5)));
    }
}
