//! Stub transport for testing.
//!
//! Serves canned responses per action without any network access and
//! records every request it receives.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use scrapyd_domain::{ApiError, ApiResult, RawResponse};

use crate::ports::{Action, Transport, Upload};

/// HTTP method of a recorded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Query-string request
    Get,
    /// Form or multipart request
    Post,
}

/// A request seen by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Method used
    pub method: Method,
    /// Action requested
    pub action: Action,
    /// Query or form pairs, in the order given
    pub params: Vec<(String, String)>,
    /// Name and size of an uploaded file
    pub file: Option<(String, usize)>,
}

/// Stub transport.
///
/// Responses are queued per action. The last queued response for an action
/// is repeated, so one `respond` covers any number of identical calls.
pub struct StubTransport {
    /// Base URL reported to callers and used in errors
    base_url: String,
    /// Queued responses by action
    responses: Mutex<HashMap<Action, VecDeque<ApiResult<RawResponse>>>>,
    /// Every request, in order
    calls: Mutex<Vec<Call>>,
}

impl StubTransport {
    /// Create a stub for `base_url` with nothing queued.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a `200` JSON response.
    pub fn respond(&self, action: Action, body: Value) -> &Self {
        self.respond_raw(action, RawResponse::json(&body))
    }

    /// Queue a raw response.
    pub fn respond_raw(&self, action: Action, raw: RawResponse) -> &Self {
        self.push(action, Ok(raw))
    }

    /// Queue a transport failure.
    pub fn fail(&self, action: Action, error: ApiError) -> &Self {
        self.push(action, Err(error))
    }

    /// All recorded requests.
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Recorded requests for one action.
    pub fn calls_to(&self, action: Action) -> Vec<Call> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.action == action)
            .cloned()
            .collect()
    }

    /// Recorded POST requests.
    pub fn posts(&self) -> Vec<Call> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.method == Method::Post)
            .cloned()
            .collect()
    }

    fn push(&self, action: Action, response: ApiResult<RawResponse>) -> &Self {
        lock(&self.responses).entry(action).or_default().push_back(response);
        self
    }

    fn next(&self, call: Call) -> ApiResult<RawResponse> {
        let action = call.action;
        lock(&self.calls).push(call);

        let mut responses = lock(&self.responses);
        let queue = responses.get_mut(&action);
        match queue {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Err(self.unstubbed(action))),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(self.unstubbed(action))),
            None => Err(self.unstubbed(action)),
        }
    }

    fn unstubbed(&self, action: Action) -> ApiError {
        ApiError::connection(action.url(&self.base_url), "no stubbed response")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Transport for StubTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, action: Action, query: &[(String, String)]) -> ApiResult<RawResponse> {
        self.next(Call {
            method: Method::Get,
            action,
            params: query.to_vec(),
            file: None,
        })
    }

    async fn post(&self, action: Action, form: &[(String, String)]) -> ApiResult<RawResponse> {
        self.next(Call {
            method: Method::Post,
            action,
            params: form.to_vec(),
            file: None,
        })
    }

    async fn upload(
        &self,
        action: Action,
        form: &[(String, String)],
        file: Upload,
    ) -> ApiResult<RawResponse> {
        self.next(Call {
            method: Method::Post,
            action,
            params: form.to_vec(),
            file: Some((file.file_name, file.bytes.len())),
        })
    }
}
