//! Response envelopes and their classification.
//!
//! Every daemon endpoint answers with a JSON object tagged by a `status`
//! field. The body is classified exactly once, at the boundary, into a
//! closed [`Classified`] union; code downstream only sees an [`Envelope`]
//! (a successful response) or an [`ApiError`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{preview, ApiError, ApiResult};

/// Raw HTTP response as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, undecoded
    pub body: String,
}

impl RawResponse {
    /// Create a raw response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Create a `200 OK` response carrying a JSON value.
    pub fn json(value: &Value) -> Self {
        Self::new(200, value.to_string())
    }
}

/// A successful (`status: "ok"`) response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    /// Envelope with only `status: "ok"`.
    pub fn ok() -> Self {
        let mut fields = Map::new();
        fields.insert("status".to_string(), Value::String("ok".to_string()));
        Self(fields)
    }

    /// Look up a single field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Convert into a plain JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Required string field.
    pub fn string(&self, field: &str) -> ApiResult<String> {
        match self.0.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.malformed(format!("field '{}' is not a string", field))),
            None => Err(self.malformed(format!("missing field '{}'", field))),
        }
    }

    /// Required array-of-strings field.
    pub fn string_list(&self, field: &str) -> ApiResult<Vec<String>> {
        let items = self.array(field)?;

        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(self.malformed(format!("field '{}' must contain only strings", field))),
            })
            .collect()
    }

    /// Job identifiers listed under `field`.
    ///
    /// Entries are either bare ids or job objects with an `id` member.
    pub fn job_ids(&self, field: &str) -> ApiResult<Vec<String>> {
        let items = self.array(field)?;

        items
            .iter()
            .map(|item| match item {
                Value::String(id) => Ok(id.clone()),
                Value::Object(job) => match job.get("id") {
                    Some(Value::String(id)) => Ok(id.clone()),
                    _ => Err(self.malformed(format!("job in '{}' has no string id", field))),
                },
                _ => Err(self.malformed(format!("unexpected job entry in '{}'", field))),
            })
            .collect()
    }

    fn array(&self, field: &str) -> ApiResult<&Vec<Value>> {
        match self.0.get(field) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(self.malformed(format!("field '{}' is not an array", field))),
            None => Err(self.malformed(format!("missing field '{}'", field))),
        }
    }

    fn malformed(&self, reason: String) -> ApiError {
        ApiError::malformed(reason, &Value::Object(self.0.clone()).to_string())
    }
}

/// Outcome of inspecting a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// `status: "ok"`
    Ok(Envelope),
    /// `status: "error"` with its message
    Error(String),
    /// Body is not a well-formed envelope
    Malformed {
        /// What was wrong
        reason: String,
        /// Bounded preview of the body
        preview: String,
    },
    /// Any other status value
    Unhandled(String),
}

impl Classified {
    /// Turn the classification into the error taxonomy.
    pub fn into_result(self) -> ApiResult<Envelope> {
        match self {
            Classified::Ok(envelope) => Ok(envelope),
            Classified::Error(message) => Err(ApiError::DomainError(message)),
            Classified::Malformed { reason, preview } => {
                Err(ApiError::MalformedResponse { reason, preview })
            }
            Classified::Unhandled(status) => Err(ApiError::UnhandledStatus(status)),
        }
    }
}

/// Classify a response body.
pub fn classify(body: &str) -> Classified {
    let malformed = |reason: &str| Classified::Malformed {
        reason: reason.to_string(),
        preview: preview(body),
    };

    let fields = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => return malformed("body is not a JSON object"),
        Err(_) => return malformed("body is not valid JSON"),
    };

    let status = match fields.get("status") {
        Some(Value::String(status)) => status.clone(),
        Some(_) => return malformed("'status' is not a string"),
        None => return malformed("missing 'status' field"),
    };

    match status.as_str() {
        "ok" => Classified::Ok(Envelope(fields)),
        "error" => match fields.get("message") {
            Some(Value::String(message)) => Classified::Error(message.clone()),
            _ => malformed("error response without a message"),
        },
        _ => Classified::Unhandled(status),
    }
}

/// Process a raw response into an envelope or an error.
///
/// The HTTP status code is not consulted: the daemon reports failures in the
/// body, and non-JSON error pages are caught as malformed.
pub fn process(raw: &RawResponse) -> ApiResult<Envelope> {
    classify(&raw.body).into_result()
}
