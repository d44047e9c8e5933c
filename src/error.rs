use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};

use crate::transport::{Method, TransportError};

/// Error type returned by this crate.
///
/// The variants form a closed set; callers can match on the kind and, for
/// HTTP-level failures, on [`ProcurosError::status`].
#[derive(Debug, thiserror::Error)]
pub enum ProcurosError {
    /// Invalid client construction input (missing token, bad base URL, ...).
    #[error("configuration error: {0}")]
    Config(String),
    /// Client-side argument check failed before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Non-success HTTP response not covered by a more specific variant.
    #[error("api error {}: {}", .0.status, .0.message)]
    Api(ApiError),
    /// 422 response carrying per-field validation messages.
    #[error("validation error: {}", .0.api.message)]
    Validation(ValidationError),
    /// 429 response.
    #[error("rate limited: {}", .0.api.message)]
    RateLimit(RateLimitError),
    /// The per-attempt deadline elapsed before a response arrived.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    /// Transport-level failure, or the caller cancelled the request.
    #[error("network error: {message}")]
    Network {
        message: String,
        /// `true` when the caller's cancellation token fired.
        cancelled: bool,
        #[source]
        source: Option<TransportError>,
    },
}

/// Body of an error response: parsed JSON when possible, raw text otherwise.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(JsonValue),
    Text(String),
}

impl ResponseBody {
    /// Parses `text` as JSON, falling back to the raw text.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text.to_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Returns the `message` member of a JSON object body.
    pub fn message(&self) -> Option<String> {
        match self.as_json()?.get("message")? {
            JsonValue::String(message) => Some(message.clone()),
            JsonValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Context shared by every HTTP-level failure.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub method: Method,
    pub path: String,
    pub message: String,
    pub body: ResponseBody,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidationError {
    pub api: ApiError,
    /// Field path to messages, e.g. `"content.header.buyer" => ["Required"]`.
    pub field_errors: BTreeMap<String, Vec<String>>,
    /// Remediation link supplied by the service, if any.
    pub error_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RateLimitError {
    pub api: ApiError,
    /// Server hint from `Retry-After`, converted to milliseconds.
    pub retry_after_ms: Option<u64>,
}

impl ProcurosError {
    pub(crate) fn network(message: impl Into<String>, source: Option<TransportError>) -> Self {
        Self::Network {
            message: message.into(),
            cancelled: false,
            source,
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::Network {
            message: "request was cancelled".to_owned(),
            cancelled: true,
            source: None,
        }
    }

    /// HTTP status for API, validation and rate-limit failures.
    pub fn status(&self) -> Option<u16> {
        self.api().map(|api| api.status)
    }

    /// Shared HTTP context for API, validation and rate-limit failures.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(api) => Some(api),
            Self::Validation(err) => Some(&err.api),
            Self::RateLimit(err) => Some(&err.api),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// `true` only when the caller's cancellation token aborted the call.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Network { cancelled: true, .. })
    }

    /// Whether this failure kind is transient (timeout, network, 5xx, 429).
    ///
    /// Caller cancellation is never transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::RateLimit(_) => true,
            Self::Network { cancelled, .. } => !cancelled,
            Self::Api(api) => api.status >= 500,
            _ => false,
        }
    }

    /// Stable name of the failure kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::InvalidArgument(_) => "InvalidArgumentError",
            Self::Api(_) => "ApiError",
            Self::Validation(_) => "ValidationError",
            Self::RateLimit(_) => "RateLimitError",
            Self::Timeout { .. } => "TimeoutError",
            Self::Network { .. } => "NetworkError",
        }
    }

    /// Serialized representation suitable for logs and error reports.
    ///
    /// Built only from the error's own fields; credentials are never part of
    /// an error value.
    pub fn to_json(&self) -> JsonValue {
        let mut out = Map::new();
        out.insert("name".to_owned(), json!(self.kind_name()));
        match self {
            Self::Api(api) => {
                insert_api(&mut out, api);
            }
            Self::Validation(err) => {
                insert_api(&mut out, &err.api);
                out.insert("fieldErrors".to_owned(), json!(err.field_errors));
                if let Some(url) = &err.error_url {
                    out.insert("errorUrl".to_owned(), json!(url));
                }
            }
            Self::RateLimit(err) => {
                insert_api(&mut out, &err.api);
                if let Some(ms) = err.retry_after_ms {
                    out.insert("retryAfterMs".to_owned(), json!(ms));
                }
            }
            Self::Timeout { timeout_ms } => {
                out.insert("message".to_owned(), json!(self.to_string()));
                out.insert("timeoutMs".to_owned(), json!(timeout_ms));
            }
            Self::Network {
                message, cancelled, ..
            } => {
                out.insert("message".to_owned(), json!(message));
                out.insert("cancelled".to_owned(), json!(cancelled));
            }
            Self::Config(message) | Self::InvalidArgument(message) => {
                out.insert("message".to_owned(), json!(message));
            }
        }
        JsonValue::Object(out)
    }
}

fn insert_api(out: &mut Map<String, JsonValue>, api: &ApiError) {
    out.insert("message".to_owned(), json!(api.message));
    out.insert("status".to_owned(), json!(api.status));
    out.insert("method".to_owned(), json!(api.method.as_str()));
    out.insert("path".to_owned(), json!(api.path));
    out.insert("body".to_owned(), json!(api.body));
}
