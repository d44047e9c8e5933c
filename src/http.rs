use std::{fmt, sync::Arc};

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    decode::{classify_failure, decode_json},
    retry::{RetryPolicy, RetryState},
    signal::{pause, AbortReason, AbortSignal},
    transport::{HttpRequest, HttpResponse, Method, Transport},
    ClientOptions, ProcurosError, RequestOptions, Result,
};

const USER_AGENT: &str = concat!("procuros-http-rust/", env!("CARGO_PKG_VERSION"));

/// One logical call: method, path, query, optional JSON body and an optional
/// caller cancellation token.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, Option<String>)>,
    body: Option<JsonValue>,
    cancel: Option<CancellationToken>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            cancel: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Adds a query parameter; `None` values are omitted from the URL.
    pub fn query<V: Into<String>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query.push((key.into(), value.map(Into::into)));
        self
    }

    /// Sets a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|err| {
            ProcurosError::InvalidArgument(format!("request body is not serializable: {err}"))
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Applies per-call options.
    pub fn options(mut self, options: &RequestOptions) -> Self {
        if let Some(token) = &options.cancel {
            self.cancel = Some(token.clone());
        }
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Immutable configuration resolved once at construction.
pub(crate) struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) authorization: HeaderValue,
    pub(crate) options: ClientOptions,
    pub(crate) transport: Arc<dyn Transport>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("authorization", &"<redacted>")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Executes logical calls: timeout, cancellation, retry and classification.
///
/// Stateless apart from its configuration; cheap to clone and safe to share
/// across concurrent calls.
#[derive(Clone, Debug)]
pub(crate) struct HttpCore {
    config: Arc<ClientConfig>,
    policy: RetryPolicy,
}

impl HttpCore {
    pub(crate) fn new(config: ClientConfig) -> Self {
        let policy = RetryPolicy::from(&config.options);
        Self {
            config: Arc::new(config),
            policy,
        }
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs the call and parses the 2xx body as JSON.
    pub(crate) async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.dispatch(&request).await?;
        decode_json(&response, request.method, &request.path)
    }

    /// Performs the call; any 2xx is success and the body is ignored.
    pub(crate) async fn execute_no_body(&self, request: ApiRequest) -> Result<()> {
        self.dispatch(&request).await.map(|_| ())
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<HttpResponse> {
        let prepared = HttpRequest {
            method: request.method,
            url: build_url(&self.config.base_url, &request.path, &request.query)?,
            headers: self.headers(request.body.is_some()),
            body: request
                .body
                .as_ref()
                .map(serde_json::to_vec)
                .transpose()
                .map_err(|err| {
                    ProcurosError::InvalidArgument(format!("failed to encode request body: {err}"))
                })?,
        };

        let method = request.method;
        let path = request.path.as_str();
        let cancel = request.cancel.as_ref();
        let timeout = self.config.options.timeout();
        let method_retryable = self.policy.method_is_retryable(method);
        let mut state = RetryState::default();

        loop {
            let attempt = state.begin_attempt();

            #[cfg(feature = "tracing")]
            tracing::debug!(%method, path, attempt, "sending request");

            let mut signal = AbortSignal::new(timeout, cancel);
            let outcome = signal
                .guard(self.config.transport.send(prepared.clone()))
                .await;
            drop(signal);

            let (failure, retryable, forced_delay) = match outcome {
                Ok(Ok(response)) if response.is_success() => return Ok(response),
                Ok(Ok(response)) => {
                    let failure = classify_failure(&response, method, path);
                    let rate_limit_hint = match &failure {
                        ProcurosError::RateLimit(limited) => Some(limited.retry_after_ms),
                        _ => None,
                    };
                    match rate_limit_hint {
                        // 429 is retried for every method.
                        Some(hint) => {
                            let forced = hint.map(|ms| self.policy.rate_limit_delay(ms));
                            (failure, true, forced)
                        }
                        None if response.status >= 500 => (failure, method_retryable, None),
                        None => return Err(failure),
                    }
                }
                Ok(Err(err)) => {
                    let message = err.message().to_owned();
                    (ProcurosError::network(message, Some(err)), method_retryable, None)
                }
                Err(AbortReason::Cancelled) => return Err(ProcurosError::cancelled()),
                Err(AbortReason::Deadline) => (
                    ProcurosError::Timeout {
                        timeout_ms: self.config.options.timeout_ms,
                    },
                    method_retryable,
                    None,
                ),
            };

            state.record(failure, forced_delay);
            if !retryable {
                return Err(state.into_last_failure());
            }
            if !state.has_budget(&self.policy) {
                #[cfg(feature = "tracing")]
                tracing::warn!(%method, path, attempts = attempt, "retries exhausted");
                return Err(state.into_last_failure());
            }

            let delay = state.next_delay(&self.policy);

            #[cfg(feature = "tracing")]
            tracing::debug!(
                %method,
                path,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            );

            #[cfg(not(feature = "tracing"))]
            let _ = attempt;

            if pause(delay, cancel).await.is_err() {
                return Err(ProcurosError::cancelled());
            }
        }
    }

    fn headers(&self, has_body: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, self.config.authorization.clone());
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        if has_body {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        headers
    }
}

/// Builds the bearer header once; marked sensitive so it is hidden in `Debug`.
pub(crate) fn bearer_header(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        ProcurosError::Config("api token contains characters not allowed in a header".to_owned())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Joins `path` onto `base` and appends the defined query parameters.
pub(crate) fn build_url(
    base: &Url,
    path: &str,
    query: &[(String, Option<String>)],
) -> Result<Url> {
    let mut url = base
        .join(path)
        .map_err(|err| ProcurosError::InvalidArgument(format!("invalid request path '{path}': {err}")))?;

    let mut defined = query
        .iter()
        .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
        .peekable();
    if defined.peek().is_some() {
        url.query_pairs_mut().extend_pairs(defined);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.example.test").unwrap()
    }

    #[test]
    fn undefined_query_values_are_omitted() {
        let query = vec![
            ("filter[type]".to_owned(), Some("INVOICE".to_owned())),
            ("cursor".to_owned(), None),
            ("per_page".to_owned(), Some("50".to_owned())),
        ];
        let url = build_url(&base(), "/v2/transactions", &query).unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("filter[type]".to_owned(), "INVOICE".to_owned()),
                ("per_page".to_owned(), "50".to_owned()),
            ]
        );
        assert_eq!(url.path(), "/v2/transactions");
    }

    #[test]
    fn no_query_string_when_nothing_is_defined() {
        let query = vec![("cursor".to_owned(), None)];
        let url = build_url(&base(), "/v2/ping", &query).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/v2/ping");
    }

    #[test]
    fn query_values_are_url_encoded() {
        let query = vec![("cursor".to_owned(), Some("a b&c=d".to_owned()))];
        let url = build_url(&base(), "/v2/transactions", &query).unwrap();
        assert_eq!(url.query(), Some("cursor=a+b%26c%3Dd"));
    }

    #[test]
    fn bearer_header_is_sensitive() {
        let value = bearer_header("secret-token").unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer secret-token");
        assert!(bearer_header("bad\ntoken").is_err());
    }

    #[test]
    fn request_builder_collects_parts() {
        let token = CancellationToken::new();
        let request = ApiRequest::post("/v2/errors")
            .json(&serde_json::json!({"errorReason": "x"}))
            .unwrap()
            .options(&RequestOptions::new().with_cancellation(token));

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.path(), "/v2/errors");
        assert!(request.body.is_some());
        assert!(request.cancel.is_some());
    }
}
