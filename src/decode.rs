use std::collections::BTreeMap;

use chrono::Utc;
use reqwest::header::RETRY_AFTER;
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::{ApiError, RateLimitError, ResponseBody, ValidationError},
    retry::parse_retry_after,
    transport::{HttpResponse, Method},
    ProcurosError,
};

/// Shape of a 422 body: `{"message": ..., "errors": {field: [msg]}, "errorUrl": ...}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationBody {
    #[serde(default)]
    message: Option<String>,
    errors: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    error_url: Option<String>,
}

/// Parses a 2xx body as JSON. A body that is not JSON, or not the expected
/// shape, is an [`ProcurosError::Api`] carrying the raw text.
pub(crate) fn decode_json<T: DeserializeOwned>(
    response: &HttpResponse,
    method: Method,
    path: &str,
) -> Result<T, ProcurosError> {
    serde_json::from_str(&response.body).map_err(|err| {
        ProcurosError::Api(ApiError {
            status: response.status,
            method,
            path: path.to_owned(),
            message: format!("failed to decode response body: {err}"),
            body: ResponseBody::Text(response.body.clone()),
        })
    })
}

/// Turns a non-2xx response into the matching failure kind.
pub(crate) fn classify_failure(response: &HttpResponse, method: Method, path: &str) -> ProcurosError {
    let body = ResponseBody::parse(&response.body);

    match response.status {
        422 => match validation_body(&body) {
            Some(validation) => {
                let message = validation
                    .message
                    .unwrap_or_else(|| "validation failed".to_owned());
                ProcurosError::Validation(ValidationError {
                    api: ApiError {
                        status: 422,
                        method,
                        path: path.to_owned(),
                        message,
                        body,
                    },
                    field_errors: validation.errors,
                    error_url: validation.error_url,
                })
            }
            None => api_error(response.status, method, path, body),
        },
        429 => {
            let retry_after_ms = response
                .header(RETRY_AFTER)
                .and_then(|value| parse_retry_after(value, Utc::now()));
            let message = body
                .message()
                .unwrap_or_else(|| "rate limit exceeded".to_owned());
            ProcurosError::RateLimit(RateLimitError {
                api: ApiError {
                    status: 429,
                    method,
                    path: path.to_owned(),
                    message,
                    body,
                },
                retry_after_ms,
            })
        }
        status => api_error(status, method, path, body),
    }
}

fn validation_body(body: &ResponseBody) -> Option<ValidationBody> {
    let value = body.as_json()?;
    if !value.is_object() {
        return None;
    }
    ValidationBody::deserialize(value).ok()
}

fn api_error(status: u16, method: Method, path: &str, body: ResponseBody) -> ProcurosError {
    let message = body
        .message()
        .unwrap_or_else(|| format!("API error: {status}"));
    ProcurosError::Api(ApiError {
        status,
        method,
        path: path.to_owned(),
        message,
        body,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value as JsonValue};

    use super::*;

    #[test]
    fn validation_body_yields_field_errors() {
        let response = HttpResponse::new(
            422,
            r#"{"message":"The given data was invalid.","errors":{"field":["msg"]}}"#,
        );

        match classify_failure(&response, Method::Post, "/v2/transactions") {
            ProcurosError::Validation(err) => {
                assert_eq!(err.field_errors.get("field"), Some(&vec!["msg".to_owned()]));
                assert_eq!(err.api.message, "The given data was invalid.");
                assert_eq!(err.error_url, None);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validation_error_url_is_kept() {
        let response = HttpResponse::new(
            422,
            json!({
                "message": "invalid",
                "errors": {"type": ["Transaction type is not valid"]},
                "errorUrl": "https://portal.example/errors/abc"
            })
            .to_string(),
        );

        match classify_failure(&response, Method::Post, "/v2/transactions") {
            ProcurosError::Validation(err) => {
                assert_eq!(err.error_url.as_deref(), Some("https://portal.example/errors/abc"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unrecognised_422_is_plain_api_error() {
        let response = HttpResponse::new(422, r#"{"message":"unprocessable"}"#);
        let err = classify_failure(&response, Method::Put, "/v2/transactions/x");
        assert!(matches!(err, ProcurosError::Api(ApiError { status: 422, .. })));
    }

    #[test]
    fn rate_limit_reads_retry_after() {
        let response = HttpResponse::new(429, "").with_header("Retry-After", "2");
        match classify_failure(&response, Method::Get, "/v2/ping") {
            ProcurosError::RateLimit(err) => {
                assert_eq!(err.retry_after_ms, Some(2_000));
                assert_eq!(err.api.message, "rate limit exceeded");
            }
            other => panic!("expected rate-limit error, got {other:?}"),
        }
    }

    #[test]
    fn generic_error_keeps_raw_text_body() {
        let response = HttpResponse::new(502, "Bad Gateway");
        match classify_failure(&response, Method::Get, "/v2/transactions") {
            ProcurosError::Api(err) => {
                assert_eq!(err.status, 502);
                assert_eq!(err.method, Method::Get);
                assert_eq!(err.path, "/v2/transactions");
                assert_eq!(err.message, "API error: 502");
                assert_eq!(err.body, ResponseBody::Text("Bad Gateway".to_owned()));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn non_json_success_body_is_api_error() {
        let response = HttpResponse::new(200, "<html>ok</html>");
        let err = decode_json::<JsonValue>(&response, Method::Get, "/v2/ping").unwrap_err();
        match err {
            ProcurosError::Api(api) => {
                assert_eq!(api.status, 200);
                assert_eq!(api.body, ResponseBody::Text("<html>ok</html>".to_owned()));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
