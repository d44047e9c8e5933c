use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;

use crate::{transport::Method, ClientOptions, ProcurosError};

/// Obsolete HTTP-date forms: RFC 850 and asctime. Both are always GMT.
const OBSOLETE_HTTP_DATE_FORMATS: [&str; 2] =
    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"];

/// Exponent cap so `2^n` cannot overflow before the `max_delay` clamp.
const MAX_BACKOFF_EXPONENT: u32 = 30;

/// Retry rules derived from [`ClientOptions`]. Read-only, shared by calls.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    retry_on_post: bool,
}

impl From<&ClientOptions> for RetryPolicy {
    fn from(options: &ClientOptions) -> Self {
        Self {
            max_retries: options.max_retries,
            base_delay_ms: options.base_delay_ms,
            max_delay_ms: options.max_delay_ms,
            retry_on_post: options.retry_on_post,
        }
    }
}

impl RetryPolicy {
    /// Whether 5xx, timeout and network failures may be retried for `method`.
    /// 429 bypasses this check.
    pub(crate) fn method_is_retryable(&self, method: Method) -> bool {
        match method {
            Method::Get | Method::Put => true,
            Method::Post => self.retry_on_post,
            Method::Delete => false,
        }
    }

    /// Jittered exponential delay before retry number `retry_index` (1-based).
    pub(crate) fn backoff_delay(&self, retry_index: u32) -> Duration {
        let factor = rand::thread_rng().gen_range(0.5..=1.0);
        self.backoff_delay_with(retry_index, factor)
    }

    /// `base * 2^(retry_index - 1) * factor`, capped at `max_delay`.
    pub(crate) fn backoff_delay_with(&self, retry_index: u32, factor: f64) -> Duration {
        let exponent = retry_index.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        let base = self.base_delay_ms.saturating_mul(1u64 << exponent) as f64;
        let millis = (base * factor).min(self.max_delay_ms as f64).max(0.0);
        Duration::from_millis(millis as u64)
    }

    /// Caps a server-provided rate-limit hint.
    pub(crate) fn rate_limit_delay(&self, retry_after_ms: u64) -> Duration {
        Duration::from_millis(retry_after_ms.min(self.max_delay_ms))
    }
}

/// Parses a `Retry-After` value into milliseconds from `now`.
///
/// Accepts delay-seconds (`"120"`) or an HTTP-date in any of its three
/// forms (`"Wed, 21 Oct 2015 07:28:00 GMT"`, RFC 850, asctime). Dates in the
/// past yield `0`.
pub(crate) fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(seconds.saturating_mul(1_000));
    }
    let at = parse_http_date(value)?;
    let millis = at.signed_duration_since(now).num_milliseconds();
    Some(millis.max(0) as u64)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc2822(value) {
        return Some(at.with_timezone(&Utc));
    }
    OBSOLETE_HTTP_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Mutable state of one logical call. Created per call, never shared.
#[derive(Debug, Default)]
pub(crate) struct RetryState {
    /// Attempts made so far.
    attempt: u32,
    last_failure: Option<ProcurosError>,
    /// Delay dictated by a `Retry-After` hint; overrides the backoff once.
    forced_delay: Option<Duration>,
}

impl RetryState {
    /// Marks the start of a new attempt and returns its 1-based number.
    pub(crate) fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    pub(crate) fn record(&mut self, failure: ProcurosError, forced_delay: Option<Duration>) {
        self.last_failure = Some(failure);
        self.forced_delay = forced_delay;
    }

    /// `true` while the total attempt count is below `max_retries + 1`.
    pub(crate) fn has_budget(&self, policy: &RetryPolicy) -> bool {
        self.attempt <= policy.max_retries
    }

    /// Delay before the next attempt; consumes any forced delay.
    pub(crate) fn next_delay(&mut self, policy: &RetryPolicy) -> Duration {
        match self.forced_delay.take() {
            Some(delay) => delay,
            None => policy.backoff_delay(self.attempt),
        }
    }

    /// The last observed failure, surfaced once retrying stops.
    pub(crate) fn into_last_failure(self) -> ProcurosError {
        self.last_failure
            .unwrap_or_else(|| ProcurosError::network("request failed before any attempt", None))
    }
}
