use std::{str::FromStr, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::ProcurosError;

pub(crate) const PRODUCTION_URL: &str = "https://api.procuros.io";
pub(crate) const STAGING_URL: &str = "https://api.procuros-staging.io";

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds. Resets on every retry.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base backoff in milliseconds (exponential with jitter).
    pub base_delay_ms: u64,
    /// Upper bound for any single backoff, including `Retry-After` hints.
    pub max_delay_ms: u64,
    /// Allow POST requests to be retried on 5xx, timeouts and network errors.
    /// 429 responses are retried regardless.
    pub retry_on_post: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            retry_on_post: false,
        }
    }
}

impl ClientOptions {
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ProcurosError> {
        if self.timeout_ms == 0 {
            return Err(ProcurosError::Config(
                "timeout_ms must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Hosted API environment.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Environment {
    #[default]
    Production,
    Staging,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_URL,
            Self::Staging => STAGING_URL,
        }
    }
}

impl FromStr for Environment {
    type Err = ProcurosError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            other => Err(ProcurosError::Config(format!(
                "unknown environment '{other}', expected 'production' or 'staging'"
            ))),
        }
    }
}

/// Per-call options accepted by every API method.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// Cancels this logical call only, including any pending backoff.
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = ClientOptions::default();
        assert_eq!(opts.timeout_ms, 30_000);
        assert_eq!(opts.max_retries, 2);
        assert_eq!(opts.base_delay_ms, 500);
        assert_eq!(opts.max_delay_ms, 10_000);
        assert!(!opts.retry_on_post);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let opts = ClientOptions {
            timeout_ms: 0,
            ..ClientOptions::default()
        };
        assert!(matches!(opts.validate(), Err(ProcurosError::Config(_))));
    }

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("Staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!(
            "production".parse::<Environment>().unwrap().base_url(),
            PRODUCTION_URL
        );
        assert!("qa".parse::<Environment>().is_err());
    }
}
