use std::{fmt, sync::Arc};

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    http::{bearer_header, ApiRequest, ClientConfig, HttpCore},
    resources::{AllTransactions, IncomingTransactions, OutgoingTransactions},
    transport::{ReqwestTransport, Transport},
    ClientOptions, Environment, ProcurosError, RequestOptions, Result,
};

/// Async client for the Procuros API.
///
/// Cloning is cheap; clones share configuration and the connection pool.
/// Concurrent calls are independent of each other.
#[derive(Clone)]
pub struct ProcurosClient {
    http: HttpCore,
}

impl fmt::Debug for ProcurosClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.http.config();
        f.debug_struct("ProcurosClient")
            .field("base_url", &config.base_url.as_str())
            .field("token", &"<redacted>")
            .field("options", &config.options)
            .finish()
    }
}

impl ProcurosClient {
    /// Creates a production client with default options.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::builder(api_token).build()
    }

    pub fn builder(api_token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_token)
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `PROCUROS_API_TOKEN` (required)
    /// - `PROCUROS_ENVIRONMENT`: `production` (default) or `staging`
    /// - `PROCUROS_BASE_URL`: overrides the environment's URL
    ///
    /// # Example
    ///
    /// ```no_run
    /// use procuros_http::ProcurosClient;
    ///
    /// let client = ProcurosClient::from_env().expect("missing PROCUROS_API_TOKEN");
    /// ```
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("PROCUROS_API_TOKEN").map_err(|_| {
            ProcurosError::Config("missing PROCUROS_API_TOKEN environment variable".to_owned())
        })?;
        let mut builder = Self::builder(token);

        if let Ok(environment) = std::env::var("PROCUROS_ENVIRONMENT") {
            builder = builder.environment(environment.parse()?);
        }
        if let Ok(base_url) = std::env::var("PROCUROS_BASE_URL") {
            if !base_url.trim().is_empty() {
                builder = builder.base_url(base_url);
            }
        }
        builder.build()
    }

    /// Transactions received from trade partners.
    pub fn incoming(&self) -> IncomingTransactions<'_> {
        IncomingTransactions::new(&self.http)
    }

    /// Transactions sent to trade partners.
    pub fn outgoing(&self) -> OutgoingTransactions<'_> {
        OutgoingTransactions::new(&self.http)
    }

    /// All transactions regardless of direction.
    pub fn transactions(&self) -> AllTransactions<'_> {
        AllTransactions::new(&self.http)
    }

    /// Checks connectivity and credentials. Succeeds on any 2xx.
    pub async fn ping(&self, request_options: &RequestOptions) -> Result<()> {
        let request = ApiRequest::get("/v2/ping").options(request_options);
        self.http.execute_no_body(request).await
    }

    /// Sends an arbitrary request and parses the JSON response.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.http.execute(request).await
    }

    /// Sends an arbitrary request; the response body is ignored.
    pub async fn execute_no_body(&self, request: ApiRequest) -> Result<()> {
        self.http.execute_no_body(request).await
    }
}

/// Builder for [`ProcurosClient`]. All inputs are checked in [`build`](Self::build).
pub struct ClientBuilder {
    api_token: String,
    environment: Environment,
    base_url: Option<String>,
    options: ClientOptions,
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_token", &"<redacted>")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl ClientBuilder {
    /// The token is sent verbatim; [`build`](Self::build) rejects blank tokens
    /// and tokens with surrounding whitespace.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            environment: Environment::default(),
            base_url: None,
            options: ClientOptions::default(),
            transport: None,
        }
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Overrides the environment's base URL (e.g. a proxy or mock server).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Applies timeout and retry options.
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the default reqwest transport.
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<ProcurosClient> {
        let token = self.api_token.as_str();
        if token.trim().is_empty() {
            return Err(ProcurosError::Config("api token is required".to_owned()));
        }
        if token.trim() != token {
            return Err(ProcurosError::Config(
                "api token must not have leading or trailing whitespace".to_owned(),
            ));
        }
        let authorization = bearer_header(token)?;
        self.options.validate()?;

        let raw_url = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url());
        let base_url = parse_base_url(raw_url)?;

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::default()));

        Ok(ProcurosClient {
            http: HttpCore::new(ClientConfig {
                base_url,
                authorization,
                options: self.options,
                transport,
            }),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|err| ProcurosError::Config(format!("invalid base URL '{raw}': {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ProcurosError::Config(format!(
            "base URL must be an absolute http(s) URL, got '{raw}'"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_rejected() {
        let err = ProcurosClient::new("   ").expect_err("blank token must fail");
        assert!(matches!(err, ProcurosError::Config(_)));
    }

    #[test]
    fn token_with_surrounding_whitespace_is_rejected() {
        for token in [" secret-token", "secret-token\n", "\tsecret-token "] {
            let err = ProcurosClient::new(token).expect_err("padded token must fail");
            assert!(matches!(err, ProcurosError::Config(_)), "{token:?}");
            assert!(!err.to_string().contains("secret-token"));
        }
    }

    #[test]
    fn environment_selects_base_url() {
        let client = ProcurosClient::builder("token")
            .environment(Environment::Staging)
            .build()
            .unwrap();
        assert_eq!(
            client.http.config().base_url.as_str(),
            "https://api.procuros-staging.io/"
        );
    }

    #[test]
    fn base_url_override_wins() {
        let client = ProcurosClient::builder("token")
            .environment(Environment::Staging)
            .base_url("http://127.0.0.1:8080")
            .build()
            .unwrap();
        assert_eq!(client.http.config().base_url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        for raw in ["not a url", "ftp://example.com", "mailto:ops@example.com"] {
            let err = ProcurosClient::builder("token").base_url(raw).build().unwrap_err();
            assert!(matches!(err, ProcurosError::Config(_)), "{raw}");
        }
    }

    #[test]
    fn options_are_validated_at_build() {
        let err = ProcurosClient::builder("token")
            .options(ClientOptions {
                timeout_ms: 0,
                ..ClientOptions::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ProcurosError::Config(_)));
    }

    #[test]
    fn debug_redacts_token() {
        let client = ProcurosClient::new("secret-token").unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));

        let builder = ProcurosClient::builder("secret-token");
        assert!(!format!("{builder:?}").contains("secret-token"));
    }
}
