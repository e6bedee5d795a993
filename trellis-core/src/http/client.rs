//! HTTP client implementation using reqwest's blocking API

use crate::config::{ClientOptions, SafeLogging};
use crate::http::{Endpoint, HttpTransport, ProviderError, StreamBody};
use reqwest::blocking::{Client, ClientBuilder, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;
use std::fmt;
use std::io::BufReader;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Default user agent
const USER_AGENT: &str = concat!("trellis/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking client bound to one provider base URL and credential set
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Build a client from resolved options.
    ///
    /// Fails when no API key is available or a header value is invalid.
    pub fn new(options: &ClientOptions) -> Result<Self, ProviderError> {
        let api_key = options
            .api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ProviderError::Configuration(
                    "The api_key client option must be set either by passing an API key \
                     to the client or by setting the OPENAI_API_KEY environment variable"
                        .to_string(),
                )
            })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| ProviderError::Configuration(format!("Invalid API key: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        if let Some(org) = &options.organization {
            let value = HeaderValue::from_str(org)
                .map_err(|e| ProviderError::Configuration(format!("Invalid organization: {}", e)))?;
            headers.insert("OpenAI-Organization", value);
        }

        let client = ClientBuilder::new()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        debug!("Created HTTP client with {}", options.safe_for_logging());

        Ok(Self {
            client,
            base_url: options.effective_base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Send a request and turn non-success statuses into errors
    fn send(&self, builder: RequestBuilder, endpoint: Endpoint) -> Result<Response, ProviderError> {
        let request_id = Uuid::new_v4();
        info!(
            "Executing HTTP request to {} [request_id: {}]",
            endpoint.path(),
            request_id
        );

        let response = builder
            .header("X-Request-ID", request_id.to_string())
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Request timeout [request_id: {}]", request_id);
                } else {
                    error!("Request error [request_id: {}]: {}", request_id, e);
                }
                ProviderError::from(e)
            })?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        if !status.is_success() {
            warn!(
                "Request failed with status {} [request_id: {}]",
                status, request_id
            );
            return Err(status_error(status.as_u16(), response.text()));
        }

        Ok(response)
    }

    fn read_json(response: Response) -> Result<Value, ProviderError> {
        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
            message: format!("Invalid JSON response: {}", e),
            body,
        })
    }
}

/// Error for a non-success response whose body may have failed to arrive
fn status_error<E: fmt::Display>(status: u16, body: Result<String, E>) -> ProviderError {
    match body {
        Ok(body) => ProviderError::Status { status, body },
        Err(e) => {
            warn!("Failed to read body of HTTP {} response: {}", status, e);
            ProviderError::Connection(format!(
                "HTTP {} response body could not be read: {}",
                status, e
            ))
        }
    }
}

impl HttpTransport for HttpClient {
    fn get_json(&self, endpoint: Endpoint) -> Result<Value, ProviderError> {
        let url = self.url(endpoint);
        debug!("GET {}", url);
        let response = self.send(self.client.get(&url), endpoint)?;
        Self::read_json(response)
    }

    fn post_json(&self, endpoint: Endpoint, body: &Value) -> Result<Value, ProviderError> {
        let url = self.url(endpoint);
        debug!("POST {}", url);
        let response = self.send(self.client.post(&url).json(body), endpoint)?;
        Self::read_json(response)
    }

    fn post_stream(&self, endpoint: Endpoint, body: &Value) -> Result<StreamBody, ProviderError> {
        let url = self.url(endpoint);
        debug!("POST {} (stream)", url);
        let builder = self
            .client
            .post(&url)
            .header(ACCEPT, "text/event-stream")
            .json(body);
        let response = self.send(builder, endpoint)?;
        Ok(Box::new(BufReader::new(response)))
    }
}
