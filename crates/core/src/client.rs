//! HTTP client for the Billingo v3 API.
//!
//! Every call resolves the API key from the injected
//! [`ClientConfiguration`] before anything touches the network, sends
//! exactly one request (no retries), and maps failures onto [`Error`].

use crate::config::ClientConfiguration;
use crate::error::{Error, Result};
use crate::query::Query;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Per-call deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Warn when fewer than this many calls remain in the rate-limit window.
pub const RATE_LIMIT_WARNING_THRESHOLD: f64 = 10.0;

const API_KEY_HEADER: &str = "x-api-key";
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Receives advisory, non-fatal warnings produced while talking to the API.
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
}

/// Prints warnings to stderr so they never mix with rendered output.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn warn(&self, message: &str) {
        eprintln!("⚠️  Warning: {}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseKind {
    Json,
    Binary,
}

/// Billingo API client
pub struct BillingoClient {
    http: reqwest::Client,
    config: ClientConfiguration,
    timeout: Duration,
    notifier: Arc<dyn Notifier>,
}

impl BillingoClient {
    /// Create a client for the given configuration.
    ///
    /// A missing API key is not an error here; it is reported by the first
    /// call so commands that never reach the network still work.
    pub fn new(config: ClientConfiguration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("billingo-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Request(e.to_string()))?;

        Ok(Self {
            http,
            config,
            timeout: DEFAULT_TIMEOUT,
            notifier: Arc::new(StderrNotifier),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// GET `path`, returning the decoded JSON body.
    pub async fn get(&self, path: &str, query: &Query) -> Result<Value> {
        let mut request = self.request(Method::GET, path, ResponseKind::Json)?;
        if !query.is_empty() {
            request = request.query(query.pairs());
        }
        let response = self.execute(request).await?;
        read_json(response).await
    }

    /// POST `body` to `path`. A missing body is sent as `{}`.
    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        let empty = Value::Object(serde_json::Map::new());
        let request = self
            .request(Method::POST, path, ResponseKind::Json)?
            .json(body.unwrap_or(&empty));
        let response = self.execute(request).await?;
        read_json(response).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        let request = self
            .request(Method::PUT, path, ResponseKind::Json)?
            .json(body);
        let response = self.execute(request).await?;
        read_json(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        let request = self.request(Method::DELETE, path, ResponseKind::Json)?;
        let response = self.execute(request).await?;
        read_json(response).await
    }

    /// GET `path` and return the raw body bytes, never JSON-decoded.
    pub async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let request = self.request(Method::GET, path, ResponseKind::Binary)?;
        let response = self.execute(request).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build an authenticated request. Fails before any I/O when no API key
    /// is configured.
    fn request(&self, method: Method, path: &str, kind: ResponseKind) -> Result<RequestBuilder> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::Configuration)?;

        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(api_key).map_err(|_| {
            Error::Request("API key contains characters not allowed in an HTTP header".to_string())
        })?;
        key_value.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if kind == ResponseKind::Json {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let url = self.url(path);
        tracing::debug!(%method, %url, "sending request");

        Ok(self
            .http
            .request(method, url)
            .headers(headers)
            .timeout(self.timeout))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "received response");

        if status.is_success() {
            if let Some(message) = rate_limit_warning(response.headers()) {
                self.notifier.warn(&message);
            }
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(transport_error)?;
        let error = Error::from_response(status.as_u16(), retry_after.as_deref(), &body);
        tracing::debug!(error = %error, "request failed");
        Err(error)
    }
}

async fn read_json(response: Response) -> Result<Value> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    Ok(decode_body(&bytes))
}

/// Decode a success body. Empty bodies become `null`; bodies that are not
/// JSON are passed through as a string.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_builder() {
        Error::Request(err.to_string())
    } else if err.is_timeout() {
        Error::Transport(format!("request timed out: {}", err))
    } else {
        Error::Transport(err.to_string())
    }
}

/// Warning text when `x-ratelimit-remaining` is numerically below the
/// threshold.
pub fn rate_limit_warning(headers: &HeaderMap) -> Option<String> {
    let remaining = headers
        .get(RATE_LIMIT_REMAINING_HEADER)?
        .to_str()
        .ok()?
        .trim();
    let count: f64 = remaining.parse().ok()?;
    if count.is_nan() || count >= RATE_LIMIT_WARNING_THRESHOLD {
        return None;
    }

    let limit = headers
        .get(RATE_LIMIT_LIMIT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or("?");
    Some(format!(
        "Only {}/{} API calls remaining in this window",
        remaining, limit
    ))
}
