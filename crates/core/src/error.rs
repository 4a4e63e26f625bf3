use serde_json::Value;
use thiserror::Error;

/// Everything that can go wrong between reading the config and decoding a
/// response. HTTP failures are classified by status code in
/// [`Error::from_response`].
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "API key not configured. Run 'billingo config set apiKey <key>' or set BILLINGO_API_KEY \
         (get a key at https://app.billingo.hu/api-key)"
    )]
    Configuration,

    #[error("Authentication failed (401). Check your API key.")]
    Authentication,

    #[error("Access denied (403). Insufficient permissions.")]
    Authorization,

    #[error("Resource not found (404).")]
    NotFound,

    #[error("Validation error (422): {message}")]
    Validation { message: String },

    #[error("Rate limit exceeded (429). {}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<String> },

    #[error("Server error ({status}). Please try again later.")]
    Server { status: u16 },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("No response from server. Check your connection. ({0})")]
    Transport(String),

    #[error("{0}")]
    Input(String),

    #[error("No data provided. Use --file <path> or --data <json>.")]
    MissingPayload,

    #[error("Request error: {0}")]
    Request(String),

    #[error("Configuration file error: {0}")]
    ConfigFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn retry_hint(retry_after: &Option<String>) -> String {
    match retry_after {
        Some(value) if value.parse::<u64>().is_ok() => format!("Retry after {} seconds.", value),
        Some(value) => format!("Retry after {}.", value),
        None => "Please wait before retrying.".to_string(),
    }
}

impl Error {
    /// Classify a non-2xx response.
    ///
    /// `retry_after` is the raw `Retry-After` header value, `body` the raw
    /// response body. Only 422 and unclassified statuses look at the body.
    pub fn from_response(status: u16, retry_after: Option<&str>, body: &[u8]) -> Self {
        match status {
            401 => Error::Authentication,
            403 => Error::Authorization,
            404 => Error::NotFound,
            422 => Error::Validation {
                message: extract_message(body),
            },
            429 => Error::RateLimited {
                retry_after: retry_after
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            },
            500..=599 => Error::Server { status },
            _ => Error::Api {
                status,
                message: extract_message(body),
            },
        }
    }

    /// HTTP status behind this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication => Some(401),
            Error::Authorization => Some(403),
            Error::NotFound => Some(404),
            Error::Validation { .. } => Some(422),
            Error::RateLimited { .. } => Some(429),
            Error::Server { status } | Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Best-effort server message: `message`, then `error`, then the whole
/// JSON body. Non-JSON bodies are returned as trimmed text.
pub(crate) fn extract_message(body: &[u8]) -> String {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                return "(empty response body)".to_string();
            }
            return text;
        }
    };

    let field = value
        .get("message")
        .filter(|v| !v.is_null())
        .or_else(|| value.get("error").filter(|v| !v.is_null()));

    match field {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => value.to_string(),
    }
}
