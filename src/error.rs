use thiserror::Error;

/// Errors surfaced by the fetch-orchestration layer.
///
/// The type is `Clone` so a single upstream failure can be handed to every
/// caller that was waiting on the same in-flight request. Library errors
/// (`reqwest`, `serde_json`, `std::io`, `toml`) are therefore captured as
/// owned messages rather than wrapped.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    // Transport failures
    #[error("Network timeout while fetching data from: {url}")]
    NetworkTimeout { url: String },

    #[error("Connection failed to: {url} - {message}")]
    NetworkConnection { url: String, message: String },

    #[error("Failed to fetch data from {url}: {message}")]
    Transport { url: String, message: String },

    // Non-success HTTP responses
    #[error("Upstream returned HTTP {status}: {body} (URL: {url})")]
    UpstreamStatus {
        status: u16,
        body: String,
        url: String,
    },

    // Payload parsing
    #[error("API returned malformed JSON: {message} (URL: {url})")]
    ApiMalformedJson { message: String, url: String },

    #[error("API returned unexpected data structure: {message} (URL: {url})")]
    ApiUnexpectedStructure { message: String, url: String },

    #[error("API returned empty or missing data: {message} (URL: {url})")]
    ApiNoData { message: String, url: String },

    // Caller input
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(String),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Log setup error: {0}")]
    LogSetup(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(e: toml::ser::Error) -> Self {
        Self::TomlSerialize(e.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        Self::TomlDeserialize(e.to_string())
    }
}

impl AppError {
    /// Create a configuration error with context
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a log setup error with context
    pub fn log_setup_error(msg: impl Into<String>) -> Self {
        Self::LogSetup(msg.into())
    }

    /// Create a validation error for bad caller input
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a network timeout error
    pub fn network_timeout(url: impl Into<String>) -> Self {
        Self::NetworkTimeout { url: url.into() }
    }

    /// Create a network connection error
    pub fn network_connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkConnection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a generic transport error
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Classifies a reqwest error into one of the transport variants.
    pub fn from_reqwest(url: &str, e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::network_timeout(url)
        } else if e.is_connect() {
            Self::network_connection(url, e.to_string())
        } else {
            Self::transport(url, e.to_string())
        }
    }

    /// Create an upstream status error carrying the response body
    pub fn upstream_status(status: u16, body: impl Into<String>, url: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            status,
            body: body.into(),
            url: url.into(),
        }
    }

    /// Create a malformed JSON error
    pub fn api_malformed_json(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiMalformedJson {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an unexpected data structure error
    pub fn api_unexpected_structure(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiUnexpectedStructure {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a no data error
    pub fn api_no_data(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiNoData {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a task failure error (panicked or aborted background fetch)
    pub fn task_failed(msg: impl Into<String>) -> Self {
        Self::TaskFailed(msg.into())
    }

    /// HTTP status of an upstream failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for network-level failures where no response was received
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::NetworkTimeout { .. }
                | AppError::NetworkConnection { .. }
                | AppError::Transport { .. }
        )
    }

    /// True for payloads that could not be decoded
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            AppError::ApiMalformedJson { .. }
                | AppError::ApiUnexpectedStructure { .. }
                | AppError::ApiNoData { .. }
        )
    }

    /// True for 4xx upstream responses
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// Check if error is worth retrying on a later cycle (network issues, server errors, rate limits).
    /// Nothing in this crate retries internally; the refresh cadence and user actions do.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
            other => other.is_transport(),
        }
    }
}
