//! Unified error types for Prensa-Oxide

use axum::http::StatusCode;
use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Prensa-Oxide
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Browser process or driver could not be started
    #[error("Session start failed: {0}")]
    SessionStart(String),

    /// A readiness condition never became true within its deadline
    #[error("Readiness timeout after {timeout_secs}s waiting for {condition}")]
    ReadinessTimeout {
        condition: String,
        timeout_secs: u64,
    },

    /// Listing scan produced no entry with a valid date and detail link
    #[error("No valid entries found on {0}")]
    NoValidEntries(String),

    /// A held element reference was invalidated by a document mutation
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// Login flow ended in rejection or timed out
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Navigation failed
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Script execution failed
    #[error("Script execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// Timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(msg: S) -> Self {
        Error::WebSocket(msg.into())
    }

    /// Create a new CDP error
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Create a new session start error
    pub fn session_start<S: Into<String>>(msg: S) -> Self {
        Error::SessionStart(msg.into())
    }

    /// Create a new readiness timeout error
    pub fn readiness_timeout<S: Into<String>>(condition: S, timeout_secs: u64) -> Self {
        Error::ReadinessTimeout {
            condition: condition.into(),
            timeout_secs,
        }
    }

    /// Create a new stale element error
    pub fn stale_element<S: Into<String>>(msg: S) -> Self {
        Error::StaleElement(msg.into())
    }

    /// Create a new authentication failed error
    pub fn authentication_failed<S: Into<String>>(msg: S) -> Self {
        Error::AuthenticationFailed(msg.into())
    }

    /// Create a new navigation failed error
    pub fn navigation_failed<S: Into<String>>(msg: S) -> Self {
        Error::NavigationFailed(msg.into())
    }

    /// Create a new script execution failed error
    pub fn script_execution_failed<S: Into<String>>(msg: S) -> Self {
        Error::ScriptExecutionFailed(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether this error indicates a stale element reference
    pub fn is_stale(&self) -> bool {
        matches!(self, Error::StaleElement(_))
    }
}

/// Map errors to HTTP status codes for the API surface
impl From<&Error> for StatusCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::SessionStart(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::NoValidEntries(_) => StatusCode::NOT_FOUND,
            Error::ReadinessTimeout { .. } | Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            Error::Configuration(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
