//! Error types for the remote backend.

use thiserror::Error;

use super::RemoteOutcome;

/// Errors that can occur while talking to the remote backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport error (connect, DNS, TLS, body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the backend
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend is unreachable (used by fakes and for simulated outages)
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// Missing or invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Classify the error into the outcome reported to the write path.
    ///
    /// Transport failures and gateway errors mean the backend could not be
    /// reached; everything else is the backend refusing the request.
    pub fn outcome(&self) -> RemoteOutcome {
        match self {
            Self::Http(err) if err.is_timeout() || err.is_connect() || err.is_request() => {
                RemoteOutcome::Unreachable
            }
            Self::Unreachable(_) => RemoteOutcome::Unreachable,
            Self::Api { status, message } => match *status {
                408 | 502 | 503 | 504 => RemoteOutcome::Unreachable,
                _ => RemoteOutcome::Rejected {
                    status: Some(*status),
                    message: message.clone(),
                },
            },
            other => RemoteOutcome::Rejected {
                status: None,
                message: other.to_string(),
            },
        }
    }
}
