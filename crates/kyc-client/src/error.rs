//! KYC back-office client error types.

use std::path::PathBuf;

/// Errors from back-office API calls.
#[derive(Debug, thiserror::Error)]
pub enum KycApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The API returned a non-2xx status.
    #[error("KYC API {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The API answered 2xx but reported that it did not create the record.
    #[error("KYC API {endpoint} refused the request: {message}")]
    Refused { endpoint: String, message: String },
    /// An attachment could not be read from disk.
    #[error("cannot read attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The record could not be encoded as JSON.
    #[error("failed to encode submission record: {0}")]
    Encode(#[from] serde_json::Error),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl KycApiError {
    /// Whether the failure is on the server's or network's side rather
    /// than in what was sent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
