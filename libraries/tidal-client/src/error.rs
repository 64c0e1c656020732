//! Error types for the Tidal client.

use thiserror::Error;

/// Errors that can occur when interacting with the Tidal API.
#[derive(Error, Debug)]
pub enum TidalClientError {
    /// Base URL or relative path did not compose into a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network-level failure before a status code was received
    #[error("Transport failure: {0}")]
    Transport(reqwest::Error),

    /// Server responded outside the 2xx range
    #[error("API request failed with status code {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// Response body was present but not valid JSON for the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Structured error returned by the token endpoint
    #[error("Auth grant error: {error_type} - {description}")]
    AuthGrant {
        error_type: String,
        description: String,
    },

    /// A grant was requested without the credentials it needs
    /// (client secret for client-credentials, refresh token for refresh)
    #[error("Authentication required")]
    AuthRequired,

    /// IO error while streaming a raw body to its sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request was cancelled or its deadline expired
    #[error("Request cancelled")]
    Cancelled,
}

impl TidalClientError {
    /// Maps a transport-level reqwest failure onto the client error kinds.
    ///
    /// Deadline expiry surfaces as [`TidalClientError::Cancelled`]; anything
    /// else that happened before a status code was known is a transport
    /// failure.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TidalClientError::Cancelled
        } else {
            TidalClientError::Transport(err)
        }
    }
}

/// Result type for Tidal client operations.
pub type Result<T> = std::result::Result<T, TidalClientError>;
