use thiserror::Error;

/// Message used when a failed response carries no readable body.
pub const GENERIC_API_ERROR: &str = "API error occurred";

/// Failure of a single HTTP request.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response whose body could not be decoded.
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl HttpError {
    /// Build a status error, falling back to the generic message for empty bodies.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = if body.trim().is_empty() {
            GENERIC_API_ERROR.to_string()
        } else {
            body
        };
        HttpError::Status { status, message }
    }

    /// HTTP status code, when the server produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            HttpError::Transport(e) => e.status().map(|s| s.as_u16()),
            HttpError::Decode(_) => None,
        }
    }
}
