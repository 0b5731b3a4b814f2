//! User-facing error taxonomy.
//!
//! Every failure that reaches the UI boundary is reduced to one
//! [`ErrorCategory`]. The text shown to users comes from
//! [`ErrorCategory::user_message`], never from the underlying error, so
//! transport details do not leak into the interface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat, exhaustive set of error categories surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    #[error("city not found")]
    CityNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("rate limited")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("network error")]
    NetworkError,

    #[error("API error")]
    GenericApiError,

    #[error("invalid input")]
    InvalidInput,

    #[error("geolocation unavailable")]
    GeolocationUnavailable,

    #[error("geolocation denied")]
    GeolocationDenied,

    #[error("unknown error")]
    UnknownError,
}

impl ErrorCategory {
    /// Every category, in declaration order.
    pub const ALL: [ErrorCategory; 10] = [
        ErrorCategory::CityNotFound,
        ErrorCategory::InvalidCredentials,
        ErrorCategory::RateLimited,
        ErrorCategory::Timeout,
        ErrorCategory::NetworkError,
        ErrorCategory::GenericApiError,
        ErrorCategory::InvalidInput,
        ErrorCategory::GeolocationUnavailable,
        ErrorCategory::GeolocationDenied,
        ErrorCategory::UnknownError,
    ];

    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::CityNotFound => "City not found",
            ErrorCategory::InvalidCredentials => "Invalid API key",
            ErrorCategory::RateLimited => "Too many requests. Please try again later.",
            ErrorCategory::Timeout => "Request timeout. Please check your connection.",
            ErrorCategory::NetworkError => "Network error",
            ErrorCategory::GenericApiError => "API error occurred",
            ErrorCategory::InvalidInput => "Please enter a valid city name",
            ErrorCategory::GeolocationUnavailable => "Geolocation is not supported",
            ErrorCategory::GeolocationDenied => "Unable to get your location",
            ErrorCategory::UnknownError => "Something went wrong",
        }
    }

    /// Stable identifier for looking the message up in a translation catalog.
    pub fn message_key(&self) -> &'static str {
        match self {
            ErrorCategory::CityNotFound => "cityNotFound",
            ErrorCategory::InvalidCredentials => "invalidApiKey",
            ErrorCategory::RateLimited => "tooManyRequests",
            ErrorCategory::Timeout => "requestTimeout",
            ErrorCategory::NetworkError => "networkError",
            ErrorCategory::GenericApiError => "apiError",
            ErrorCategory::InvalidInput => "invalidInput",
            ErrorCategory::GeolocationUnavailable => "geolocationNotSupported",
            ErrorCategory::GeolocationDenied => "geolocationError",
            ErrorCategory::UnknownError => "unknownError",
        }
    }

    /// True for categories caused by the host location service.
    pub fn is_geolocation(&self) -> bool {
        matches!(
            self,
            ErrorCategory::GeolocationUnavailable | ErrorCategory::GeolocationDenied
        )
    }
}
