use nimbus_core::ErrorCategory;
use nimbus_http::{classify, HttpError};
use thiserror::Error;

use crate::location::LocationError;

/// Normalized failure of a weather operation.
///
/// Displays as the category's user message. `detail` keeps the underlying
/// cause for logs and is never shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .category.user_message())]
pub struct WeatherError {
    pub category: ErrorCategory,
    pub detail: Option<String>,
}

impl WeatherError {
    pub fn new(category: ErrorCategory) -> Self {
        Self {
            category,
            detail: None,
        }
    }

    pub fn with_detail(category: ErrorCategory, detail: impl Into<String>) -> Self {
        Self {
            category,
            detail: Some(detail.into()),
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.category.user_message()
    }
}

impl From<HttpError> for WeatherError {
    fn from(err: HttpError) -> Self {
        Self::with_detail(classify(&err), err.to_string())
    }
}

impl From<LocationError> for WeatherError {
    fn from(err: LocationError) -> Self {
        Self::with_detail(err.category(), err.to_string())
    }
}

impl From<ErrorCategory> for WeatherError {
    fn from(category: ErrorCategory) -> Self {
        Self::new(category)
    }
}
