//! Host location lookup.

use async_trait::async_trait;
use nimbus_core::ErrorCategory;
use thiserror::Error;

use crate::types::Coordinate;

/// Location service errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

impl LocationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LocationError::PermissionDenied => ErrorCategory::GeolocationDenied,
            LocationError::ServiceUnavailable
            | LocationError::Timeout
            | LocationError::Other(_) => ErrorCategory::GeolocationUnavailable,
        }
    }
}

/// One-shot source of the device's current coordinate.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Coordinate, LocationError>;
}

/// Always reports the same coordinate, typically taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coordinate: Coordinate,
}

impl FixedLocation {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        Ok(self.coordinate)
    }
}

/// Used when the host has no location service.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}
