//! Search lifecycle state machine.
//!
//! `Idle -> Loading -> Settled | Failed`. A new request moves any state back
//! to `Loading`. Only the most recently started request may settle the
//! state; results carrying an older request id are dropped.

use nimbus_core::ErrorCategory;
use nimbus_weather::{ForecastPoint, WeatherSnapshot};

/// Monotonically increasing id assigned to each search.
pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Loading,
    Settled,
    Failed,
}

/// What started a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrigin {
    City,
    Coordinates,
}

/// Location of the last settled search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchLocation {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    /// Text currently in the search box
    pub query: String,
    pub result: Option<WeatherSnapshot>,
    pub forecast: Option<Vec<ForecastPoint>>,
    pub phase: SearchPhase,
    pub error: Option<ErrorCategory>,
    pub is_geolocation_origin: bool,
    pub last_location: Option<SearchLocation>,
    /// Id of the newest request; 0 before the first search
    pub latest_request: RequestId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    SetQuery(String),
    Started {
        request: RequestId,
        origin: SearchOrigin,
    },
    Succeeded {
        request: RequestId,
        snapshot: WeatherSnapshot,
        forecast: Vec<ForecastPoint>,
        location: SearchLocation,
    },
    Failed {
        request: RequestId,
        error: ErrorCategory,
    },
    /// Failure that did not come from a request, e.g. geolocation
    SetError(ErrorCategory),
    Clear,
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Loading
    }

    /// True if `request` is the newest request and may settle the state.
    pub fn accepts(&self, request: RequestId) -> bool {
        request == self.latest_request
    }

    pub fn dispatch(self, event: SearchEvent) -> Self {
        match event {
            SearchEvent::SetQuery(query) => {
                if query.is_empty() {
                    let phase = if self.is_loading() {
                        SearchPhase::Loading
                    } else {
                        SearchPhase::Idle
                    };
                    SearchState {
                        query,
                        result: None,
                        forecast: None,
                        error: None,
                        is_geolocation_origin: false,
                        phase,
                        ..self
                    }
                } else {
                    SearchState { query, ..self }
                }
            }
            SearchEvent::Started { request, origin } => SearchState {
                result: None,
                forecast: None,
                error: None,
                phase: SearchPhase::Loading,
                is_geolocation_origin: origin == SearchOrigin::Coordinates,
                latest_request: request,
                ..self
            },
            SearchEvent::Succeeded {
                request,
                snapshot,
                forecast,
                location,
            } => {
                if !self.accepts(request) {
                    tracing::debug!(
                        "Dropping stale result for request {} (latest {})",
                        request,
                        self.latest_request
                    );
                    return self;
                }
                SearchState {
                    result: Some(snapshot),
                    forecast: Some(forecast),
                    error: None,
                    phase: SearchPhase::Settled,
                    last_location: Some(location),
                    ..self
                }
            }
            SearchEvent::Failed { request, error } => {
                if !self.accepts(request) {
                    tracing::debug!(
                        "Dropping stale failure for request {} (latest {})",
                        request,
                        self.latest_request
                    );
                    return self;
                }
                SearchState {
                    result: None,
                    forecast: None,
                    error: Some(error),
                    phase: SearchPhase::Failed,
                    ..self
                }
            }
            SearchEvent::SetError(error) => SearchState {
                error: Some(error),
                phase: SearchPhase::Failed,
                is_geolocation_origin: error.is_geolocation() || self.is_geolocation_origin,
                ..self
            },
            // Resetting the latest id also orphans any request in flight.
            SearchEvent::Clear => SearchState::default(),
        }
    }
}
