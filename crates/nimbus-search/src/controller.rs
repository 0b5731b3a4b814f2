//! Search orchestration: runs searches and keeps [`AppState`] current.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use nimbus_core::{ErrorCategory, Locale, SearchConfig};
use nimbus_storage::Storage;
use nimbus_weather::{LocationProvider, WeatherBundle, WeatherClient, WeatherError};
use tokio::sync::watch;

use crate::app::{AppEvent, AppState};
use crate::debounce::{Debouncer, DEFAULT_QUIET_PERIOD};
use crate::state::{RequestId, SearchEvent, SearchLocation, SearchOrigin, SearchState};

/// Name stored with coordinates from the location provider.
pub const CURRENT_LOCATION_LABEL: &str = "Current Location";

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub locale: Locale,
    pub debounce: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            debounce: DEFAULT_QUIET_PERIOD,
        }
    }
}

impl SearchOptions {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            locale: config.locale(),
            debounce: Duration::from_millis(config.debounce_ms),
        }
    }
}

/// What happened to a search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Nothing to do (blank input, or state already present)
    Ignored,
    /// The result is now in the state
    Applied,
    /// The failure is now in the state
    Failed(ErrorCategory),
    /// A newer search started first; the result was dropped
    Superseded,
}

struct Inner {
    weather: WeatherClient,
    storage: Storage,
    location: Arc<dyn LocationProvider>,
    locale: Locale,
    state: watch::Sender<AppState>,
    next_request: AtomicU64,
    debouncer: Debouncer,
}

/// Drives the search state machine.
///
/// Requests are not queued: each search gets a fresh id and only the newest
/// one can settle the state. Nothing is retried at this level. Clones share
/// the same state.
#[derive(Clone)]
pub struct SearchController {
    inner: Arc<Inner>,
}

impl SearchController {
    pub fn new(
        weather: WeatherClient,
        storage: Storage,
        location: Arc<dyn LocationProvider>,
        options: SearchOptions,
    ) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            inner: Arc::new(Inner {
                weather,
                storage,
                location,
                locale: options.locale,
                state,
                next_request: AtomicU64::new(1),
                debouncer: Debouncer::new(options.debounce),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    pub fn search_state(&self) -> SearchState {
        self.inner.state.borrow().search.clone()
    }

    /// Receiver that sees every state change.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.state.subscribe()
    }

    pub fn locale(&self) -> Locale {
        self.inner.locale
    }

    /// Apply a UI event that does not involve a request, e.g. a tab switch.
    pub fn dispatch(&self, event: impl Into<AppEvent>) {
        let event = event.into();
        self.inner
            .state
            .send_modify(|state| *state = std::mem::take(state).dispatch(event));
    }

    pub fn set_query(&self, text: &str) {
        self.dispatch(SearchEvent::SetQuery(text.to_string()));
    }

    /// Search by city name. The city is added to the history as soon as the
    /// search starts, whether or not it succeeds.
    pub async fn search_city(&self, text: &str) -> SearchOutcome {
        let city = text.trim();
        if city.is_empty() {
            return SearchOutcome::Ignored;
        }

        let request = self.begin(SearchOrigin::City);
        self.inner.storage.add_to_search_history(city);
        tracing::info!("Searching for city {:?} (request {})", city, request);

        let result = self
            .inner
            .weather
            .combined_by_city(city, self.inner.locale)
            .await;
        self.finish(request, result, |bundle| SearchLocation {
            lat: bundle.snapshot.coordinate.lat,
            lon: bundle.snapshot.coordinate.lon,
            name: bundle.snapshot.name.clone(),
        })
    }

    /// Update the query now and search for it once typing pauses.
    pub fn search_city_debounced(&self, text: &str) {
        self.set_query(text);

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let text = text.to_string();
        self.inner.debouncer.call(move || async move {
            if let Some(inner) = weak.upgrade() {
                SearchController { inner }.search_city(&text).await;
            }
        });
    }

    /// Search by coordinate. Skips the history but remembers the location
    /// for the next session.
    pub async fn search_coordinates(&self, lat: f64, lon: f64) -> SearchOutcome {
        let request = self.begin(SearchOrigin::Coordinates);
        self.inner
            .storage
            .set_last_location(lat, lon, CURRENT_LOCATION_LABEL);
        tracing::info!("Searching at {}, {} (request {})", lat, lon, request);

        let result = self
            .inner
            .weather
            .combined_by_coordinates(lat, lon, self.inner.locale)
            .await;
        self.finish(request, result, |bundle| SearchLocation {
            lat,
            lon,
            name: bundle.snapshot.name.clone(),
        })
    }

    /// Ask the location provider once and search there.
    pub async fn locate(&self) -> SearchOutcome {
        match self.inner.location.current_location().await {
            Ok(coordinate) => self.search_coordinates(coordinate.lat, coordinate.lon).await,
            Err(e) => {
                tracing::warn!("Geolocation failed: {}", e);
                let category = e.category();
                self.dispatch(SearchEvent::SetError(category));
                SearchOutcome::Failed(category)
            }
        }
    }

    /// Startup behavior: resume from the stored location if there is one,
    /// otherwise locate the user when nothing has been searched yet.
    pub async fn on_mount(&self) -> SearchOutcome {
        let state = self.search_state();
        if state.result.is_some() || state.is_loading() {
            return SearchOutcome::Ignored;
        }

        if let Some(last) = self.inner.storage.last_location() {
            tracing::info!("Resuming from last location {:?}", last.name);
            return self.search_coordinates(last.lat, last.lon).await;
        }

        if state.query.is_empty() {
            return self.locate().await;
        }
        SearchOutcome::Ignored
    }

    /// Reset the search state. History is kept.
    pub fn clear(&self) {
        self.dispatch(SearchEvent::Clear);
    }

    /// Leave the failed state. The last request is not replayed.
    pub fn try_again(&self) {
        tracing::debug!("Clearing search state after failure");
        self.clear();
    }

    pub fn history(&self) -> Vec<String> {
        self.inner.storage.search_history()
    }

    pub fn clear_history(&self) -> bool {
        self.inner.storage.clear_search_history()
    }

    /// Cancel any pending debounced search.
    pub fn shutdown(&self) {
        if self.inner.debouncer.cancel() {
            tracing::debug!("Cancelled pending debounced search");
        }
    }

    /// Issue a new request id and mark it started. Both happen under the
    /// state lock, so ids reach the state in increasing order.
    fn begin(&self, origin: SearchOrigin) -> RequestId {
        let mut request = 0;
        self.inner.state.send_modify(|state| {
            request = self.inner.next_request.fetch_add(1, Ordering::SeqCst);
            *state = std::mem::take(state).dispatch(SearchEvent::Started { request, origin });
        });
        request
    }

    fn finish(
        &self,
        request: RequestId,
        result: Result<WeatherBundle, WeatherError>,
        location: impl FnOnce(&WeatherBundle) -> SearchLocation,
    ) -> SearchOutcome {
        let outcome;
        let event = match result {
            Ok(bundle) => {
                outcome = SearchOutcome::Applied;
                SearchEvent::Succeeded {
                    request,
                    location: location(&bundle),
                    snapshot: bundle.snapshot,
                    forecast: bundle.forecast,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Search {} failed: {} ({})",
                    request,
                    e,
                    e.detail.as_deref().unwrap_or("no detail")
                );
                outcome = SearchOutcome::Failed(e.category);
                SearchEvent::Failed {
                    request,
                    error: e.category,
                }
            }
        };

        let mut accepted = false;
        self.inner.state.send_modify(|state| {
            accepted = state.search.accepts(request);
            *state = std::mem::take(state).dispatch(event);
        });

        if accepted {
            outcome
        } else {
            tracing::debug!("Request {} superseded", request);
            SearchOutcome::Superseded
        }
    }
}

impl std::fmt::Debug for SearchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("locale", &self.inner.locale)
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}
