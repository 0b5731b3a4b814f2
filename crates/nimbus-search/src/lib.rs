//! Search orchestration for nimbus.
//!
//! [`SearchController`] runs city, coordinate and geolocation searches
//! against the weather client and publishes [`AppState`] through a watch
//! channel. The state machines in [`state`] and [`map`] are pure and can be
//! driven without a controller.

pub mod app;
pub mod controller;
pub mod debounce;
pub mod map;
pub mod state;

pub use app::{AppEvent, AppState};
pub use controller::{SearchController, SearchOptions, SearchOutcome, CURRENT_LOCATION_LABEL};
pub use debounce::{Debouncer, DEFAULT_QUIET_PERIOD};
pub use map::{MapEvent, MapState, MapTab};
pub use state::{RequestId, SearchEvent, SearchLocation, SearchOrigin, SearchPhase, SearchState};
