//! Top-level state composed from the search and map state machines.

use nimbus_weather::Coordinate;

use crate::map::{MapEvent, MapState};
use crate::state::{SearchEvent, SearchState};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub search: SearchState,
    pub map: MapState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Search(SearchEvent),
    Map(MapEvent),
}

impl From<SearchEvent> for AppEvent {
    fn from(event: SearchEvent) -> Self {
        AppEvent::Search(event)
    }
}

impl From<MapEvent> for AppEvent {
    fn from(event: MapEvent) -> Self {
        AppEvent::Map(event)
    }
}

impl AppState {
    /// Apply `event`. A search that settles is mirrored into the map state;
    /// a geolocation failure clears the map's weather.
    pub fn dispatch(self, event: impl Into<AppEvent>) -> Self {
        match event.into() {
            AppEvent::Map(event) => AppState {
                map: self.map.dispatch(event),
                ..self
            },
            AppEvent::Search(event) => {
                let mirror = match &event {
                    SearchEvent::Succeeded {
                        request,
                        snapshot,
                        forecast,
                        location,
                    } if self.search.accepts(*request) => {
                        let weather = snapshot.clone();
                        let forecast = forecast.clone();
                        Some(if self.search.is_geolocation_origin {
                            MapEvent::LocationResolved {
                                location: Coordinate::new(location.lat, location.lon),
                                weather,
                                forecast,
                            }
                        } else {
                            MapEvent::WeatherAndForecast { weather, forecast }
                        })
                    }
                    SearchEvent::SetError(error) if error.is_geolocation() => {
                        Some(MapEvent::LocationFailed)
                    }
                    _ => None,
                };

                let search = self.search.dispatch(event);
                let map = match mirror {
                    Some(event) => self.map.dispatch(event),
                    None => self.map,
                };
                AppState { search, map }
            }
        }
    }
}
