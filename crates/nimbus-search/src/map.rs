//! Map page state.

use nimbus_weather::{Coordinate, ForecastPoint, WeatherSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapTab {
    Analytics,
    Map,
    #[default]
    Overview,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapState {
    pub user_location: Option<Coordinate>,
    pub user_weather: Option<WeatherSnapshot>,
    pub forecast: Vec<ForecastPoint>,
    pub active_tab: MapTab,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    SetActiveTab(MapTab),
    /// Mirror of a settled search
    WeatherAndForecast {
        weather: WeatherSnapshot,
        forecast: Vec<ForecastPoint>,
    },
    LocationResolved {
        location: Coordinate,
        weather: WeatherSnapshot,
        forecast: Vec<ForecastPoint>,
    },
    LocationFailed,
}

impl MapState {
    pub fn dispatch(self, event: MapEvent) -> Self {
        match event {
            MapEvent::SetActiveTab(active_tab) => MapState { active_tab, ..self },
            MapEvent::WeatherAndForecast { weather, forecast } => MapState {
                user_weather: Some(weather),
                forecast,
                ..self
            },
            MapEvent::LocationResolved {
                location,
                weather,
                forecast,
            } => MapState {
                user_location: Some(location),
                user_weather: Some(weather),
                forecast,
                ..self
            },
            MapEvent::LocationFailed => MapState {
                user_weather: None,
                forecast: Vec::new(),
                ..self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_switch_keeps_data() {
        let state = MapState {
            user_location: Some(Coordinate::new(1.0, 1.0)),
            ..MapState::default()
        };
        let state = state.dispatch(MapEvent::SetActiveTab(MapTab::Analytics));
        assert_eq!(state.active_tab, MapTab::Analytics);
        assert_eq!(state.user_location, Some(Coordinate::new(1.0, 1.0)));
    }

    #[test]
    fn location_failure_drops_weather_but_keeps_location() {
        let state = MapState {
            user_location: Some(Coordinate::new(1.0, 1.0)),
            ..MapState::default()
        };
        let state = state.dispatch(MapEvent::LocationFailed);
        assert!(state.user_weather.is_none());
        assert!(state.forecast.is_empty());
        assert!(state.user_location.is_some());
        assert_eq!(state.active_tab, MapTab::Overview);
    }
}
