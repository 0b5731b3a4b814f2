//! Storage keys shared by every component that persists state.

pub const SEARCH_HISTORY: &str = "weather_search_history";
pub const LAST_LOCATION: &str = "weather_last_location";
pub const WEATHER_CARD_ORDER: &str = "weather_card_order";
pub const FORECAST_CARD_ORDER: &str = "forecast_card_order";
