//! Weather data for Nimbus
//!
//! Fetches current conditions and forecasts from the OpenWeather API,
//! caches responses for a few minutes, and derives the values the dashboard
//! displays (hourly strip, daily summaries, wind chart, stat cards).

pub mod cache;
pub mod client;
pub mod error;
pub mod location;
pub mod types;
pub mod view;

pub use cache::{cache_key, CacheEntry, Clock, ManualClock, RequestKind, SystemClock, TtlCache};
pub use client::{ApiSettings, WeatherClient, CACHE_TTL};
pub use error::WeatherError;
pub use location::{FixedLocation, LocationError, LocationProvider, NoLocation};
pub use types::*;
pub use view::{
    daily_aggregates, format_local_time, hourly_slice, stat_cards, wind_histogram,
    DailyAggregate, HourlyPoint, LocalTime, Octant, StatCard, WindBucket, WindHistogram,
    WindSample,
};
