use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use nimbus_core::ErrorCategory;
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One reported weather condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Coarse group, e.g. "Rain" or "Clouds"
    pub main_category: String,
    /// Localized description, e.g. "light rain"
    pub description: String,
    /// Icon code, e.g. "10d"
    pub icon_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Only reported for current conditions
    pub feels_like: Option<f64>,
    pub humidity: u8,
    pub pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Meters per second
    pub speed: f64,
    pub direction_degrees: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sun {
    pub sunrise_epoch: i64,
    pub sunset_epoch: i64,
}

/// Current conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Display label returned by the API
    pub name: String,
    pub coordinate: Coordinate,
    pub timezone_offset_seconds: i32,
    pub conditions: Vec<Condition>,
    pub metrics: Metrics,
    pub wind: Wind,
    pub sun: Sun,
    pub visibility: Option<u32>,
}

impl WeatherSnapshot {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }

    /// A snapshot without any condition cannot be rendered.
    pub fn is_valid(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Wall-clock time at the snapshot's location.
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.naive_utc() + Duration::seconds(i64::from(self.timezone_offset_seconds))
    }
}

/// One sample of the 3-hour forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Source timestamp, "YYYY-MM-DD HH:MM:SS"; empty when the API omitted it
    pub timestamp_text: String,
    pub metrics: Metrics,
    pub wind: Wind,
    pub conditions: Vec<Condition>,
    pub visibility: Option<u32>,
}

impl ForecastPoint {
    /// Calendar date part of the timestamp.
    pub fn date(&self) -> Option<&str> {
        self.timestamp_text
            .split(' ')
            .next()
            .filter(|date| !date.is_empty())
    }

    /// "HH:mm" part of the timestamp.
    pub fn time_of_day(&self) -> Option<&str> {
        let time = self.timestamp_text.split(' ').nth(1)?;
        Some(time.get(..5).unwrap_or(time))
    }
}

/// Current conditions and the forecast for the same location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherBundle {
    pub snapshot: WeatherSnapshot,
    pub forecast: Vec<ForecastPoint>,
}

/// Parse a `"lat,lon"` query.
pub fn parse_coordinates(query: &str) -> Result<Coordinate, WeatherError> {
    let invalid = || {
        WeatherError::with_detail(
            ErrorCategory::InvalidInput,
            format!("not a coordinate pair: {:?}", query),
        )
    };

    let mut parts = query.split(',');
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid());
    }
    Ok(Coordinate { lat, lon })
}

// OpenWeather wire format

#[derive(Debug, Deserialize)]
pub(crate) struct ApiWeatherResponse {
    #[serde(default)]
    name: String,
    coord: ApiCoord,
    #[serde(default)]
    weather: Vec<ApiCondition>,
    main: ApiMain,
    #[serde(default)]
    wind: ApiWind,
    #[serde(default)]
    sys: ApiSys,
    #[serde(default)]
    timezone: i32,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastResponse {
    #[serde(default)]
    list: Vec<ApiForecastItem>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastItem {
    dt_txt: Option<String>,
    #[serde(default)]
    main: ApiMain,
    #[serde(default)]
    wind: ApiWind,
    #[serde(default)]
    weather: Vec<ApiCondition>,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    feels_like: Option<f64>,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiWind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiSys {
    sunrise: i64,
    sunset: i64,
}

impl From<ApiCondition> for Condition {
    fn from(c: ApiCondition) -> Self {
        Self {
            main_category: c.main,
            description: c.description,
            icon_code: c.icon,
        }
    }
}

impl From<ApiMain> for Metrics {
    fn from(m: ApiMain) -> Self {
        Self {
            temp: m.temp,
            temp_min: m.temp_min,
            temp_max: m.temp_max,
            feels_like: m.feels_like,
            humidity: m.humidity,
            pressure: m.pressure,
        }
    }
}

impl From<ApiWind> for Wind {
    fn from(w: ApiWind) -> Self {
        Self {
            speed: w.speed,
            direction_degrees: w.deg,
        }
    }
}

impl From<ApiWeatherResponse> for WeatherSnapshot {
    fn from(r: ApiWeatherResponse) -> Self {
        Self {
            name: r.name,
            coordinate: Coordinate::new(r.coord.lat, r.coord.lon),
            timezone_offset_seconds: r.timezone,
            conditions: r.weather.into_iter().map(Condition::from).collect(),
            metrics: r.main.into(),
            wind: r.wind.into(),
            sun: Sun {
                sunrise_epoch: r.sys.sunrise,
                sunset_epoch: r.sys.sunset,
            },
            visibility: r.visibility,
        }
    }
}

impl From<ApiForecastItem> for ForecastPoint {
    fn from(item: ApiForecastItem) -> Self {
        let mut metrics = Metrics::from(item.main);
        // Forecast samples carry no feels-like value.
        metrics.feels_like = None;
        Self {
            timestamp_text: item.dt_txt.unwrap_or_default(),
            metrics,
            wind: item.wind.into(),
            conditions: item.weather.into_iter().map(Condition::from).collect(),
            visibility: item.visibility,
        }
    }
}

impl ApiForecastResponse {
    pub(crate) fn into_points(self) -> Vec<ForecastPoint> {
        self.list.into_iter().map(ForecastPoint::from).collect()
    }
}
