//! OpenWeather API client with response caching.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use nimbus_core::{ApiConfig, ErrorCategory, Locale};
use nimbus_http::HttpClient;
use tracing::instrument;
use url::Url;

use crate::cache::{cache_key, Clock, RequestKind, SystemClock, TtlCache};
use crate::error::WeatherError;
use crate::types::{
    parse_coordinates, ApiForecastResponse, ApiWeatherResponse, ForecastPoint, WeatherBundle,
    WeatherSnapshot,
};

/// How long a fetched response is served from the cache.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Endpoint and credentials for the weather API.
#[derive(Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
    pub units: String,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            units: "metric".to_string(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            units: config.units.clone(),
        }
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("units", &self.units)
            .finish()
    }
}

#[derive(Debug, Clone)]
enum CachedResponse {
    Snapshot(WeatherSnapshot),
    Forecast(Vec<ForecastPoint>),
}

type Params = Vec<(&'static str, String)>;

fn coordinate_params(lat: f64, lon: f64, locale: Locale) -> Params {
    vec![
        ("lat", lat.to_string()),
        ("lon", lon.to_string()),
        ("lang", locale.code().to_string()),
    ]
}

fn city_params(city: &str, locale: Locale) -> Params {
    vec![("q", city.to_string()), ("lang", locale.code().to_string())]
}

/// Client for current conditions and forecasts.
///
/// Every operation checks the cache first; a hit never touches the network.
/// Failures are classified into a [`WeatherError`]. Clones share the cache.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    settings: Arc<ApiSettings>,
    http: HttpClient,
    cache: Arc<TtlCache<CachedResponse>>,
}

impl WeatherClient {
    pub fn new(settings: ApiSettings, http: HttpClient) -> Self {
        Self::with_clock(settings, http, Arc::new(SystemClock))
    }

    /// Build a client whose cache reads time from `clock`.
    pub fn with_clock(settings: ApiSettings, http: HttpClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings: Arc::new(settings),
            http,
            cache: Arc::new(TtlCache::with_clock(CACHE_TTL, clock)),
        }
    }

    /// Current conditions at a coordinate.
    #[instrument(skip(self), level = "info")]
    pub async fn current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
        locale: Locale,
    ) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch_snapshot(coordinate_params(lat, lon, locale)).await
    }

    /// Current conditions for a city name.
    #[instrument(skip(self), level = "info")]
    pub async fn current_by_city(
        &self,
        city: &str,
        locale: Locale,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::with_detail(
                ErrorCategory::InvalidInput,
                "empty city name",
            ));
        }
        self.fetch_snapshot(city_params(city, locale)).await
    }

    /// Current conditions for free-text input: a city name, or `"lat,lon"`
    /// when `by_coordinates` is set.
    pub async fn current_by_query(
        &self,
        query: &str,
        locale: Locale,
        by_coordinates: bool,
    ) -> Result<WeatherSnapshot, WeatherError> {
        if by_coordinates {
            let coordinate = parse_coordinates(query)?;
            self.current_by_coordinates(coordinate.lat, coordinate.lon, locale)
                .await
        } else {
            self.current_by_city(query, locale).await
        }
    }

    /// 5-day forecast in 3-hour steps at a coordinate.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
        locale: Locale,
    ) -> Result<Vec<ForecastPoint>, WeatherError> {
        let params = coordinate_params(lat, lon, locale);
        let key = cache_key(RequestKind::Forecast, &params);
        if let Some(CachedResponse::Forecast(points)) = self.cache.get(&key) {
            tracing::debug!("Cache hit: {}", key);
            return Ok(points);
        }

        let url = self.build_url(RequestKind::Forecast, &params)?;
        let response: ApiForecastResponse =
            self.http.request(&url).await.map_err(WeatherError::from)?;
        let points = response.into_points();
        tracing::debug!("Fetched {} forecast points", points.len());

        self.cache.set(key, CachedResponse::Forecast(points.clone()));
        Ok(points)
    }

    /// Current conditions and forecast, fetched concurrently. Fails if
    /// either request fails.
    #[instrument(skip(self), level = "info")]
    pub async fn combined_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
        locale: Locale,
    ) -> Result<WeatherBundle, WeatherError> {
        let (snapshot, forecast) = tokio::try_join!(
            self.current_by_coordinates(lat, lon, locale),
            self.forecast_by_coordinates(lat, lon, locale),
        )?;
        Ok(WeatherBundle { snapshot, forecast })
    }

    /// Current conditions for a city, then the forecast at its resolved
    /// coordinate.
    #[instrument(skip(self), level = "info")]
    pub async fn combined_by_city(
        &self,
        city: &str,
        locale: Locale,
    ) -> Result<WeatherBundle, WeatherError> {
        let snapshot = self.current_by_city(city, locale).await?;
        let forecast = self
            .forecast_by_coordinates(snapshot.coordinate.lat, snapshot.coordinate.lon, locale)
            .await?;
        Ok(WeatherBundle { snapshot, forecast })
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Weather cache cleared");
    }

    /// Drop the cached current conditions and forecast for one coordinate.
    pub fn clear_location_cache(&self, lat: f64, lon: f64, locale: Locale) {
        let params = coordinate_params(lat, lon, locale);
        self.cache.delete(&cache_key(RequestKind::Weather, &params));
        self.cache.delete(&cache_key(RequestKind::Forecast, &params));
    }

    async fn fetch_snapshot(&self, params: Params) -> Result<WeatherSnapshot, WeatherError> {
        let key = cache_key(RequestKind::Weather, &params);
        if let Some(CachedResponse::Snapshot(snapshot)) = self.cache.get(&key) {
            tracing::debug!("Cache hit: {}", key);
            return Ok(snapshot);
        }

        let url = self.build_url(RequestKind::Weather, &params)?;
        let response: ApiWeatherResponse =
            self.http.request(&url).await.map_err(WeatherError::from)?;
        let snapshot = WeatherSnapshot::from(response);
        tracing::debug!("Fetched current weather for {}", snapshot.name);

        self.cache.set(key, CachedResponse::Snapshot(snapshot.clone()));
        Ok(snapshot)
    }

    fn build_url(
        &self,
        kind: RequestKind,
        params: &[(&str, String)],
    ) -> Result<String, WeatherError> {
        let base = self.settings.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}{}", base, kind.path())).map_err(|e| {
            WeatherError::with_detail(
                ErrorCategory::UnknownError,
                format!("invalid API base URL {:?}: {}", base, e),
            )
        })?;

        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(name, value)| (*name, value.as_str())))
            .append_pair("units", &self.settings.units)
            .append_pair("appid", &self.settings.api_key);
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use nimbus_http::HttpConfig;

    fn client(base_url: &str) -> WeatherClient {
        let http = HttpClient::new(&HttpConfig::default()).unwrap();
        WeatherClient::new(ApiSettings::new(base_url, "secret key"), http)
    }

    #[test]
    fn test_url_is_query_encoded() {
        let client = client("https://api.example.com/data/2.5/");
        let url = client
            .build_url(RequestKind::Weather, &city_params("São Paulo", Locale::Ar))
            .unwrap();

        assert_eq!(
            url,
            "https://api.example.com/data/2.5/weather?q=S%C3%A3o+Paulo&lang=ar&units=metric&appid=secret+key"
        );
    }

    #[test]
    fn test_forecast_url_uses_coordinates() {
        let client = client("https://api.example.com/data/2.5");
        let url = client
            .build_url(RequestKind::Forecast, &coordinate_params(30.5, -2.0, Locale::En))
            .unwrap();

        assert!(url.starts_with(
            "https://api.example.com/data/2.5/forecast?lat=30.5&lon=-2&lang=en"
        ));
    }

    #[test]
    fn test_bad_base_url_is_an_error() {
        let client = client("not a url");
        let err = client
            .build_url(RequestKind::Weather, &city_params("Cairo", Locale::En))
            .unwrap_err();
        assert_eq!(err.category, ErrorCategory::UnknownError);
    }

    #[test]
    fn test_settings_debug_hides_key() {
        let settings = ApiSettings::new("https://api.example.com", "hunter2");
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }

    #[tokio::test]
    async fn test_blank_city_is_invalid_input() {
        let client = client("https://api.example.com");
        let err = client.current_by_city("   ", Locale::En).await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidInput);
    }

    #[tokio::test]
    async fn test_malformed_coordinate_query() {
        let client = client("https://api.example.com");
        let err = client
            .current_by_query("north,south", Locale::En, true)
            .await
            .unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidInput);
    }
}
