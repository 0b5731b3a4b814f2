//! Display-ready values derived from weather data.
//!
//! Every builder is a pure function of its input and recomputes from scratch
//! on each call.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{ForecastPoint, Wind, WeatherSnapshot};

/// Number of forecast points shown in the hourly strip (24 hours).
pub const HOURLY_POINTS: usize = 8;
/// Maximum number of days in the daily forecast.
pub const MAX_DAYS: usize = 7;
/// Icon shown for a day whose first sample has no condition.
pub const FALLBACK_ICON: &str = "01d";
/// Lower bound of the wind chart's radial axis, in m/s.
pub const MIN_CHART_MAX: f64 = 10.0;

/// One entry of the hourly strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    /// "HH:mm", empty when the source had no timestamp
    pub time: String,
    pub temp: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_direction_degrees: f64,
    /// Description of the first condition, empty when there is none
    pub condition: String,
}

pub fn hourly_slice(forecast: &[ForecastPoint]) -> Vec<HourlyPoint> {
    forecast
        .iter()
        .take(HOURLY_POINTS)
        .map(|point| HourlyPoint {
            time: point.time_of_day().unwrap_or_default().to_string(),
            temp: point.metrics.temp,
            humidity: point.metrics.humidity,
            wind_speed: point.wind.speed,
            wind_direction_degrees: point.wind.direction_degrees.unwrap_or(0.0),
            condition: point
                .conditions
                .first()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
        })
        .collect()
}

/// Temperature summary for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    /// "YYYY-MM-DD"
    pub date: String,
    pub min_temp: f64,
    pub max_temp: f64,
    pub avg_temp: f64,
    pub icon_code: String,
}

/// Group points by date in first-seen order and summarize each day.
///
/// Points without a timestamp are skipped, days with no finite temperature
/// are dropped, and at most [`MAX_DAYS`] days are returned.
pub fn daily_aggregates(forecast: &[ForecastPoint]) -> Vec<DailyAggregate> {
    let mut groups: Vec<(&str, Vec<&ForecastPoint>)> = Vec::new();
    for point in forecast {
        let Some(date) = point.date() else {
            continue;
        };
        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, points)) => points.push(point),
            None => groups.push((date, vec![point])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(date, points)| aggregate_day(date, &points))
        .take(MAX_DAYS)
        .collect()
}

fn aggregate_day(date: &str, points: &[&ForecastPoint]) -> Option<DailyAggregate> {
    let temps: Vec<f64> = points
        .iter()
        .map(|p| p.metrics.temp)
        .filter(|t| t.is_finite())
        .collect();
    if temps.is_empty() {
        return None;
    }

    let min_temp = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max_temp = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg_temp = temps.iter().sum::<f64>() / temps.len() as f64;
    let icon_code = points
        .first()
        .and_then(|p| p.conditions.first())
        .map(|c| c.icon_code.as_str())
        .filter(|icon| !icon.is_empty())
        .unwrap_or(FALLBACK_ICON)
        .to_string();

    Some(DailyAggregate {
        date: date.to_string(),
        min_temp,
        max_temp,
        avg_temp,
        icon_code,
    })
}

/// Compass octant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Octant {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Octant {
    pub const ALL: [Octant; 8] = [
        Octant::N,
        Octant::NE,
        Octant::E,
        Octant::SE,
        Octant::S,
        Octant::SW,
        Octant::W,
        Octant::NW,
    ];

    /// Octant containing `degrees`, with each octant centered on its bearing.
    pub fn from_degrees(degrees: f64) -> Self {
        let index = (degrees / 45.0 + 0.5).floor();
        if !index.is_finite() {
            return Octant::N;
        }
        Self::ALL[(index as i64).rem_euclid(8) as usize]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Octant::N => "N",
            Octant::NE => "NE",
            Octant::E => "E",
            Octant::SE => "SE",
            Octant::S => "S",
            Octant::SW => "SW",
            Octant::W => "W",
            Octant::NW => "NW",
        }
    }

    /// Chart color for the octant's slice.
    pub fn color(&self) -> &'static str {
        match self {
            Octant::N => "#4f46e5",
            Octant::NE => "#7c3aed",
            Octant::E => "#a78bfa",
            Octant::SE => "#c4b5fd",
            Octant::S => "#a5b4fc",
            Octant::SW => "#818cf8",
            Octant::W => "#6366f1",
            Octant::NW => "#4338ca",
        }
    }
}

/// Anything that carries a wind reading.
pub trait WindSample {
    fn wind_speed(&self) -> f64;
    fn wind_direction(&self) -> Option<f64>;
}

impl WindSample for Wind {
    fn wind_speed(&self) -> f64 {
        self.speed
    }

    fn wind_direction(&self) -> Option<f64> {
        self.direction_degrees
    }
}

impl WindSample for ForecastPoint {
    fn wind_speed(&self) -> f64 {
        self.wind.speed
    }

    fn wind_direction(&self) -> Option<f64> {
        self.wind.direction_degrees
    }
}

impl WindSample for HourlyPoint {
    fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    fn wind_direction(&self) -> Option<f64> {
        Some(self.wind_direction_degrees)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindBucket {
    pub octant: Octant,
    pub mean_speed: f64,
    pub samples: usize,
}

/// Mean wind speed per compass octant.
///
/// Only octants with at least one sample appear in `buckets`, in compass
/// order starting from north.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindHistogram {
    pub buckets: Vec<WindBucket>,
    /// Mean speed over all samples
    pub average_speed: f64,
    /// Radial axis maximum: the largest bucket mean, at least [`MIN_CHART_MAX`]
    pub chart_max: f64,
}

impl WindHistogram {
    pub fn mean_for(&self, octant: Octant) -> Option<f64> {
        self.buckets
            .iter()
            .find(|b| b.octant == octant)
            .map(|b| b.mean_speed)
    }
}

/// Bucket samples by octant. Returns `None` when there are no samples.
///
/// A sample without a direction counts as north.
pub fn wind_histogram<S: WindSample>(samples: &[S]) -> Option<WindHistogram> {
    if samples.is_empty() {
        return None;
    }

    let mut totals = [(0.0_f64, 0_usize); 8];
    for sample in samples {
        let octant = sample
            .wind_direction()
            .map(Octant::from_degrees)
            .unwrap_or(Octant::N);
        let slot = &mut totals[octant as usize];
        slot.0 += sample.wind_speed();
        slot.1 += 1;
    }

    let buckets: Vec<WindBucket> = Octant::ALL
        .iter()
        .zip(totals)
        .filter(|(_, (_, count))| *count > 0)
        .map(|(octant, (total, count))| WindBucket {
            octant: *octant,
            mean_speed: total / count as f64,
            samples: count,
        })
        .collect();

    let average_speed =
        samples.iter().map(|s| s.wind_speed()).sum::<f64>() / samples.len() as f64;
    let chart_max = buckets
        .iter()
        .map(|b| b.mean_speed)
        .fold(MIN_CHART_MAX, f64::max);

    Some(WindHistogram {
        buckets,
        average_speed,
        chart_max,
    })
}

/// Summary card shown above the forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub id: &'static str,
    /// Translation key of the card title
    pub title_key: &'static str,
    pub value: String,
    /// Translation key of the caption
    pub description_key: &'static str,
}

/// Rounds half up, so -2.5 becomes -2.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn stat_cards(snapshot: &WeatherSnapshot) -> Vec<StatCard> {
    vec![
        StatCard {
            id: "highLow",
            title_key: "highLow",
            value: format!(
                "{}° / {}°",
                round_half_up(snapshot.metrics.temp_max),
                round_half_up(snapshot.metrics.temp_min)
            ),
            description_key: "dailyRange",
        },
        StatCard {
            id: "avgHumidity",
            title_key: "avgHumidity",
            value: format!("{}%", snapshot.metrics.humidity),
            description_key: "currentHumidity",
        },
        StatCard {
            id: "avgWind",
            title_key: "avgWind",
            value: format!("{:.1} m/s", snapshot.wind.speed),
            description_key: "windSpeed",
        },
    ]
}

/// Date and time at the snapshot's location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalTime {
    /// e.g. "Mon, 01 Jan"
    pub date: String,
    /// e.g. "02:05 PM"
    pub time: String,
}

pub fn format_local_time(snapshot: &WeatherSnapshot, now: DateTime<Utc>) -> LocalTime {
    let local = snapshot.local_time(now);
    LocalTime {
        date: local.format("%a, %d %b").to_string(),
        time: local.format("%I:%M %p").to_string(),
    }
}
