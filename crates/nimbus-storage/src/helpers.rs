//! Typed helpers for the values Nimbus persists between sessions.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::keys;
use crate::storage::Storage;

/// Maximum number of cities kept in the search history.
pub const MAX_SEARCH_HISTORY: usize = 10;

/// Move `city` to the front of `history`, truncating to [`MAX_SEARCH_HISTORY`].
///
/// Matching is case-insensitive. A repeated city keeps the spelling it was
/// first stored with.
pub fn push_history(history: &[String], city: &str) -> Vec<String> {
    let lowered = city.to_lowercase();
    let front = history
        .iter()
        .find(|existing| existing.to_lowercase() == lowered)
        .cloned()
        .unwrap_or_else(|| city.to_string());

    let mut next = Vec::with_capacity(MAX_SEARCH_HISTORY);
    next.push(front);
    next.extend(
        history
            .iter()
            .filter(|existing| existing.to_lowercase() != lowered)
            .cloned(),
    );
    next.truncate(MAX_SEARCH_HISTORY);
    next
}

/// Last coordinate the user searched from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastLocation {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    /// Milliseconds since the Unix epoch when the location was recorded.
    pub timestamp: i64,
}

/// Sortable card grids whose order is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardGrid {
    Weather,
    Forecast,
}

impl CardGrid {
    pub fn key(self) -> &'static str {
        match self {
            CardGrid::Weather => keys::WEATHER_CARD_ORDER,
            CardGrid::Forecast => keys::FORECAST_CARD_ORDER,
        }
    }
}

impl Storage {
    /// Previously searched cities, most recent first.
    pub fn search_history(&self) -> Vec<String> {
        self.get(keys::SEARCH_HISTORY, Vec::new())
    }

    /// Record `city` at the front of the history. Blank input is ignored.
    pub fn add_to_search_history(&self, city: &str) -> bool {
        let city = city.trim();
        if city.is_empty() {
            return false;
        }
        let next = push_history(&self.search_history(), city);
        self.set(keys::SEARCH_HISTORY, &next)
    }

    pub fn clear_search_history(&self) -> bool {
        self.remove(keys::SEARCH_HISTORY)
    }

    pub fn last_location(&self) -> Option<LastLocation> {
        self.get(keys::LAST_LOCATION, None)
    }

    /// Store the coordinate, stamped with the current time.
    pub fn set_last_location(&self, lat: f64, lon: f64, name: &str) -> bool {
        let location = LastLocation {
            lat,
            lon,
            name: name.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };
        self.set(keys::LAST_LOCATION, &location)
    }

    pub fn card_order(&self, grid: CardGrid, default: &[String]) -> Vec<String> {
        self.get(grid.key(), default.to_vec())
    }

    pub fn set_card_order(&self, grid: CardGrid, order: &[String]) -> bool {
        self.set(grid.key(), order)
    }
}
