// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Canonical forecast records produced by the weather normalizer.
//!
//! A lookup yields either a full [`DailyForecast`] or a [`ForecastError`],
//! carried through the pipeline as a tagged union. The error shape is never
//! coerced into a success shape; downstream consumers must branch.

use serde::{Deserialize, Serialize};

/// Result of a weather lookup: a forecast or a typed, human-readable error.
///
/// Serialized untagged so the prompt sees either the forecast object or the
/// `{error, locationName}` object, matching what the generation service is
/// instructed to branch on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeatherLookup {
    Forecast(DailyForecast),
    Unavailable(ForecastError),
}

impl WeatherLookup {
    /// The error payload, if the lookup failed.
    pub fn error(&self) -> Option<&ForecastError> {
        match self {
            WeatherLookup::Forecast(_) => None,
            WeatherLookup::Unavailable(e) => Some(e),
        }
    }
}

/// Canonical daily forecast for the user's location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// Resolved location name, e.g. "London"
    pub location_name: String,
    /// Friendly date label, e.g. "Tuesday, July 30"
    pub date: String,
    /// General summary of the day's weather
    pub overall_description: String,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Local time label, e.g. "6:00 AM"
    pub sunrise: String,
    /// Local time label, e.g. "8:30 PM"
    pub sunset: String,
    /// Average humidity for the day (percent)
    pub humidity_avg: f64,
    /// Average wind speed for the day (user's preferred unit)
    pub wind_avg: f64,
    /// Up to 24 hourly forecast segments
    pub hourly: Vec<HourlyForecast>,
}

/// One hourly forecast segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecast {
    /// Local time label, e.g. "9:00 AM"
    pub time: String,
    pub temp: f64,
    pub feels_like: f64,
    /// Weather description, e.g. "Light Rain"
    pub description: String,
    /// Probability of precipitation, 0-100
    pub pop: f64,
    pub wind_speed: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_gust: Option<f64>,
    /// Provider icon code
    pub icon: String,
}

/// Typed weather failure with best-effort location context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastError {
    /// Human-readable failure message
    pub error: String,
    /// Best-known location name, when resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

impl ForecastError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            location_name: None,
        }
    }

    pub fn at(error: impl Into<String>, location_name: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            location_name: Some(location_name.into()),
        }
    }
}
