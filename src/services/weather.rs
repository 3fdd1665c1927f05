// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather normalizer (OpenWeatherMap).
//!
//! Resolves a city to coordinates, fetches the One Call forecast and
//! normalizes it into the canonical [`DailyForecast`] record. Every failure
//! mode (missing key, city not found, transport, malformed payload) is
//! reported as a [`ForecastError`] with a human-readable message; nothing is
//! thrown past this boundary. No retries are attempted here; the caller
//! decides whether to retry.

use crate::models::user::WeatherUnit;
use crate::models::weather::{DailyForecast, ForecastError, HourlyForecast, WeatherLookup};
use crate::time_utils;
use serde::Deserialize;
use std::time::Duration;

const GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";
const ONECALL_BASE_URL: &str = "https://api.openweathermap.org/data/3.0";

/// Bounded timeout per provider call.
const WEATHER_TIMEOUT_SECS: u64 = 10;

/// Cap on hourly segments carried into the canonical record.
const MAX_HOURLY_SEGMENTS: usize = 24;

/// Weather lookup service.
#[derive(Clone)]
pub struct WeatherService {
    http: reqwest::Client,
    geo_base_url: String,
    onecall_base_url: String,
    api_key: Option<String>,
}

impl WeatherService {
    pub fn new(api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(WEATHER_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http,
            geo_base_url: GEO_BASE_URL.to_string(),
            onecall_base_url: ONECALL_BASE_URL.to_string(),
            api_key,
        }
    }

    /// Look up the forecast for a city. Total: always returns a lookup,
    /// never an error.
    pub async fn lookup(&self, city: &str, unit: WeatherUnit) -> WeatherLookup {
        let Some(api_key) = self.api_key.as_deref() else {
            return WeatherLookup::Unavailable(ForecastError::new(
                "Weather service is not configured (missing API key)",
            ));
        };

        let city = city.trim();
        if city.is_empty() {
            return WeatherLookup::Unavailable(ForecastError::new(
                "No location set in profile",
            ));
        }

        let hit = match self.geocode(api_key, city).await {
            Ok(hit) => hit,
            Err(e) => return WeatherLookup::Unavailable(e),
        };

        let raw = match self.fetch_forecast(api_key, hit.lat, hit.lon, unit).await {
            Ok(raw) => raw,
            Err(msg) => {
                return WeatherLookup::Unavailable(ForecastError::at(msg, hit.name));
            }
        };

        match normalize(&hit.name, raw) {
            Ok(forecast) => WeatherLookup::Forecast(forecast),
            Err(msg) => WeatherLookup::Unavailable(ForecastError::at(msg, hit.name)),
        }
    }

    /// Resolve a city name to coordinates.
    async fn geocode(&self, api_key: &str, city: &str) -> Result<GeoHit, ForecastError> {
        let url = format!("{}/direct", self.geo_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", city), ("limit", "1"), ("appid", api_key)])
            .send()
            .await
            .map_err(|e| {
                ForecastError::new(format!("Could not reach the weather service: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(ForecastError::new(format!(
                "Geocoding failed with status {}",
                response.status()
            )));
        }

        let hits: Vec<GeoHit> = response.json().await.map_err(|e| {
            ForecastError::new(format!("Malformed geocoding response: {}", e))
        })?;

        hits.into_iter()
            .next()
            .ok_or_else(|| ForecastError::at("City not found", city))
    }

    /// Fetch the raw One Call forecast for coordinates.
    async fn fetch_forecast(
        &self,
        api_key: &str,
        lat: f64,
        lon: f64,
        unit: WeatherUnit,
    ) -> Result<OneCallResponse, String> {
        let url = format!("{}/onecall", self.onecall_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", unit.api_units().to_string()),
                ("exclude", "minutely,alerts".to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await
            .map_err(|e| format!("Could not reach the weather service: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            return Err(format!("Forecast request failed ({}): {}", status, message));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Malformed forecast response: {}", e))
    }
}

/// Normalize a raw One Call payload into the canonical daily record.
fn normalize(location_name: &str, raw: OneCallResponse) -> Result<DailyForecast, String> {
    let offset = raw.timezone_offset;

    let today = raw
        .daily
        .and_then(|mut days| {
            if days.is_empty() {
                None
            } else {
                Some(days.remove(0))
            }
        })
        .ok_or_else(|| "Forecast data was incomplete (no daily entry)".to_string())?;

    let hourly_raw = raw
        .hourly
        .filter(|h| !h.is_empty())
        .ok_or_else(|| "Forecast data was incomplete (no hourly entries)".to_string())?;

    let hourly: Vec<HourlyForecast> = hourly_raw
        .into_iter()
        .take(MAX_HOURLY_SEGMENTS)
        .map(|h| {
            let condition = h.weather.first();
            HourlyForecast {
                time: time_utils::time_of_day_label(h.dt, offset),
                temp: h.temp,
                feels_like: h.feels_like,
                description: condition
                    .map(|c| capitalize(&c.description))
                    .unwrap_or_default(),
                pop: scale_pop(h.pop),
                wind_speed: h.wind_speed,
                wind_gust: h.wind_gust,
                icon: condition.map(|c| c.icon.clone()).unwrap_or_default(),
            }
        })
        .collect();

    let overall_description = today
        .summary
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| {
            today
                .weather
                .first()
                .map(|c| capitalize(&c.description))
                .unwrap_or_else(|| "No description available".to_string())
        });

    Ok(DailyForecast {
        location_name: location_name.to_string(),
        date: time_utils::day_label(today.dt, offset),
        overall_description,
        temp_min: today.temp.min,
        temp_max: today.temp.max,
        sunrise: time_utils::time_of_day_label(today.sunrise, offset),
        sunset: time_utils::time_of_day_label(today.sunset, offset),
        humidity_avg: today.humidity,
        wind_avg: today.wind_speed,
        hourly,
    })
}

/// Provider pop is 0-1; the canonical record uses 0-100.
fn scale_pop(pop: f64) -> f64 {
    (pop * 100.0).round().clamp(0.0, 100.0)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ─── Wire Types (OpenWeatherMap) ─────────────────────────────────

#[derive(Debug, Deserialize)]
struct GeoHit {
    name: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    timezone_offset: i64,
    hourly: Option<Vec<RawHourly>>,
    daily: Option<Vec<RawDaily>>,
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    dt: i64,
    temp: f64,
    feels_like: f64,
    wind_speed: f64,
    wind_gust: Option<f64>,
    /// 0-1 range
    #[serde(default)]
    pop: f64,
    #[serde(default)]
    weather: Vec<RawCondition>,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    dt: i64,
    sunrise: i64,
    sunset: i64,
    #[serde(default)]
    humidity: f64,
    wind_speed: f64,
    summary: Option<String>,
    temp: RawDailyTemp,
    #[serde(default)]
    weather: Vec<RawCondition>,
}

#[derive(Debug, Deserialize)]
struct RawDailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    description: String,
    icon: String,
}
