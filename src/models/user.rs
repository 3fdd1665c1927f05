// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User and training plan models.
//!
//! Documents are stored with camelCase field names to match the layout the
//! web client writes.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document ID (auth UID)
    pub id: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Profile settings that drive dashboard generation
    #[serde(default)]
    pub profile: UserProfile,
    /// Active training plan, if any
    #[serde(default)]
    pub training_plan_id: Option<String>,
}

impl User {
    /// Display name used in greetings.
    pub fn display_name(&self) -> &str {
        &self.first_name
    }
}

/// Profile settings that affect generated dashboard content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Running level, e.g. "Beginner"
    pub running_level: String,
    /// Primary training goal, e.g. "Marathon"
    pub goal: String,
    /// City used for weather and geographic news
    pub location_city: String,
    /// Preferred temperature unit
    pub weather_unit: WeatherUnit,
    /// Preferred news search categories
    pub news_search_categories: Vec<NewsSearchCategory>,
}

/// Temperature unit preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherUnit {
    #[default]
    C,
    F,
}

impl WeatherUnit {
    /// OpenWeatherMap `units` query parameter value.
    pub fn api_units(self) -> &'static str {
        match self {
            WeatherUnit::C => "metric",
            WeatherUnit::F => "imperial",
        }
    }
}

impl std::fmt::Display for WeatherUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherUnit::C => write!(f, "C"),
            WeatherUnit::F => write!(f, "F"),
        }
    }
}

/// News search categories a user can opt into.
///
/// `GeographicArea` is special: it scopes the search to the user's city
/// instead of contributing a keyword (see the news service).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NewsSearchCategory {
    GeographicArea,
    TrackRoadTrail,
    RunningTech,
    RunningApparel,
    MarathonMajors,
    Nutrition,
    Training,
}

impl NewsSearchCategory {
    /// Search keyword form (underscores become spaces).
    pub fn keyword(self) -> &'static str {
        match self {
            NewsSearchCategory::GeographicArea => "geographic area",
            NewsSearchCategory::TrackRoadTrail => "track road trail",
            NewsSearchCategory::RunningTech => "running tech",
            NewsSearchCategory::RunningApparel => "running apparel",
            NewsSearchCategory::MarathonMajors => "marathon majors",
            NewsSearchCategory::Nutrition => "nutrition",
            NewsSearchCategory::Training => "training",
        }
    }
}

/// A training plan with dated workout entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
    pub id: String,
    pub user_id: String,
    /// ISO date (YYYY-MM-DD)
    pub start_date: String,
    /// ISO date (YYYY-MM-DD)
    pub end_date: String,
    #[serde(default)]
    pub workouts: Vec<Workout>,
}

impl TrainingPlan {
    /// The workout description scheduled for `date` (ISO YYYY-MM-DD),
    /// or "Rest day" if nothing is scheduled.
    pub fn workout_for(&self, date: &str) -> String {
        self.workouts
            .iter()
            .find(|w| w.date == date)
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Rest day".to_string())
    }
}

/// A single scheduled workout within a training plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub workout_type: String,
    #[serde(default)]
    pub completed: bool,
}
