// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard content and cache record models.
//!
//! `DashboardContent` is the synthesized output of the content pipeline;
//! `DashboardCache` is the per-user persisted record. Both use camelCase
//! field names to match the document layout the web client reads.

use crate::models::user::{NewsSearchCategory, WeatherUnit};
use serde::{Deserialize, Serialize};

/// Synthesized dashboard content, always schema-valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardContent {
    /// Personalized greeting (non-empty)
    pub greeting: String,
    /// Human-readable weather narrative; states unavailability explicitly
    /// when the weather lookup failed
    pub weather_summary: String,
    /// The day's workout text, passed through for display
    pub workout_for_display: String,
    /// Up to 5 validated news stories
    pub top_stories: Vec<NewsItem>,
    /// Message when the training plan has ended, otherwise None
    pub plan_end_notification: Option<String>,
    /// Clothing recommendations; empty whenever weather was unavailable
    pub dress_my_run_suggestion: Vec<ClothingItem>,
}

/// A validated news story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    /// Absolute URL, validated before acceptance
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A single clothing recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    /// Specific item, e.g. "Lightweight, moisture-wicking t-shirt"
    pub item: String,
    pub category: ClothingCategory,
}

/// The fixed set of clothing categories a recommendation may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClothingCategory {
    Hat,
    Visor,
    Sunglasses,
    Headband,
    Shirt,
    TankTop,
    LongSleeve,
    BaseLayer,
    MidLayer,
    Jacket,
    Vest,
    Windbreaker,
    RainJacket,
    Shorts,
    Capris,
    Tights,
    Pants,
    Gloves,
    Mittens,
    Socks,
    Shoes,
    Gaiter,
    Balaclava,
    Accessory,
}

impl ClothingCategory {
    /// Lenient parse for untrusted generated output: case-insensitive,
    /// accepts spaces or underscores in place of hyphens. Unknown values
    /// are rejected (the caller drops the entry).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        serde_json::from_value(serde_json::Value::String(normalized)).ok()
    }
}

/// Per-user cached dashboard record, keyed by user ID.
///
/// Superseded by newer records via merge-upsert; never deleted by the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCache {
    /// Document ID (same as user_id)
    pub id: String,
    pub user_id: String,
    /// ISO date (YYYY-MM-DD) the content was generated for
    pub cache_date: String,
    #[serde(flatten)]
    pub content: DashboardContent,
    /// Fingerprint of the inputs the content was generated from
    pub cached_inputs: CachedInputs,
}

/// Fingerprint of the profile/plan inputs that affect generated content.
///
/// Categories are normalized to a sorted set on construction so that
/// reordering a preference list never forces regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedInputs {
    pub location_city: String,
    pub weather_unit: WeatherUnit,
    pub news_search_categories: Vec<NewsSearchCategory>,
    pub training_plan_id: Option<String>,
}

impl CachedInputs {
    pub fn new(
        location_city: String,
        weather_unit: WeatherUnit,
        mut news_search_categories: Vec<NewsSearchCategory>,
        training_plan_id: Option<String>,
    ) -> Self {
        news_search_categories.sort();
        news_search_categories.dedup();
        Self {
            location_city,
            weather_unit,
            news_search_categories,
            training_plan_id,
        }
    }

    /// Structural equality with set semantics for categories.
    ///
    /// Persisted records may predate the sorted-on-construction guarantee,
    /// so both sides are normalized before comparison.
    pub fn matches(&self, other: &CachedInputs) -> bool {
        self.location_city == other.location_city
            && self.weather_unit == other.weather_unit
            && self.training_plan_id == other.training_plan_id
            && sorted(&self.news_search_categories) == sorted(&other.news_search_categories)
    }
}

fn sorted(categories: &[NewsSearchCategory]) -> Vec<NewsSearchCategory> {
    let mut v = categories.to_vec();
    v.sort();
    v.dedup();
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clothing_category_parse_lenient() {
        assert_eq!(ClothingCategory::parse("tank-top"), Some(ClothingCategory::TankTop));
        assert_eq!(ClothingCategory::parse("Tank Top"), Some(ClothingCategory::TankTop));
        assert_eq!(ClothingCategory::parse("RAIN_JACKET"), Some(ClothingCategory::RainJacket));
        assert_eq!(ClothingCategory::parse("  shoes "), Some(ClothingCategory::Shoes));
        assert_eq!(ClothingCategory::parse("snorkel"), None);
        assert_eq!(ClothingCategory::parse(""), None);
    }

    #[test]
    fn test_cached_inputs_category_order_insensitive() {
        let a = CachedInputs::new(
            "Austin".to_string(),
            WeatherUnit::C,
            vec![NewsSearchCategory::Training, NewsSearchCategory::Nutrition],
            None,
        );
        let b = CachedInputs::new(
            "Austin".to_string(),
            WeatherUnit::C,
            vec![NewsSearchCategory::Nutrition, NewsSearchCategory::Training],
            None,
        );
        assert!(a.matches(&b));
    }

    #[test]
    fn test_cached_inputs_unit_drift_mismatch() {
        let a = CachedInputs::new("Austin".to_string(), WeatherUnit::C, vec![], None);
        let b = CachedInputs::new("Austin".to_string(), WeatherUnit::F, vec![], None);
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_cached_inputs_plan_change_mismatch() {
        let a = CachedInputs::new("Austin".to_string(), WeatherUnit::C, vec![], None);
        let b = CachedInputs::new(
            "Austin".to_string(),
            WeatherUnit::C,
            vec![],
            Some("plan-1".to_string()),
        );
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_cache_record_persisted_layout() {
        let record = DashboardCache {
            id: "u1".to_string(),
            user_id: "u1".to_string(),
            cache_date: "2026-08-30".to_string(),
            content: DashboardContent {
                greeting: "Hi".to_string(),
                weather_summary: "Sunny".to_string(),
                workout_for_display: "Rest day".to_string(),
                top_stories: vec![],
                plan_end_notification: None,
                dress_my_run_suggestion: vec![],
            },
            cached_inputs: CachedInputs::new("Austin".to_string(), WeatherUnit::C, vec![], None),
        };

        let json = serde_json::to_value(&record).unwrap();
        // Content fields are flattened into the record document.
        assert_eq!(json["cacheDate"], "2026-08-30");
        assert_eq!(json["greeting"], "Hi");
        assert_eq!(json["workoutForDisplay"], "Rest day");
        assert_eq!(json["cachedInputs"]["locationCity"], "Austin");
        assert_eq!(json["cachedInputs"]["weatherUnit"], "C");
    }
}
