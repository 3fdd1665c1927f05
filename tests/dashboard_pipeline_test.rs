// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Orchestrator behavior tests: sanitization of untrusted generated
//! content and the fallback chain.

mod common;

use common::{generated_output, sample_forecast, test_orchestrator, MockGenerator};
use runmate::models::{ClothingCategory, ForecastError, NewsSearchCategory, WeatherLookup, WeatherUnit};
use runmate::services::dashboard::DashboardInput;
use serde_json::json;
use std::sync::Arc;

fn input_with_weather(weather: WeatherLookup) -> DashboardInput {
    DashboardInput {
        user_name: "Sam".to_string(),
        location_city: "Austin".to_string(),
        running_level: "Intermediate".to_string(),
        goal: "Marathon".to_string(),
        todays_workout: "Easy 5k".to_string(),
        detailed_weather: weather,
        weather_unit: WeatherUnit::C,
        news_search_categories: vec![NewsSearchCategory::Training],
    }
}

#[tokio::test]
async fn test_weather_error_forces_empty_clothing() {
    // The generator disobeys and returns clothing anyway.
    let generator = Arc::new(MockGenerator::returning(generated_output("Hi Sam!")));
    let orchestrator = test_orchestrator(generator);

    let input = input_with_weather(WeatherLookup::Unavailable(ForecastError::at(
        "City not found",
        "Austin",
    )));
    let content = orchestrator.generate(&input).await;

    assert!(content.dress_my_run_suggestion.is_empty());
    assert_eq!(content.greeting, "Hi Sam!");
}

#[tokio::test]
async fn test_clothing_kept_when_weather_succeeded() {
    let generator = Arc::new(MockGenerator::returning(generated_output("Hi Sam!")));
    let orchestrator = test_orchestrator(generator);

    let input = input_with_weather(WeatherLookup::Forecast(sample_forecast("Austin")));
    let content = orchestrator.generate(&input).await;

    assert_eq!(content.dress_my_run_suggestion.len(), 1);
    assert_eq!(
        content.dress_my_run_suggestion[0].category,
        ClothingCategory::Shirt
    );
}

#[tokio::test]
async fn test_stories_bounded_and_invalid_dropped() {
    let mut output = generated_output("Hi Sam!");
    output["topStories"] = json!([
        { "title": "A", "summary": "s", "url": "https://example.com/1" },
        { "title": "B", "summary": "s", "url": "https://example.com/2" },
        { "title": "C", "summary": "s", "url": "/relative" },
        { "title": "", "summary": "s", "url": "https://example.com/3" },
        { "title": "D", "summary": "s", "url": "https://example.com/4" },
        { "title": "E", "summary": "s", "url": "https://example.com/5" },
        { "title": "F", "summary": "s", "url": "https://example.com/6" },
        { "title": "G", "summary": "s", "url": "https://example.com/7" },
    ]);
    let generator = Arc::new(MockGenerator::returning(output));
    let orchestrator = test_orchestrator(generator);

    let input = input_with_weather(WeatherLookup::Forecast(sample_forecast("Austin")));
    let content = orchestrator.generate(&input).await;

    let titles: Vec<&str> = content.top_stories.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "D", "E", "F"]);
}

#[tokio::test]
async fn test_unknown_clothing_category_dropped() {
    let mut output = generated_output("Hi Sam!");
    output["dressMyRunSuggestion"] = json!([
        { "item": "Cap", "category": "hat" },
        { "item": "Snorkel", "category": "snorkel" },
    ]);
    let generator = Arc::new(MockGenerator::returning(output));
    let orchestrator = test_orchestrator(generator);

    let input = input_with_weather(WeatherLookup::Forecast(sample_forecast("Austin")));
    let content = orchestrator.generate(&input).await;

    assert_eq!(content.dress_my_run_suggestion.len(), 1);
    assert_eq!(content.dress_my_run_suggestion[0].item, "Cap");
}

#[tokio::test]
async fn test_empty_plan_end_notification_is_none() {
    let mut output = generated_output("Hi Sam!");
    output["planEndNotification"] = json!("   ");
    let generator = Arc::new(MockGenerator::returning(output));
    let orchestrator = test_orchestrator(generator);

    let input = input_with_weather(WeatherLookup::Forecast(sample_forecast("Austin")));
    let content = orchestrator.generate(&input).await;

    assert_eq!(content.plan_end_notification, None);
}

#[tokio::test]
async fn test_generator_failure_falls_back_completely() {
    let generator = Arc::new(MockGenerator::failing().with_text(Some("Run like the wind.")));
    let orchestrator = test_orchestrator(generator);

    let input = input_with_weather(WeatherLookup::Forecast(sample_forecast("Austin")));
    let content = orchestrator.generate(&input).await;

    // Greeting still generated from the pun path.
    assert!(content.greeting.contains("Sam"));
    assert!(content.greeting.contains("Run like the wind."));
    assert_eq!(content.workout_for_display, "Easy 5k");
    assert!(content.top_stories.is_empty());
    assert!(content.dress_my_run_suggestion.is_empty());
    assert_eq!(content.plan_end_notification, None);
    assert!(content.weather_summary.contains("Austin"));
}

#[tokio::test]
async fn test_everything_failing_yields_static_content() {
    let generator = Arc::new(MockGenerator::failing());
    let orchestrator = test_orchestrator(generator);

    let input = input_with_weather(WeatherLookup::Unavailable(ForecastError::new(
        "City not found",
    )));
    let content = orchestrator.generate(&input).await;

    assert_eq!(
        content.greeting,
        "Hello Sam, your personalized dashboard content could not be generated at this time."
    );
    assert_eq!(
        content.weather_summary,
        "Weather forecast for Austin is currently unavailable: City not found."
    );
    assert_eq!(content.workout_for_display, "Easy 5k");
    assert!(content.top_stories.is_empty());
    assert!(content.dress_my_run_suggestion.is_empty());
}

#[tokio::test]
async fn test_malformed_output_falls_back() {
    let generator =
        Arc::new(MockGenerator::returning(json!("not an object")).with_text(Some("Pun.")));
    let orchestrator = test_orchestrator(generator);

    let input = input_with_weather(WeatherLookup::Forecast(sample_forecast("Austin")));
    let content = orchestrator.generate(&input).await;

    // Fallback path: no generated weather narrative, but still complete.
    assert!(content.weather_summary.contains("Could not generate"));
    assert!(!content.greeting.is_empty());
}

#[tokio::test]
async fn test_missing_greeting_falls_back() {
    let mut output = generated_output("ignored");
    output["greeting"] = json!("");
    let generator = Arc::new(MockGenerator::returning(output).with_text(Some("Pun.")));
    let orchestrator = test_orchestrator(generator);

    let input = input_with_weather(WeatherLookup::Forecast(sample_forecast("Austin")));
    let content = orchestrator.generate(&input).await;

    assert!(content.greeting.contains("Pun."));
}
