// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard content orchestrator.
//!
//! Composes weather, news and greeting generation into one dashboard
//! synthesis call, then enforces the output invariants no matter what the
//! generation service returned. The generation service is untrusted and
//! non-deterministic: sanitization here is mandatory, and this module is the
//! enforcement point for cross-field invariants (a weather error always
//! yields an empty clothing list, failed news always yields an empty story
//! list).
//!
//! `generate` is total: for every input and every collaborator failure it
//! produces a schema-valid `DashboardContent`. Callers never need a
//! catch-all around it.

use crate::models::dashboard::{ClothingCategory, ClothingItem, DashboardContent, NewsItem};
use crate::models::user::{NewsSearchCategory, WeatherUnit};
use crate::models::weather::WeatherLookup;
use crate::services::genai::{
    ContentGenerator, GenerationError, ToolDeclaration, ToolHandler,
};
use crate::services::greeting::{self, GreetingService};
use crate::services::news::NewsService;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const GREETING_TOOL: &str = "generateMotivationalPun";
const NEWS_TOOL: &str = "fetchRunningNews";

/// Maximum number of top stories in the output.
const MAX_TOP_STORIES: usize = 5;

/// Resolved inputs for one dashboard generation.
///
/// Weather is already resolved (success or error) before the orchestrator
/// runs; it is never a pending value.
#[derive(Debug, Clone)]
pub struct DashboardInput {
    pub user_name: String,
    pub location_city: String,
    pub running_level: String,
    pub goal: String,
    pub todays_workout: String,
    pub detailed_weather: WeatherLookup,
    pub weather_unit: WeatherUnit,
    pub news_search_categories: Vec<NewsSearchCategory>,
}

/// The content orchestrator.
#[derive(Clone)]
pub struct DashboardOrchestrator {
    generator: Arc<dyn ContentGenerator>,
    greetings: GreetingService,
    news: NewsService,
}

impl DashboardOrchestrator {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        greetings: GreetingService,
        news: NewsService,
    ) -> Self {
        Self {
            generator,
            greetings,
            news,
        }
    }

    /// Generate dashboard content. Total: never returns an error.
    pub async fn generate(&self, input: &DashboardInput) -> DashboardContent {
        match self.generate_primary(input).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    user = %input.user_name,
                    "Primary dashboard generation failed, running fallback chain"
                );
                self.fallback(input).await
            }
        }
    }

    /// One combined generation call with greeting and news tools, followed
    /// by mandatory sanitization.
    async fn generate_primary(
        &self,
        input: &DashboardInput,
    ) -> Result<DashboardContent, GenerationError> {
        let prompt = build_prompt(input)?;
        let tools = DashboardTools {
            input,
            greetings: &self.greetings,
            news: &self.news,
        };

        let raw = self.generator.generate(&prompt, &tools).await?;
        let parsed: RawGenerated = serde_json::from_value(raw)
            .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;

        sanitize(parsed, input)
    }

    /// Fallback chain: each sub-step is independently failure-safe, so a
    /// broken generation service still yields a complete dashboard.
    async fn fallback(&self, input: &DashboardInput) -> DashboardContent {
        let greeting = match self.greetings.generate(&input.user_name).await {
            Ok(g) => g,
            Err(e) => {
                tracing::debug!(error = %e, "Fallback greeting generation failed, using static");
                greeting::static_greeting(&input.user_name)
            }
        };

        let weather_summary =
            fallback_weather_summary(&input.location_city, &input.detailed_weather);

        let workout_for_display = if input.todays_workout.trim().is_empty() {
            "No workout information available.".to_string()
        } else {
            input.todays_workout.clone()
        };

        // News lookup is total; a failed lookup carries an empty list.
        let lookup = self
            .news
            .fetch(&input.location_city, &input.news_search_categories)
            .await;
        if let Some(error) = &lookup.error {
            tracing::debug!(error = %error, "Fallback news lookup failed");
        }
        let top_stories = lookup
            .articles
            .into_iter()
            .map(|a| NewsItem {
                title: a.title,
                summary: a.snippet,
                url: a.link,
                source: a.source,
            })
            .collect();

        DashboardContent {
            greeting,
            weather_summary,
            workout_for_display,
            top_stories,
            plan_end_notification: None,
            dress_my_run_suggestion: Vec::new(),
        }
    }
}

/// Weather summary used on the fallback path.
///
/// The error branch reproduces the full unavailability message; the success
/// branch deliberately does NOT re-derive the narrative a successful
/// generation would produce.
fn fallback_weather_summary(location_city: &str, weather: &WeatherLookup) -> String {
    let city = if location_city.trim().is_empty() {
        "your location"
    } else {
        location_city
    };

    match weather.error() {
        Some(err) => {
            let msg = err.error.trim_end();
            let period = if msg.ends_with(['.', '!', '?']) { "" } else { "." };
            format!(
                "Weather forecast for {} is currently unavailable: {}{}",
                city, msg, period
            )
        }
        None => format!(
            "Could not generate a weather summary and running recommendation for {} at this time. Please check back later.",
            city
        ),
    }
}

// ─── Prompt Construction ─────────────────────────────────────────

fn build_prompt(input: &DashboardInput) -> Result<String, GenerationError> {
    let weather_json = serde_json::to_string(&input.detailed_weather)
        .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;
    let categories_json = serde_json::to_string(&input.news_search_categories)
        .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;

    Ok(format!(
        r#"You are an AI assistant for a running companion app. Generate all content for the user's daily dashboard.

User details:
- Name: {name}
- Location: {city}
- Running level: {level}
- Goal: {goal}
- Today's workout: {workout}
- Weather unit: {unit}
- Weather data or error (JSON): {weather}
- News search categories (JSON): {categories}

Respond with a single JSON object with exactly these fields:
"greeting", "weatherSummary", "workoutForDisplay", "topStories", "planEndNotification", "dressMyRunSuggestion".

Follow these steps precisely:

1. greeting: call the '{greeting_tool}' tool with {{"userName": "{name}"}} and use the returned greeting.

2. weatherSummary: if the weather JSON contains an "error" field, this MUST be exactly "Weather forecast for {city} is currently unavailable: <error>." and dressMyRunSuggestion MUST be []. Otherwise write one coherent paragraph: today's overall conditions, high/low with {unit}, sunrise/sunset and average humidity, then analyze the hourly segments (time, temp, feelsLike, pop, windSpeed) and recommend the best time slot to run, preferring low precipitation chance, moderate feels-like temperatures and lower wind.

3. workoutForDisplay: the exact string "{workout}".

4. topStories: call the '{news_tool}' tool with {{"userLocation": "{city}", "searchCategories": {categories}}}. If the tool reports an error or returns no articles, topStories MUST be []. Never invent articles. Otherwise map each article to {{"title", "summary" (the snippet), "url" (the link), "source"}}.

5. planEndNotification: if today's workout indicates the plan is finished (phrases like "plan completed" or "final workout"), congratulate {name} and suggest setting a new goal; otherwise null.

6. dressMyRunSuggestion: a detailed, itemized clothing list for the recommended run time, each entry {{"item": "specific item", "category": "<one of: hat, visor, sunglasses, headband, shirt, tank-top, long-sleeve, base-layer, mid-layer, jacket, vest, windbreaker, rain-jacket, shorts, capris, tights, pants, gloves, mittens, socks, shoes, gaiter, balaclava, accessory>"}}. Empty array if weather is unavailable.

Output only the JSON object."#,
        name = input.user_name,
        city = input.location_city,
        level = input.running_level,
        goal = input.goal,
        workout = input.todays_workout,
        unit = input.weather_unit,
        weather = weather_json,
        categories = categories_json,
        greeting_tool = GREETING_TOOL,
        news_tool = NEWS_TOOL,
    ))
}

// ─── Tool Dispatch ───────────────────────────────────────────────

/// Tools exposed to the generation service for one dashboard request.
struct DashboardTools<'a> {
    input: &'a DashboardInput,
    greetings: &'a GreetingService,
    news: &'a NewsService,
}

#[async_trait]
impl ToolHandler for DashboardTools<'_> {
    fn declarations(&self) -> Vec<ToolDeclaration> {
        vec![
            ToolDeclaration {
                name: GREETING_TOOL.to_string(),
                description:
                    "Generates a friendly, motivational greeting with a running-related pun."
                        .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "userName": { "type": "string" }
                    },
                    "required": ["userName"]
                }),
            },
            ToolDeclaration {
                name: NEWS_TOOL.to_string(),
                description:
                    "Fetches recent running-related news articles from the last 30 days, \
                     optionally tailored by location and categories."
                        .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "userLocation": { "type": "string" },
                        "searchCategories": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    }
                }),
            },
        ]
    }

    async fn invoke(&self, name: &str, args: Value) -> Result<Value, GenerationError> {
        match name {
            GREETING_TOOL => {
                let user_name = args
                    .get("userName")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&self.input.user_name)
                    .to_string();
                let greeting = self.greetings.generate(&user_name).await.map_err(|e| {
                    GenerationError::ToolFailed(GREETING_TOOL.to_string(), e.to_string())
                })?;
                Ok(json!({ "greeting": greeting }))
            }
            NEWS_TOOL => {
                // Model-supplied arguments are untrusted; ignore anything
                // that does not parse and fall back to the request inputs.
                let parsed: NewsToolArgs = serde_json::from_value(args).unwrap_or_default();
                let location = parsed
                    .user_location
                    .unwrap_or_else(|| self.input.location_city.clone());
                let categories = parsed
                    .search_categories
                    .unwrap_or_else(|| self.input.news_search_categories.clone());

                let lookup = self.news.fetch(&location, &categories).await;
                serde_json::to_value(lookup)
                    .map_err(|e| GenerationError::MalformedOutput(e.to_string()))
            }
            other => Err(GenerationError::ToolFailed(
                other.to_string(),
                "unknown tool".to_string(),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NewsToolArgs {
    user_location: Option<String>,
    search_categories: Option<Vec<NewsSearchCategory>>,
}

// ─── Sanitization ────────────────────────────────────────────────

/// Lenient shape of the generated output; every field re-validated below.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGenerated {
    greeting: Option<String>,
    weather_summary: Option<String>,
    workout_for_display: Option<String>,
    #[serde(default)]
    top_stories: Option<Value>,
    #[serde(default)]
    plan_end_notification: Option<String>,
    #[serde(default)]
    dress_my_run_suggestion: Option<Value>,
}

/// Enforce the output invariants on untrusted generated content.
fn sanitize(
    raw: RawGenerated,
    input: &DashboardInput,
) -> Result<DashboardContent, GenerationError> {
    let greeting = raw
        .greeting
        .filter(|g| !g.trim().is_empty())
        .ok_or_else(|| GenerationError::MalformedOutput("missing greeting".to_string()))?;

    let weather_summary = raw
        .weather_summary
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| GenerationError::MalformedOutput("missing weather summary".to_string()))?;

    // Pass-through field: the request input is the source of truth when the
    // service omits it.
    let workout_for_display = raw
        .workout_for_display
        .filter(|w| !w.trim().is_empty())
        .unwrap_or_else(|| input.todays_workout.clone());

    let weather_failed = input.detailed_weather.error().is_some();

    Ok(DashboardContent {
        greeting,
        weather_summary,
        workout_for_display,
        top_stories: sanitize_stories(raw.top_stories.as_ref()),
        plan_end_notification: normalize_plan_end(raw.plan_end_notification),
        dress_my_run_suggestion: sanitize_clothing(
            raw.dress_my_run_suggestion.as_ref(),
            weather_failed,
        ),
    })
}

/// Filter stories to entries with a non-empty title, a string summary, a
/// syntactically valid absolute URL and a string-or-absent source; truncate
/// to the story limit. Anything else is coerced to an empty list.
fn sanitize_stories(value: Option<&Value>) -> Vec<NewsItem> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;

            let title = obj.get("title")?.as_str()?.trim();
            if title.is_empty() {
                return None;
            }

            let summary = obj.get("summary")?.as_str()?;

            let url = obj.get("url")?.as_str()?;
            if reqwest::Url::parse(url).is_err() {
                tracing::debug!(url = %url, title = %title, "Dropping story with invalid URL");
                return None;
            }

            let source = match obj.get("source") {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(_) => return None,
            };

            Some(NewsItem {
                title: title.to_string(),
                summary: summary.to_string(),
                url: url.to_string(),
                source,
            })
        })
        .take(MAX_TOP_STORIES)
        .collect()
}

/// Keep only entries with a non-empty item and a known clothing category.
/// When the original weather input was an error the list is forced empty,
/// regardless of what the service returned.
fn sanitize_clothing(value: Option<&Value>, weather_failed: bool) -> Vec<ClothingItem> {
    if weather_failed {
        return Vec::new();
    }

    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;

            let item = obj.get("item")?.as_str()?.trim();
            if item.is_empty() {
                return None;
            }

            let category = ClothingCategory::parse(obj.get("category")?.as_str()?)?;

            Some(ClothingItem {
                item: item.to_string(),
                category,
            })
        })
        .collect()
}

/// Empty or whitespace-only notifications become None.
fn normalize_plan_end(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weather::ForecastError;

    fn story(title: &str, url: &str) -> Value {
        json!({ "title": title, "summary": "s", "url": url })
    }

    #[test]
    fn test_sanitize_stories_non_array_is_empty() {
        assert!(sanitize_stories(None).is_empty());
        assert!(sanitize_stories(Some(&json!("nope"))).is_empty());
        assert!(sanitize_stories(Some(&json!({"a": 1}))).is_empty());
    }

    #[test]
    fn test_sanitize_stories_truncates_to_limit() {
        let entries: Vec<Value> = (0..8)
            .map(|i| story(&format!("t{}", i), &format!("https://example.com/{}", i)))
            .collect();
        let stories = sanitize_stories(Some(&Value::Array(entries)));
        assert_eq!(stories.len(), MAX_TOP_STORIES);
    }

    #[test]
    fn test_sanitize_stories_drops_invalid_entries() {
        let entries = json!([
            story("good", "https://example.com/a"),
            story("", "https://example.com/b"),
            story("relative", "/no/scheme"),
            { "title": "no url", "summary": "s" },
            { "title": "bad source", "summary": "s", "url": "https://example.com/c", "source": 42 },
            "not an object",
        ]);
        let stories = sanitize_stories(Some(&entries));
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].title, "good");
    }

    #[test]
    fn test_sanitize_clothing_forced_empty_on_weather_error() {
        let entries = json!([{ "item": "Rain jacket", "category": "rain-jacket" }]);
        assert!(sanitize_clothing(Some(&entries), true).is_empty());
    }

    #[test]
    fn test_sanitize_clothing_drops_unknown_categories() {
        let entries = json!([
            { "item": "Cap", "category": "hat" },
            { "item": "Snorkel", "category": "snorkel" },
            { "item": "", "category": "gloves" },
        ]);
        let items = sanitize_clothing(Some(&entries), false);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, ClothingCategory::Hat);
    }

    #[test]
    fn test_normalize_plan_end() {
        assert_eq!(normalize_plan_end(None), None);
        assert_eq!(normalize_plan_end(Some("  ".to_string())), None);
        assert_eq!(
            normalize_plan_end(Some("Congrats!".to_string())),
            Some("Congrats!".to_string())
        );
    }

    #[test]
    fn test_fallback_weather_summary_error_message() {
        let weather = WeatherLookup::Unavailable(ForecastError::new("City not found"));
        assert_eq!(
            fallback_weather_summary("Austin", &weather),
            "Weather forecast for Austin is currently unavailable: City not found."
        );
    }

    #[test]
    fn test_fallback_weather_summary_no_double_period() {
        let weather = WeatherLookup::Unavailable(ForecastError::new("Service exploded."));
        assert_eq!(
            fallback_weather_summary("Austin", &weather),
            "Weather forecast for Austin is currently unavailable: Service exploded."
        );
    }

    #[test]
    fn test_fallback_weather_summary_missing_city() {
        let weather = WeatherLookup::Unavailable(ForecastError::new("boom"));
        let summary = fallback_weather_summary("  ", &weather);
        assert!(summary.contains("your location"));
    }
}
