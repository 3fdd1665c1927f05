// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use runmate::config::Config;
use runmate::db::{DashboardStore, FirestoreDb};
use runmate::error::AppError;
use runmate::models::{
    CachedInputs, DailyForecast, DashboardCache, DashboardContent, HourlyForecast, NewsSearchCategory,
    WeatherUnit,
};
use runmate::services::genai::{ContentGenerator, GenerationError, ToolHandler};
use runmate::services::{
    DashboardCacheManager, DashboardOrchestrator, DashboardRequest, GeminiClient, GreetingService,
    NewsService, WeatherService,
};
use runmate::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

// ─── Stores ──────────────────────────────────────────────────────

/// In-memory store standing in for Firestore.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, DashboardCache>>,
}

impl MemoryStore {
    #[allow(dead_code)]
    pub fn seeded(record: DashboardCache) -> Self {
        let store = Self::default();
        store
            .records
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record);
        store
    }

    #[allow(dead_code)]
    pub fn record_for(&self, user_id: &str) -> Option<DashboardCache> {
        self.records.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl DashboardStore for MemoryStore {
    async fn get_dashboard_cache(&self, user_id: &str) -> Result<Option<DashboardCache>, AppError> {
        Ok(self.records.lock().unwrap().get(user_id).cloned())
    }

    async fn upsert_dashboard_cache(&self, record: &DashboardCache) -> Result<(), AppError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record.clone());
        Ok(())
    }
}

/// Store where every operation fails, for read/write degradation tests.
pub struct FailingStore;

#[async_trait]
impl DashboardStore for FailingStore {
    async fn get_dashboard_cache(
        &self,
        _user_id: &str,
    ) -> Result<Option<DashboardCache>, AppError> {
        Err(AppError::Database("store unavailable".to_string()))
    }

    async fn upsert_dashboard_cache(&self, _record: &DashboardCache) -> Result<(), AppError> {
        Err(AppError::Database("store unavailable".to_string()))
    }
}

// ─── Generator ───────────────────────────────────────────────────

/// Scripted generation service with a call counter and optional delay.
pub struct MockGenerator {
    output: Option<Value>,
    text: Option<String>,
    delay: Duration,
    generate_calls: AtomicUsize,
}

impl MockGenerator {
    /// Generator whose combined generation always returns `output`.
    pub fn returning(output: Value) -> Self {
        Self {
            output: Some(output),
            text: Some("I'm fast and I cannot tie.".to_string()),
            delay: Duration::ZERO,
            generate_calls: AtomicUsize::new(0),
        }
    }

    /// Generator where every call fails.
    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self {
            output: None,
            text: None,
            delay: Duration::ZERO,
            generate_calls: AtomicUsize::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn with_text(mut self, text: Option<&str>) -> Self {
        self.text = text.map(str::to_string);
        self
    }

    #[allow(dead_code)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of combined generation calls observed.
    pub fn calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _tools: &dyn ToolHandler,
    ) -> Result<Value, GenerationError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.output
            .clone()
            .ok_or_else(|| GenerationError::Api("scripted failure".to_string()))
    }

    async fn generate_text(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.text.clone().ok_or(GenerationError::Empty)
    }
}

// ─── Builders ────────────────────────────────────────────────────

/// A complete, valid generated dashboard payload.
#[allow(dead_code)]
pub fn generated_output(greeting: &str) -> Value {
    json!({
        "greeting": greeting,
        "weatherSummary": "Clear skies all day; best window is 7 AM.",
        "workoutForDisplay": "Easy 5k",
        "topStories": [],
        "planEndNotification": null,
        "dressMyRunSuggestion": [
            { "item": "Lightweight t-shirt", "category": "shirt" }
        ]
    })
}

#[allow(dead_code)]
pub fn test_request(user_id: &str) -> DashboardRequest {
    DashboardRequest {
        user_id: user_id.to_string(),
        user_name: "Sam".to_string(),
        location_city: "Austin".to_string(),
        running_level: "Intermediate".to_string(),
        goal: "Marathon".to_string(),
        todays_workout: "Easy 5k".to_string(),
        weather_unit: WeatherUnit::C,
        news_search_categories: vec![NewsSearchCategory::Training, NewsSearchCategory::Nutrition],
        training_plan_id: Some("plan-1".to_string()),
    }
}

/// A cached record that is fresh for `request` on `date`.
#[allow(dead_code)]
pub fn cached_record(request: &DashboardRequest, date: &str) -> DashboardCache {
    DashboardCache {
        id: request.user_id.clone(),
        user_id: request.user_id.clone(),
        cache_date: date.to_string(),
        content: DashboardContent {
            greeting: "Cached greeting".to_string(),
            weather_summary: "Cached weather".to_string(),
            workout_for_display: "Cached workout".to_string(),
            top_stories: vec![],
            plan_end_notification: None,
            dress_my_run_suggestion: vec![],
        },
        cached_inputs: CachedInputs::new(
            request.location_city.clone(),
            request.weather_unit,
            request.news_search_categories.clone(),
            request.training_plan_id.clone(),
        ),
    }
}

/// Wire a cache manager with no provider credentials: the weather lookup
/// reports "not configured" and news degrades, so no test touches the
/// network.
#[allow(dead_code)]
pub fn test_manager(
    store: Arc<dyn DashboardStore>,
    generator: Arc<MockGenerator>,
) -> DashboardCacheManager {
    DashboardCacheManager::new(
        store,
        WeatherService::new(None),
        test_orchestrator(generator),
    )
}

#[allow(dead_code)]
pub fn test_orchestrator(generator: Arc<MockGenerator>) -> DashboardOrchestrator {
    DashboardOrchestrator::new(
        generator.clone(),
        GreetingService::new(generator),
        NewsService::new(None, None),
    )
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = FirestoreDb::new_mock();

    let generator = Arc::new(GeminiClient::new(None, config.gemini_model.clone()));
    let orchestrator = DashboardOrchestrator::new(
        generator.clone(),
        GreetingService::new(generator),
        NewsService::new(None, None),
    );
    let dashboard =
        DashboardCacheManager::new(Arc::new(db.clone()), WeatherService::new(None), orchestrator);

    let state = Arc::new(AppState {
        config,
        db,
        dashboard,
    });
    (runmate::routes::create_router(state.clone()), state)
}

/// A plausible daily forecast for orchestrator tests.
#[allow(dead_code)]
pub fn sample_forecast(city: &str) -> DailyForecast {
    DailyForecast {
        location_name: city.to_string(),
        date: "Tuesday, July 30".to_string(),
        overall_description: "Scattered clouds".to_string(),
        temp_min: 14.0,
        temp_max: 26.0,
        sunrise: "6:12 AM".to_string(),
        sunset: "8:24 PM".to_string(),
        humidity_avg: 65.0,
        wind_avg: 7.5,
        hourly: vec![HourlyForecast {
            time: "7:00 AM".to_string(),
            temp: 16.0,
            feels_like: 15.5,
            description: "Clear sky".to_string(),
            pop: 5.0,
            wind_speed: 4.0,
            wind_gust: None,
            icon: "01d".to_string(),
        }],
    }
}
