// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard cache manager.
//!
//! Front door of the dashboard pipeline: returns cached content when it is
//! still valid for today's date and the current profile fingerprint, and
//! otherwise regenerates it exactly once per user at a time. Concurrent
//! requests for the same user coalesce on a per-user latch; requests for
//! different users never contend.
//!
//! Persistence is best-effort and off the request path: the freshly
//! generated record is visible to subsequent requests (via the in-memory
//! tier) before the store write completes, and a failed write only costs a
//! regeneration after restart.

use crate::db::DashboardStore;
use crate::models::dashboard::{CachedInputs, DashboardCache, DashboardContent};
use crate::models::user::{NewsSearchCategory, WeatherUnit};
use crate::services::dashboard::{DashboardInput, DashboardOrchestrator};
use crate::services::weather::WeatherService;
use crate::time_utils;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything the pipeline needs to serve one user's dashboard, resolved
/// from the user profile and training plan by the route handler.
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub user_id: String,
    pub user_name: String,
    pub location_city: String,
    pub running_level: String,
    pub goal: String,
    pub todays_workout: String,
    pub weather_unit: WeatherUnit,
    pub news_search_categories: Vec<NewsSearchCategory>,
    pub training_plan_id: Option<String>,
}

/// Cache-aware dashboard content manager.
#[derive(Clone)]
pub struct DashboardCacheManager {
    store: Arc<dyn DashboardStore>,
    weather: WeatherService,
    orchestrator: DashboardOrchestrator,
    /// Per-user generation latches. Entries are small and bounded by the
    /// active user population, so they are never evicted.
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    /// In-memory cache tier. Written synchronously on generation so that
    /// coalesced requests see the record before the store write lands.
    memory: Arc<DashMap<String, DashboardCache>>,
}

impl DashboardCacheManager {
    pub fn new(
        store: Arc<dyn DashboardStore>,
        weather: WeatherService,
        orchestrator: DashboardOrchestrator,
    ) -> Self {
        Self {
            store,
            weather,
            orchestrator,
            locks: Arc::new(DashMap::new()),
            memory: Arc::new(DashMap::new()),
        }
    }

    /// Serve dashboard content for a user, from cache when valid.
    ///
    /// Total in the same sense as the orchestrator: cache read failures
    /// degrade to regeneration, and generation itself always yields content.
    pub async fn content_for(&self, request: &DashboardRequest) -> DashboardContent {
        let today = time_utils::today_iso();
        let fingerprint = CachedInputs::new(
            request.location_city.clone(),
            request.weather_unit,
            request.news_search_categories.clone(),
            request.training_plan_id.clone(),
        );

        if let Some(content) = self.cached_content(&request.user_id, &today, &fingerprint).await {
            tracing::debug!(user_id = %request.user_id, "Serving dashboard from cache");
            return content;
        }

        let latch = self
            .locks
            .entry(request.user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = latch.lock().await;

        // A coalesced request may have generated while we waited.
        if let Some(content) = self.cached_content(&request.user_id, &today, &fingerprint).await {
            tracing::debug!(
                user_id = %request.user_id,
                "Dashboard generated by a concurrent request while waiting"
            );
            return content;
        }

        tracing::info!(user_id = %request.user_id, "Generating dashboard content");
        let content = self.generate(request).await;

        let record = DashboardCache {
            id: request.user_id.clone(),
            user_id: request.user_id.clone(),
            cache_date: today,
            content: content.clone(),
            cached_inputs: fingerprint,
        };

        self.memory.insert(request.user_id.clone(), record.clone());
        self.persist(record);

        content
    }

    /// Weather is resolved before synthesis so the orchestrator always sees
    /// a settled lookup, success or error.
    async fn generate(&self, request: &DashboardRequest) -> DashboardContent {
        let detailed_weather = self
            .weather
            .lookup(&request.location_city, request.weather_unit)
            .await;

        let input = DashboardInput {
            user_name: request.user_name.clone(),
            location_city: request.location_city.clone(),
            running_level: request.running_level.clone(),
            goal: request.goal.clone(),
            todays_workout: request.todays_workout.clone(),
            detailed_weather,
            weather_unit: request.weather_unit,
            news_search_categories: request.news_search_categories.clone(),
        };

        self.orchestrator.generate(&input).await
    }

    /// Look up a still-valid cached record, memory tier first. A store read
    /// failure is treated as a cache miss, not an error.
    async fn cached_content(
        &self,
        user_id: &str,
        today: &str,
        fingerprint: &CachedInputs,
    ) -> Option<DashboardContent> {
        if let Some(record) = self.memory.get(user_id) {
            if is_fresh(&record, today, fingerprint) {
                return Some(record.content.clone());
            }
        }

        match self.store.get_dashboard_cache(user_id).await {
            Ok(Some(record)) if is_fresh(&record, today, fingerprint) => {
                self.memory.insert(user_id.to_string(), record.clone());
                Some(record.content)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Dashboard cache read failed, regenerating"
                );
                None
            }
        }
    }

    /// Fire-and-forget store write. The request already has its content; a
    /// persistence failure is logged and otherwise ignored.
    fn persist(&self, record: DashboardCache) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.upsert_dashboard_cache(&record).await {
                tracing::warn!(
                    user_id = %record.user_id,
                    error = %e,
                    "Failed to persist dashboard cache record"
                );
            }
        });
    }
}

/// A record is fresh when it was generated for today and its input
/// fingerprint still matches.
fn is_fresh(record: &DashboardCache, today: &str, fingerprint: &CachedInputs) -> bool {
    record.cache_date == today && record.cached_inputs.matches(fingerprint)
}
