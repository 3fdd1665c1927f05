// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard content route.

use crate::error::{AppError, Result};
use crate::models::DashboardContent;
use crate::services::DashboardRequest;
use crate::time_utils;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Firestore document IDs are capped well below this; anything longer is
/// not a real user.
const MAX_USER_ID_LEN: usize = 128;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard/{user_id}", get(get_dashboard))
}

/// Serve a user's dashboard content, generating it when the cached record
/// is stale or the profile has drifted.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<DashboardContent>> {
    let user_id = user_id.trim();
    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
        return Err(AppError::BadRequest("Invalid user ID".to_string()));
    }

    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    // Plan lookups are advisory: a missing or unreadable plan degrades to
    // "Rest day" rather than failing the dashboard.
    let todays_workout = match &user.training_plan_id {
        Some(plan_id) => match state.db.get_training_plan(plan_id).await {
            Ok(Some(plan)) => plan.workout_for(&time_utils::today_iso()),
            Ok(None) => {
                tracing::warn!(user_id = %user_id, plan_id = %plan_id, "Training plan not found");
                "Rest day".to_string()
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Training plan lookup failed");
                "Rest day".to_string()
            }
        },
        None => "Rest day".to_string(),
    };

    let request = DashboardRequest {
        user_id: user.id.clone(),
        user_name: user.display_name().to_string(),
        location_city: user.profile.location_city.clone(),
        running_level: user.profile.running_level.clone(),
        goal: user.profile.goal.clone(),
        todays_workout,
        weather_unit: user.profile.weather_unit,
        news_search_categories: user.profile.news_search_categories.clone(),
        training_plan_id: user.training_plan_id.clone(),
    };

    let content = state.dashboard.content_for(&request).await;
    Ok(Json(content))
}
