// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! RunMate API Server
//!
//! Serves personalized daily dashboard content for runners: greeting,
//! weather narrative with a recommended run window, the day's workout,
//! running news and clothing suggestions, cached per user per day.

use runmate::{
    config::Config,
    db::FirestoreDb,
    services::{
        DashboardCacheManager, DashboardOrchestrator, GeminiClient, GreetingService, NewsService,
        WeatherService,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env();
    tracing::info!(port = config.port, "Starting RunMate API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Generation client is shared by the orchestrator and the greeting
    // service; a missing API key is reported per-call, not at startup.
    let generator = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; dashboard generation will use fallbacks");
    }

    let greetings = GreetingService::new(generator.clone());
    let news = NewsService::new(
        config.google_search_api_key.clone(),
        config.google_search_engine_id.clone(),
    );
    let weather = WeatherService::new(config.openweather_api_key.clone());

    let orchestrator = DashboardOrchestrator::new(generator, greetings, news);
    let dashboard = DashboardCacheManager::new(Arc::new(db.clone()), weather, orchestrator);
    tracing::info!("Dashboard pipeline initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        dashboard,
    });

    // Build router
    let app = runmate::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("runmate=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
