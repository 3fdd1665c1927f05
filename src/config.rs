// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Provider credentials are optional on purpose: a missing weather, news or
//! generation key must not prevent startup. The affected component reports a
//! typed "not configured" payload at call time and the dashboard degrades
//! instead of failing.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,

    // --- Provider credentials (all optional, degrade at call time) ---
    /// OpenWeatherMap API key
    pub openweather_api_key: Option<String>,
    /// Google Custom Search API key
    pub google_search_api_key: Option<String>,
    /// Google Custom Search engine ID
    pub google_search_engine_id: Option<String>,
    /// Gemini API key for content generation
    pub gemini_api_key: Option<String>,
    /// Gemini model name
    pub gemini_model: String,
}

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable has a default or is optional, so loading cannot
    /// fail; missing provider keys degrade the affected component at
    /// call time instead.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            openweather_api_key: optional_env("OPENWEATHERMAP_API_KEY"),
            google_search_api_key: optional_env("GOOGLE_CUSTOM_SEARCH_API_KEY"),
            google_search_engine_id: optional_env("GOOGLE_CUSTOM_SEARCH_ENGINE_ID"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
        }
    }

    /// Default config for tests: no provider credentials, so every external
    /// component reports "not configured" instead of making network calls.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            openweather_api_key: None,
            google_search_api_key: None,
            google_search_engine_id: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

/// Read an env var, treating empty values as unset.
fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
