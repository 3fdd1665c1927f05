// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Business logic services.

pub mod cache;
pub mod dashboard;
pub mod genai;
pub mod greeting;
pub mod news;
pub mod weather;

pub use cache::{DashboardCacheManager, DashboardRequest};
pub use dashboard::DashboardOrchestrator;
pub use genai::GeminiClient;
pub use greeting::GreetingService;
pub use news::NewsService;
pub use weather::WeatherService;
