// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod dashboard;
pub mod user;
pub mod weather;

pub use dashboard::{
    CachedInputs, ClothingCategory, ClothingItem, DashboardCache, DashboardContent, NewsItem,
};
pub use user::{NewsSearchCategory, TrainingPlan, User, UserProfile, WeatherUnit, Workout};
pub use weather::{DailyForecast, ForecastError, HourlyForecast, WeatherLookup};
