// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! RunMate: personalized running dashboard backend
//!
//! This crate provides the backend API that synthesizes daily dashboard
//! content (greeting, weather narrative, workout, news, clothing
//! recommendations) and caches it per user.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::DashboardCacheManager;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub dashboard: DashboardCacheManager,
}
