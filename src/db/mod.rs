// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::DashboardCache;
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TRAINING_PLANS: &str = "trainingPlans";
    /// Per-user dashboard cache records (keyed by user ID)
    pub const DASHBOARD_CACHE: &str = "dashboardCache";
}

/// Storage seam for the dashboard cache.
///
/// The cache manager depends on this trait rather than on `FirestoreDb`
/// directly so tests can substitute an in-memory store.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Read the cached dashboard record for a user, if one exists.
    async fn get_dashboard_cache(&self, user_id: &str) -> Result<Option<DashboardCache>, AppError>;

    /// Merge-upsert the cached dashboard record for a user.
    ///
    /// The new record is not derived from the old one, so last-writer-wins
    /// is acceptable; a racing duplicate write is harmless.
    async fn upsert_dashboard_cache(&self, record: &DashboardCache) -> Result<(), AppError>;
}
