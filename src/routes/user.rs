// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile, lifetime statistics and daily progress.

use crate::calendar::format_utc_rfc3339;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::stats::{achievements, Achievement};
use crate::models::{ActivityTotals, DailyGoalReport, User};
use crate::services::compute_daily_progress;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::Utc;
use futures_util::future::try_join;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/profile", get(get_profile))
        .route("/api/user/stats", get(get_stats))
        .route("/api/user/daily-progress", get(get_daily_progress))
}

/// Current user, engagement fields flattened.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_points: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_check_in: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            total_points: user.engagement.total_points,
            current_streak: user.engagement.current_streak,
            longest_streak: user.engagement.longest_streak,
            last_check_in: user.engagement.last_check_in.map(format_utc_rfc3339),
            created_at: format_utc_rfc3339(user.created_at),
        }
    }
}

async fn load_user(state: &AppState, user_id: &str) -> Result<User> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = load_user(&state, &user.user_id).await?;
    Ok(Json(ProfileResponse {
        user: profile.into(),
    }))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_mood_entries: u32,
    /// One decimal
    pub average_mood: f64,
    pub total_posts: u32,
    pub total_likes: u32,
    pub joined_date: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub user: UserResponse,
    pub stats: UserStats,
    pub achievements: Vec<Achievement>,
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse>> {
    let profile = load_user(&state, &user.user_id).await?;

    let (moods, posts) = try_join(
        state.db.recent_mood_entries(&user.user_id, None),
        state.db.posts_by_user(&user.user_id),
    )
    .await?;

    let totals = ActivityTotals::from_records(&moods, &posts);
    let earned = achievements(&totals, &profile.engagement);

    tracing::debug!(
        user_id = %user.user_id,
        moods = totals.mood_entries,
        posts = totals.posts,
        earned = earned.iter().filter(|a| a.earned).count(),
        "User stats computed"
    );

    Ok(Json(StatsResponse {
        stats: UserStats {
            total_mood_entries: totals.mood_entries,
            average_mood: totals.average_mood(),
            total_posts: totals.posts,
            total_likes: totals.likes_received,
            joined_date: format_utc_rfc3339(profile.created_at),
        },
        user: profile.into(),
        achievements: earned,
    }))
}

// ─── Daily progress ──────────────────────────────────────────

async fn get_daily_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DailyGoalReport>> {
    let report =
        compute_daily_progress(state.db.as_ref(), &state.calendar, &user.user_id, Utc::now())
            .await?;
    Ok(Json(report))
}
