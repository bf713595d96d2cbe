// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mood journal routes.

use crate::calendar::format_utc_rfc3339;
use crate::db::new_document_id;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Mood, MoodEntry, RecordKind};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

/// Entries returned by the history endpoint.
const HISTORY_LIMIT: u32 = 30;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/mood", get(get_mood_history).post(save_mood))
        .route("/api/mood/calendar", get(get_mood_calendar))
}

// ─── Save ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct MoodInput {
    #[validate(length(min = 1, message = "Please provide mood and intensity"))]
    pub emoji: String,
    #[validate(length(min = 1, message = "Please provide mood and intensity"))]
    pub label: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveMoodRequest {
    #[serde(default)]
    #[validate(nested)]
    pub mood: MoodInput,
    #[serde(default)]
    #[validate(range(min = 1, max = 10, message = "Intensity must be between 1 and 10"))]
    pub intensity: i64,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Journal entry must be 1000 characters or fewer"))]
    pub journal_entry: String,
}

/// Mood entry as the client sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntryResponse {
    pub id: String,
    pub mood: Mood,
    pub intensity: u8,
    pub journal_entry: String,
    pub date: String,
}

impl From<MoodEntry> for MoodEntryResponse {
    fn from(entry: MoodEntry) -> Self {
        Self {
            id: entry.id,
            mood: entry.mood,
            intensity: entry.intensity,
            journal_entry: entry.journal_entry,
            date: format_utc_rfc3339(entry.date),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMoodResponse {
    pub message: String,
    pub mood_entry: MoodEntryResponse,
    pub streak_updated: bool,
    pub current_streak: u32,
    pub total_points: u64,
}

/// Persist a mood entry, then count it as the day's check-in.
///
/// The entry is stored first. If the engagement update then fails, the
/// client gets `engagement_not_recorded` naming the entry, and can credit
/// it later through the check-in route.
async fn save_mood(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SaveMoodRequest>,
) -> Result<Json<SaveMoodResponse>> {
    req.validate()?;

    let now = Utc::now();
    let entry = MoodEntry {
        id: new_document_id(),
        user_id: user.user_id.clone(),
        mood: Mood {
            emoji: req.mood.emoji,
            label: req.mood.label,
        },
        // Range-checked above
        intensity: req.intensity as u8,
        journal_entry: req.journal_entry.trim().to_string(),
        date: now,
        engagement_applied: false,
    };

    state.db.create_mood_entry(&entry).await?;

    let outcome = state
        .engagement
        .credit(&user.user_id, RecordKind::Mood, &entry.id, now)
        .await
        .map_err(|e| AppError::EngagementNotRecorded {
            kind: RecordKind::Mood,
            id: entry.id.clone(),
            source: Box::new(e),
        })?;

    tracing::info!(
        user_id = %user.user_id,
        entry_id = %entry.id,
        intensity = entry.intensity,
        streak_updated = outcome.streak_updated,
        "Mood entry saved"
    );

    Ok(Json(SaveMoodResponse {
        message: "Mood entry saved successfully".to_string(),
        mood_entry: entry.into(),
        streak_updated: outcome.streak_updated,
        current_streak: outcome.current_streak,
        total_points: outcome.total_points,
    }))
}

// ─── History ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodHistoryResponse {
    pub mood_entries: Vec<MoodEntryResponse>,
}

async fn get_mood_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MoodHistoryResponse>> {
    let entries = state
        .db
        .recent_mood_entries(&user.user_id, Some(HISTORY_LIMIT))
        .await?;

    Ok(Json(MoodHistoryResponse {
        mood_entries: entries.into_iter().map(Into::into).collect(),
    }))
}

// ─── Calendar ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CalendarDay {
    pub emoji: String,
    pub label: String,
    pub intensity: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodCalendarResponse {
    /// Keyed by local date, `YYYY-MM-DD`
    pub calendar_data: BTreeMap<String, CalendarDay>,
}

/// One entry per local day for a month; later entries of a day win.
async fn get_mood_calendar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<MoodCalendarResponse>> {
    let (this_year, this_month) = state.calendar.year_month(Utc::now());
    let year = query.year.unwrap_or(this_year);
    let month = query.month.unwrap_or(this_month);

    let (start, end) = state
        .calendar
        .month_bounds(year, month)
        .ok_or_else(|| AppError::Validation(format!("Invalid month {year}-{month}")))?;

    let entries = state
        .db
        .mood_entries_between(&user.user_id, start, end)
        .await?;

    let calendar_data = entries
        .into_iter()
        .map(|entry| {
            let day = state.calendar.day_of(entry.date).format("%Y-%m-%d").to_string();
            let cell = CalendarDay {
                emoji: entry.mood.emoji,
                label: entry.mood.label,
                intensity: entry.intensity,
            };
            (day, cell)
        })
        .collect();

    Ok(Json(MoodCalendarResponse { calendar_data }))
}
