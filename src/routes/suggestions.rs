// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Personalised activity suggestions.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::{load_inputs, SuggestionsReport};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::Utc;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/ai/suggestions", get(get_suggestions))
}

async fn get_suggestions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SuggestionsReport>> {
    let now = Utc::now();
    let inputs = load_inputs(state.db.as_ref(), &state.calendar, &user.user_id, now).await?;

    // The RNG is created after the last await so the handler future stays Send.
    let report = inputs.report(&mut rand::thread_rng(), state.calendar.hour_of(now));

    tracing::debug!(
        user_id = %user.user_id,
        suggestions = report.suggestions.len(),
        recent_moods = report.analytics.recent_mood_count,
        "Suggestions ranked"
    );

    Ok(Json(report))
}
