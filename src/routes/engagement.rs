// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Late crediting of an activity record whose engagement update failed.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::RecordKind;
use crate::AppState;
use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/engagement/check-in", post(check_in))
}

/// Names the saved record, as echoed in an `engagement_not_recorded` error.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckInRequest {
    pub kind: RecordKind,
    #[validate(length(min = 1, message = "Record id is required"))]
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub streak_updated: bool,
    pub points_earned: u64,
    pub current_streak: u32,
    pub total_points: u64,
}

/// Apply the record's event at the record's own timestamp.
///
/// Each record is credited at most once; a repeat gets `already_credited`.
async fn check_in(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>> {
    req.validate()?;

    let outcome = state
        .engagement
        .retry_credit(&user.user_id, req.kind, &req.id)
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        kind = ?req.kind,
        record_id = %req.id,
        points = outcome.points_earned,
        "Activity credited on retry"
    );

    Ok(Json(CheckInResponse {
        streak_updated: outcome.streak_updated,
        points_earned: outcome.points_earned,
        current_streak: outcome.current_streak,
        total_points: outcome.total_points,
    }))
}
