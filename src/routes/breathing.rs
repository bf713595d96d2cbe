// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Guided breathing session routes.

use crate::calendar::format_utc_rfc3339;
use crate::db::new_document_id;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{BreathingSession, RecordKind, Technique};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::{Validate, ValidationError};

/// Sessions the statistics are computed over.
const STATS_WINDOW: u32 = 20;
/// Sessions listed in the response.
const LISTED_SESSIONS: usize = 5;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/breathing/session",
        get(get_sessions).post(complete_session),
    )
}

fn validate_technique(technique: &str) -> std::result::Result<(), ValidationError> {
    match Technique::parse(technique) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("technique").with_message(
            "Technique must be one of: box, 478, triangle, coherent, energizing, extended".into(),
        )),
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSessionRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_technique"))]
    pub technique: String,
    /// Seconds
    #[serde(default)]
    #[validate(range(
        min = 0,
        max = 86_400,
        message = "Duration must be between 0 and 86400 seconds"
    ))]
    pub duration: i64,
    #[serde(default)]
    #[validate(range(
        min = 1,
        max = 10_000,
        message = "Cycles must be between 1 and 10000"
    ))]
    pub cycles: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub technique: Technique,
    pub duration: u32,
    pub cycles: u32,
    pub completed_at: String,
}

impl From<BreathingSession> for SessionResponse {
    fn from(session: BreathingSession) -> Self {
        Self {
            id: session.id,
            technique: session.technique,
            duration: session.duration,
            cycles: session.cycles,
            completed_at: format_utc_rfc3339(session.completed_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSessionResponse {
    pub message: String,
    pub session: SessionResponse,
    pub points_earned: u64,
    pub total_points: u64,
    pub streak_updated: bool,
    pub current_streak: u32,
}

/// Store a finished session, then award the check-in and session bonus.
async fn complete_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CompleteSessionRequest>,
) -> Result<Json<CompleteSessionResponse>> {
    req.validate()?;
    let technique = Technique::parse(&req.technique)
        .ok_or_else(|| AppError::Validation(format!("Unknown technique {}", req.technique)))?;

    let now = Utc::now();
    let session = BreathingSession {
        id: new_document_id(),
        user_id: user.user_id.clone(),
        technique,
        // Range-checked above
        duration: req.duration as u32,
        cycles: req.cycles as u32,
        completed_at: now,
        engagement_applied: false,
    };

    state.db.create_breathing_session(&session).await?;

    let outcome = state
        .engagement
        .credit(&user.user_id, RecordKind::Breathing, &session.id, now)
        .await
        .map_err(|e| AppError::EngagementNotRecorded {
            kind: RecordKind::Breathing,
            id: session.id.clone(),
            source: Box::new(e),
        })?;

    tracing::info!(
        user_id = %user.user_id,
        session_id = %session.id,
        technique = %session.technique,
        cycles = session.cycles,
        points = outcome.points_earned,
        "Breathing session completed"
    );

    Ok(Json(CompleteSessionResponse {
        message: "Breathing session completed!".to_string(),
        session: session.into(),
        points_earned: outcome.points_earned,
        total_points: outcome.total_points,
        streak_updated: outcome.streak_updated,
        current_streak: outcome.current_streak,
    }))
}

// ─── History & stats ─────────────────────────────────────────

#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreathingStats {
    pub total_sessions: usize,
    pub total_cycles: u64,
    /// Seconds
    pub total_duration: u64,
    /// Session count per technique
    pub technique_stats: BTreeMap<String, u32>,
    pub average_cycles: u64,
    pub average_duration: u64,
}

impl BreathingStats {
    /// Aggregate over `sessions`; averages are rounded to whole numbers.
    pub fn from_sessions(sessions: &[BreathingSession]) -> Self {
        let mut stats = Self {
            total_sessions: sessions.len(),
            ..Default::default()
        };

        for s in sessions {
            stats.total_cycles += u64::from(s.cycles);
            stats.total_duration += u64::from(s.duration);
            *stats
                .technique_stats
                .entry(s.technique.as_str().to_string())
                .or_default() += 1;
        }

        if !sessions.is_empty() {
            let n = sessions.len() as f64;
            stats.average_cycles = (stats.total_cycles as f64 / n).round() as u64;
            stats.average_duration = (stats.total_duration as f64 / n).round() as u64;
        }

        stats
    }
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionResponse>,
    pub stats: BreathingStats,
}

async fn get_sessions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SessionsResponse>> {
    let sessions = state
        .db
        .recent_breathing_sessions(&user.user_id, STATS_WINDOW)
        .await?;

    let stats = BreathingStats::from_sessions(&sessions);

    Ok(Json(SessionsResponse {
        sessions: sessions
            .into_iter()
            .take(LISTED_SESSIONS)
            .map(Into::into)
            .collect(),
        stats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(technique: Technique, cycles: u32, duration: u32) -> BreathingSession {
        BreathingSession {
            id: new_document_id(),
            user_id: "u1".to_string(),
            technique,
            duration,
            cycles,
            completed_at: Utc::now(),
            engagement_applied: true,
        }
    }

    #[test]
    fn test_stats_rounds_averages() {
        let stats = BreathingStats::from_sessions(&[
            session(Technique::Box, 4, 60),
            session(Technique::Box, 5, 90),
            session(Technique::FourSevenEight, 5, 95),
        ]);

        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_cycles, 14);
        assert_eq!(stats.total_duration, 245);
        assert_eq!(stats.average_cycles, 5);
        assert_eq!(stats.average_duration, 82);
        assert_eq!(stats.technique_stats.get("box"), Some(&2));
        assert_eq!(stats.technique_stats.get("478"), Some(&1));
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(BreathingStats::from_sessions(&[]), BreathingStats::default());
    }

    #[test]
    fn test_request_validation() {
        let bad = CompleteSessionRequest {
            technique: "wim-hof".to_string(),
            duration: -1,
            cycles: 0,
        };
        let err = AppError::from(bad.validate().unwrap_err());
        let AppError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("Technique must be one of"));
        assert!(msg.contains("Cycles must be between 1 and 10000"));
        assert!(msg.contains("Duration must be between 0 and 86400 seconds"));

        let huge = CompleteSessionRequest {
            technique: "box".to_string(),
            duration: i64::from(u32::MAX) + 1,
            cycles: 1_000_000,
        };
        let AppError::Validation(msg) = AppError::from(huge.validate().unwrap_err()) else {
            panic!("expected validation error");
        };
        assert!(msg.contains("Duration must be between"));
        assert!(msg.contains("Cycles must be between"));

        let good = CompleteSessionRequest {
            technique: "478".to_string(),
            duration: 120,
            cycles: 4,
        };
        assert!(good.validate().is_ok());
    }
}
