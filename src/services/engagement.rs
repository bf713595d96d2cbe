// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Engagement service: applies point/streak events to stored user state.
//!
//! Each user's read-modify-write is serialised twice over:
//! - a per-user async mutex inside this process, and
//! - a revision-conditional write at the store, which catches writers in
//!   other processes; on conflict the whole read-modify-write is retried.
//!
//! Stored activity records carry an `engagement_applied` flag. Crediting a
//! record claims the flag first, so a record is never credited twice.

use crate::calendar::Calendar;
use crate::db::{KeyedLocks, Store};
use crate::error::{AppError, Result};
use crate::models::{EngagementEvent, EngagementOutcome, RecordKind};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Attempts before a persistent write conflict is surfaced as an error.
const MAX_WRITE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct EngagementService {
    db: Arc<dyn Store>,
    calendar: Calendar,
    user_locks: KeyedLocks,
}

impl EngagementService {
    pub fn new(db: Arc<dyn Store>, calendar: Calendar) -> Self {
        Self {
            db,
            calendar,
            user_locks: KeyedLocks::new(),
        }
    }

    /// Apply one event for `user_id` at `now` and persist the result.
    ///
    /// Same-day repeats of a check-in are no-ops and skip the write.
    pub async fn record(
        &self,
        user_id: &str,
        event: EngagementEvent,
        now: DateTime<Utc>,
    ) -> Result<EngagementOutcome> {
        let _guard = self.user_locks.lock(user_id).await;
        self.apply_locked(user_id, event, now).await
    }

    /// Credit a freshly stored activity record at its own timestamp.
    pub async fn credit(
        &self,
        user_id: &str,
        kind: RecordKind,
        record_id: &str,
        at: DateTime<Utc>,
    ) -> Result<EngagementOutcome> {
        let _guard = self.user_locks.lock(user_id).await;
        self.credit_locked(user_id, kind, record_id, at).await
    }

    /// Credit a record whose engagement update failed when it was saved.
    ///
    /// The record must belong to `user_id` and must not have been credited.
    pub async fn retry_credit(
        &self,
        user_id: &str,
        kind: RecordKind,
        record_id: &str,
    ) -> Result<EngagementOutcome> {
        let _guard = self.user_locks.lock(user_id).await;

        let owned = match kind {
            RecordKind::Mood => self
                .db
                .get_mood_entry(record_id)
                .await?
                .map(|e| (e.user_id, e.date)),
            RecordKind::Breathing => self
                .db
                .get_breathing_session(record_id)
                .await?
                .map(|s| (s.user_id, s.completed_at)),
            RecordKind::Post => self
                .db
                .get_post(record_id)
                .await?
                .map(|p| (p.user_id, p.created_at)),
        };

        // Someone else's record is reported the same as a missing one.
        let at = match owned {
            Some((owner, at)) if owner == user_id => at,
            _ => {
                return Err(AppError::NotFound(format!(
                    "{} {record_id} not found",
                    kind.label()
                )))
            }
        };

        self.credit_locked(user_id, kind, record_id, at).await
    }

    async fn credit_locked(
        &self,
        user_id: &str,
        kind: RecordKind,
        record_id: &str,
        at: DateTime<Utc>,
    ) -> Result<EngagementOutcome> {
        if self.db.set_engagement_applied(kind, record_id, true).await? {
            return Err(AppError::AlreadyCredited(format!(
                "{} {record_id} was already credited",
                kind.label()
            )));
        }

        match self.apply_locked(user_id, kind.event(), at).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                // Leave the record eligible for a retry.
                let released = self.db.set_engagement_applied(kind, record_id, false).await;
                if let Err(release) = released {
                    tracing::error!(
                        user_id,
                        record_id,
                        error = %release,
                        "Failed to release engagement claim"
                    );
                }
                Err(e)
            }
        }
    }

    /// Read-modify-write of the user's engagement state. Caller holds the
    /// user lock.
    async fn apply_locked(
        &self,
        user_id: &str,
        event: EngagementEvent,
        now: DateTime<Utc>,
    ) -> Result<EngagementOutcome> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let user = self
                .db
                .get_user(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

            let mut state = user.engagement;
            let outcome = state.apply(event, now, &self.calendar);

            if !outcome.changed() {
                tracing::debug!(user_id, ?event, "Already checked in today");
                return Ok(outcome);
            }

            match self
                .db
                .update_engagement(user_id, user.revision, &state)
                .await
            {
                Ok(revision) => {
                    tracing::info!(
                        user_id,
                        ?event,
                        points_earned = outcome.points_earned,
                        streak_updated = outcome.streak_updated,
                        current_streak = outcome.current_streak,
                        total_points = outcome.total_points,
                        revision,
                        "Engagement recorded"
                    );
                    return Ok(outcome);
                }
                Err(AppError::Conflict(msg)) => {
                    tracing::warn!(
                        user_id,
                        attempt,
                        conflict = %msg,
                        "Engagement write conflict, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Database(format!(
            "Engagement update for user {user_id} kept conflicting after {MAX_WRITE_ATTEMPTS} attempts"
        )))
    }
}
