// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Points and streak state, and the rules that mutate it.
//!
//! The rules are pure: storage, locking and retries live in
//! [`crate::services::EngagementService`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::Calendar;

/// Points for the first qualifying event of a calendar day.
pub const CHECK_IN_POINTS: u64 = 10;
/// Flat bonus for every completed breathing session.
pub const BREATHING_SESSION_POINTS: u64 = 10;
/// Flat bonus for every community post.
pub const COMMUNITY_POST_POINTS: u64 = 5;

/// Per-user gamification state, embedded in the user document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementState {
    #[serde(default)]
    pub total_points: u64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    /// Streak value before the most recent check-in changed it.
    #[serde(default)]
    pub previous_streak: u32,
    /// Instant of the most recent check-in; only its calendar day matters.
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub last_check_in: Option<DateTime<Utc>>,
}

/// An activity that can earn points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementEvent {
    MoodLogged,
    BreathingCompleted,
    PostCreated,
}

impl EngagementEvent {
    /// Whether the event counts as a daily check-in for the streak.
    pub fn is_qualifying(self) -> bool {
        match self {
            EngagementEvent::MoodLogged | EngagementEvent::BreathingCompleted => true,
            EngagementEvent::PostCreated => false,
        }
    }

    /// Points awarded on every occurrence, independent of the check-in.
    pub fn flat_points(self) -> u64 {
        match self {
            EngagementEvent::MoodLogged => 0,
            EngagementEvent::BreathingCompleted => BREATHING_SESSION_POINTS,
            EngagementEvent::PostCreated => COMMUNITY_POST_POINTS,
        }
    }
}

/// Kind of stored activity record that earns points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Mood,
    Breathing,
    Post,
}

impl RecordKind {
    /// The event a record of this kind is credited as.
    pub fn event(self) -> EngagementEvent {
        match self {
            RecordKind::Mood => EngagementEvent::MoodLogged,
            RecordKind::Breathing => EngagementEvent::BreathingCompleted,
            RecordKind::Post => EngagementEvent::PostCreated,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Mood => "mood entry",
            RecordKind::Breathing => "breathing session",
            RecordKind::Post => "community post",
        }
    }
}

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementOutcome {
    pub streak_updated: bool,
    pub points_earned: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_points: u64,
}

impl EngagementOutcome {
    /// Whether the stored state must be written back.
    pub fn changed(&self) -> bool {
        self.streak_updated || self.points_earned > 0
    }
}

impl EngagementState {
    /// Record a daily check-in at `now`.
    ///
    /// Returns `true` if the state changed. A second check-in on the same
    /// calendar day is a no-op, and so is one dated before the last check-in's
    /// day (a record credited late never rewinds the streak).
    pub fn record_check_in(&mut self, now: DateTime<Utc>, calendar: &Calendar) -> bool {
        if let Some(last) = self.last_check_in {
            if calendar.day_of(now) <= calendar.day_of(last) {
                return false;
            }
        }

        let continues = self
            .last_check_in
            .is_some_and(|last| calendar.is_consecutive_day(last, now));

        self.previous_streak = self.current_streak;
        self.current_streak = if continues {
            self.current_streak.saturating_add(1)
        } else {
            1
        };

        self.total_points = self.total_points.saturating_add(CHECK_IN_POINTS);
        self.last_check_in = Some(now);
        if self.current_streak > self.longest_streak {
            self.longest_streak = self.current_streak;
        }

        true
    }

    /// Apply an event: check-in for qualifying events, then the flat bonus.
    pub fn apply(
        &mut self,
        event: EngagementEvent,
        now: DateTime<Utc>,
        calendar: &Calendar,
    ) -> EngagementOutcome {
        let before = self.total_points;

        let streak_updated = event.is_qualifying() && self.record_check_in(now, calendar);
        self.total_points = self.total_points.saturating_add(event.flat_points());

        EngagementOutcome {
            streak_updated,
            points_earned: self.total_points - before,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            total_points: self.total_points,
        }
    }

    /// Whether the streak grew with a check-in on the day containing `now`.
    pub fn streak_grew_on(&self, now: DateTime<Utc>, calendar: &Calendar) -> bool {
        self.current_streak > self.previous_streak
            && self
                .last_check_in
                .is_some_and(|last| calendar.is_same_day(last, now))
    }
}
