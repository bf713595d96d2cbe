// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod breathing;
pub mod community;
pub mod engagement;
pub mod goals;
pub mod mood;
pub mod stats;
pub mod suggestion;
pub mod user;

pub use breathing::{BreathingSession, Technique};
pub use community::{CommunityPost, LikeToggle};
pub use engagement::{EngagementEvent, EngagementOutcome, EngagementState, RecordKind};
pub use goals::{DailyGoalReport, Goal, GoalId, RecentActivity};
pub use mood::{Mood, MoodEntry};
pub use stats::ActivityTotals;
pub use suggestion::{Reason, Suggestion, SuggestionKind};
pub use user::User;

/// Records stored before the credit flag existed were credited on save.
fn credited() -> bool {
    true
}
