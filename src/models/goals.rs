// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Daily goal report shapes. Derived per request, never stored.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The four daily goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalId {
    Mood,
    Journal,
    Community,
    Breathing,
}

impl GoalId {
    pub const ALL: [GoalId; 4] = [
        GoalId::Mood,
        GoalId::Journal,
        GoalId::Community,
        GoalId::Breathing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GoalId::Mood => "Track Mood",
            GoalId::Journal => "Journal Entry",
            GoalId::Community => "Community Post",
            GoalId::Breathing => "Breathing Exercise",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            GoalId::Mood => "💝",
            GoalId::Journal => "📝",
            GoalId::Community => "👥",
            GoalId::Breathing => "🫁",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GoalId::Mood => "Log your daily mood",
            GoalId::Journal => "Write in your journal",
            GoalId::Community => "Share with community",
            GoalId::Breathing => "Practice mindful breathing",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Goal {
    pub id: GoalId,
    pub name: &'static str,
    pub completed: bool,
    pub icon: &'static str,
    pub description: &'static str,
}

impl Goal {
    pub fn new(id: GoalId, completed: bool) -> Self {
        Self {
            id,
            name: id.name(),
            completed,
            icon: id.icon(),
            description: id.description(),
        }
    }
}

/// Kind of a recent-activity line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Mood,
    Community,
    Streak,
    Breathing,
}

/// One human-readable line in today's activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct RecentActivity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub time: DateTime<Utc>,
    pub icon: String,
}

/// Today's goal completion for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoalReport {
    pub goals: Vec<Goal>,
    pub progress_percentage: u32,
    pub completed_goals: u32,
    pub total_goals: u32,
    /// Newest first
    pub recent_activities: Vec<RecentActivity>,
}

impl DailyGoalReport {
    pub fn is_goal_complete(&self, id: GoalId) -> bool {
        self.goals.iter().any(|g| g.id == id && g.completed)
    }
}
