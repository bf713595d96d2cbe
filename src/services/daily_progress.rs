// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily goal aggregation.
//!
//! Reads today's activity records (local calendar day, `[start, end)`) and
//! derives goal completion plus a short activity feed. Read-only.

use crate::calendar::Calendar;
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::goals::ActivityKind;
use crate::models::{
    BreathingSession, CommunityPost, DailyGoalReport, EngagementState, Goal, GoalId, MoodEntry,
    RecentActivity,
};
use chrono::{DateTime, Utc};
use futures_util::future::try_join3;

/// Today's raw activity for one user.
#[derive(Debug, Clone, Default)]
pub struct TodayActivity {
    /// First mood entry of the day, if any
    pub mood: Option<MoodEntry>,
    /// Ascending by creation time
    pub posts: Vec<CommunityPost>,
    /// Ascending by completion time
    pub sessions: Vec<BreathingSession>,
}

/// Fetch today's mood entry, posts and breathing sessions concurrently.
pub async fn fetch_today(
    db: &dyn Store,
    calendar: &Calendar,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<TodayActivity> {
    let (start, end) = calendar.day_bounds(now);

    let (moods, posts, sessions) = try_join3(
        db.mood_entries_between(user_id, start, end),
        db.posts_by_user_between(user_id, start, end),
        db.breathing_sessions_between(user_id, start, end),
    )
    .await?;

    Ok(TodayActivity {
        mood: moods.into_iter().next(),
        posts,
        sessions,
    })
}

/// Compute the daily goal report for `user_id` on the day containing `now`.
pub async fn compute_daily_progress(
    db: &dyn Store,
    calendar: &Calendar,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<DailyGoalReport> {
    let user = db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    let today = fetch_today(db, calendar, user_id, now).await?;
    let report = build_report(&user.engagement, &today, now, calendar);

    tracing::debug!(
        user_id,
        completed = report.completed_goals,
        percentage = report.progress_percentage,
        "Daily progress computed"
    );

    Ok(report)
}

/// Derive the report from already-fetched records.
pub fn build_report(
    engagement: &EngagementState,
    today: &TodayActivity,
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> DailyGoalReport {
    let goals: Vec<Goal> = GoalId::ALL
        .into_iter()
        .map(|id| {
            let completed = match id {
                GoalId::Mood => today.mood.is_some(),
                GoalId::Journal => today.mood.as_ref().is_some_and(MoodEntry::has_journal),
                GoalId::Community => !today.posts.is_empty(),
                GoalId::Breathing => !today.sessions.is_empty(),
            };
            Goal::new(id, completed)
        })
        .collect();

    let total_goals = goals.len() as u32;
    let completed_goals = goals.iter().filter(|g| g.completed).count() as u32;
    let progress_percentage =
        (100.0 * f64::from(completed_goals) / f64::from(total_goals)).round() as u32;

    DailyGoalReport {
        goals,
        progress_percentage,
        completed_goals,
        total_goals,
        recent_activities: recent_activities(engagement, today, now, calendar),
    }
}

fn recent_activities(
    engagement: &EngagementState,
    today: &TodayActivity,
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> Vec<RecentActivity> {
    let mut activities = Vec::new();

    if let Some(mood) = &today.mood {
        activities.push(RecentActivity {
            kind: ActivityKind::Mood,
            title: "Mood tracked".to_string(),
            description: format!("Feeling {} ({}/10)", mood.mood.label, mood.intensity),
            time: mood.date,
            icon: mood.mood.emoji.clone(),
        });
    }

    if let Some(post) = today.posts.first() {
        activities.push(RecentActivity {
            kind: ActivityKind::Community,
            title: "Community post shared".to_string(),
            description: "Thanks for contributing to the community!".to_string(),
            time: post.created_at,
            icon: "💬".to_string(),
        });
    }

    if engagement.streak_grew_on(now, calendar) {
        if let Some(checked_in) = engagement.last_check_in {
            activities.push(RecentActivity {
                kind: ActivityKind::Streak,
                title: "Streak updated".to_string(),
                description: format!("{} day streak maintained!", engagement.current_streak),
                time: checked_in,
                icon: "🔥".to_string(),
            });
        }
    }

    if let Some(session) = today.sessions.first() {
        activities.push(RecentActivity {
            kind: ActivityKind::Breathing,
            title: "Breathing exercise completed".to_string(),
            description: format!(
                "Completed {} cycles of {} breathing",
                session.cycles, session.technique
            ),
            time: session.completed_at,
            icon: "🫁".to_string(),
        });
    }

    // Stable: equal timestamps keep insertion order.
    activities.sort_by(|a, b| b.time.cmp(&a.time));
    activities
}
