//! Lifetime activity totals and the achievement catalogue derived from them.
//!
//! Achievements are recomputed from totals on each request, so they never
//! drift from the underlying records.

use serde::Serialize;

use crate::models::{CommunityPost, EngagementState, MoodEntry};

/// Lifetime totals for one user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityTotals {
    pub mood_entries: u32,
    /// Mood entries with non-empty journal text
    pub journal_entries: u32,
    /// Sum of mood intensities (for the average)
    pub intensity_sum: u64,
    pub posts: u32,
    /// Likes received across all posts
    pub likes_received: u32,
}

impl ActivityTotals {
    pub fn from_records(moods: &[MoodEntry], posts: &[CommunityPost]) -> Self {
        Self {
            mood_entries: moods.len() as u32,
            journal_entries: moods.iter().filter(|m| m.has_journal()).count() as u32,
            intensity_sum: moods.iter().map(|m| u64::from(m.intensity)).sum(),
            posts: posts.len() as u32,
            likes_received: posts.iter().map(|p| p.like_count() as u32).sum(),
        }
    }

    /// Average mood intensity rounded to one decimal, 0 when there are no entries.
    pub fn average_mood(&self) -> f64 {
        if self.mood_entries == 0 {
            return 0.0;
        }
        round_one_decimal(self.intensity_sum as f64 / self.mood_entries as f64)
    }
}

/// Round to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Achievement {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub earned: bool,
}

/// Evaluate the full achievement catalogue, earned or not.
pub fn achievements(totals: &ActivityTotals, engagement: &EngagementState) -> Vec<Achievement> {
    let a = |name, icon, description, earned| Achievement {
        name,
        icon,
        description,
        earned,
    };

    vec![
        a(
            "First Steps",
            "🌱",
            "Complete first mood entry",
            totals.mood_entries >= 1,
        ),
        a(
            "Week Warrior",
            "🔥",
            "Maintain 7-day streak",
            engagement.current_streak >= 7,
        ),
        a(
            "Streak Master",
            "⭐",
            "Maintain 30-day streak",
            engagement.current_streak >= 30,
        ),
        a(
            "Mindful Moment",
            "🧘",
            "Complete 10 mood entries",
            totals.mood_entries >= 10,
        ),
        a(
            "Community Helper",
            "🤝",
            "Make first community post",
            totals.posts >= 1,
        ),
        a(
            "Social Butterfly",
            "🦋",
            "Make 5 community posts",
            totals.posts >= 5,
        ),
        a(
            "Gratitude Guru",
            "🙏",
            "Write 30 journal entries",
            totals.journal_entries >= 30,
        ),
        a(
            "Wellness Warrior",
            "💪",
            "Reach 1000 points",
            engagement.total_points >= 1000,
        ),
    ]
}
