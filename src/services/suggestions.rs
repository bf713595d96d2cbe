// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Personalised suggestion ranking.
//!
//! Rule tiers add at most one suggestion per kind; random catalogue picks
//! backfill up to [`MAX_SUGGESTIONS`]. The final list is a stable sort by
//! priority, truncated. The random source is injected so callers (and tests)
//! control it.

use crate::calendar::Calendar;
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::stats::round_one_decimal;
use crate::models::suggestion::CATALOG;
use crate::models::{EngagementState, MoodEntry, Reason, Suggestion, SuggestionKind};
use crate::services::daily_progress::fetch_today;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Most suggestions returned per request.
pub const MAX_SUGGESTIONS: usize = 3;
/// Window of mood history considered.
pub const RECENT_MOOD_DAYS: i64 = 7;
/// Below this average intensity, moods count as low.
const LOW_MOOD_THRESHOLD: f64 = 5.0;
/// Above this average intensity, moods count as high.
const HIGH_MOOD_THRESHOLD: f64 = 7.0;
/// Streak length that earns celebration.
const STREAK_CELEBRATION_DAYS: u32 = 7;
/// Users below this many points are nudged toward the community.
const SOCIAL_NUDGE_MAX_POINTS: u64 = 50;
/// Priority given to random backfill picks.
const BACKFILL_PRIORITY: u8 = 10;

/// Everything the ranker looks at, already loaded.
#[derive(Debug, Clone)]
pub struct SuggestionInputs {
    pub user_name: String,
    pub engagement: EngagementState,
    /// Newest first
    pub recent_moods: Vec<MoodEntry>,
    pub tracked_today: bool,
    pub posts_today: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionAnalytics {
    pub recent_mood_count: usize,
    /// Rounded to one decimal; 0 without history
    pub average_recent_mood: f64,
    pub has_tracked_today: bool,
    pub has_posted_today: bool,
    pub current_streak: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsReport {
    pub suggestions: Vec<Suggestion>,
    pub personalized_message: String,
    pub analytics: SuggestionAnalytics,
}

/// Load ranking inputs for `user_id` as of `now`.
pub async fn load_inputs(
    db: &dyn Store,
    calendar: &Calendar,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<SuggestionInputs> {
    let user = db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    let (_, end_of_today) = calendar.day_bounds(now);
    let since = now - Duration::days(RECENT_MOOD_DAYS);

    let mut recent_moods = db.mood_entries_between(user_id, since, end_of_today).await?;
    recent_moods.reverse();

    let today = fetch_today(db, calendar, user_id, now).await?;

    Ok(SuggestionInputs {
        user_name: user.name,
        engagement: user.engagement,
        recent_moods,
        tracked_today: today.mood.is_some(),
        posts_today: today.posts.len(),
    })
}

/// Mean intensity over `moods`, `None` when empty.
pub fn average_intensity(moods: &[MoodEntry]) -> Option<f64> {
    if moods.is_empty() {
        return None;
    }
    let sum: u32 = moods.iter().map(|m| u32::from(m.intensity)).sum();
    Some(f64::from(sum) / moods.len() as f64)
}

/// Accumulates suggestions, refusing repeated kinds.
struct Picks {
    list: Vec<Suggestion>,
}

impl Picks {
    fn has(&self, kind: SuggestionKind) -> bool {
        self.list.iter().any(|s| s.kind == kind)
    }

    fn len(&self) -> usize {
        self.list.len()
    }

    fn add(
        &mut self,
        kind: SuggestionKind,
        description: Option<String>,
        priority: u8,
        reason: Reason,
    ) {
        if !self.has(kind) {
            self.list
                .push(Suggestion::from_template(kind, description, priority, reason));
        }
    }
}

impl SuggestionInputs {
    fn average_intensity(&self) -> Option<f64> {
        average_intensity(&self.recent_moods)
    }

    fn any_label(&self, labels: &[&str]) -> bool {
        self.recent_moods.iter().any(|m| {
            labels
                .iter()
                .any(|l| m.mood.label.eq_ignore_ascii_case(l))
        })
    }

    /// Ranked, deduplicated suggestions (at most [`MAX_SUGGESTIONS`]).
    pub fn suggestions<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Suggestion> {
        let mut picks = Picks { list: Vec::new() };

        if !self.tracked_today {
            picks.add(
                SuggestionKind::MoodTrack,
                Some(
                    "You haven't tracked your mood today. Take a moment to check in with yourself."
                        .to_string(),
                ),
                1,
                Reason::DailyTracking,
            );
        }

        if self.posts_today == 0 && self.engagement.total_points < SOCIAL_NUDGE_MAX_POINTS {
            picks.add(
                SuggestionKind::Social,
                Some(
                    "Connect with others who understand your journey. Share or support someone today."
                        .to_string(),
                ),
                2,
                Reason::CommunityEngagement,
            );
        }

        if let Some(average) = self.average_intensity() {
            if average < LOW_MOOD_THRESHOLD {
                picks.add(
                    SuggestionKind::Breathing,
                    Some(
                        "Your recent moods suggest you might benefit from some calming breathing exercises."
                            .to_string(),
                    ),
                    3,
                    Reason::LowMoodPattern,
                );
                if picks.len() < MAX_SUGGESTIONS {
                    picks.add(
                        SuggestionKind::Music,
                        Some(
                            "Some soothing music might help lift your spirits and provide comfort."
                                .to_string(),
                        ),
                        4,
                        Reason::MoodSupport,
                    );
                }
            }

            if average > HIGH_MOOD_THRESHOLD {
                picks.add(
                    SuggestionKind::Gratitude,
                    Some(
                        "You're feeling great! Capture this positive energy with some gratitude journaling."
                            .to_string(),
                    ),
                    3,
                    Reason::PositiveMood,
                );
                if picks.len() < MAX_SUGGESTIONS {
                    picks.add(
                        SuggestionKind::Walk,
                        Some(
                            "Your positive energy is perfect for an energizing walk outside!"
                                .to_string(),
                        ),
                        4,
                        Reason::EnergyBoost,
                    );
                }
            }

            if self.any_label(&["anxious", "stressed"]) {
                picks.add(
                    SuggestionKind::Meditation,
                    Some(
                        "Feeling anxious? A short meditation can help calm your mind and reduce stress."
                            .to_string(),
                    ),
                    2,
                    Reason::AnxietySupport,
                );
            }

            if self.any_label(&["tired", "exhausted"]) {
                picks.add(
                    SuggestionKind::Stretch,
                    Some(
                        "Feeling tired? Some gentle stretches can help energize your body and mind."
                            .to_string(),
                    ),
                    3,
                    Reason::EnergyBoost,
                );
            }
        }

        if self.engagement.current_streak >= STREAK_CELEBRATION_DAYS {
            picks.add(
                SuggestionKind::Progress,
                Some(format!(
                    "Amazing {}-day streak! Take a moment to celebrate your consistency.",
                    self.engagement.current_streak
                )),
                5,
                Reason::StreakCelebration,
            );
        }

        while picks.len() < MAX_SUGGESTIONS {
            let available: Vec<SuggestionKind> = CATALOG
                .iter()
                .map(|t| t.kind)
                .filter(|k| !picks.has(*k))
                .collect();
            let Some(&kind) = available.choose(rng) else {
                break;
            };
            picks.add(kind, None, BACKFILL_PRIORITY, Reason::GeneralWellness);
        }

        let mut list = picks.list;
        list.sort_by_key(|s| s.priority);
        list.truncate(MAX_SUGGESTIONS);
        list
    }

    /// Greeting for the local `hour` plus the single best-fitting message body.
    pub fn personalized_message(&self, hour: u32) -> String {
        let greeting = if hour < 12 {
            "Good morning"
        } else if hour < 17 {
            "Good afternoon"
        } else {
            "Good evening"
        };
        let name = &self.user_name;

        if !self.tracked_today {
            return format!("{greeting}, {name}! Ready to start your wellness journey today?");
        }

        let Some(average) = self.average_intensity() else {
            return format!("{greeting}! Here are some activities to support your wellbeing.");
        };

        if average < LOW_MOOD_THRESHOLD {
            format!(
                "{greeting}, {name}. I've noticed you've been having some challenging days. Here are some gentle activities that might help."
            )
        } else if average > HIGH_MOOD_THRESHOLD {
            format!(
                "{greeting}, {name}! You've been feeling great lately. Let's keep that positive momentum going!"
            )
        } else if self.engagement.current_streak >= STREAK_CELEBRATION_DAYS {
            format!(
                "{greeting}, {name}! Your {}-day streak is impressive. Here are some ways to maintain your wellness routine.",
                self.engagement.current_streak
            )
        } else {
            format!(
                "{greeting}, {name}! Based on your recent activity, here are some personalized suggestions for you."
            )
        }
    }

    pub fn analytics(&self) -> SuggestionAnalytics {
        SuggestionAnalytics {
            recent_mood_count: self.recent_moods.len(),
            average_recent_mood: self.average_intensity().map(round_one_decimal).unwrap_or(0.0),
            has_tracked_today: self.tracked_today,
            has_posted_today: self.posts_today > 0,
            current_streak: self.engagement.current_streak,
        }
    }

    /// Full response for the local `hour`.
    pub fn report<R: Rng + ?Sized>(&self, rng: &mut R, hour: u32) -> SuggestionsReport {
        SuggestionsReport {
            suggestions: self.suggestions(rng),
            personalized_message: self.personalized_message(hour),
            analytics: self.analytics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mood;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn mood(label: &str, intensity: u8) -> MoodEntry {
        MoodEntry {
            id: crate::db::new_document_id(),
            user_id: "u1".to_string(),
            mood: Mood {
                emoji: "•".to_string(),
                label: label.to_string(),
            },
            intensity,
            journal_entry: String::new(),
            date: Utc::now(),
            engagement_applied: true,
        }
    }

    fn inputs(
        moods: Vec<MoodEntry>,
        tracked: bool,
        posts: usize,
        points: u64,
        streak: u32,
    ) -> SuggestionInputs {
        SuggestionInputs {
            user_name: "Ada".to_string(),
            engagement: EngagementState {
                total_points: points,
                current_streak: streak,
                longest_streak: streak,
                ..Default::default()
            },
            recent_moods: moods,
            tracked_today: tracked,
            posts_today: posts,
        }
    }

    fn kinds(list: &[Suggestion]) -> Vec<SuggestionKind> {
        list.iter().map(|s| s.kind).collect()
    }

    fn assert_well_formed(list: &[Suggestion]) {
        assert!(list.len() <= MAX_SUGGESTIONS);
        let unique: HashSet<_> = list.iter().map(|s| s.kind).collect();
        assert_eq!(unique.len(), list.len(), "duplicate kinds in {list:?}");
        assert!(list.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn test_low_mood_suggests_breathing() {
        let ctx = inputs(
            vec![mood("Sad", 2), mood("Low", 3), mood("Down", 1)],
            true,
            1,
            200,
            2,
        );
        let list = ctx.suggestions(&mut StdRng::seed_from_u64(7));

        let breathing = list
            .iter()
            .find(|s| s.kind == SuggestionKind::Breathing)
            .expect("breathing suggested");
        assert_eq!(breathing.reason, Reason::LowMoodPattern);
        assert_eq!(breathing.priority, 3);
        assert_eq!(kinds(&list)[..2], [SuggestionKind::Breathing, SuggestionKind::Music]);
        assert_well_formed(&list);
    }

    #[test]
    fn test_new_user_gets_tracking_and_social_first() {
        let ctx = inputs(vec![], false, 0, 0, 0);
        let list = ctx.suggestions(&mut StdRng::seed_from_u64(1));

        assert_eq!(list.len(), 3);
        assert_eq!(list[0].kind, SuggestionKind::MoodTrack);
        assert_eq!(list[0].reason, Reason::DailyTracking);
        assert_eq!(list[1].kind, SuggestionKind::Social);
        assert_eq!(list[2].reason, Reason::GeneralWellness);
        assert_eq!(list[2].priority, BACKFILL_PRIORITY);
        assert_well_formed(&list);
    }

    #[test]
    fn test_social_nudge_only_below_points_threshold() {
        let nudged = |points| {
            inputs(vec![], true, 0, points, 0)
                .suggestions(&mut StdRng::seed_from_u64(3))
                .iter()
                .any(|s| s.reason == Reason::CommunityEngagement)
        };
        assert!(nudged(49));
        assert!(!nudged(50));
    }

    #[test]
    fn test_music_skipped_when_full() {
        // mood-track, social, breathing fill the list before music is considered.
        let ctx = inputs(vec![mood("Sad", 2)], false, 0, 0, 0);
        let list = ctx.suggestions(&mut StdRng::seed_from_u64(5));
        assert_eq!(
            kinds(&list),
            vec![
                SuggestionKind::MoodTrack,
                SuggestionKind::Social,
                SuggestionKind::Breathing
            ]
        );
    }

    #[test]
    fn test_anxious_label_case_insensitive_meditation_ranks_high() {
        let ctx = inputs(vec![mood("ANXIOUS", 6), mood("Okay", 6)], true, 1, 100, 0);
        let list = ctx.suggestions(&mut StdRng::seed_from_u64(9));

        assert_eq!(list[0].kind, SuggestionKind::Meditation);
        assert_eq!(list[0].priority, 2);
        assert_eq!(list[0].reason, Reason::AnxietySupport);
        assert_well_formed(&list);
    }

    #[test]
    fn test_high_mood_and_tired() {
        let ctx = inputs(vec![mood("Tired", 8), mood("Happy", 9)], true, 1, 100, 0);
        let list = ctx.suggestions(&mut StdRng::seed_from_u64(2));

        // gratitude(3), walk(4), stretch(3) -> stable sort keeps gratitude before stretch.
        assert_eq!(
            kinds(&list),
            vec![
                SuggestionKind::Gratitude,
                SuggestionKind::Stretch,
                SuggestionKind::Walk
            ]
        );
        assert_eq!(list[1].reason, Reason::EnergyBoost);
    }

    #[test]
    fn test_streak_celebration_interpolates_length() {
        let ctx = inputs(vec![mood("Okay", 6)], true, 1, 500, 12);
        let list = ctx.suggestions(&mut StdRng::seed_from_u64(4));

        let progress = list
            .iter()
            .find(|s| s.kind == SuggestionKind::Progress)
            .expect("progress suggested");
        assert!(progress.description.contains("12-day streak"));
        assert_eq!(progress.reason, Reason::StreakCelebration);
    }

    #[test]
    fn test_invariants_hold_across_seeds_and_inputs() {
        let histories = [
            vec![],
            vec![mood("Sad", 1)],
            vec![mood("Happy", 10), mood("Anxious", 9)],
            vec![mood("Exhausted", 4), mood("Stressed", 2)],
            vec![mood("Okay", 5), mood("Fine", 7)],
        ];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for (i, history) in histories.iter().enumerate() {
                let ctx = inputs(
                    history.clone(),
                    seed % 2 == 0,
                    (seed % 3) as usize,
                    seed * 3,
                    (i as u32) * 4,
                );
                let list = ctx.suggestions(&mut rng);
                assert_eq!(list.len(), MAX_SUGGESTIONS);
                assert_well_formed(&list);
            }
        }
    }

    #[test]
    fn test_message_precedence() {
        let not_tracked = inputs(vec![mood("Sad", 1)], false, 0, 0, 10);
        assert_eq!(
            not_tracked.personalized_message(9),
            "Good morning, Ada! Ready to start your wellness journey today?"
        );

        let no_history = inputs(vec![], true, 0, 0, 10);
        assert_eq!(
            no_history.personalized_message(13),
            "Good afternoon! Here are some activities to support your wellbeing."
        );

        let low = inputs(vec![mood("Sad", 2)], true, 0, 0, 10);
        assert!(low
            .personalized_message(20)
            .starts_with("Good evening, Ada. I've noticed"));

        let high = inputs(vec![mood("Great", 9)], true, 0, 0, 10);
        assert!(high.personalized_message(12).contains("feeling great lately"));

        let streak = inputs(vec![mood("Okay", 6)], true, 0, 0, 10);
        assert!(streak.personalized_message(16).contains("Your 10-day streak"));

        let plain = inputs(vec![mood("Okay", 6)], true, 0, 0, 2);
        assert!(plain.personalized_message(17).starts_with("Good evening, Ada! Based on"));
    }

    #[test]
    fn test_analytics() {
        let ctx = inputs(vec![mood("a", 2), mood("b", 3), mood("c", 3)], true, 2, 0, 4);
        let analytics = ctx.analytics();
        assert_eq!(analytics.recent_mood_count, 3);
        assert_eq!(analytics.average_recent_mood, 2.7);
        assert!(analytics.has_tracked_today);
        assert!(analytics.has_posted_today);
        assert_eq!(analytics.current_streak, 4);
    }
}
