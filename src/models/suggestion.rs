// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Suggestion catalogue and ranked suggestion shape.

use serde::Serialize;

/// Suggestion type; at most one suggestion of each kind per response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    Breathing,
    Gratitude,
    Meditation,
    Walk,
    Music,
    Stretch,
    Social,
    MoodTrack,
    Progress,
}

/// Why a suggestion was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    DailyTracking,
    CommunityEngagement,
    LowMoodPattern,
    MoodSupport,
    PositiveMood,
    EnergyBoost,
    AnxietySupport,
    StreakCelebration,
    GeneralWellness,
}

/// Static catalogue entry.
#[derive(Debug)]
pub struct SuggestionTemplate {
    pub kind: SuggestionKind,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub action: &'static str,
    pub color: &'static str,
    pub category: &'static str,
    pub priority: u8,
}

/// The full catalogue, in base-priority order.
pub static CATALOG: [SuggestionTemplate; 9] = [
    SuggestionTemplate {
        kind: SuggestionKind::Breathing,
        title: "Guided Breathing Exercise",
        description: "Try a guided breathing technique to reduce stress and improve focus.",
        icon: "🫁",
        action: "Start Breathing",
        color: "from-cyan-400 to-blue-500",
        category: "mindfulness",
        priority: 1,
    },
    SuggestionTemplate {
        kind: SuggestionKind::Gratitude,
        title: "Gratitude Journaling",
        description: "Write down three things you're grateful for today.",
        icon: "🙏",
        action: "Start Journaling",
        color: "from-green-400 to-emerald-500",
        category: "reflection",
        priority: 2,
    },
    SuggestionTemplate {
        kind: SuggestionKind::Meditation,
        title: "Mindfulness Meditation",
        description: "Take 10 minutes to practice mindfulness and center yourself.",
        icon: "🧘",
        action: "Start Meditation",
        color: "from-purple-400 to-indigo-500",
        category: "mindfulness",
        priority: 3,
    },
    SuggestionTemplate {
        kind: SuggestionKind::Walk,
        title: "Nature Walk",
        description: "Step outside for a refreshing walk to boost your mood.",
        icon: "🚶",
        action: "Plan Walk",
        color: "from-green-400 to-teal-500",
        category: "physical",
        priority: 4,
    },
    SuggestionTemplate {
        kind: SuggestionKind::Music,
        title: "Calming Music",
        description: "Listen to soothing music to help relax your mind.",
        icon: "🎵",
        action: "Play Music",
        color: "from-pink-400 to-rose-500",
        category: "relaxation",
        priority: 5,
    },
    SuggestionTemplate {
        kind: SuggestionKind::Stretch,
        title: "Gentle Stretching",
        description: "Do some light stretches to release tension in your body.",
        icon: "🤸",
        action: "Start Stretching",
        color: "from-orange-400 to-yellow-500",
        category: "physical",
        priority: 6,
    },
    SuggestionTemplate {
        kind: SuggestionKind::Social,
        title: "Connect with Community",
        description: "Share your thoughts or support others in the community.",
        icon: "👥",
        action: "Visit Community",
        color: "from-indigo-400 to-purple-500",
        category: "social",
        priority: 7,
    },
    SuggestionTemplate {
        kind: SuggestionKind::MoodTrack,
        title: "Track Your Mood",
        description: "Take a moment to check in with yourself and log your mood.",
        icon: "💝",
        action: "Track Mood",
        color: "from-pink-400 to-purple-500",
        category: "tracking",
        priority: 8,
    },
    SuggestionTemplate {
        kind: SuggestionKind::Progress,
        title: "Review Your Progress",
        description: "Look at your achievements and celebrate your journey.",
        icon: "📊",
        action: "View Progress",
        color: "from-cyan-400 to-blue-500",
        category: "reflection",
        priority: 9,
    },
];

impl SuggestionKind {
    pub fn template(self) -> &'static SuggestionTemplate {
        match CATALOG.iter().find(|t| t.kind == self) {
            Some(t) => t,
            // Every kind has exactly one catalogue entry.
            None => unreachable!("missing catalogue entry for {self:?}"),
        }
    }
}

/// A ranked recommendation returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: &'static str,
    pub description: String,
    pub icon: &'static str,
    pub action: &'static str,
    pub color: &'static str,
    pub category: &'static str,
    /// Lower is more urgent
    pub priority: u8,
    pub reason: Reason,
}

impl Suggestion {
    /// Instantiate a catalogue entry with a ranking priority and reason.
    /// `description` overrides the catalogue text when given.
    pub fn from_template(
        kind: SuggestionKind,
        description: Option<String>,
        priority: u8,
        reason: Reason,
    ) -> Self {
        let t = kind.template();
        Self {
            kind,
            title: t.title,
            description: description.unwrap_or_else(|| t.description.to_string()),
            icon: t.icon,
            action: t.action,
            color: t.color,
            category: t.category,
            priority,
            reason,
        }
    }
}
