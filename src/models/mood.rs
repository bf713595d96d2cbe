// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Mood journal entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub emoji: String,
    pub label: String,
}

/// Stored mood entry. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    /// Document ID
    pub id: String,
    /// Owner
    pub user_id: String,
    pub mood: Mood,
    /// 1-10 inclusive
    pub intensity: u8,
    /// Free text; empty when none was written
    #[serde(default)]
    pub journal_entry: String,
    /// When the mood was logged
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub date: DateTime<Utc>,
    /// Whether points/streak have been credited for this entry
    #[serde(default = "super::credited")]
    pub engagement_applied: bool,
}

impl MoodEntry {
    /// Journal text is trimmed when saved, so any text counts.
    pub fn has_journal(&self) -> bool {
        !self.journal_entry.is_empty()
    }
}
