// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Guided breathing sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported breathing techniques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technique {
    Box,
    #[serde(rename = "478")]
    FourSevenEight,
    Triangle,
    Coherent,
    Energizing,
    Extended,
}

impl Technique {
    pub const ALL: [Technique; 6] = [
        Technique::Box,
        Technique::FourSevenEight,
        Technique::Triangle,
        Technique::Coherent,
        Technique::Energizing,
        Technique::Extended,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Technique::Box => "box",
            Technique::FourSevenEight => "478",
            Technique::Triangle => "triangle",
            Technique::Coherent => "coherent",
            Technique::Energizing => "energizing",
            Technique::Extended => "extended",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored breathing session. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathingSession {
    /// Document ID
    pub id: String,
    /// Owner
    pub user_id: String,
    pub technique: Technique,
    /// Seconds
    #[serde(default)]
    pub duration: u32,
    /// At least 1
    pub cycles: u32,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub completed_at: DateTime<Utc>,
    /// Whether points/streak have been credited for this session
    #[serde(default = "super::credited")]
    pub engagement_applied: bool,
}
