// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Anonymous community feed posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Longest post body accepted.
pub const MAX_POST_CHARS: usize = 500;

/// Stored community post.
///
/// Only `likes` changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPost {
    /// Document ID
    pub id: String,
    /// Author
    pub user_id: String,
    /// Trimmed body
    pub content: String,
    /// Author's display name when the post was made
    pub author_name: String,
    /// Liker user ID -> when they liked it
    #[serde(default)]
    pub likes: HashMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_anonymous")]
    pub is_anonymous: bool,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Whether the post bonus has been credited
    #[serde(default = "super::credited")]
    pub engagement_applied: bool,
}

fn default_anonymous() -> bool {
    true
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    /// Whether the user likes the post after the toggle
    pub liked: bool,
    /// Like count after the toggle
    pub likes: usize,
}

impl CommunityPost {
    /// Flip `user_id`'s like. Membership is a set, so repeats cannot stack.
    pub fn toggle_like(&mut self, user_id: &str, now: DateTime<Utc>) -> LikeToggle {
        let liked = if self.likes.remove(user_id).is_some() {
            false
        } else {
            self.likes.insert(user_id.to_string(), now);
            true
        };

        LikeToggle {
            liked,
            likes: self.likes.len(),
        }
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.contains_key(user_id)
    }
}
