//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EngagementState;

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID (also used as document ID, and JWT subject)
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// When the account was created
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Points and streak state
    #[serde(default)]
    pub engagement: EngagementState,
    /// Bumped on every engagement write; conditional writes compare against it.
    #[serde(default)]
    pub revision: u64,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            created_at: Utc::now(),
            engagement: EngagementState::default(),
            revision: 0,
        }
    }
}
