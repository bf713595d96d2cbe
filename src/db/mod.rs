//! Database layer.
//!
//! [`Store`] is the document-store collaborator the services talk to. Two
//! backends implement it: Firestore for deployments and an in-memory store
//! for local development and tests.

pub mod firestore;
pub mod locks;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use locks::KeyedLocks;
pub use memory::MemoryDb;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::models::{
    BreathingSession, CommunityPost, EngagementState, LikeToggle, MoodEntry, RecordKind, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const MOOD_ENTRIES: &str = "mood_entries";
    pub const BREATHING_SESSIONS: &str = "breathing_sessions";
    pub const COMMUNITY_POSTS: &str = "community_posts";
}

/// Typed document-store operations.
///
/// Range queries are half-open (`start <= t < end`) and return records in
/// ascending time order; "recent" queries return newest first.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    async fn upsert_user(&self, user: &User) -> Result<(), AppError>;

    /// Write `state` only if the stored revision still equals `expected_revision`.
    ///
    /// Returns the new revision, `AppError::Conflict` if another writer got
    /// there first, or `AppError::NotFound` if the user is gone.
    async fn update_engagement(
        &self,
        user_id: &str,
        expected_revision: u64,
        state: &EngagementState,
    ) -> Result<u64, AppError>;

    // ─── Mood entries ────────────────────────────────────────────

    async fn create_mood_entry(&self, entry: &MoodEntry) -> Result<(), AppError>;

    async fn get_mood_entry(&self, entry_id: &str) -> Result<Option<MoodEntry>, AppError>;

    async fn mood_entries_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MoodEntry>, AppError>;

    /// Newest first; `None` returns every entry.
    async fn recent_mood_entries(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<MoodEntry>, AppError>;

    // ─── Breathing sessions ──────────────────────────────────────

    async fn create_breathing_session(&self, session: &BreathingSession) -> Result<(), AppError>;

    async fn get_breathing_session(
        &self,
        session_id: &str,
    ) -> Result<Option<BreathingSession>, AppError>;

    async fn breathing_sessions_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BreathingSession>, AppError>;

    /// Newest first.
    async fn recent_breathing_sessions(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<BreathingSession>, AppError>;

    // ─── Community posts ─────────────────────────────────────────

    async fn create_post(&self, post: &CommunityPost) -> Result<(), AppError>;

    async fn get_post(&self, post_id: &str) -> Result<Option<CommunityPost>, AppError>;

    /// Feed across all users, newest first.
    async fn recent_posts(&self, limit: u32) -> Result<Vec<CommunityPost>, AppError>;

    async fn posts_by_user_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CommunityPost>, AppError>;

    /// Every post by a user, newest first.
    async fn posts_by_user(&self, user_id: &str) -> Result<Vec<CommunityPost>, AppError>;

    /// Atomically flip `user_id`'s like on a post.
    async fn toggle_like(
        &self,
        post_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LikeToggle, AppError>;

    // ─── Engagement credit ───────────────────────────────────────

    /// Atomically set the `engagement_applied` flag on an activity record.
    ///
    /// Returns the flag's previous value, so setting `true` doubles as a
    /// claim: only the caller that sees `false` may credit the record.
    async fn set_engagement_applied(
        &self,
        kind: RecordKind,
        record_id: &str,
        applied: bool,
    ) -> Result<bool, AppError>;

    // ─── Lifecycle ───────────────────────────────────────────────

    /// Release the connection. Later calls fail with a database error.
    async fn close(&self) -> Result<(), AppError>;
}

/// Connect the backend selected in `config`.
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>, AppError> {
    match config.storage {
        StorageBackend::Firestore => Ok(Arc::new(FirestoreDb::new(&config.gcp_project_id).await?)),
        StorageBackend::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryDb::new()))
        }
    }
}

/// New random document ID.
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
