// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile + engagement state)
//! - Mood entries, breathing sessions (per-user activity records)
//! - Community posts (shared feed with likes)

use crate::db::{collections, KeyedLocks, Store};
use crate::error::AppError;
use crate::models::{
    BreathingSession, CommunityPost, EngagementState, LikeToggle, MoodEntry, RecordKind, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::{
    FirestoreConsistencySelector, FirestoreQueryDirection, FirestoreTimestamp,
    FirestoreTransaction,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Commits retried after the transaction lost to a concurrent writer.
const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
    /// Serialises like toggles per post within this instance.
    post_locks: KeyedLocks,
    /// Shared by clones; set by `close`.
    closed: Arc<AtomicBool>,
}

/// A client whose reads join `transaction`.
///
/// Firestore validates these reads at commit time, so a write to any of the
/// read documents by another client in between aborts the commit.
fn transactional(
    client: &firestore::FirestoreDb,
    transaction: &FirestoreTransaction<'_>,
) -> firestore::FirestoreDb {
    client.clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
        transaction.transaction_id().clone(),
    ))
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
            post_locks: KeyedLocks::new(),
            closed: Arc::default(),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
            post_locks: KeyedLocks::new(),
            closed: Arc::default(),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            post_locks: KeyedLocks::new(),
            closed: Arc::default(),
        }
    }

    /// Helper to get the client or return an error if offline or closed.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AppError::Database("Firestore client is closed".to_string()));
        }
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Per-user query on `time_field` within `[start, end)`, ascending.
    async fn user_range<T>(
        &self,
        collection: &str,
        user_id: &str,
        time_field: &'static str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field(time_field)
                        .greater_than_or_equal(FirestoreTimestamp(start)),
                    q.field(time_field).less_than(FirestoreTimestamp(end)),
                ])
            })
            .order_by([(time_field, FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Per-user query, newest first on `time_field`.
    async fn user_recent<T>(
        &self,
        collection: &str,
        user_id: &str,
        time_field: &'static str,
        limit: Option<u32>,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        let user_id = user_id.to_string();
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([(time_field, FirestoreQueryDirection::Descending)]);

        let query = match limit {
            Some(limit) => query.limit(limit),
            None => query,
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

impl FirestoreDb {
    async fn get_by_id<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Transactionally swap a boolean field of one document.
    async fn swap_flag<T>(
        &self,
        collection: &str,
        id: &str,
        value: bool,
        flag: fn(&mut T) -> &mut bool,
    ) -> Result<Option<bool>, AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<T> = transactional(client, &transaction)
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read {collection} in transaction: {}", e))
            })?;

        let Some(mut doc) = current else {
            let _ = transaction.rollback().await;
            return Ok(None);
        };

        let previous = std::mem::replace(flag(&mut doc), value);
        if previous == value {
            let _ = transaction.rollback().await;
            return Ok(Some(previous));
        }

        client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(&doc)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add write to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Conflict(format!("Transaction commit failed: {}", e)))?;

        Ok(Some(previous))
    }

    /// One transactional like toggle. A lost commit race is a conflict.
    async fn try_toggle_like(
        &self,
        post_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LikeToggle, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<CommunityPost> = transactional(client, &transaction)
            .fluent()
            .select()
            .by_id_in(collections::COMMUNITY_POSTS)
            .obj()
            .one(post_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read post in transaction: {}", e))
            })?;

        let Some(mut post) = current else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!("Post {post_id} not found")));
        };

        let toggle = post.toggle_like(user_id, now);

        client
            .fluent()
            .update()
            .in_col(collections::COMMUNITY_POSTS)
            .document_id(post_id)
            .object(&post)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add post to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Conflict(format!("Transaction commit failed: {}", e)))?;

        Ok(toggle)
    }
}

#[async_trait]
impl Store for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_by_id(collections::USERS, user_id).await
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Conditional engagement write inside a Firestore transaction.
    ///
    /// The user document is read through the transaction, so the revision
    /// check and the write commit together. If another client writes the
    /// document in between, the commit aborts and surfaces as a conflict.
    async fn update_engagement(
        &self,
        user_id: &str,
        expected_revision: u64,
        state: &EngagementState,
    ) -> Result<u64, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<User> = transactional(client, &transaction)
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read user in transaction: {}", e))
            })?;

        let Some(mut user) = current else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!("User {user_id} not found")));
        };

        if user.revision != expected_revision {
            let _ = transaction.rollback().await;
            return Err(AppError::Conflict(format!(
                "user {user_id} at revision {}, expected {expected_revision}",
                user.revision
            )));
        }

        user.engagement = state.clone();
        user.revision += 1;

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add user to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Conflict(format!("Transaction commit failed: {}", e)))?;

        Ok(user.revision)
    }

    // ─── Mood Operations ─────────────────────────────────────────

    async fn create_mood_entry(&self, entry: &MoodEntry) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MOOD_ENTRIES)
            .document_id(&entry.id)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_mood_entry(&self, entry_id: &str) -> Result<Option<MoodEntry>, AppError> {
        self.get_by_id(collections::MOOD_ENTRIES, entry_id).await
    }

    async fn mood_entries_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MoodEntry>, AppError> {
        self.user_range(collections::MOOD_ENTRIES, user_id, "date", start, end)
            .await
    }

    async fn recent_mood_entries(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<MoodEntry>, AppError> {
        self.user_recent(collections::MOOD_ENTRIES, user_id, "date", limit)
            .await
    }

    // ─── Breathing Operations ────────────────────────────────────

    async fn create_breathing_session(&self, session: &BreathingSession) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::BREATHING_SESSIONS)
            .document_id(&session.id)
            .object(session)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_breathing_session(
        &self,
        session_id: &str,
    ) -> Result<Option<BreathingSession>, AppError> {
        self.get_by_id(collections::BREATHING_SESSIONS, session_id)
            .await
    }

    async fn breathing_sessions_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BreathingSession>, AppError> {
        self.user_range(
            collections::BREATHING_SESSIONS,
            user_id,
            "completed_at",
            start,
            end,
        )
        .await
    }

    async fn recent_breathing_sessions(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<BreathingSession>, AppError> {
        self.user_recent(
            collections::BREATHING_SESSIONS,
            user_id,
            "completed_at",
            Some(limit),
        )
        .await
    }

    // ─── Community Operations ────────────────────────────────────

    async fn create_post(&self, post: &CommunityPost) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COMMUNITY_POSTS)
            .document_id(&post.id)
            .object(post)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<CommunityPost>, AppError> {
        self.get_by_id(collections::COMMUNITY_POSTS, post_id).await
    }

    async fn recent_posts(&self, limit: u32) -> Result<Vec<CommunityPost>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COMMUNITY_POSTS)
            .order_by([("created_at", FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn posts_by_user_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CommunityPost>, AppError> {
        self.user_range(
            collections::COMMUNITY_POSTS,
            user_id,
            "created_at",
            start,
            end,
        )
        .await
    }

    async fn posts_by_user(&self, user_id: &str) -> Result<Vec<CommunityPost>, AppError> {
        self.user_recent(collections::COMMUNITY_POSTS, user_id, "created_at", None)
            .await
    }

    /// Toggle a like inside a transaction, serialised per post in-process.
    ///
    /// Commits that lose to another process are retried from a fresh read.
    async fn toggle_like(
        &self,
        post_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LikeToggle, AppError> {
        let _guard = self.post_locks.lock(post_id).await;

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            match self.try_toggle_like(post_id, user_id, now).await {
                Ok(toggle) => {
                    tracing::debug!(post_id, user_id, liked = toggle.liked, "Like toggled");
                    return Ok(toggle);
                }
                Err(AppError::Conflict(msg)) => {
                    tracing::warn!(
                        post_id,
                        attempt,
                        conflict = %msg,
                        "Like commit conflict, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Database(format!(
            "Like toggle on post {post_id} kept conflicting after {MAX_COMMIT_ATTEMPTS} attempts"
        )))
    }

    // ─── Engagement credit ───────────────────────────────────────

    async fn set_engagement_applied(
        &self,
        kind: RecordKind,
        record_id: &str,
        applied: bool,
    ) -> Result<bool, AppError> {
        let previous = match kind {
            RecordKind::Mood => {
                self.swap_flag::<MoodEntry>(collections::MOOD_ENTRIES, record_id, applied, |e| {
                    &mut e.engagement_applied
                })
                .await?
            }
            RecordKind::Breathing => {
                self.swap_flag::<BreathingSession>(
                    collections::BREATHING_SESSIONS,
                    record_id,
                    applied,
                    |s| &mut s.engagement_applied,
                )
                .await?
            }
            RecordKind::Post => {
                self.swap_flag::<CommunityPost>(
                    collections::COMMUNITY_POSTS,
                    record_id,
                    applied,
                    |p| &mut p.engagement_applied,
                )
                .await?
            }
        };

        previous.ok_or_else(|| {
            AppError::NotFound(format!("{} {record_id} not found", kind.label()))
        })
    }

    // ─── Lifecycle ───────────────────────────────────────────────

    async fn close(&self) -> Result<(), AppError> {
        // The gRPC channel itself is released when the last clone drops.
        self.closed.store(true, Ordering::SeqCst);
        tracing::info!("Firestore client closed");
        Ok(())
    }
}
