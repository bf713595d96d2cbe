// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store for local development and tests.

use crate::db::Store;
use crate::error::AppError;
use crate::models::{
    BreathingSession, CommunityPost, EngagementState, LikeToggle, MoodEntry, RecordKind, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory store. Clones share the same data.
///
/// Per-user collections are kept in insertion order; mutation of a single
/// document happens under its DashMap shard lock, so conditional writes and
/// like toggles are atomic.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    users: DashMap<String, User>,
    /// user_id -> entries
    moods: DashMap<String, Vec<MoodEntry>>,
    /// user_id -> sessions
    sessions: DashMap<String, Vec<BreathingSession>>,
    /// post_id -> post
    posts: DashMap<String, CommunityPost>,
    closed: AtomicBool,
    fail_engagement_writes: AtomicBool,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent engagement write fail (for exercising
    /// partial-write handling).
    pub fn fail_engagement_writes(&self, fail: bool) {
        self.inner
            .fail_engagement_writes
            .store(fail, Ordering::SeqCst);
    }

    fn ensure_open(&self) -> Result<&Inner, AppError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(AppError::Database("Store is closed".to_string()));
        }
        Ok(&self.inner)
    }
}

fn in_range(t: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start <= t && t < end
}

#[async_trait]
impl Store for MemoryDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.ensure_open()?.users.get(user_id).map(|u| u.value().clone()))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.ensure_open()?
            .users
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update_engagement(
        &self,
        user_id: &str,
        expected_revision: u64,
        state: &EngagementState,
    ) -> Result<u64, AppError> {
        let inner = self.ensure_open()?;
        if inner.fail_engagement_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("Engagement write rejected".to_string()));
        }

        let mut user = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        if user.revision != expected_revision {
            return Err(AppError::Conflict(format!(
                "user {user_id} at revision {}, expected {expected_revision}",
                user.revision
            )));
        }

        user.engagement = state.clone();
        user.revision += 1;
        Ok(user.revision)
    }

    async fn create_mood_entry(&self, entry: &MoodEntry) -> Result<(), AppError> {
        self.ensure_open()?
            .moods
            .entry(entry.user_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn get_mood_entry(&self, entry_id: &str) -> Result<Option<MoodEntry>, AppError> {
        Ok(self
            .ensure_open()?
            .moods
            .iter()
            .find_map(|list| list.iter().find(|e| e.id == entry_id).cloned()))
    }

    async fn mood_entries_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MoodEntry>, AppError> {
        let mut entries: Vec<MoodEntry> = self
            .ensure_open()?
            .moods
            .get(user_id)
            .map(|list| {
                list.iter()
                    .filter(|e| in_range(e.date, start, end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    async fn recent_mood_entries(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<MoodEntry>, AppError> {
        let mut entries: Vec<MoodEntry> = self
            .ensure_open()?
            .moods
            .get(user_id)
            .map(|list| list.value().clone())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = limit {
            entries.truncate(limit as usize);
        }
        Ok(entries)
    }

    async fn create_breathing_session(&self, session: &BreathingSession) -> Result<(), AppError> {
        self.ensure_open()?
            .sessions
            .entry(session.user_id.clone())
            .or_default()
            .push(session.clone());
        Ok(())
    }

    async fn get_breathing_session(
        &self,
        session_id: &str,
    ) -> Result<Option<BreathingSession>, AppError> {
        Ok(self
            .ensure_open()?
            .sessions
            .iter()
            .find_map(|list| list.iter().find(|s| s.id == session_id).cloned()))
    }

    async fn breathing_sessions_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BreathingSession>, AppError> {
        let mut sessions: Vec<BreathingSession> = self
            .ensure_open()?
            .sessions
            .get(user_id)
            .map(|list| {
                list.iter()
                    .filter(|s| in_range(s.completed_at, start, end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sessions.sort_by_key(|s| s.completed_at);
        Ok(sessions)
    }

    async fn recent_breathing_sessions(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<BreathingSession>, AppError> {
        let mut sessions: Vec<BreathingSession> = self
            .ensure_open()?
            .sessions
            .get(user_id)
            .map(|list| list.value().clone())
            .unwrap_or_default();
        sessions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn create_post(&self, post: &CommunityPost) -> Result<(), AppError> {
        self.ensure_open()?
            .posts
            .insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<CommunityPost>, AppError> {
        Ok(self.ensure_open()?.posts.get(post_id).map(|p| p.value().clone()))
    }

    async fn recent_posts(&self, limit: u32) -> Result<Vec<CommunityPost>, AppError> {
        let mut posts: Vec<CommunityPost> = self
            .ensure_open()?
            .posts
            .iter()
            .map(|p| p.value().clone())
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn posts_by_user_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CommunityPost>, AppError> {
        let mut posts: Vec<CommunityPost> = self
            .ensure_open()?
            .posts
            .iter()
            .filter(|p| p.user_id == user_id && in_range(p.created_at, start, end))
            .map(|p| p.value().clone())
            .collect();
        posts.sort_by_key(|p| p.created_at);
        Ok(posts)
    }

    async fn posts_by_user(&self, user_id: &str) -> Result<Vec<CommunityPost>, AppError> {
        let mut posts: Vec<CommunityPost> = self
            .ensure_open()?
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.value().clone())
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn toggle_like(
        &self,
        post_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LikeToggle, AppError> {
        let mut post = self
            .ensure_open()?
            .posts
            .get_mut(post_id)
            .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

        Ok(post.toggle_like(user_id, now))
    }

    async fn set_engagement_applied(
        &self,
        kind: RecordKind,
        record_id: &str,
        applied: bool,
    ) -> Result<bool, AppError> {
        let inner = self.ensure_open()?;

        // Each flag lives under a single shard lock, so the swap is atomic.
        let previous = match kind {
            RecordKind::Mood => inner.moods.iter_mut().find_map(|mut list| {
                list.iter_mut()
                    .find(|e| e.id == record_id)
                    .map(|e| std::mem::replace(&mut e.engagement_applied, applied))
            }),
            RecordKind::Breathing => inner.sessions.iter_mut().find_map(|mut list| {
                list.iter_mut()
                    .find(|s| s.id == record_id)
                    .map(|s| std::mem::replace(&mut s.engagement_applied, applied))
            }),
            RecordKind::Post => inner
                .posts
                .get_mut(record_id)
                .map(|mut p| std::mem::replace(&mut p.engagement_applied, applied)),
        };

        previous.ok_or_else(|| {
            AppError::NotFound(format!("{} {record_id} not found", kind.label()))
        })
    }

    async fn close(&self) -> Result<(), AppError> {
        self.inner.closed.store(true, Ordering::SeqCst);
        tracing::info!("In-memory store closed");
        Ok(())
    }
}
