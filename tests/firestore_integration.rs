// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (`FIRESTORE_EMULATOR_HOST`); otherwise they skip.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use wellness_tracker::calendar::Calendar;
use wellness_tracker::db::{new_document_id, Store};
use wellness_tracker::error::AppError;
use wellness_tracker::models::{
    CommunityPost, EngagementEvent, EngagementState, Mood, MoodEntry, RecordKind, User,
};
use wellness_tracker::services::EngagementService;

mod common;
use common::test_db;

/// Unique user id for test isolation.
fn unique_user_id() -> String {
    format!("test-{}", new_document_id())
}

#[tokio::test]
async fn test_user_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    assert!(db.get_user(&user_id).await.unwrap().is_none());

    let user = User::new(&user_id, "Test", "test@example.com");
    db.upsert_user(&user).await.unwrap();

    let loaded = db.get_user(&user_id).await.unwrap().expect("user exists");
    assert_eq!(loaded.name, "Test");
    assert_eq!(loaded.engagement, EngagementState::default());
    assert_eq!(loaded.revision, 0);
}

#[tokio::test]
async fn test_conditional_engagement_write() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();
    db.upsert_user(&User::new(&user_id, "Test", "t@example.com"))
        .await
        .unwrap();

    let state = EngagementState {
        total_points: 10,
        current_streak: 1,
        longest_streak: 1,
        previous_streak: 0,
        last_check_in: Some(Utc::now()),
    };

    let revision = db.update_engagement(&user_id, 0, &state).await.unwrap();
    assert_eq!(revision, 1);

    // Stale revision is rejected.
    let stale = db.update_engagement(&user_id, 0, &state).await;
    assert!(matches!(stale, Err(AppError::Conflict(_))));

    let loaded = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(loaded.engagement.total_points, 10);
    assert_eq!(loaded.revision, 1);
}

#[tokio::test]
async fn test_mood_range_query_is_half_open() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();
    let cal = Calendar::utc();
    let (start, end) = cal.day_bounds(Utc::now());

    for date in [start - Duration::seconds(1), start, end - Duration::seconds(1), end] {
        let entry = MoodEntry {
            id: new_document_id(),
            user_id: user_id.clone(),
            mood: Mood {
                emoji: "🙂".to_string(),
                label: "Calm".to_string(),
            },
            intensity: 5,
            journal_entry: String::new(),
            date,
            engagement_applied: true,
        };
        db.create_mood_entry(&entry).await.unwrap();
    }

    let today = db.mood_entries_between(&user_id, start, end).await.unwrap();
    assert_eq!(today.len(), 2);
    assert!(today[0].date <= today[1].date);
}

#[tokio::test]
async fn test_like_toggle_persists() {
    require_emulator!();

    let db = test_db().await;
    let post = CommunityPost {
        id: new_document_id(),
        user_id: unique_user_id(),
        content: "Hello".to_string(),
        author_name: "Test".to_string(),
        likes: HashMap::new(),
        tags: vec![],
        is_anonymous: true,
        created_at: Utc::now(),
        engagement_applied: true,
    };
    db.create_post(&post).await.unwrap();

    let on = db.toggle_like(&post.id, "liker", Utc::now()).await.unwrap();
    assert!(on.liked);
    assert_eq!(on.likes, 1);

    let off = db.toggle_like(&post.id, "liker", Utc::now()).await.unwrap();
    assert!(!off.liked);
    assert_eq!(off.likes, 0);
}

#[tokio::test]
async fn test_concurrent_check_ins_award_once() {
    require_emulator!();

    let db: Arc<dyn Store> = Arc::new(test_db().await);
    let user_id = unique_user_id();
    db.upsert_user(&User::new(&user_id, "Race", "race@example.com"))
        .await
        .unwrap();

    let service = EngagementService::new(db.clone(), Calendar::utc());
    let now = Utc::now();

    let mut handles = vec![];
    for _ in 0..5 {
        let service = service.clone();
        let user_id = user_id.clone();
        handles.push(tokio::spawn(async move {
            service
                .record(&user_id, EngagementEvent::MoodLogged, now)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let user = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.engagement.total_points, 10);
    assert_eq!(user.engagement.current_streak, 1);
}

#[tokio::test]
async fn test_separate_clients_do_not_lose_engagement_updates() {
    require_emulator!();

    // Independent clients and lock maps, as in two server processes.
    let first: Arc<dyn Store> = Arc::new(test_db().await);
    let second: Arc<dyn Store> = Arc::new(test_db().await);
    let user_id = unique_user_id();
    first
        .upsert_user(&User::new(&user_id, "Race", "race@example.com"))
        .await
        .unwrap();

    let services = [
        EngagementService::new(first.clone(), Calendar::utc()),
        EngagementService::new(second, Calendar::utc()),
    ];
    let now = Utc::now();

    let mut handles = vec![];
    for i in 0..6 {
        let service = services[i % 2].clone();
        let user_id = user_id.clone();
        handles.push(tokio::spawn(async move {
            service
                .record(&user_id, EngagementEvent::PostCreated, now)
                .await
        }));
    }

    let mut succeeded = 0u64;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    let user = first.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.engagement.total_points, 5 * succeeded);
    assert_eq!(user.revision, succeeded);
}

#[tokio::test]
async fn test_separate_clients_count_every_like() {
    require_emulator!();

    let first = test_db().await;
    let second = test_db().await;
    let post = CommunityPost {
        id: new_document_id(),
        user_id: unique_user_id(),
        content: "Busy feed".to_string(),
        author_name: "Author".to_string(),
        likes: HashMap::new(),
        tags: vec![],
        is_anonymous: true,
        created_at: Utc::now(),
        engagement_applied: true,
    };
    first.create_post(&post).await.unwrap();

    let mut handles = vec![];
    for i in 0..6 {
        let db = if i % 2 == 0 {
            first.clone()
        } else {
            second.clone()
        };
        let post_id = post.id.clone();
        handles.push(tokio::spawn(async move {
            db.toggle_like(&post_id, &format!("liker-{i}"), Utc::now())
                .await
        }));
    }

    let mut liked = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            liked += 1;
        }
    }

    let stored = first.get_post(&post.id).await.unwrap().unwrap();
    assert_eq!(stored.like_count(), liked);
}

#[tokio::test]
async fn test_engagement_flag_is_claimed_once() {
    require_emulator!();

    let db = test_db().await;
    let entry = MoodEntry {
        id: new_document_id(),
        user_id: unique_user_id(),
        mood: Mood {
            emoji: "🙂".to_string(),
            label: "Calm".to_string(),
        },
        intensity: 6,
        journal_entry: String::new(),
        date: Utc::now(),
        engagement_applied: false,
    };
    db.create_mood_entry(&entry).await.unwrap();

    assert!(!db
        .set_engagement_applied(RecordKind::Mood, &entry.id, true)
        .await
        .unwrap());
    assert!(db
        .set_engagement_applied(RecordKind::Mood, &entry.id, true)
        .await
        .unwrap());

    let loaded = db.get_mood_entry(&entry.id).await.unwrap().unwrap();
    assert!(loaded.engagement_applied);

    let missing = db
        .set_engagement_applied(RecordKind::Post, &entry.id, true)
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}
