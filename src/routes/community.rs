// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Community feed routes.

use crate::calendar::{format_utc_rfc3339, time_ago};
use crate::db::new_document_id;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::community::MAX_POST_CHARS;
use crate::models::{CommunityPost, RecordKind};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use validator::{Validate, ValidationError};

/// Posts shown in the feed.
const FEED_LIMIT: u32 = 20;
/// Author name shown on anonymous posts.
const ANONYMOUS_AUTHOR: &str = "Anonymous";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/community", get(get_feed).post(create_post))
        .route("/api/community/{id}/like", post(toggle_like))
}

// ─── Feed ────────────────────────────────────────────────────

/// Post as rendered in the feed, relative to the viewing user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    pub likes: usize,
    pub liked_by_me: bool,
    /// Relative age ("5 minutes ago")
    pub timestamp: String,
    pub created_at: String,
}

impl PostView {
    pub fn new(post: CommunityPost, viewer: &str, now: DateTime<Utc>) -> Self {
        let liked_by_me = post.is_liked_by(viewer);
        let likes = post.like_count();
        let author = if post.is_anonymous {
            ANONYMOUS_AUTHOR.to_string()
        } else {
            post.author_name
        };

        Self {
            id: post.id,
            content: post.content,
            author,
            tags: post.tags,
            likes,
            liked_by_me,
            timestamp: time_ago(post.created_at, now),
            created_at: format_utc_rfc3339(post.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<PostView>,
}

async fn get_feed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FeedResponse>> {
    let now = Utc::now();
    let posts = state.db.recent_posts(FEED_LIMIT).await?;

    Ok(Json(FeedResponse {
        posts: posts
            .into_iter()
            .map(|p| PostView::new(p, &user.user_id, now))
            .collect(),
    }))
}

// ─── Create ──────────────────────────────────────────────────

fn validate_content(content: &str) -> std::result::Result<(), ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("content").with_message("Post content is required".into()));
    }
    if trimmed.chars().count() > MAX_POST_CHARS {
        return Err(ValidationError::new("content")
            .with_message("Post content must be 500 characters or fewer".into()));
    }
    Ok(())
}

fn default_anonymous() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_content"))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 10, message = "A post can have at most 10 tags"))]
    pub tags: Vec<String>,
    #[serde(default = "default_anonymous")]
    pub is_anonymous: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub message: String,
    pub post: PostView,
    pub points_earned: u64,
    pub total_points: u64,
}

/// Publish a post, then award the flat community bonus.
async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<CreatePostResponse>> {
    req.validate()?;

    let author = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    let now = Utc::now();
    let post = CommunityPost {
        id: new_document_id(),
        user_id: user.user_id.clone(),
        content: req.content.trim().to_string(),
        author_name: author.name,
        likes: HashMap::new(),
        tags: req
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        is_anonymous: req.is_anonymous,
        created_at: now,
        engagement_applied: false,
    };

    state.db.create_post(&post).await?;

    let outcome = state
        .engagement
        .credit(&user.user_id, RecordKind::Post, &post.id, now)
        .await
        .map_err(|e| AppError::EngagementNotRecorded {
            kind: RecordKind::Post,
            id: post.id.clone(),
            source: Box::new(e),
        })?;

    tracing::info!(
        user_id = %user.user_id,
        post_id = %post.id,
        tags = post.tags.len(),
        "Community post created"
    );

    Ok(Json(CreatePostResponse {
        message: "Post shared successfully".to_string(),
        post: PostView::new(post, &user.user_id, now),
        points_earned: outcome.points_earned,
        total_points: outcome.total_points,
    }))
}

// ─── Likes ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub message: String,
    pub likes: usize,
    pub liked: bool,
}

async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<LikeResponse>> {
    let toggle = state
        .db
        .toggle_like(&post_id, &user.user_id, Utc::now())
        .await?;

    let message = if toggle.liked {
        "Post liked"
    } else {
        "Post unliked"
    };

    Ok(Json(LikeResponse {
        message: message.to_string(),
        likes: toggle.likes,
        liked: toggle.liked,
    }))
}
