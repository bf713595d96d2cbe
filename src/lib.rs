// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wellness-Tracker: mood journaling, guided breathing and a community feed
//! with points, streaks and daily goals.
//!
//! This crate provides the backend API. The interesting part lives in
//! [`services`]: the engagement/streak engine, the daily goal aggregator and
//! the suggestion ranker.

pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use calendar::Calendar;
use config::Config;
use db::Store;
use services::EngagementService;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Store>,
    pub calendar: Calendar,
    pub engagement: EngagementService,
}

impl AppState {
    /// Wire the services around an already connected store.
    pub fn new(config: Config, db: Arc<dyn Store>) -> Self {
        let calendar = Calendar::from_offset_minutes(config.utc_offset_minutes);
        let engagement = EngagementService::new(db.clone(), calendar);
        Self {
            config,
            db,
            calendar,
            engagement,
        }
    }
}
