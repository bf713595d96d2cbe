// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod daily_progress;
pub mod engagement;
pub mod suggestions;

pub use daily_progress::{compute_daily_progress, fetch_today, TodayActivity};
pub use engagement::EngagementService;
pub use suggestions::{load_inputs, SuggestionInputs, SuggestionsReport};
