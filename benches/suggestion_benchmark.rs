use chrono::{Duration, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;
use wellness_tracker::models::{EngagementState, Mood, MoodEntry};
use wellness_tracker::services::SuggestionInputs;

fn history(labels: &[(&str, u8)]) -> Vec<MoodEntry> {
    let now = Utc::now();
    labels
        .iter()
        .enumerate()
        .map(|(i, (label, intensity))| MoodEntry {
            id: format!("m{i}"),
            user_id: "bench".to_string(),
            mood: Mood {
                emoji: "🙂".to_string(),
                label: label.to_string(),
            },
            intensity: *intensity,
            journal_entry: String::new(),
            date: now - Duration::hours(i as i64 * 12),
            engagement_applied: true,
        })
        .collect()
}

fn benchmark_rank_suggestions(c: &mut Criterion) {
    // A week of low, anxious moods: most rule tiers fire.
    let busy = SuggestionInputs {
        user_name: "Bench".to_string(),
        engagement: EngagementState {
            total_points: 30,
            current_streak: 9,
            longest_streak: 9,
            ..Default::default()
        },
        recent_moods: history(&[
            ("Anxious", 3),
            ("Tired", 4),
            ("Stressed", 2),
            ("Sad", 3),
            ("Exhausted", 2),
            ("Okay", 5),
            ("Anxious", 4),
        ]),
        tracked_today: false,
        posts_today: 0,
    };

    // No history: the list is filled by random backfill.
    let quiet = SuggestionInputs {
        user_name: "Bench".to_string(),
        engagement: EngagementState {
            total_points: 500,
            ..Default::default()
        },
        recent_moods: Vec::new(),
        tracked_today: true,
        posts_today: 1,
    };

    let mut group = c.benchmark_group("suggestions");
    let mut rng = StdRng::seed_from_u64(42);

    group.bench_function("rule_heavy", |b| {
        b.iter(|| black_box(&busy).suggestions(&mut rng))
    });

    group.bench_function("backfill_only", |b| {
        b.iter(|| black_box(&quiet).suggestions(&mut rng))
    });

    group.bench_function("full_report", |b| {
        b.iter(|| black_box(&busy).report(&mut rng, black_box(9)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_rank_suggestions);
criterion_main!(benches);
