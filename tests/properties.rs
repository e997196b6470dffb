//! Property-based tests for extraction and scoring invariants.

use chrono::{TimeZone, Utc};
use channel_intel::{extract, score_engagement_at, score_performance, ContentMetrics, EngagementLevel};
use proptest::prelude::*;
use std::collections::HashSet;

fn handle_heavy_text() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        "[a-z]{1,8}@[a-z]{1,6}\\.(com|io|org)",
        "@[A-Za-z0-9_]{0,16}",
        "https?://(www\\.)?(twitter|x|github|instagram)\\.com/[A-Za-z0-9_.-]{0,12}",
        "(discord\\.gg|t\\.me|twitch\\.tv)/[A-Za-z0-9_-]{0,10}",
        "\\+?[0-9]{0,3}[ .-]?\\(?[0-9]{3}\\)?[ .-]?[0-9]{3}[ .-]?[0-9]{4}",
        "[ \\t\\n]{0,3}",
        "\\PC{0,12}",
    ];
    prop::collection::vec(fragment, 0..12).prop_map(|parts| parts.join(" "))
}

fn metrics_strategy() -> impl Strategy<Value = ContentMetrics> {
    (
        0u64..5_000_000,
        0u64..5_000_000,
        0u64..1_000_000,
        0u64..20_000,
        0usize..400,
        prop::collection::btree_set("[a-z]{1,6}", 0..15),
        any::<bool>(),
        prop_oneof![
            Just(String::new()),
            Just("garbage".to_string()),
            Just("2023-11-05".to_string()),
            Just("20240401".to_string()),
            Just("2024-06-01T12:00:00Z".to_string()),
        ],
    )
        .prop_map(
            |(views, likes, comments, duration, description_len, tags, caption, published_at)| {
                ContentMetrics {
                    view_count: views,
                    like_count: likes,
                    comment_count: comments,
                    duration_seconds: duration,
                    description: "d".repeat(description_len),
                    tags,
                    caption_present: caption,
                    published_at,
                }
            },
        )
}

proptest! {
    #[test]
    fn extract_always_returns_every_category(text in "\\PC*") {
        let identifiers = extract(&text);
        prop_assert_eq!(identifiers.iter().count(), 16);
    }

    #[test]
    fn extracted_values_are_trimmed_unique_and_non_empty(text in handle_heavy_text()) {
        let identifiers = extract(&text);
        for (category, values) in identifiers.iter() {
            let mut seen = HashSet::new();
            for value in values {
                prop_assert!(!value.trim().is_empty(), "{} has blank value", category.as_str());
                prop_assert_eq!(value.trim(), value.as_str());
                prop_assert!(seen.insert(value.clone()), "{} repeats {}", category.as_str(), value);
            }
        }
    }

    #[test]
    fn extract_is_deterministic(text in handle_heavy_text()) {
        prop_assert_eq!(extract(&text), extract(&text));
    }

    #[test]
    fn scores_stay_in_range(metrics in metrics_strategy()) {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let engagement = score_engagement_at(&metrics, now);
        let performance = score_performance(&metrics, &engagement);

        for score in [
            engagement.engagement_score,
            engagement.virality_score,
            performance.performance_score,
            performance.content_effectiveness,
            performance.growth_potential,
        ] {
            prop_assert!((0.0..=100.0).contains(&score), "score out of range: {}", score);
        }
        prop_assert!((5.0..=95.0).contains(&performance.audience_retention));
    }

    #[test]
    fn zero_views_zero_engagement(likes in 0u64..1_000_000, comments in 0u64..1_000_000) {
        let metrics = ContentMetrics::new(0, likes, comments);
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let engagement = score_engagement_at(&metrics, now);

        prop_assert_eq!(engagement.like_rate, 0.0);
        prop_assert_eq!(engagement.comment_rate, 0.0);
        prop_assert_eq!(engagement.total_engagement_rate, 0.0);
        prop_assert_eq!(engagement.engagement_score, 0.0);
        prop_assert_eq!(engagement.engagement_level, EngagementLevel::Low);
    }
}
