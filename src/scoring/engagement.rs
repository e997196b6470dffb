use chrono::{DateTime, Utc};

use crate::record::parse_publish_date;
use crate::{clamp, clamp_score, percent_of, round2, ContentMetrics, EngagementLevel, EngagementResult};

pub const HIGH_ENGAGEMENT_SCORE: f64 = 70.0;
pub const MEDIUM_ENGAGEMENT_SCORE: f64 = 30.0;

const LIKE_RATE_WEIGHT: f64 = 2.0;
const COMMENT_RATE_WEIGHT: f64 = 10.0;

const UNKNOWN_AGE_FACTOR: f64 = 0.5;
const AGE_HORIZON_DAYS: f64 = 365.0;

const TAGGED_BONUS: f64 = 0.2;
const RICH_DESCRIPTION_BONUS: f64 = 0.2;
const RICH_DESCRIPTION_CHARS: usize = 100;

pub fn score_engagement(metrics: &ContentMetrics) -> EngagementResult {
    score_engagement_at(metrics, Utc::now())
}

/// Engagement metrics with recency measured against `now`.
pub fn score_engagement_at(metrics: &ContentMetrics, now: DateTime<Utc>) -> EngagementResult {
    let views = metrics.view_count;
    let like_rate = percent_of(metrics.like_count, views);
    let comment_rate = percent_of(metrics.comment_count, views);
    let total_engagement_rate = percent_of(metrics.interactions(), views);

    let engagement_score =
        clamp_score(like_rate * LIKE_RATE_WEIGHT + comment_rate * COMMENT_RATE_WEIGHT);

    let virality = total_engagement_rate
        * age_factor(&metrics.published_at, now)
        * content_quality_factor(metrics);

    EngagementResult {
        like_rate: round2(like_rate),
        comment_rate: round2(comment_rate),
        total_engagement_rate: round2(total_engagement_rate),
        engagement_score: round2(engagement_score),
        engagement_level: engagement_level(engagement_score),
        virality_score: round2(clamp_score(virality)),
    }
}

pub fn engagement_level(engagement_score: f64) -> EngagementLevel {
    if engagement_score >= HIGH_ENGAGEMENT_SCORE {
        EngagementLevel::High
    } else if engagement_score >= MEDIUM_ENGAGEMENT_SCORE {
        EngagementLevel::Medium
    } else {
        EngagementLevel::Low
    }
}

/// Linear decay over a year since publishing, in `[0, 1]`. Unparseable
/// dates get a flat 0.5.
pub fn age_factor(published_at: &str, now: DateTime<Utc>) -> f64 {
    match parse_publish_date(published_at) {
        Some(published) => {
            let days = (now - published).num_seconds() as f64 / 86_400.0;
            clamp(1.0 - days / AGE_HORIZON_DAYS, 0.0, 1.0)
        }
        None => UNKNOWN_AGE_FACTOR,
    }
}

/// 1.0 plus bonuses for tags and a description longer than 100 chars.
pub fn content_quality_factor(metrics: &ContentMetrics) -> f64 {
    let mut factor = 1.0;
    if !metrics.tags.is_empty() {
        factor += TAGGED_BONUS;
    }
    if metrics.description_len() > RICH_DESCRIPTION_CHARS {
        factor += RICH_DESCRIPTION_BONUS;
    }
    factor
}
