use crate::{
    clamp, clamp_score, round2, ContentMetrics, EngagementResult, PerformanceCategory,
    PerformanceResult,
};

const VIEW_WEIGHT: f64 = 0.6;
const ENGAGEMENT_WEIGHT: f64 = 0.4;

const DESCRIPTION_WEIGHT: f64 = 0.4;
const TAG_WEIGHT: f64 = 0.4;
const CAPTION_WEIGHT: f64 = 0.2;
const CAPTION_SCORE: f64 = 20.0;

const RETENTION_FLOOR: f64 = 5.0;
const RETENTION_CEILING: f64 = 95.0;
const DURATION_FACTOR_FLOOR: f64 = 0.3;
const DURATION_HORIZON_SECONDS: f64 = 3600.0;

const GROWTH_ENGAGEMENT_WEIGHT: f64 = 0.4;
const GROWTH_VIRALITY_WEIGHT: f64 = 0.3;
const GROWTH_PERFORMANCE_WEIGHT: f64 = 0.3;

pub fn score_performance(metrics: &ContentMetrics, engagement: &EngagementResult) -> PerformanceResult {
    let performance_score = VIEW_WEIGHT * view_score(metrics.view_count)
        + ENGAGEMENT_WEIGHT * engagement_component(metrics);
    let growth_potential = GROWTH_ENGAGEMENT_WEIGHT * engagement.engagement_score
        + GROWTH_VIRALITY_WEIGHT * engagement.virality_score
        + GROWTH_PERFORMANCE_WEIGHT * performance_score;

    PerformanceResult {
        performance_score: round2(performance_score),
        // classified before rounding: 59.996 is still Average
        performance_category: performance_category(performance_score),
        content_effectiveness: round2(content_effectiveness(metrics)),
        audience_retention: round2(audience_retention(metrics)),
        growth_potential: round2(growth_potential),
    }
}

pub fn performance_category(performance_score: f64) -> PerformanceCategory {
    if performance_score >= 80.0 {
        PerformanceCategory::Excellent
    } else if performance_score >= 60.0 {
        PerformanceCategory::Good
    } else if performance_score >= 40.0 {
        PerformanceCategory::Average
    } else {
        PerformanceCategory::BelowAverage
    }
}

/// Logarithmic so a million views lands at 60 instead of saturating.
fn view_score(views: u64) -> f64 {
    clamp_score(10.0 * (views.max(1) as f64).log10())
}

fn engagement_component(metrics: &ContentMetrics) -> f64 {
    clamp_score(1000.0 * metrics.interactions() as f64 / metrics.view_count.max(1) as f64)
}

fn content_effectiveness(metrics: &ContentMetrics) -> f64 {
    let description_score = clamp_score(metrics.description_len() as f64 / 10.0);
    let tag_score = clamp_score(10.0 * metrics.tags.len() as f64);
    let caption_score = if metrics.caption_present {
        CAPTION_SCORE
    } else {
        0.0
    };
    DESCRIPTION_WEIGHT * description_score + TAG_WEIGHT * tag_score + CAPTION_WEIGHT * caption_score
}

fn audience_retention(metrics: &ContentMetrics) -> f64 {
    let like_ratio = metrics.like_count as f64 / metrics.view_count.max(1) as f64;
    let duration_factor = clamp(
        1.0 - metrics.duration_seconds as f64 / DURATION_HORIZON_SECONDS,
        DURATION_FACTOR_FLOOR,
        1.0,
    );
    clamp(100.0 * like_ratio * duration_factor, RETENTION_FLOOR, RETENTION_CEILING)
}
