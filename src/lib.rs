pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod record;
pub mod scoring;
pub mod youtube;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use error::{Error, Result};
pub use extract::{extract, IdentifierCategory, IdentifierSet};
pub use record::{ItemKind, VideoRecord};
pub use scoring::{score_engagement, score_engagement_at, score_performance};

/// Raw counters and metadata for one content item. Unknown fields default
/// to zero/empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentMetrics {
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub duration_seconds: u64,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub caption_present: bool,
    pub published_at: String,
}

impl ContentMetrics {
    pub fn new(view_count: u64, like_count: u64, comment_count: u64) -> Self {
        Self {
            view_count,
            like_count,
            comment_count,
            ..Self::default()
        }
    }

    pub fn interactions(&self) -> u64 {
        self.like_count.saturating_add(self.comment_count)
    }

    pub fn description_len(&self) -> usize {
        self.description.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    High,
    Medium,
    Low,
}

impl EngagementLevel {
    pub fn label(self) -> &'static str {
        match self {
            EngagementLevel::High => "high",
            EngagementLevel::Medium => "medium",
            EngagementLevel::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceCategory {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Below Average")]
    BelowAverage,
}

impl PerformanceCategory {
    pub fn label(self) -> &'static str {
        match self {
            PerformanceCategory::Excellent => "Excellent",
            PerformanceCategory::Good => "Good",
            PerformanceCategory::Average => "Average",
            PerformanceCategory::BelowAverage => "Below Average",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementResult {
    pub like_rate: f64,
    pub comment_rate: f64,
    pub total_engagement_rate: f64,
    pub engagement_score: f64,
    pub engagement_level: EngagementLevel,
    pub virality_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    pub performance_score: f64,
    pub performance_category: PerformanceCategory,
    pub content_effectiveness: f64,
    pub audience_retention: f64,
    pub growth_potential: f64,
}

pub fn round2(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Clamps into `[low, high]`; NaN maps to `low`.
pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    if value.is_nan() {
        return low;
    }
    value.max(low).min(high)
}

pub fn clamp_score(value: f64) -> f64 {
    clamp(value, 0.0, 100.0)
}

pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

pub fn format_number(value: u64) -> String {
    let mut chars: Vec<char> = value.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
