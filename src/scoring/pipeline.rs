use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::extract::{extract, IdentifierSet};
use crate::record::{ItemKind, VideoRecord};
use crate::scoring::{score_engagement_at, score_performance};
use crate::{ContentMetrics, EngagementResult, PerformanceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedVideo {
    pub id: String,
    pub kind: ItemKind,
    pub title: String,
    pub channel_title: String,
    pub published_at: String,
    pub metrics: ContentMetrics,
    pub engagement: EngagementResult,
    pub performance: PerformanceResult,
    pub identifiers: IdentifierSet,
}

/// Runs extraction and both scoring stages for one record, with recency
/// measured against a fixed reference time so a batch is scored
/// consistently.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    reference_time: DateTime<Utc>,
}

impl Default for ScoringPipeline {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl ScoringPipeline {
    pub fn new(reference_time: DateTime<Utc>) -> Self {
        Self { reference_time }
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    pub fn analyze(&self, record: &VideoRecord) -> AnalyzedVideo {
        let metrics = record.metrics();
        let engagement = score_engagement_at(&metrics, self.reference_time);
        let performance = score_performance(&metrics, &engagement);
        let identifiers = extract(&record.description);

        AnalyzedVideo {
            id: record.record_id(),
            kind: record.kind,
            title: record.title.clone(),
            channel_title: record.channel_title.clone(),
            published_at: record.published_at.clone(),
            metrics,
            engagement,
            performance,
            identifiers,
        }
    }

    /// Orders by performance score, best first. Ties keep input order.
    pub fn rank(&self, videos: &mut [AnalyzedVideo]) {
        videos.sort_by(|a, b| {
            b.performance
                .performance_score
                .partial_cmp(&a.performance.performance_score)
                .unwrap_or(Ordering::Equal)
        });
    }
}
