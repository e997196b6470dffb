use serde::{Deserialize, Serialize};

use crate::scoring::AnalyzedVideo;
use crate::{percent_of, round2, EngagementLevel};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl EngagementDistribution {
    pub fn record(&mut self, level: EngagementLevel) {
        match level {
            EngagementLevel::High => self.high += 1,
            EngagementLevel::Medium => self.medium += 1,
            EngagementLevel::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPerformer {
    pub id: String,
    pub title: String,
    pub performance_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_videos: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub average_engagement_rate: f64,
    pub engagement_distribution: EngagementDistribution,
    pub top_performers: Vec<TopPerformer>,
}

impl AnalysisSummary {
    pub fn add(&mut self, video: &AnalyzedVideo) {
        self.total_videos += 1;
        self.total_views = self.total_views.saturating_add(video.metrics.view_count);
        self.total_likes = self.total_likes.saturating_add(video.metrics.like_count);
        self.total_comments = self
            .total_comments
            .saturating_add(video.metrics.comment_count);
        self.engagement_distribution
            .record(video.engagement.engagement_level);
    }

    /// Fills the aggregate rate and the top-N list. `ranked` must already be
    /// ordered best first.
    pub fn finalize(&mut self, ranked: &[AnalyzedVideo], top_n: usize) {
        let interactions = self.total_likes.saturating_add(self.total_comments);
        self.average_engagement_rate = round2(percent_of(interactions, self.total_views));
        self.top_performers = ranked
            .iter()
            .take(top_n)
            .map(|video| TopPerformer {
                id: video.id.clone(),
                title: video.title.clone(),
                performance_score: video.performance.performance_score,
            })
            .collect();
    }
}
