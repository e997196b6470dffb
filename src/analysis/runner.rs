use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::analysis::summary::AnalysisSummary;
use crate::config::AppConfig;
use crate::record::VideoRecord;
use crate::scoring::{AnalyzedVideo, ScoringPipeline};

/// Shared stop flag for a running batch. Only the iteration over records
/// observes it; a single record is always scored to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub percent: u8,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub cancelled: bool,
    pub videos: Vec<AnalyzedVideo>,
    pub summary: AnalysisSummary,
}

pub struct BatchAnalyzer {
    pipeline: ScoringPipeline,
    top_performers: usize,
}

impl BatchAnalyzer {
    pub fn new(pipeline: ScoringPipeline, top_performers: usize) -> Self {
        Self {
            pipeline,
            top_performers,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ScoringPipeline::default(), config.analysis.top_performers)
    }

    pub fn run<F>(&self, records: &[VideoRecord], cancel: &CancelToken, mut progress: F) -> AnalysisReport
    where
        F: FnMut(ProgressEvent),
    {
        info!(records = records.len(), "starting batch analysis");

        let mut videos = Vec::with_capacity(records.len());
        let mut summary = AnalysisSummary::default();
        let mut cancelled = false;
        let total = records.len();

        for (idx, record) in records.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(analyzed = videos.len(), "batch analysis cancelled");
                cancelled = true;
                break;
            }

            let video = self.pipeline.analyze(record);
            debug!(
                id = %video.id,
                performance = video.performance.performance_score,
                level = video.engagement.engagement_level.label(),
                "analyzed record"
            );
            summary.add(&video);
            progress(ProgressEvent {
                percent: progress_percent(idx + 1, total),
                message: format!("Analyzed video: {}", record.display_title()),
            });
            videos.push(video);
        }

        let mut ranked = videos.clone();
        self.pipeline.rank(&mut ranked);
        summary.finalize(&ranked, self.top_performers);

        info!(
            analyzed = summary.total_videos,
            average_engagement_rate = summary.average_engagement_rate,
            "batch analysis finished"
        );

        AnalysisReport {
            generated_at: self.pipeline.reference_time(),
            cancelled,
            videos,
            summary,
        }
    }
}

fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done * 100) / total).min(100) as u8
}
