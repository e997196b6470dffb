pub mod engagement;
pub mod performance;
pub mod pipeline;

pub use engagement::{age_factor, content_quality_factor, score_engagement, score_engagement_at};
pub use performance::{performance_category, score_performance};
pub use pipeline::{AnalyzedVideo, ScoringPipeline};
