pub mod runner;
pub mod summary;

pub use runner::{AnalysisReport, BatchAnalyzer, CancelToken, ProgressEvent};
pub use summary::{AnalysisSummary, EngagementDistribution, TopPerformer};
