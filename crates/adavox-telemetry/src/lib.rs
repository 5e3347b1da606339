pub mod history;
pub mod pipeline_metrics;
pub mod quality;
pub mod signals;

pub use history::RollingHistory;
pub use pipeline_metrics::PipelineMetrics;
pub use quality::{ChunkQuality, ChunkQualityRecorder, QualityAverages};
pub use signals::{SignalAggregator, UiMetrics};
