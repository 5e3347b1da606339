pub mod chunker;
pub mod pipeline;
pub mod sinks;
pub mod source;

pub use chunker::FrameChunker;
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport, PipelineStatus};
pub use sinks::TranscriptAccumulator;
pub use source::read_wav_samples;
