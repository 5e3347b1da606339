use crate::types::{SttError, TranscriptionResult};
use async_trait::async_trait;

/// Batch transcription capability.
///
/// `audio` is normalized mono f32 in [-1, 1] at the pipeline sample rate.
/// Calls may take hundreds of milliseconds to seconds; the segmenter
/// deliberately awaits them inline so the frame queue is the only
/// buffering point. No timeout is imposed here; callers wanting bounded
/// latency wrap the call themselves.
#[async_trait]
pub trait TranscriptionEngine: Send {
    async fn transcribe(
        &mut self,
        audio: &[f32],
        language: Option<&str>,
    ) -> Result<TranscriptionResult, SttError>;
}
