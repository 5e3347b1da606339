use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Segment sink failure: {0}")]
    Failed(String),
}

/// Downstream consumer of finalized segments.
///
/// The segmenter calls `on_audio_chunk` first, then transcribes, then
/// calls `on_transcription`, all synchronously in finalize order. Errors
/// propagate into the segmenter loop and abort the run; no retry happens
/// at this layer.
pub trait SegmentSink: Send {
    fn on_audio_chunk(&mut self, audio: &[f32], duration_seconds: f64) -> Result<(), SinkError>;

    fn on_transcription(&mut self, text: &str, duration_seconds: f64) -> Result<(), SinkError>;
}
