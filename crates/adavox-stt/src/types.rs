//! Core types for the transcription boundary

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SttError {
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),
}

/// One decoded sub-unit of a transcription, carrying the engine's mean
/// log-probability for that stretch of audio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodedSegment {
    pub avg_logprob: f32,
}

/// What an engine returns for one finalized speech segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    /// Per-sub-unit decoding metadata; empty when the engine exposes none.
    pub segments: Vec<DecodedSegment>,
}

impl TranscriptionResult {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            segments: Vec::new(),
        }
    }
}
