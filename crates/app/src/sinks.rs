//! Default downstream segment consumers

use std::sync::Arc;

use adavox_segmenter::{SegmentSink, SinkError};
use adavox_telemetry::SignalAggregator;
use parking_lot::Mutex;
use tracing::info;

/// Accumulates (text, duration) pairs in finalize order and feeds the
/// loudness signal from each segment's audio. The shared store outlives
/// the segmenter, so the final transcript survives shutdown.
pub struct TranscriptAccumulator {
    entries: Arc<Mutex<Vec<(String, f64)>>>,
    signals: Arc<SignalAggregator>,
}

#[derive(Clone)]
pub struct TranscriptHandle {
    entries: Arc<Mutex<Vec<(String, f64)>>>,
}

impl TranscriptAccumulator {
    pub fn new(signals: Arc<SignalAggregator>) -> (Self, TranscriptHandle) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                entries: entries.clone(),
                signals,
            },
            TranscriptHandle { entries },
        )
    }
}

impl SegmentSink for TranscriptAccumulator {
    fn on_audio_chunk(&mut self, audio: &[f32], _duration_seconds: f64) -> Result<(), SinkError> {
        self.signals.record_audio(audio);
        Ok(())
    }

    fn on_transcription(&mut self, text: &str, duration_seconds: f64) -> Result<(), SinkError> {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            info!(target: "transcript", "{}", trimmed);
        }
        self.entries
            .lock()
            .push((trimmed.to_string(), duration_seconds));
        Ok(())
    }
}

impl TranscriptHandle {
    /// Joined transcript of every finalized segment so far.
    pub fn full_text(&self) -> String {
        self.entries
            .lock()
            .iter()
            .map(|(text, _)| text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn segments(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whole-run speaking rate: total words over total speech time.
    pub fn average_wpm(&self) -> f32 {
        let entries = self.entries.lock();
        let total_words: usize = entries
            .iter()
            .map(|(text, _)| text.split_whitespace().count())
            .sum();
        let total_seconds: f64 = entries.iter().map(|(_, d)| d).sum();
        if total_seconds <= 0.0 {
            return 0.0;
        }
        (total_words as f64 / (total_seconds / 60.0)) as f32
    }
}
