use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared counters for cross-task pipeline monitoring.
#[derive(Clone, Default)]
pub struct PipelineMetrics {
    pub frames_in: Arc<AtomicU64>,
    pub speech_frames: Arc<AtomicU64>,
    pub silence_frames: Arc<AtomicU64>,
    pub segments_finalized: Arc<AtomicU64>,
    pub transcribe_errors: Arc<AtomicU64>,
    pub last_transcribe_latency_ms: Arc<AtomicU64>,
    pub parameter_updates_applied: Arc<AtomicU64>,
}

impl PipelineMetrics {
    pub fn record_frame(&self, is_speech: bool) {
        self.frames_in.fetch_add(1, Ordering::Relaxed);
        if is_speech {
            self.speech_frames.fetch_add(1, Ordering::Relaxed);
        } else {
            self.silence_frames.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_segment(&self, transcribe_latency_ms: u64) {
        self.segments_finalized.fetch_add(1, Ordering::Relaxed);
        self.last_transcribe_latency_ms
            .store(transcribe_latency_ms, Ordering::Relaxed);
    }

    pub fn record_transcribe_error(&self) {
        self.transcribe_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parameter_update(&self) {
        self.parameter_updates_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_in(&self) -> u64 {
        self.frames_in.load(Ordering::Relaxed)
    }

    pub fn segments_finalized(&self) -> u64 {
        self.segments_finalized.load(Ordering::Relaxed)
    }

    pub fn parameter_updates_applied(&self) -> u64 {
        self.parameter_updates_applied.load(Ordering::Relaxed)
    }
}
