use crate::history::RollingHistory;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Per-segment quality signals computed at finalize time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkQuality {
    /// Fraction of the segment's frame window the classifier called silence.
    pub silence_ratio: f32,
    /// Decoder confidence in [0, 1].
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QualityAverages {
    pub silence_ratio: f32,
    pub confidence: f32,
}

/// Rolling view of recent segment quality.
///
/// Written by the segmenter at finalize, read by the controller from the
/// transcription-completion context; one lock covers both histories so a
/// reader never sees one history advanced past the other.
pub struct ChunkQualityRecorder {
    inner: Mutex<Histories>,
}

struct Histories {
    silence_ratios: RollingHistory,
    confidences: RollingHistory,
}

pub const DEFAULT_QUALITY_WINDOW: usize = 5;

impl ChunkQualityRecorder {
    pub fn new(window: usize) -> Self {
        Self {
            inner: Mutex::new(Histories {
                silence_ratios: RollingHistory::new(window),
                confidences: RollingHistory::new(window),
            }),
        }
    }

    pub fn record(&self, quality: ChunkQuality) {
        let mut inner = self.inner.lock();
        inner.silence_ratios.push(quality.silence_ratio);
        inner.confidences.push(quality.confidence);
    }

    pub fn averages(&self) -> QualityAverages {
        let inner = self.inner.lock();
        QualityAverages {
            silence_ratio: inner.silence_ratios.mean(),
            confidence: inner.confidences.mean(),
        }
    }

    pub fn recorded(&self) -> usize {
        self.inner.lock().confidences.len()
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.silence_ratios.clear();
        inner.confidences.clear();
    }
}

impl Default for ChunkQualityRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_recorder_reads_zero() {
        let recorder = ChunkQualityRecorder::default();
        let avg = recorder.averages();
        assert_eq!(avg.silence_ratio, 0.0);
        assert_eq!(avg.confidence, 0.0);
    }

    #[test]
    fn averages_follow_the_window() {
        let recorder = ChunkQualityRecorder::new(2);
        for (sr, c) in [(0.2, 0.9), (0.4, 0.7), (0.6, 0.5)] {
            recorder.record(ChunkQuality {
                silence_ratio: sr,
                confidence: c,
            });
        }
        // First sample evicted; window holds (0.4, 0.7) and (0.6, 0.5).
        let avg = recorder.averages();
        assert!((avg.silence_ratio - 0.5).abs() < 1e-6);
        assert!((avg.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn reset_clears_both_histories() {
        let recorder = ChunkQualityRecorder::default();
        recorder.record(ChunkQuality {
            silence_ratio: 0.3,
            confidence: 0.8,
        });
        recorder.reset();
        assert_eq!(recorder.recorded(), 0);
        assert_eq!(recorder.averages().confidence, 0.0);
    }
}
