use crate::history::RollingHistory;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Rolling UI-facing metrics snapshot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UiMetrics {
    /// Speaking rate, words per minute.
    pub wpm: f32,
    /// Segment loudness, dBFS.
    pub volume_dbfs: f32,
}

pub const DEFAULT_SIGNAL_WINDOW: usize = 10;

/// Rolling means of metrics derived from the transcription path
/// (speaking rate from text length, loudness from segment audio).
///
/// Lives in its own lock domain, separate from [`crate::ChunkQualityRecorder`]:
/// its producers observe transcribed text, not the segmenter's frame
/// tallies, and the controller tolerates the two being read at slightly
/// different instants.
pub struct SignalAggregator {
    inner: Mutex<Histories>,
}

struct Histories {
    wpm: RollingHistory,
    volume: RollingHistory,
}

impl SignalAggregator {
    pub fn new(window: usize) -> Self {
        Self {
            inner: Mutex::new(Histories {
                wpm: RollingHistory::new(window),
                volume: RollingHistory::new(window),
            }),
        }
    }

    /// Records one transcribed segment. Zero-duration segments carry no
    /// rate information and are skipped.
    pub fn record_transcript(&self, text: &str, duration_seconds: f64) {
        if duration_seconds <= 0.0 {
            return;
        }
        let words = text.split_whitespace().count() as f64;
        let wpm = words / (duration_seconds / 60.0);
        self.inner.lock().wpm.push(wpm as f32);
    }

    /// Records the loudness of one finalized segment's audio.
    pub fn record_audio(&self, audio: &[f32]) {
        if audio.is_empty() {
            return;
        }
        let sum: f64 = audio.iter().map(|&s| s as f64 * s as f64).sum();
        let rms = (sum / audio.len() as f64).sqrt();
        // 1e-12 keeps pure digital silence finite.
        let dbfs = 20.0 * (rms + 1e-12).log10();
        self.inner.lock().volume.push(dbfs as f32);
    }

    pub fn average_wpm(&self) -> f32 {
        self.inner.lock().wpm.mean()
    }

    pub fn snapshot(&self) -> UiMetrics {
        let inner = self.inner.lock();
        UiMetrics {
            wpm: inner.wpm.mean(),
            volume_dbfs: inner.volume.mean(),
        }
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.wpm.clear();
        inner.volume.clear();
    }
}

impl Default for SignalAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNAL_WINDOW)
    }
}
