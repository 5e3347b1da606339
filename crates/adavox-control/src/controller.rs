//! Adaptive segmentation parameter control
//!
//! Watches rolling quality signals and, every `averaging_window`
//! finalized segments, decides whether the active segmentation
//! parameters should move. Candidates go out through the parameter
//! channel; the segmenter alone applies them, at segment boundaries.

use std::collections::VecDeque;

use adavox_segmenter::{
    ParamPublisher, SegmentationParams, MAX_SILENCE_FRAMES_CEILING, MIN_SILENCE_FRAMES_FLOOR,
};
use adavox_telemetry::ChunkQuality;
use adavox_vad::FrameDuration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_AVERAGING_WINDOW: usize = 5;

/// Trigger bands for the three adjustment rules.
///
/// Only the low side of confidence triggers: an unusually confident
/// decode is not a problem worth destabilizing the parameters for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlThresholds {
    pub confidence_low: f32,
    pub silence_ratio_high: f32,
    pub silence_ratio_low: f32,
    pub wpm_fast: f32,
    pub wpm_slow: f32,
}

impl Default for ControlThresholds {
    fn default() -> Self {
        Self {
            confidence_low: 0.4,
            silence_ratio_high: 0.7,
            silence_ratio_low: 0.3,
            wpm_fast: 150.0,
            wpm_slow: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Observation {
    confidence: f32,
    silence_ratio: f32,
    wpm: f32,
}

#[derive(Debug, Clone, Copy)]
struct Averages {
    confidence: f32,
    silence_ratio: f32,
    wpm: f32,
}

/// Read-only diagnostics snapshot; obtainable without disturbing
/// in-flight state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerStatus {
    pub current_aggressiveness: u8,
    pub current_frame_duration_ms: u32,
    pub current_max_silence_frames: u32,
    pub adjustment_count: u64,
    pub last_adjustment_time: DateTime<Utc>,
    pub chunk_counter: u64,
    pub buffer_size: usize,
    pub averaging_window: usize,
}

pub struct AdaptiveController {
    thresholds: ControlThresholds,
    averaging_window: usize,
    buffer: VecDeque<Observation>,
    chunk_counter: u64,
    current: SegmentationParams,
    adjustment_count: u64,
    last_adjustment: DateTime<Utc>,
    publisher: Option<ParamPublisher>,
}

impl AdaptiveController {
    pub fn new(initial: SegmentationParams) -> Self {
        Self {
            thresholds: ControlThresholds::default(),
            averaging_window: DEFAULT_AVERAGING_WINDOW,
            buffer: VecDeque::with_capacity(DEFAULT_AVERAGING_WINDOW),
            chunk_counter: 0,
            current: initial.clamped(),
            adjustment_count: 0,
            last_adjustment: Utc::now(),
            publisher: None,
        }
    }

    pub fn with_thresholds(mut self, thresholds: ControlThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_averaging_window(mut self, window: usize) -> Self {
        assert!(window > 0, "averaging window must be at least 1");
        self.averaging_window = window;
        self
    }

    /// Committed parameter sets are published here for the segmenter to
    /// pick up at its next boundary.
    pub fn with_publisher(mut self, publisher: ParamPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Reports one finalized segment. Runs the decision cadence: nothing
    /// is evaluated until `averaging_window` observations have
    /// accumulated since the last decision attempt, and every attempt
    /// (commit, insignificant candidate, or in-band metrics) restarts
    /// the count.
    pub fn observe(&mut self, quality: ChunkQuality, wpm: f32) -> Option<SegmentationParams> {
        if self.buffer.len() == self.averaging_window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(Observation {
            confidence: quality.confidence,
            silence_ratio: quality.silence_ratio,
            wpm,
        });
        self.chunk_counter += 1;

        if (self.chunk_counter as usize) < self.averaging_window {
            return None;
        }

        let avg = self.averages();
        if !self.should_adjust(&avg) {
            debug!(
                target: "adaptive",
                "Metrics in band (confidence={:.3} silence_ratio={:.3} wpm={:.1}), no adjustment",
                avg.confidence, avg.silence_ratio, avg.wpm
            );
            self.chunk_counter = 0;
            return None;
        }

        info!(
            target: "adaptive",
            "Metrics out of band: confidence={:.3} silence_ratio={:.3} wpm={:.1}",
            avg.confidence, avg.silence_ratio, avg.wpm
        );

        let candidate = self.calculate_adjustments(&avg);
        if self.update_parameters(candidate) {
            Some(self.current)
        } else {
            self.chunk_counter = 0;
            None
        }
    }

    fn averages(&self) -> Averages {
        let n = self.buffer.len().max(1) as f32;
        let mut avg = Averages {
            confidence: 0.0,
            silence_ratio: 0.0,
            wpm: 0.0,
        };
        for obs in &self.buffer {
            avg.confidence += obs.confidence;
            avg.silence_ratio += obs.silence_ratio;
            avg.wpm += obs.wpm;
        }
        avg.confidence /= n;
        avg.silence_ratio /= n;
        avg.wpm /= n;
        avg
    }

    fn should_adjust(&self, avg: &Averages) -> bool {
        let t = &self.thresholds;
        avg.confidence < t.confidence_low
            || avg.silence_ratio > t.silence_ratio_high
            || avg.silence_ratio < t.silence_ratio_low
            || avg.wpm > t.wpm_fast
            || avg.wpm < t.wpm_slow
    }

    /// Builds one candidate from the three rules, highest priority
    /// first. The rules are independent; several can contribute to the
    /// same candidate.
    fn calculate_adjustments(&self, avg: &Averages) -> SegmentationParams {
        let t = &self.thresholds;
        let mut candidate = self.current;

        // Confidence: a struggling decoder gets a stricter classifier so
        // segments carry less borderline audio.
        if avg.confidence < t.confidence_low {
            candidate.aggressiveness = candidate.aggressiveness.saturating_step(1);
        }

        // Silence ratio: trim or extend the trailing-silence hold.
        if avg.silence_ratio > t.silence_ratio_high {
            candidate.max_silence_frames = candidate
                .max_silence_frames
                .saturating_sub(1)
                .max(MIN_SILENCE_FRAMES_FLOOR);
        } else if avg.silence_ratio < t.silence_ratio_low {
            candidate.max_silence_frames =
                (candidate.max_silence_frames + 1).min(MAX_SILENCE_FRAMES_CEILING);
        }

        // Speaking rate picks the frame size outright.
        candidate.frame_duration = if avg.wpm > t.wpm_fast {
            FrameDuration::Ms10
        } else if avg.wpm < t.wpm_slow {
            FrameDuration::Ms30
        } else {
            FrameDuration::Ms20
        };

        candidate
    }

    /// Commits a candidate if it differs materially from the active set:
    /// any aggressiveness or frame-duration change counts, but a
    /// max-silence-frames drift of a single frame is rounding noise and
    /// is discarded to keep the segmenter from oscillating.
    pub fn update_parameters(&mut self, candidate: SegmentationParams) -> bool {
        let candidate = candidate.clamped();
        let msf_delta = (candidate.max_silence_frames as i64
            - self.current.max_silence_frames as i64)
            .abs();
        let significant = candidate.aggressiveness != self.current.aggressiveness
            || candidate.frame_duration != self.current.frame_duration
            || msf_delta >= 2;

        if !significant {
            debug!(
                target: "adaptive",
                "Candidate [{}] discarded as insignificant against [{}]", candidate, self.current
            );
            return false;
        }

        self.current = candidate;
        self.adjustment_count += 1;
        self.last_adjustment = Utc::now();
        self.chunk_counter = 0;

        info!(target: "adaptive", "Parameters adjusted: [{}]", self.current);

        if let Some(publisher) = &self.publisher {
            publisher.publish(self.current);
        }
        true
    }

    pub fn current_params(&self) -> SegmentationParams {
        self.current
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            current_aggressiveness: self.current.aggressiveness.level(),
            current_frame_duration_ms: self.current.frame_duration.as_millis(),
            current_max_silence_frames: self.current.max_silence_frames,
            adjustment_count: self.adjustment_count,
            last_adjustment_time: self.last_adjustment,
            chunk_counter: self.chunk_counter,
            buffer_size: self.buffer.len(),
            averaging_window: self.averaging_window,
        }
    }

    pub fn reset(&mut self) {
        self.current = SegmentationParams::default();
        self.buffer.clear();
        self.chunk_counter = 0;
        self.adjustment_count = 0;
        self.last_adjustment = Utc::now();
        info!(target: "adaptive", "Controller reset to default parameters");
    }
}

impl Default for AdaptiveController {
    fn default() -> Self {
        Self::new(SegmentationParams::default())
    }
}
