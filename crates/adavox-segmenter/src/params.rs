use adavox_vad::{Aggressiveness, FrameDuration};
use serde::{Deserialize, Serialize};

pub const MIN_SILENCE_FRAMES_FLOOR: u32 = 1;
pub const MAX_SILENCE_FRAMES_CEILING: u32 = 10;

/// The tunable segmentation knobs. Exactly one instance is active per
/// stream, owned by the segmenter and replaced only at segment
/// boundaries; the controller submits candidates, never mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationParams {
    pub aggressiveness: Aggressiveness,
    pub frame_duration: FrameDuration,
    /// Consecutive silence frames that seal an open segment.
    pub max_silence_frames: u32,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            aggressiveness: Aggressiveness::new(3),
            frame_duration: FrameDuration::Ms20,
            max_silence_frames: 5,
        }
    }
}

impl SegmentationParams {
    /// Returns self with `max_silence_frames` forced into [1, 10].
    pub fn clamped(self) -> Self {
        Self {
            max_silence_frames: self
                .max_silence_frames
                .clamp(MIN_SILENCE_FRAMES_FLOOR, MAX_SILENCE_FRAMES_CEILING),
            ..self
        }
    }

    pub fn frame_samples(&self, sample_rate_hz: u32) -> usize {
        self.frame_duration.samples_at(sample_rate_hz)
    }
}

impl std::fmt::Display for SegmentationParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "aggressiveness={} frame={}ms max_silence_frames={}",
            self.aggressiveness,
            self.frame_duration.as_millis(),
            self.max_silence_frames
        )
    }
}
