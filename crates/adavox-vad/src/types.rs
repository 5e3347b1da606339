use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VadError {
    #[error("Invalid frame size: got {got} samples, expected {expected}")]
    InvalidFrameSize { got: usize, expected: usize },

    #[error("Unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(u32),

    #[error("Classifier backend error: {0}")]
    Backend(String),
}

/// How readily the classifier calls a frame silence. 0 is permissive
/// (most frames pass as speech), 3 filters hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aggressiveness(u8);

impl Aggressiveness {
    pub const MIN: Aggressiveness = Aggressiveness(0);
    pub const MAX: Aggressiveness = Aggressiveness(3);

    /// Clamps into [0, 3].
    pub fn new(level: u8) -> Self {
        Self(level.min(3))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Steps up or down, saturating at the bounds.
    pub fn saturating_step(self, delta: i8) -> Self {
        let next = (self.0 as i16 + delta as i16).clamp(0, 3);
        Self(next as u8)
    }
}

impl Default for Aggressiveness {
    fn default() -> Self {
        Self(3)
    }
}

impl std::fmt::Display for Aggressiveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame length the classifier and chunker agree on. Only these three
/// durations are valid at 8/16/32/48 kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameDuration {
    Ms10,
    Ms20,
    Ms30,
}

impl FrameDuration {
    pub fn as_millis(self) -> u32 {
        match self {
            FrameDuration::Ms10 => 10,
            FrameDuration::Ms20 => 20,
            FrameDuration::Ms30 => 30,
        }
    }

    pub fn samples_at(self, sample_rate_hz: u32) -> usize {
        (sample_rate_hz as usize * self.as_millis() as usize) / 1000
    }
}

impl Default for FrameDuration {
    fn default() -> Self {
        FrameDuration::Ms20
    }
}

impl TryFrom<u32> for FrameDuration {
    type Error = VadError;

    fn try_from(ms: u32) -> Result<Self, Self::Error> {
        match ms {
            10 => Ok(FrameDuration::Ms10),
            20 => Ok(FrameDuration::Ms20),
            30 => Ok(FrameDuration::Ms30),
            other => Err(VadError::Backend(format!(
                "frame duration {} ms is not one of 10/20/30",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SAMPLE_RATE_HZ;

    #[test]
    fn aggressiveness_clamps_and_saturates() {
        assert_eq!(Aggressiveness::new(7).level(), 3);
        assert_eq!(Aggressiveness::MAX.saturating_step(1), Aggressiveness::MAX);
        assert_eq!(Aggressiveness::MIN.saturating_step(-1), Aggressiveness::MIN);
        assert_eq!(Aggressiveness::new(1).saturating_step(1).level(), 2);
    }

    #[test]
    fn frame_duration_sample_counts() {
        assert_eq!(FrameDuration::Ms10.samples_at(SAMPLE_RATE_HZ), 160);
        assert_eq!(FrameDuration::Ms20.samples_at(SAMPLE_RATE_HZ), 320);
        assert_eq!(FrameDuration::Ms30.samples_at(SAMPLE_RATE_HZ), 480);
    }

    #[test]
    fn frame_duration_try_from_rejects_odd_values() {
        assert!(FrameDuration::try_from(20).is_ok());
        assert!(FrameDuration::try_from(25).is_err());
    }
}
