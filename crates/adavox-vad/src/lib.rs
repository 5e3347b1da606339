pub mod constants;
pub mod energy;
pub mod types;

pub use constants::SAMPLE_RATE_HZ;
pub use energy::{EnergyClassifier, EnergyClassifierFactory};
pub use types::{Aggressiveness, FrameDuration, VadError};

/// Frame-level speech/silence verdict capability.
///
/// Implementations must be deterministic: the same frame at the same
/// sample rate under the same aggressiveness always yields the same
/// verdict.
pub trait VoiceActivityClassifier: Send {
    fn is_speech(&mut self, frame: &[i16], sample_rate_hz: u32) -> Result<bool, VadError>;
}

/// Builds classifiers at a given aggressiveness.
///
/// The segmenter rebuilds its classifier through this seam whenever an
/// applied parameter update changes the aggressiveness level.
pub trait ClassifierFactory: Send {
    fn create(
        &self,
        aggressiveness: Aggressiveness,
    ) -> Result<Box<dyn VoiceActivityClassifier>, VadError>;
}
