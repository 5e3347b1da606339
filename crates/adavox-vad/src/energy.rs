use crate::types::{Aggressiveness, VadError};
use crate::VoiceActivityClassifier;

/// Energy-gate classifier: a frame is speech when its RMS level clears a
/// dBFS floor. Kept as the deterministic fallback backend; the WebRTC
/// classifier is the production choice.
pub struct EnergyClassifier {
    threshold_dbfs: f32,
}

impl EnergyClassifier {
    /// The floor rises with aggressiveness: level 0 admits anything above
    /// -60 dBFS, level 3 requires -45 dBFS.
    pub fn new(aggressiveness: Aggressiveness) -> Self {
        Self {
            threshold_dbfs: -60.0 + 5.0 * aggressiveness.level() as f32,
        }
    }

    fn rms_dbfs(frame: &[i16]) -> f32 {
        if frame.is_empty() {
            return f32::NEG_INFINITY;
        }
        let sum: f64 = frame.iter().map(|&s| s as f64 * s as f64).sum();
        let rms = (sum / frame.len() as f64).sqrt() / i16::MAX as f64;
        if rms <= 0.0 {
            f32::NEG_INFINITY
        } else {
            (20.0 * rms.log10()) as f32
        }
    }
}

impl VoiceActivityClassifier for EnergyClassifier {
    fn is_speech(&mut self, frame: &[i16], _sample_rate_hz: u32) -> Result<bool, VadError> {
        if frame.is_empty() {
            return Err(VadError::InvalidFrameSize { got: 0, expected: 1 });
        }
        Ok(Self::rms_dbfs(frame) > self.threshold_dbfs)
    }
}

#[derive(Default)]
pub struct EnergyClassifierFactory;

impl crate::ClassifierFactory for EnergyClassifierFactory {
    fn create(
        &self,
        aggressiveness: Aggressiveness,
    ) -> Result<Box<dyn VoiceActivityClassifier>, VadError> {
        Ok(Box::new(EnergyClassifier::new(aggressiveness)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(amplitude: i16, len: usize) -> Vec<i16> {
        (0..len)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .collect()
    }

    #[test]
    fn silence_is_not_speech() {
        let mut vad = EnergyClassifier::new(Aggressiveness::new(0));
        assert!(!vad.is_speech(&vec![0i16; 320], 16_000).unwrap());
    }

    #[test]
    fn loud_tone_is_speech_at_every_level() {
        let frame = tone(16_000, 320);
        for level in 0..=3 {
            let mut vad = EnergyClassifier::new(Aggressiveness::new(level));
            assert!(vad.is_speech(&frame, 16_000).unwrap(), "level {}", level);
        }
    }

    #[test]
    fn faint_tone_passes_only_permissive_levels() {
        // ~-57 dBFS: above the level-0 floor (-60), below level-1 (-55).
        let frame = tone(45, 320);
        let mut permissive = EnergyClassifier::new(Aggressiveness::new(0));
        let mut strict = EnergyClassifier::new(Aggressiveness::new(3));
        assert!(permissive.is_speech(&frame, 16_000).unwrap());
        assert!(!strict.is_speech(&frame, 16_000).unwrap());
    }

    #[test]
    fn empty_frame_is_rejected() {
        let mut vad = EnergyClassifier::new(Aggressiveness::default());
        assert!(vad.is_speech(&[], 16_000).is_err());
    }

    #[test]
    fn verdicts_are_deterministic() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let frame: Vec<i16> = (0..320).map(|_| rng.gen_range(-3000..3000)).collect();

        let mut a = EnergyClassifier::new(Aggressiveness::new(2));
        let mut b = EnergyClassifier::new(Aggressiveness::new(2));
        for _ in 0..10 {
            assert_eq!(
                a.is_speech(&frame, 16_000).unwrap(),
                b.is_speech(&frame, 16_000).unwrap()
            );
        }
    }
}
