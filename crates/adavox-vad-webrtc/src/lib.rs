//! WebRTC VAD backend.
//!
//! Wraps the GIPS voice-activity detector behind the
//! [`VoiceActivityClassifier`] trait. The detector accepts exactly
//! 10/20/30 ms frames at 8/16/32/48 kHz and maps the pipeline's
//! aggressiveness levels 0..3 onto its four operating modes.

use adavox_vad::{Aggressiveness, ClassifierFactory, VadError, VoiceActivityClassifier};
use webrtc_vad::{SampleRate, Vad, VadMode};

pub struct WebRtcClassifier {
    vad: Vad,
    aggressiveness: Aggressiveness,
    sample_rate_hz: u32,
}

// The inner detector holds a raw pointer; all access goes through
// &mut self and the instance is owned by a single task.
unsafe impl Send for WebRtcClassifier {}

fn to_sample_rate(hz: u32) -> Result<SampleRate, VadError> {
    match hz {
        8_000 => Ok(SampleRate::Rate8kHz),
        16_000 => Ok(SampleRate::Rate16kHz),
        32_000 => Ok(SampleRate::Rate32kHz),
        48_000 => Ok(SampleRate::Rate48kHz),
        other => Err(VadError::UnsupportedSampleRate(other)),
    }
}

fn to_mode(aggressiveness: Aggressiveness) -> VadMode {
    match aggressiveness.level() {
        0 => VadMode::Quality,
        1 => VadMode::LowBitrate,
        2 => VadMode::Aggressive,
        _ => VadMode::VeryAggressive,
    }
}

impl WebRtcClassifier {
    pub fn new(aggressiveness: Aggressiveness, sample_rate_hz: u32) -> Result<Self, VadError> {
        let rate = to_sample_rate(sample_rate_hz)?;
        Ok(Self {
            vad: Vad::new_with_rate_and_mode(rate, to_mode(aggressiveness)),
            aggressiveness,
            sample_rate_hz,
        })
    }
}

impl VoiceActivityClassifier for WebRtcClassifier {
    fn is_speech(&mut self, frame: &[i16], sample_rate_hz: u32) -> Result<bool, VadError> {
        if sample_rate_hz != self.sample_rate_hz {
            // The detector is rate-bound at construction; a mismatched
            // caller indicates a wiring bug, not a recoverable state.
            return Err(VadError::UnsupportedSampleRate(sample_rate_hz));
        }
        self.vad.is_voice_segment(frame).map_err(|_| {
            VadError::InvalidFrameSize {
                got: frame.len(),
                // Valid lengths are 10/20/30 ms worth of samples.
                expected: (self.sample_rate_hz as usize * 20) / 1000,
            }
        })
    }
}

pub struct WebRtcClassifierFactory {
    sample_rate_hz: u32,
}

impl WebRtcClassifierFactory {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self { sample_rate_hz }
    }
}

impl ClassifierFactory for WebRtcClassifierFactory {
    fn create(
        &self,
        aggressiveness: Aggressiveness,
    ) -> Result<Box<dyn VoiceActivityClassifier>, VadError> {
        Ok(Box::new(WebRtcClassifier::new(
            aggressiveness,
            self.sample_rate_hz,
        )?))
    }
}

impl std::fmt::Debug for WebRtcClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebRtcClassifier")
            .field("aggressiveness", &self.aggressiveness)
            .field("sample_rate_hz", &self.sample_rate_hz)
            .finish()
    }
}
