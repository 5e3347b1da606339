//! Shared test doubles for segmenter tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use adavox_stt::plugins::MockEngine;
use adavox_stt::{SttError, TranscriptionEngine, TranscriptionResult};
use adavox_vad::{Aggressiveness, ClassifierFactory, VadError, VoiceActivityClassifier};
use async_trait::async_trait;

/// Classifier that replays a scripted verdict sequence; exhausted
/// scripts read as silence.
pub struct ScriptedClassifier {
    verdicts: Arc<Mutex<VecDeque<bool>>>,
}

impl VoiceActivityClassifier for ScriptedClassifier {
    fn is_speech(&mut self, _frame: &[i16], _sample_rate_hz: u32) -> Result<bool, VadError> {
        Ok(self.verdicts.lock().unwrap().pop_front().unwrap_or(false))
    }
}

/// Factory sharing one verdict script across rebuilds, counting how many
/// classifiers it has built.
pub struct ScriptedFactory {
    verdicts: Arc<Mutex<VecDeque<bool>>>,
    created: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    pub fn new(verdicts: &[bool]) -> Self {
        Self {
            verdicts: Arc::new(Mutex::new(verdicts.iter().copied().collect())),
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn created_handle(&self) -> Arc<AtomicUsize> {
        self.created.clone()
    }
}

impl ClassifierFactory for ScriptedFactory {
    fn create(
        &self,
        _aggressiveness: Aggressiveness,
    ) -> Result<Box<dyn VoiceActivityClassifier>, VadError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedClassifier {
            verdicts: self.verdicts.clone(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Audio { samples: usize, duration_seconds: f64 },
    Text { text: String, duration_seconds: f64 },
}

/// Sink recording callback order; optionally fails on the audio callback.
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<SinkEvent>>>,
    pub fail_on_audio: bool,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<Vec<SinkEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: events.clone(),
                fail_on_audio: false,
            },
            events,
        )
    }

    pub fn failing() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            fail_on_audio: true,
        }
    }
}

impl adavox_segmenter::SegmentSink for RecordingSink {
    fn on_audio_chunk(
        &mut self,
        audio: &[f32],
        duration_seconds: f64,
    ) -> Result<(), adavox_segmenter::SinkError> {
        if self.fail_on_audio {
            return Err(adavox_segmenter::SinkError::Failed(
                "injected audio sink failure".to_string(),
            ));
        }
        self.events.lock().unwrap().push(SinkEvent::Audio {
            samples: audio.len(),
            duration_seconds,
        });
        Ok(())
    }

    fn on_transcription(
        &mut self,
        text: &str,
        duration_seconds: f64,
    ) -> Result<(), adavox_segmenter::SinkError> {
        self.events.lock().unwrap().push(SinkEvent::Text {
            text: text.to_string(),
            duration_seconds,
        });
        Ok(())
    }
}

/// Engine wrapper exposing a call count that survives the segmenter
/// taking ownership of the engine.
pub struct CountingEngine {
    inner: MockEngine,
    calls: Arc<AtomicUsize>,
}

impl CountingEngine {
    pub fn new(inner: MockEngine) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl TranscriptionEngine for CountingEngine {
    async fn transcribe(
        &mut self,
        audio: &[f32],
        language: Option<&str>,
    ) -> Result<TranscriptionResult, SttError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.transcribe(audio, language).await
    }
}
