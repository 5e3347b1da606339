//! Frame-level speech segmentation
//!
//! Consumes raw PCM frames, runs them through the voice-activity
//! classifier, and buffers contiguous speech until enough trailing
//! silence has elapsed to seal a segment. The segmenter is the sole
//! owner of the active [`SegmentationParams`]; controller candidates
//! arrive through the parameter channel and are applied only at segment
//! boundaries.

use std::sync::Arc;
use std::time::Instant;

use adavox_stt::{confidence, samples_to_f32, SttError, TranscriptionEngine};
use adavox_telemetry::{ChunkQuality, ChunkQualityRecorder, PipelineMetrics};
use adavox_vad::{ClassifierFactory, VadError, VoiceActivityClassifier};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::channel::ParamInbox;
use crate::params::SegmentationParams;
use crate::sink::{SegmentSink, SinkError};

#[derive(Error, Debug)]
pub enum SegmenterError {
    #[error("Classifier error: {0}")]
    Vad(#[from] VadError),

    #[error("Transcription error: {0}")]
    Stt(#[from] SttError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// No speech buffered.
    Idle,
    /// One or more speech frames buffered, segment open.
    Accumulating,
}

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    pub sample_rate_hz: u32,
    pub initial_params: SegmentationParams,
    pub language: Option<String>,
    /// Force-finalize a non-empty speech buffer when the frame stream
    /// closes. Off by default: a live stream's trailing partial is noise,
    /// a file's trailing partial is content.
    pub flush_on_shutdown: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: adavox_vad::SAMPLE_RATE_HZ,
            initial_params: SegmentationParams::default(),
            language: Some("en".to_string()),
            flush_on_shutdown: false,
        }
    }
}

/// Sent to the control task after each finalized segment, in finalize
/// order. Carries everything the controller's observation needs.
#[derive(Debug, Clone)]
pub struct SegmentNotice {
    pub text: String,
    pub duration_seconds: f64,
    pub quality: ChunkQuality,
}

pub struct SpeechSegmenter<S: SegmentSink> {
    config: SegmenterConfig,
    frame_rx: mpsc::Receiver<Vec<i16>>,
    classifier: Box<dyn VoiceActivityClassifier>,
    factory: Box<dyn ClassifierFactory>,
    engine: Box<dyn TranscriptionEngine>,
    sink: S,
    quality: Arc<ChunkQualityRecorder>,
    notice_tx: Option<mpsc::Sender<SegmentNotice>>,
    param_inbox: Option<ParamInbox>,
    applied_tx: Option<watch::Sender<SegmentationParams>>,
    metrics: Option<PipelineMetrics>,

    params: SegmentationParams,
    state: SegmenterState,
    speech_buffer: Vec<i16>,
    silence_counter: u32,
    // Frame tallies for the silence ratio of the segment being built;
    // reset exactly when a segment is emitted.
    chunk_total_frames: u64,
    chunk_silence_frames: u64,
    segments_emitted: u64,
}

impl<S: SegmentSink> SpeechSegmenter<S> {
    pub fn new(
        config: SegmenterConfig,
        frame_rx: mpsc::Receiver<Vec<i16>>,
        factory: Box<dyn ClassifierFactory>,
        engine: Box<dyn TranscriptionEngine>,
        sink: S,
        quality: Arc<ChunkQualityRecorder>,
    ) -> Result<Self, VadError> {
        let params = config.initial_params.clamped();
        let classifier = factory.create(params.aggressiveness)?;
        Ok(Self {
            config,
            frame_rx,
            classifier,
            factory,
            engine,
            sink,
            quality,
            notice_tx: None,
            param_inbox: None,
            applied_tx: None,
            metrics: None,
            params,
            state: SegmenterState::Idle,
            speech_buffer: Vec::new(),
            silence_counter: 0,
            chunk_total_frames: 0,
            chunk_silence_frames: 0,
            segments_emitted: 0,
        })
    }

    pub fn with_notice_sender(mut self, tx: mpsc::Sender<SegmentNotice>) -> Self {
        self.notice_tx = Some(tx);
        self
    }

    pub fn with_param_inbox(mut self, inbox: ParamInbox) -> Self {
        self.param_inbox = Some(inbox);
        self
    }

    /// Publishes the currently-applied parameters so frame producers can
    /// follow frame-duration changes.
    pub fn with_applied_params_watch(mut self, tx: watch::Sender<SegmentationParams>) -> Self {
        let _ = tx.send(self.params);
        self.applied_tx = Some(tx);
        self
    }

    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn current_state(&self) -> SegmenterState {
        self.state
    }

    pub fn current_params(&self) -> SegmentationParams {
        self.params
    }

    pub fn buffered_samples(&self) -> usize {
        self.speech_buffer.len()
    }

    pub fn segments_emitted(&self) -> u64 {
        self.segments_emitted
    }

    /// Runs until the frame channel closes. Closure of the channel is
    /// the end-of-stream sentinel: every sender dropping delivers it
    /// exactly once. Downstream failures abort the loop; restart policy
    /// belongs to the caller.
    pub async fn run(mut self) -> Result<(), SegmenterError> {
        info!(target: "segmenter", "Speech segmenter started ({})", self.params);

        while let Some(frame) = self.frame_rx.recv().await {
            self.process_frame(&frame).await?;
        }

        if self.config.flush_on_shutdown && !self.speech_buffer.is_empty() {
            info!(
                target: "segmenter",
                "Flushing trailing segment at end of stream ({} samples)",
                self.speech_buffer.len()
            );
            self.finalize_segment().await?;
        }

        info!(
            target: "segmenter",
            "Speech segmenter stopped: {} segments emitted", self.segments_emitted
        );
        Ok(())
    }

    async fn process_frame(&mut self, frame: &[i16]) -> Result<(), SegmenterError> {
        let is_speech = self
            .classifier
            .is_speech(frame, self.config.sample_rate_hz)?;

        self.chunk_total_frames += 1;
        if let Some(m) = &self.metrics {
            m.record_frame(is_speech);
        }

        if is_speech {
            self.speech_buffer.extend_from_slice(frame);
            self.silence_counter = 0;
            self.state = SegmenterState::Accumulating;
        } else {
            self.chunk_silence_frames += 1;
            self.silence_counter += 1;

            if self.silence_counter > self.params.max_silence_frames
                && !self.speech_buffer.is_empty()
            {
                self.finalize_segment().await?;
            }
        }

        Ok(())
    }

    /// Seals the open segment: sink callbacks and transcription run
    /// synchronously in order, quality is recorded, and only then are
    /// pending parameter updates applied.
    async fn finalize_segment(&mut self) -> Result<(), SegmenterError> {
        let samples = std::mem::take(&mut self.speech_buffer);
        let duration_seconds = samples.len() as f64 / self.config.sample_rate_hz as f64;

        let silence_ratio = if self.chunk_total_frames > 0 {
            self.chunk_silence_frames as f32 / self.chunk_total_frames as f32
        } else {
            0.0
        };

        // Tallies and counters reset at the emit point, per segment.
        self.chunk_total_frames = 0;
        self.chunk_silence_frames = 0;
        self.silence_counter = 0;
        self.state = SegmenterState::Idle;

        debug!(
            target: "segmenter",
            "Finalizing segment: {} samples ({:.2}s), silence_ratio={:.3}",
            samples.len(),
            duration_seconds,
            silence_ratio
        );

        let audio = samples_to_f32(&samples);
        self.sink.on_audio_chunk(&audio, duration_seconds)?;

        let started = Instant::now();
        let result = match self
            .engine
            .transcribe(&audio, self.config.language.as_deref())
            .await
        {
            Ok(result) => result,
            Err(e) => {
                if let Some(m) = &self.metrics {
                    m.record_transcribe_error();
                }
                return Err(e.into());
            }
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        self.sink.on_transcription(&result.text, duration_seconds)?;

        let quality = ChunkQuality {
            silence_ratio,
            confidence: confidence(&result),
        };
        self.quality.record(quality);
        self.segments_emitted += 1;
        if let Some(m) = &self.metrics {
            m.record_segment(latency_ms);
        }

        if let Some(tx) = &self.notice_tx {
            // Consumer gone means shutdown is racing us; nothing to do.
            let _ = tx
                .send(SegmentNotice {
                    text: result.text,
                    duration_seconds,
                    quality,
                })
                .await;
        }

        self.apply_pending_params()?;
        Ok(())
    }

    /// Boundary-only parameter application. An aggressiveness change
    /// rebuilds the classifier; a frame-duration change is re-published
    /// on the applied-params watch so the frame producer resizes
    /// subsequent frames. The in-flight stream is otherwise untouched.
    fn apply_pending_params(&mut self) -> Result<(), VadError> {
        let Some(inbox) = self.param_inbox.as_mut() else {
            return Ok(());
        };
        let Some(next) = inbox.drain() else {
            return Ok(());
        };

        let next = next.clamped();
        if next == self.params {
            return Ok(());
        }

        info!(
            target: "segmenter",
            "Applying parameters at segment boundary: [{}] -> [{}]", self.params, next
        );

        if next.aggressiveness != self.params.aggressiveness {
            self.classifier = self.factory.create(next.aggressiveness)?;
        }
        self.params = next;

        if let Some(m) = &self.metrics {
            m.record_parameter_update();
        }
        if let Some(tx) = &self.applied_tx {
            let _ = tx.send(next);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkError;
    use adavox_stt::plugins::MockEngine;
    use adavox_vad::Aggressiveness;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct FixedVerdicts(Mutex<VecDeque<bool>>);

    impl VoiceActivityClassifier for FixedVerdicts {
        fn is_speech(&mut self, _frame: &[i16], _rate: u32) -> Result<bool, VadError> {
            Ok(self.0.lock().unwrap().pop_front().unwrap_or(false))
        }
    }

    struct FixedFactory(Vec<bool>);

    impl ClassifierFactory for FixedFactory {
        fn create(
            &self,
            _aggressiveness: Aggressiveness,
        ) -> Result<Box<dyn VoiceActivityClassifier>, VadError> {
            Ok(Box::new(FixedVerdicts(Mutex::new(
                self.0.iter().copied().collect(),
            ))))
        }
    }

    struct NullSink;

    impl SegmentSink for NullSink {
        fn on_audio_chunk(&mut self, _audio: &[f32], _duration: f64) -> Result<(), SinkError> {
            Ok(())
        }
        fn on_transcription(&mut self, _text: &str, _duration: f64) -> Result<(), SinkError> {
            Ok(())
        }
    }

    fn segmenter_with(verdicts: Vec<bool>) -> SpeechSegmenter<NullSink> {
        let (_tx, rx) = mpsc::channel(1);
        SpeechSegmenter::new(
            SegmenterConfig::default(),
            rx,
            Box::new(FixedFactory(verdicts)),
            Box::new(MockEngine::default()),
            NullSink,
            Arc::new(ChunkQualityRecorder::default()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn buffer_is_empty_after_every_finalize() {
        let mut seg = segmenter_with(vec![true, true, false, false, false, false, false, false]);
        let frame = vec![500i16; 320];

        for _ in 0..2 {
            seg.process_frame(&frame).await.unwrap();
        }
        assert_eq!(seg.current_state(), SegmenterState::Accumulating);
        assert_eq!(seg.buffered_samples(), 640);

        for _ in 0..6 {
            seg.process_frame(&frame).await.unwrap();
        }
        assert_eq!(seg.current_state(), SegmenterState::Idle);
        assert_eq!(seg.buffered_samples(), 0);
        assert_eq!(seg.segments_emitted(), 1);
    }

    #[tokio::test]
    async fn speech_resets_the_silence_run() {
        // 5 silences, speech, 5 silences: never exceeds the threshold.
        let mut verdicts = vec![true];
        verdicts.extend([false; 5]);
        verdicts.push(true);
        verdicts.extend([false; 5]);
        let mut seg = segmenter_with(verdicts);
        let frame = vec![500i16; 320];

        for _ in 0..12 {
            seg.process_frame(&frame).await.unwrap();
        }
        assert_eq!(seg.segments_emitted(), 0);
        assert_eq!(seg.current_state(), SegmenterState::Accumulating);
    }

    #[tokio::test]
    async fn idle_silence_never_finalizes() {
        let mut seg = segmenter_with(vec![false; 20]);
        let frame = vec![0i16; 320];
        for _ in 0..20 {
            seg.process_frame(&frame).await.unwrap();
        }
        assert_eq!(seg.segments_emitted(), 0);
        assert_eq!(seg.current_state(), SegmenterState::Idle);
    }
}

