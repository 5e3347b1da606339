//! Pipeline assembly
//!
//! Owns every component instance for one run: chunker, segmenter,
//! quality recorder, signal aggregator, and the adaptive controller,
//! wired together with channels. No ambient state; drop the pipeline
//! and the run is gone.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use adavox_control::{AdaptiveController, ControlThresholds};
use adavox_foundation::PipelineError;
use adavox_segmenter::{
    parameter_channel, SegmentNotice, SegmenterConfig, SegmenterError, SpeechSegmenter,
};
use adavox_stt::TranscriptionEngine;
use adavox_telemetry::{ChunkQualityRecorder, PipelineMetrics, QualityAverages, SignalAggregator, UiMetrics};
use adavox_vad::ClassifierFactory;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::chunker::FrameChunker;
use crate::sinks::{TranscriptAccumulator, TranscriptHandle};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub segmenter: SegmenterConfig,
    pub thresholds: ControlThresholds,
    pub averaging_window: usize,
    pub quality_window: usize,
    pub signal_window: usize,
    /// Bound on the frame queue between chunker and segmenter. When
    /// transcription lags audio arrival, the queue fills and
    /// backpressure stalls the chunker (and through it the source)
    /// rather than growing without limit.
    pub frame_queue_depth: usize,
    pub sample_queue_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            thresholds: ControlThresholds::default(),
            averaging_window: adavox_control::DEFAULT_AVERAGING_WINDOW,
            quality_window: 5,
            signal_window: 10,
            frame_queue_depth: 512,
            sample_queue_depth: 64,
        }
    }
}

/// Read-only snapshot of a running pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub controller: adavox_control::ControllerStatus,
    pub quality: QualityAverages,
    pub ui: UiMetrics,
    pub frames_in: u64,
    pub segments_finalized: u64,
    pub parameter_updates_applied: u64,
}

/// End-of-run summary.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub transcript: String,
    pub segments: usize,
    pub average_wpm: f32,
}

pub struct Pipeline {
    sample_tx: mpsc::Sender<Vec<i16>>,
    chunker_handle: JoinHandle<()>,
    segmenter_handle: JoinHandle<Result<(), SegmenterError>>,
    control_handle: JoinHandle<()>,
    controller: Arc<Mutex<AdaptiveController>>,
    quality: Arc<ChunkQualityRecorder>,
    signals: Arc<SignalAggregator>,
    metrics: PipelineMetrics,
    transcript: TranscriptHandle,
    paused: Arc<std::sync::atomic::AtomicBool>,
}

impl Pipeline {
    /// Builds and starts every task. Must run inside a tokio runtime.
    pub fn spawn(
        config: PipelineConfig,
        factory: Box<dyn ClassifierFactory>,
        engine: Box<dyn TranscriptionEngine>,
    ) -> Result<Self, PipelineError> {
        let metrics = PipelineMetrics::default();
        let quality = Arc::new(ChunkQualityRecorder::new(config.quality_window));
        let signals = Arc::new(SignalAggregator::new(config.signal_window));

        let (sample_tx, sample_rx) = mpsc::channel(config.sample_queue_depth);
        let (frame_tx, frame_rx) = mpsc::channel(config.frame_queue_depth);
        let (notice_tx, notice_rx) = mpsc::channel::<SegmentNotice>(32);
        let (param_tx, param_inbox) = parameter_channel();
        let (applied_tx, applied_rx) = watch::channel(config.segmenter.initial_params.clamped());

        let controller = Arc::new(Mutex::new(
            AdaptiveController::new(config.segmenter.initial_params)
                .with_thresholds(config.thresholds.clone())
                .with_averaging_window(config.averaging_window)
                .with_publisher(param_tx),
        ));

        let (sink, transcript) = TranscriptAccumulator::new(signals.clone());

        let segmenter = SpeechSegmenter::new(
            config.segmenter.clone(),
            frame_rx,
            factory,
            engine,
            sink,
            quality.clone(),
        )
        .map_err(|e| PipelineError::Config(e.to_string()))?
        .with_notice_sender(notice_tx)
        .with_param_inbox(param_inbox)
        .with_applied_params_watch(applied_tx)
        .with_metrics(metrics.clone());

        let chunker = FrameChunker::new(
            sample_rx,
            frame_tx,
            applied_rx,
            config.segmenter.sample_rate_hz,
        );
        let paused = chunker.pause_flag();

        let segmenter_handle = tokio::spawn(segmenter.run());
        let chunker_handle = tokio::spawn(chunker.run());
        let control_handle = tokio::spawn(control_loop(
            notice_rx,
            signals.clone(),
            controller.clone(),
        ));

        info!("Pipeline started");

        Ok(Self {
            sample_tx,
            chunker_handle,
            segmenter_handle,
            control_handle,
            controller,
            quality,
            signals,
            metrics,
            transcript,
            paused,
        })
    }

    /// Handle for feeding PCM blocks. Drop all clones (and call
    /// [`Pipeline::shutdown`]) to end the stream.
    pub fn sample_sender(&self) -> mpsc::Sender<Vec<i16>> {
        self.sample_tx.clone()
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
        info!("Pipeline paused");
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
        info!("Pipeline resumed");
    }

    pub fn transcript(&self) -> TranscriptHandle {
        self.transcript.clone()
    }

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            controller: self.controller.lock().status(),
            quality: self.quality.averages(),
            ui: self.signals.snapshot(),
            frames_in: self.metrics.frames_in(),
            segments_finalized: self.metrics.segments_finalized(),
            parameter_updates_applied: self.metrics.parameter_updates_applied(),
        }
    }

    /// Graceful stop: closes the sample stream and waits for the tasks
    /// to drain in dependency order. A segmenter failure surfaces here.
    pub async fn shutdown(self) -> Result<PipelineReport, PipelineError> {
        drop(self.sample_tx);

        self.chunker_handle
            .await
            .map_err(|e| PipelineError::Fatal(format!("chunker task panicked: {e}")))?;

        match self.segmenter_handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(PipelineError::Fatal(e.to_string())),
            Err(e) => {
                return Err(PipelineError::Fatal(format!(
                    "segmenter task panicked: {e}"
                )))
            }
        }

        self.control_handle
            .await
            .map_err(|e| PipelineError::Fatal(format!("control task panicked: {e}")))?;

        info!("Pipeline shut down cleanly");

        Ok(PipelineReport {
            transcript: self.transcript.full_text(),
            segments: self.transcript.segments(),
            average_wpm: self.transcript.average_wpm(),
        })
    }
}

/// The transcription-completion context: consumes segment notices in
/// finalize order, folds them into the signal aggregator, and lets the
/// controller decide. Committed parameters flow back to the segmenter
/// through the parameter channel.
async fn control_loop(
    mut notice_rx: mpsc::Receiver<SegmentNotice>,
    signals: Arc<SignalAggregator>,
    controller: Arc<Mutex<AdaptiveController>>,
) {
    info!(target: "adaptive", "Control task started");

    while let Some(notice) = notice_rx.recv().await {
        signals.record_transcript(&notice.text, notice.duration_seconds);
        let wpm = signals.average_wpm();
        controller.lock().observe(notice.quality, wpm);
    }

    info!(target: "adaptive", "Control task stopped: notice stream closed");
}
