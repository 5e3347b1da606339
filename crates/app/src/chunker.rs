//! PCM block to frame slicing
//!
//! Sits between a frame source and the segmenter: accepts arbitrarily
//! sized PCM blocks, slices them into frames of the currently-applied
//! frame duration, and forwards them on a bounded channel. That channel
//! is the pipeline's only buffering point; when it fills, backpressure
//! propagates here and on to the source.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use adavox_segmenter::SegmentationParams;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

pub struct FrameChunker {
    sample_rx: mpsc::Receiver<Vec<i16>>,
    frame_tx: mpsc::Sender<Vec<i16>>,
    params_rx: watch::Receiver<SegmentationParams>,
    sample_rate_hz: u32,
    paused: Arc<AtomicBool>,
    buffer: VecDeque<i16>,
    frames_emitted: u64,
}

impl FrameChunker {
    pub fn new(
        sample_rx: mpsc::Receiver<Vec<i16>>,
        frame_tx: mpsc::Sender<Vec<i16>>,
        params_rx: watch::Receiver<SegmentationParams>,
        sample_rate_hz: u32,
    ) -> Self {
        Self {
            sample_rx,
            frame_tx,
            params_rx,
            sample_rate_hz,
            paused: Arc::new(AtomicBool::new(false)),
            buffer: VecDeque::new(),
            frames_emitted: 0,
        }
    }

    /// Shared pause flag; while set, incoming blocks are dropped.
    pub fn pause_flag(&self) -> Arc<AtomicBool> {
        self.paused.clone()
    }

    /// Runs until the sample channel closes, then drains whole frames
    /// and drops the sub-frame residue. Dropping `frame_tx` on return is
    /// the segmenter's end-of-stream sentinel, delivered exactly once.
    pub async fn run(mut self) {
        info!(target: "chunker", "Frame chunker started");

        while let Some(block) = self.sample_rx.recv().await {
            if self.paused.load(Ordering::Relaxed) {
                debug!(target: "chunker", "Paused, dropping {} samples", block.len());
                continue;
            }
            self.buffer.extend(block);
            if !self.flush_ready_frames().await {
                break;
            }
        }

        // Residue shorter than a frame cannot be classified; drop it.
        if !self.buffer.is_empty() {
            debug!(
                target: "chunker",
                "Dropping {} residual samples at end of stream",
                self.buffer.len()
            );
        }

        info!(
            target: "chunker",
            "Frame chunker stopped: {} frames emitted", self.frames_emitted
        );
    }

    /// Emits every whole frame currently buffered. The frame size is
    /// re-read per frame so an applied frame-duration change takes
    /// effect on the very next slice. Returns false when the segmenter
    /// side has gone away.
    async fn flush_ready_frames(&mut self) -> bool {
        loop {
            let frame_samples = self.params_rx.borrow().frame_samples(self.sample_rate_hz);
            if self.buffer.len() < frame_samples {
                return true;
            }

            let frame: Vec<i16> = self.buffer.drain(..frame_samples).collect();
            if self.frame_tx.send(frame).await.is_err() {
                debug!(target: "chunker", "Frame channel closed, stopping");
                return false;
            }
            self.frames_emitted += 1;
        }
    }
}
