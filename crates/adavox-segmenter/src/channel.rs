use crate::params::SegmentationParams;
use tokio::sync::mpsc;
use tracing::debug;

/// Creates the single-writer parameter update channel between the
/// controller and the segmenter.
///
/// Publishing queues updates FIFO and never blocks; the segmenter drains
/// the queue only at segment boundaries, so an in-flight segment is
/// never processed with half-changed parameters. Updates are absolute
/// parameter sets, so draining all of them in publish order and keeping
/// the final value is equivalent to applying each in turn.
pub fn parameter_channel() -> (ParamPublisher, ParamInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ParamPublisher { tx }, ParamInbox { rx })
}

#[derive(Clone)]
pub struct ParamPublisher {
    tx: mpsc::UnboundedSender<SegmentationParams>,
}

impl ParamPublisher {
    /// Non-blocking, callable from any task. A publish that races the
    /// segmenter's shutdown is dropped silently: the consumer no longer
    /// exists, so there is nothing to update.
    pub fn publish(&self, params: SegmentationParams) {
        if self.tx.send(params).is_err() {
            debug!(target: "segmenter", "Parameter update dropped: segmenter already stopped");
        }
    }
}

pub struct ParamInbox {
    rx: mpsc::UnboundedReceiver<SegmentationParams>,
}

impl ParamInbox {
    /// Consumes every update available right now, in publish order, and
    /// returns the resulting parameter set. Empty inbox is a no-op.
    pub fn drain(&mut self) -> Option<SegmentationParams> {
        let mut latest = None;
        while let Ok(params) = self.rx.try_recv() {
            if let Some(superseded) = latest.replace(params) {
                debug!(
                    target: "segmenter",
                    "Parameter update superseded before application: {}", superseded
                );
            }
        }
        latest
    }
}
