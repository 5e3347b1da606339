pub mod channel;
pub mod params;
pub mod segmenter;
pub mod sink;

pub use channel::{parameter_channel, ParamInbox, ParamPublisher};
pub use params::{SegmentationParams, MAX_SILENCE_FRAMES_CEILING, MIN_SILENCE_FRAMES_FLOOR};
pub use segmenter::{
    SegmentNotice, SegmenterConfig, SegmenterError, SegmenterState, SpeechSegmenter,
};
pub use sink::{SegmentSink, SinkError};
