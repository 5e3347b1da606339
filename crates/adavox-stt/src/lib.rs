pub mod confidence;
pub mod engine;
pub mod helpers;
pub mod plugins;
pub mod types;

pub use confidence::confidence;
pub use engine::TranscriptionEngine;
pub use helpers::samples_to_f32;
pub use types::{DecodedSegment, SttError, TranscriptionResult};
