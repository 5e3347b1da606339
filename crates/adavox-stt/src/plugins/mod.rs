pub mod mock;

pub use mock::{MockConfig, MockEngine, NoopEngine};
