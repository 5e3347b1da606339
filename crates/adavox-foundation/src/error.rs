use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Segmenter error: {0}")]
    Segmenter(String),

    #[error("Shutdown requested")]
    ShutdownRequested,

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),

    #[error("Transient error, will retry: {0}")]
    Transient(String),
}

#[derive(Debug, Clone)]
pub enum RecoveryStrategy {
    Retry { max_attempts: u32, delay: Duration },
    Restart,
    Fatal,
}

impl PipelineError {
    /// Maps an error to what the supervising caller should do with it.
    /// Classifier and engine failures are fatal by default: a broken
    /// capability invalidates every transcript produced after it.
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            PipelineError::Transient(_) => RecoveryStrategy::Retry {
                max_attempts: 3,
                delay: Duration::from_millis(500),
            },
            PipelineError::Segmenter(_) => RecoveryStrategy::Restart,
            PipelineError::Fatal(_) | PipelineError::ShutdownRequested => RecoveryStrategy::Fatal,
            PipelineError::Config(_) => RecoveryStrategy::Fatal,
        }
    }
}
