//! Mock engines for testing the pipeline

use crate::engine::TranscriptionEngine;
use crate::types::{DecodedSegment, SttError, TranscriptionResult};
use async_trait::async_trait;
use tracing::info;

/// Configuration for scripted mock transcriptions
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Transcripts returned in order; the last one repeats once exhausted.
    pub scripted_texts: Vec<String>,

    /// avg_logprob attached to every result; None emits no segments
    /// (confidence falls back to the neutral default downstream).
    pub avg_logprob: Option<f32>,

    /// Simulate processing delay in ms
    pub processing_delay_ms: u64,

    /// Simulate failure after N calls
    pub fail_after_calls: Option<usize>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            scripted_texts: vec!["mock test transcription".to_string()],
            avg_logprob: Some(-0.1),
            processing_delay_ms: 0,
            fail_after_calls: None,
        }
    }
}

/// Scripted engine for pipeline tests.
#[derive(Debug)]
pub struct MockEngine {
    config: MockConfig,
    calls_made: usize,
}

impl MockEngine {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            calls_made: 0,
        }
    }

    pub fn with_transcription(text: impl Into<String>) -> Self {
        Self::new(MockConfig {
            scripted_texts: vec![text.into()],
            ..Default::default()
        })
    }

    pub fn with_logprob(text: impl Into<String>, avg_logprob: f32) -> Self {
        Self::new(MockConfig {
            scripted_texts: vec![text.into()],
            avg_logprob: Some(avg_logprob),
            ..Default::default()
        })
    }

    pub fn calls_made(&self) -> usize {
        self.calls_made
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

#[async_trait]
impl TranscriptionEngine for MockEngine {
    async fn transcribe(
        &mut self,
        audio: &[f32],
        _language: Option<&str>,
    ) -> Result<TranscriptionResult, SttError> {
        self.calls_made += 1;

        if let Some(fail_after) = self.config.fail_after_calls {
            if self.calls_made > fail_after {
                return Err(SttError::TranscriptionFailed(
                    "Simulated failure".to_string(),
                ));
            }
        }

        if self.config.processing_delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(
                self.config.processing_delay_ms,
            ))
            .await;
        }

        let text = if self.config.scripted_texts.is_empty() {
            String::new()
        } else {
            let idx = (self.calls_made - 1).min(self.config.scripted_texts.len() - 1);
            self.config.scripted_texts[idx].clone()
        };
        info!(
            "MockEngine: call {} -> {:?} ({} samples)",
            self.calls_made,
            text,
            audio.len()
        );

        Ok(TranscriptionResult {
            text,
            segments: self
                .config
                .avg_logprob
                .map(|avg_logprob| vec![DecodedSegment { avg_logprob }])
                .unwrap_or_default(),
        })
    }
}

/// Engine that recognizes nothing; used for smoke runs without a model.
#[derive(Debug, Default)]
pub struct NoopEngine;

#[async_trait]
impl TranscriptionEngine for NoopEngine {
    async fn transcribe(
        &mut self,
        _audio: &[f32],
        _language: Option<&str>,
    ) -> Result<TranscriptionResult, SttError> {
        Ok(TranscriptionResult::text_only(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::confidence;

    #[tokio::test]
    async fn scripted_texts_play_in_order_and_repeat() {
        let mut engine = MockEngine::new(MockConfig {
            scripted_texts: vec!["first".into(), "second".into()],
            ..Default::default()
        });
        assert_eq!(engine.transcribe(&[0.0], None).await.unwrap().text, "first");
        assert_eq!(engine.transcribe(&[0.0], None).await.unwrap().text, "second");
        assert_eq!(engine.transcribe(&[0.0], None).await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn fails_after_configured_calls() {
        let mut engine = MockEngine::new(MockConfig {
            fail_after_calls: Some(1),
            ..Default::default()
        });
        assert!(engine.transcribe(&[0.0], None).await.is_ok());
        assert!(engine.transcribe(&[0.0], None).await.is_err());
    }

    #[tokio::test]
    async fn logprob_controls_downstream_confidence() {
        let mut engine = MockEngine::with_logprob("hi", -2.0);
        let result = engine.transcribe(&[0.0], None).await.unwrap();
        assert!(confidence(&result) < 0.2);

        let mut bare = MockEngine::new(MockConfig {
            avg_logprob: None,
            ..Default::default()
        });
        let result = bare.transcribe(&[0.0], None).await.unwrap();
        assert_eq!(confidence(&result), 0.5);
    }
}
