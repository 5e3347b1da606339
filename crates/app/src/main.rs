use adavox_app::{read_wav_samples, Pipeline, PipelineConfig};
use adavox_foundation::{AppState, RecoveryStrategy, ShutdownHandler, StateManager};
use adavox_segmenter::SegmenterConfig;
use adavox_stt::plugins::NoopEngine;
use adavox_vad::SAMPLE_RATE_HZ;
use adavox_vad_webrtc::WebRtcClassifierFactory;
use anyhow::{anyhow, Context};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "adavox.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    std::mem::forget(guard);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;
    tracing::info!("Starting adavox");

    let wav_path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: adavox <wav-file>  (16 kHz, 16-bit PCM)"))?;

    let state_manager = StateManager::new();
    let shutdown = ShutdownHandler::new();
    shutdown.install_signal_handler();
    let mut shutdown_token = shutdown.token();

    let samples = read_wav_samples(&wav_path).context("loading input audio")?;

    // A file's trailing partial segment is content, not noise: flush it.
    let config = PipelineConfig {
        segmenter: SegmenterConfig {
            flush_on_shutdown: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let pipeline = Pipeline::spawn(
        config,
        Box::new(WebRtcClassifierFactory::new(SAMPLE_RATE_HZ)),
        // Transcription engines are pluggable; the bundled one
        // recognizes nothing and exists to exercise the pipeline.
        Box::new(NoopEngine),
    )?;

    state_manager.transition(AppState::Running)?;

    let sample_tx = pipeline.sample_sender();
    let mut feeder = tokio::spawn(async move {
        // 100 ms blocks, the granularity a capture driver would deliver.
        for block in samples.chunks((SAMPLE_RATE_HZ as usize) / 10) {
            if sample_tx.send(block.to_vec()).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = shutdown_token.wait() => {
            tracing::info!("Shutdown signal received, stopping feed");
            feeder.abort();
        }
        result = &mut feeder => {
            if let Err(e) = result {
                tracing::warn!("Feeder task ended abnormally: {e}");
            }
        }
    }

    state_manager.transition(AppState::Stopping)?;

    let status = pipeline.status();
    let report = match pipeline.shutdown().await {
        Ok(report) => report,
        Err(err) => {
            match err.recovery_strategy() {
                RecoveryStrategy::Retry { .. } | RecoveryStrategy::Restart => {
                    tracing::error!("Pipeline failed ({err}); a supervisor should restart the run")
                }
                RecoveryStrategy::Fatal => tracing::error!("Pipeline failed fatally: {err}"),
            }
            return Err(err.into());
        }
    };

    state_manager.transition(AppState::Stopped)?;

    println!("\nFinal transcript:\n{}\n", report.transcript);
    println!(
        "Segments: {}  Average WPM: {:.1}",
        report.segments, report.average_wpm
    );
    println!(
        "Controller status: {}",
        serde_json::to_string_pretty(&status)?
    );

    Ok(())
}
