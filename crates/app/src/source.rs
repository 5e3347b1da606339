//! Offline frame sources
//!
//! Live capture is an external collaborator; the binary and the tests
//! feed the pipeline from WAV files or generated PCM instead.

use std::path::Path;

use adavox_vad::SAMPLE_RATE_HZ;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("WAV read error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unsupported WAV format: {0}")]
    UnsupportedFormat(String),
}

/// Loads a WAV file as mono i16 PCM at the pipeline sample rate.
/// Multi-channel input is averaged down to mono; other sample rates are
/// rejected rather than silently resampled.
pub fn read_wav_samples(path: impl AsRef<Path>) -> Result<Vec<i16>, SourceError> {
    let mut reader = hound::WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    if spec.sample_rate != SAMPLE_RATE_HZ {
        return Err(SourceError::UnsupportedFormat(format!(
            "sample rate {} Hz, expected {}",
            spec.sample_rate, SAMPLE_RATE_HZ
        )));
    }
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(SourceError::UnsupportedFormat(format!(
            "{:?} {} bits, expected 16-bit integer PCM",
            spec.sample_format, spec.bits_per_sample
        )));
    }

    let channels = spec.channels as usize;
    let interleaved = reader
        .samples::<i16>()
        .collect::<Result<Vec<i16>, hound::Error>>()?;

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    };

    info!(
        target: "source",
        "Loaded {} samples ({:.2}s) from {}",
        samples.len(),
        samples.len() as f64 / SAMPLE_RATE_HZ as f64,
        path.as_ref().display()
    );
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("adavox-{}-{}.wav", name, std::process::id()))
    }

    #[test]
    fn reads_mono_16k() {
        let path = temp_path("mono");
        write_wav(&path, 1, SAMPLE_RATE_HZ, &[100, -100, 200]);
        let samples = read_wav_samples(&path).unwrap();
        assert_eq!(samples, vec![100, -100, 200]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn averages_stereo_to_mono() {
        let path = temp_path("stereo");
        write_wav(&path, 2, SAMPLE_RATE_HZ, &[1000, -1000, 600, 400]);
        let samples = read_wav_samples(&path).unwrap();
        assert_eq!(samples, vec![0, 500]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rejects_wrong_sample_rate() {
        let path = temp_path("badrate");
        write_wav(&path, 1, 44_100, &[0; 10]);
        assert!(matches!(
            read_wav_samples(&path),
            Err(SourceError::UnsupportedFormat(_))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
