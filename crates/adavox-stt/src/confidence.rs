use crate::types::TranscriptionResult;

/// Collapses per-sub-unit log-probabilities into a single [0, 1]
/// confidence figure: exp of the mean log-probability, clamped.
///
/// This mapping is engine-specific (it matches how Whisper-family
/// decoders report `avg_logprob`) and is kept out of the controller so
/// another engine can substitute its own without touching control logic.
/// Engines that report nothing get the neutral 0.5.
pub fn confidence(result: &TranscriptionResult) -> f32 {
    if result.segments.is_empty() {
        return 0.5;
    }
    let mean_logprob: f32 = result
        .segments
        .iter()
        .map(|s| s.avg_logprob)
        .sum::<f32>()
        / result.segments.len() as f32;
    mean_logprob.exp().clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DecodedSegment;

    fn result_with(logprobs: &[f32]) -> TranscriptionResult {
        TranscriptionResult {
            text: String::new(),
            segments: logprobs
                .iter()
                .map(|&avg_logprob| DecodedSegment { avg_logprob })
                .collect(),
        }
    }

    #[test]
    fn no_segments_defaults_to_neutral() {
        assert_eq!(confidence(&result_with(&[])), 0.5);
    }

    #[test]
    fn exp_of_mean_logprob() {
        // mean(-0.2, -0.4) = -0.3, exp(-0.3) ≈ 0.7408
        let c = confidence(&result_with(&[-0.2, -0.4]));
        assert!((c - (-0.3f32).exp()).abs() < 1e-6);
    }

    #[test]
    fn positive_logprobs_clamp_to_one() {
        assert_eq!(confidence(&result_with(&[0.5, 1.0])), 1.0);
    }

    #[test]
    fn very_negative_logprobs_stay_near_zero() {
        let c = confidence(&result_with(&[-20.0]));
        assert!(c >= 0.0 && c < 1e-6);
    }
}
