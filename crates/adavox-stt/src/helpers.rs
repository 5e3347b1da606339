/// i16 PCM to normalized f32 in [-1, 1], the format engines consume.
pub fn samples_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32_767.0).collect()
}
