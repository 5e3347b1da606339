use std::collections::VecDeque;

/// Fixed-capacity FIFO of samples with an unweighted mean.
///
/// Eviction is strictly insertion-ordered, so the contents are always
/// the most recent `capacity` samples.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl RollingHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "rolling history needs capacity >= 1");
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Mean of the current contents; empty history reads as 0.0.
    pub fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn empty_history_means_zero() {
        assert_eq!(RollingHistory::new(5).mean(), 0.0);
    }

    #[test]
    fn mean_before_capacity_uses_present_samples() {
        let mut h = RollingHistory::new(5);
        h.push(1.0);
        h.push(3.0);
        assert!((h.mean() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn eviction_keeps_most_recent_window() {
        let mut h = RollingHistory::new(3);
        for v in [10.0, 20.0, 30.0, 40.0] {
            h.push(v);
        }
        assert_eq!(h.len(), 3);
        assert!((h.mean() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn mean_matches_reference_under_random_eviction() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let capacity = rng.gen_range(1..=8);
            let n = rng.gen_range(capacity..capacity + 20);
            let values: Vec<f32> = (0..n).map(|_| rng.gen_range(-100.0..100.0)).collect();

            let mut h = RollingHistory::new(capacity);
            for &v in &values {
                h.push(v);
            }

            let tail = &values[n - capacity..];
            let expected: f32 = tail.iter().sum::<f32>() / capacity as f32;
            assert!(
                (h.mean() - expected).abs() < 1e-6 * expected.abs().max(1.0),
                "capacity={} n={}",
                capacity,
                n
            );
        }
    }
}
