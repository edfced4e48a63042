//! Quantile estimation via precision-histogram bucket traversal.

use super::histogram::PrecisionHistogram;
use crate::diagnostics;

/// Estimates the value below which a given fraction of samples fall, by
/// walking a [`PrecisionHistogram`]'s buckets in ascending order.
#[derive(Debug, Clone)]
pub struct Quantile {
    inner: PrecisionHistogram,
    q_prob: f64,
}

impl Quantile {
    /// `q` must be in `(0, 1]`; out-of-range values are clamped to the
    /// default 0.95 with a diagnostic.
    pub fn new(q: f64) -> Self {
        let q_prob = if q <= 0.0 || q > 1.0 {
            diagnostics::invalid_argument("Quantile::new", "q must be in (0, 1]");
            0.95
        } else {
            q
        };
        Quantile {
            inner: PrecisionHistogram::new(),
            q_prob,
        }
    }

    pub fn set_value(&mut self, value: f64) {
        self.inner.set_value(value);
    }

    pub fn precision(&self) -> &PrecisionHistogram {
        &self.inner
    }

    /// The estimated quantile value.
    pub fn value(&self) -> f64 {
        let p_samples = self.inner.number_of_samples() as f64 * self.q_prob;
        if p_samples == 0.0 {
            diagnostics::invalid_argument("Quantile::value", "no samples to estimate from");
            return 0.0;
        }
        let mut n_entries = 0u64;
        let mut trail_name = 0.0;
        for bucket in self.inner.buckets() {
            n_entries += bucket.count;
            trail_name = bucket.name;
            if n_entries as f64 >= p_samples {
                break;
            }
        }
        trail_name
    }

    /// `max - min` of all observed values.
    pub fn range(&self) -> f64 {
        self.inner.variance_stat().max() - self.inner.variance_stat().min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_is_monotone_in_q() {
        let mut low = Quantile::new(0.5);
        let mut high = Quantile::new(0.95);
        for v in 1..=100 {
            low.set_value(v as f64);
            high.set_value(v as f64);
        }
        assert!(low.value() <= high.value());
    }

    #[test]
    fn invalid_q_falls_back_to_default() {
        let q = Quantile::new(1.5);
        assert!((q.q_prob - 0.95).abs() < f64::EPSILON);
    }
}
