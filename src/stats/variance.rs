//! Running variance, built on top of [`Mean`].

use super::mean::Mean;

/// Running sample variance (Bessel-corrected) and its derived statistics.
#[derive(Debug, Clone, Copy)]
pub struct Variance {
    mean: Mean,
    sum_sq: f64,
}

impl Default for Variance {
    fn default() -> Self {
        Self::new()
    }
}

impl Variance {
    pub fn new() -> Self {
        Variance {
            mean: Mean::new(),
            sum_sq: 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn set_value(&mut self, value: f64) {
        self.mean.set_value(value);
        self.sum_sq += value * value;
    }

    pub fn mean_stat(&self) -> &Mean {
        &self.mean
    }

    pub fn number_of_samples(&self) -> u64 {
        self.mean.number_of_samples()
    }

    pub fn sum(&self) -> f64 {
        self.mean.sum()
    }

    pub fn mean(&self) -> f64 {
        self.mean.mean()
    }

    pub fn max(&self) -> f64 {
        self.mean.max()
    }

    pub fn min(&self) -> f64 {
        self.mean.min()
    }

    pub fn variance(&self) -> f64 {
        let n = self.number_of_samples();
        if n < 2 {
            return 0.0;
        }
        let n = n as f64;
        (self.sum_sq - self.sum() * self.sum() / n) / (n - 1.0)
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Half-width of a confidence interval at `percent` (90, 95, or 99;
    /// anything else falls back to the 95% t-value, matching the
    /// reference).
    pub fn confidence(&self, percent: f64) -> f64 {
        let n = self.number_of_samples();
        if n < 2 {
            return 0.0;
        }
        let t = match percent {
            p if p == 90.0 => 1.645,
            p if p == 99.0 => 2.576,
            _ => 1.960,
        };
        t * self.std_dev() / (n as f64).sqrt()
    }

    /// `" sum_sq "` — appended after the [`Mean`] fields in the reference's
    /// save order.
    pub fn save_fields(&self) -> String {
        format!("{} {}", self.mean.save_fields(), self.sum_sq)
    }

    /// Parse fields in `[Mean fields..., sum_sq]` order starting at
    /// `parts[0]`. Returns the restored value and how many fields it
    /// consumed.
    pub fn restore_fields(parts: &[&str]) -> Option<(Variance, usize)> {
        let (mean, used) = Mean::restore_fields(parts)?;
        let sum_sq: f64 = parts.get(used)?.parse().ok()?;
        Some((Variance { mean, sum_sq }, used + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variance_matches_known_sample() {
        let mut v = Variance::new();
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            v.set_value(x);
        }
        assert!((v.variance() - 4.571428571428571).abs() < 1e-9);
    }

    #[test]
    fn variance_is_zero_below_two_samples() {
        let mut v = Variance::new();
        v.set_value(3.0);
        assert_eq!(v.variance(), 0.0);
        assert_eq!(v.confidence(95.0), 0.0);
    }

    #[test]
    fn round_trips_through_save_restore() {
        let mut v = Variance::new();
        for x in [1.0, 2.0, 3.0, 4.0] {
            v.set_value(x);
        }
        let saved = v.save_fields();
        let parts: Vec<&str> = saved.split_whitespace().collect();
        let (restored, used) = Variance::restore_fields(&parts).unwrap();
        assert_eq!(used, parts.len());
        assert_eq!(restored.save_fields(), saved);
    }
}
