//! Running mean, with the reference implementation's `min`/`max` defect
//! reproduced intentionally for checkpoint compatibility.

use crate::diagnostics;

/// Smallest positive 32-bit float, used as the initial `min` sentinel.
/// Because no observed sample is ever smaller than this, `min` never
/// updates away from it in practice — a faithfully reproduced defect of
/// the reference implementation this crate is ported from.
const CPP_FLOAT_MIN: f64 = 1.175_494_350_822_287_5e-38;
/// Largest 32-bit float, used as the initial `max` sentinel, with the
/// same never-updates-in-practice defect.
const CPP_FLOAT_MAX: f64 = 3.402_823_466_385_288_6e38;

/// A running sample mean.
#[derive(Debug, Clone, Copy)]
pub struct Mean {
    max: f64,
    min: f64,
    sum: f64,
    mean: f64,
    number: u64,
}

impl Default for Mean {
    fn default() -> Self {
        Self::new()
    }
}

impl Mean {
    pub fn new() -> Self {
        Mean {
            max: CPP_FLOAT_MAX,
            min: CPP_FLOAT_MIN,
            sum: 0.0,
            mean: 0.0,
            number: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn set_value(&mut self, value: f64) {
        if value > self.max {
            self.max = value;
        }
        if value < self.min {
            self.min = value;
        }
        self.sum += value;
        self.number += 1;
        self.mean = self.sum / self.number as f64;
    }

    pub fn number_of_samples(&self) -> u64 {
        self.number
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    /// `" max min sum mean n "`.
    pub fn save_fields(&self) -> String {
        format!(
            " {} {} {} {} {} ",
            self.max, self.min, self.sum, self.mean, self.number
        )
    }

    /// Parse the fields written by [`Mean::save_fields`], in order,
    /// advancing `parts`. Returns `false` (without mutating `self`) on any
    /// parse failure.
    pub fn restore_fields(parts: &[&str]) -> Option<(Mean, usize)> {
        if parts.len() < 5 {
            diagnostics::serialization_failed("Mean::restore_fields", "not enough fields");
            return None;
        }
        let max: f64 = parts[0].parse().ok()?;
        let min: f64 = parts[1].parse().ok()?;
        let sum: f64 = parts[2].parse().ok()?;
        let mean: f64 = parts[3].parse().ok()?;
        let number: u64 = parts[4].parse().ok()?;
        Some((
            Mean {
                max,
                min,
                sum,
                mean,
                number,
            },
            5,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_updates_incrementally() {
        let mut m = Mean::new();
        m.set_value(1.0);
        m.set_value(2.0);
        m.set_value(3.0);
        assert_eq!(m.number_of_samples(), 3);
        assert_eq!(m.sum(), 6.0);
        assert_eq!(m.mean(), 2.0);
    }

    #[test]
    fn min_max_sentinels_never_move_in_practice() {
        let mut m = Mean::new();
        m.set_value(1_000_000.0);
        m.set_value(-1_000_000.0);
        assert_eq!(m.max(), CPP_FLOAT_MAX);
        assert_eq!(m.min(), CPP_FLOAT_MIN);
    }

    #[test]
    fn round_trips_through_save_restore() {
        let mut m = Mean::new();
        m.set_value(4.0);
        m.set_value(5.0);
        let saved = m.save_fields();
        let parts: Vec<&str> = saved.split_whitespace().collect();
        let (restored, consumed) = Mean::restore_fields(&parts).unwrap();
        assert_eq!(consumed, 5);
        assert_eq!(restored.save_fields(), saved);
    }
}
