//! Time-weighted variance: a step function sampled over simulated time.

use super::variance::Variance;

/// Tracks a value that changes at discrete instants and charges the area
/// under its step function as the Variance layer's samples, rather than
/// the raw values themselves.
#[derive(Debug, Clone, Copy)]
pub struct TimeVariance {
    variance: Variance,
    current_value: f64,
    start_time: f64,
}

impl Default for TimeVariance {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeVariance {
    pub fn new() -> Self {
        TimeVariance {
            variance: Variance::new(),
            current_value: 0.0,
            start_time: 0.0,
        }
    }

    pub fn variance_stat(&self) -> &Variance {
        &self.variance
    }

    fn area(&self, now: f64) -> f64 {
        self.current_value * (now - self.start_time)
    }

    /// Charge the area accumulated under the previous value since the
    /// last update, then begin tracking `value` from `now`.
    pub fn set_value(&mut self, value: f64, now: f64) {
        self.variance.set_value(self.area(now));
        self.current_value = value;
        self.start_time = now;
    }

    /// Charge the trailing segment without changing the tracked value.
    pub fn finalize(&mut self, now: f64) {
        self.variance.set_value(self.area(now));
        self.start_time = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charges_area_under_previous_value() {
        let mut tv = TimeVariance::new();
        tv.set_value(2.0, 0.0);
        tv.set_value(3.0, 5.0);
        assert_eq!(tv.variance_stat().sum(), 10.0);
        tv.finalize(8.0);
        assert_eq!(tv.variance_stat().sum(), 10.0 + 9.0);
    }
}
