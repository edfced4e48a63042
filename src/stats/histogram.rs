//! Precision and bounded histograms.

use super::variance::Variance;
use crate::diagnostics;

/// A single histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub name: f64,
    pub count: u64,
}

impl Bucket {
    pub fn size(&self) -> u64 {
        self.count
    }
}

/// Merge policy applied when a bounded [`Histogram`] is at capacity and a
/// new, never-seen value arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeChoice {
    /// Keep the higher bucket's name, combine counts.
    Accumulate = 0,
    /// Weighted average of names, combine counts.
    Mean = 1,
    /// Keep the higher bucket's name and count only.
    Max = 2,
    /// Keep the lower bucket's name and count only.
    Min = 3,
}

impl MergeChoice {
    fn from_id(id: u32) -> Option<MergeChoice> {
        match id {
            0 => Some(MergeChoice::Accumulate),
            1 => Some(MergeChoice::Mean),
            2 => Some(MergeChoice::Max),
            3 => Some(MergeChoice::Min),
            _ => None,
        }
    }
}

/// Unbounded histogram keeping one bucket per unique observed value,
/// ordered ascending by `name`.
#[derive(Debug, Clone)]
pub struct PrecisionHistogram {
    variance: Variance,
    buckets: Vec<Bucket>,
}

impl Default for PrecisionHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl PrecisionHistogram {
    pub fn new() -> Self {
        PrecisionHistogram {
            variance: Variance::new(),
            buckets: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.buckets.clear();
        self.variance.reset();
    }

    /// Build a histogram from already-known buckets without replaying them
    /// through [`PrecisionHistogram::set_value`]. Used by
    /// [`super::simple_histogram::SimpleHistogram`], whose serialization
    /// format carries no variance fields of its own — restoring must not
    /// fabricate variance data that was never saved.
    pub(crate) fn from_parts(variance: Variance, buckets: Vec<Bucket>) -> Self {
        PrecisionHistogram { variance, buckets }
    }

    pub fn variance_stat(&self) -> &Variance {
        &self.variance
    }

    pub fn number_of_samples(&self) -> u64 {
        self.variance.number_of_samples()
    }

    pub fn number_of_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn total_entries(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn is_present(&self, value: f64) -> bool {
        self.buckets.iter().any(|b| b.name == value)
    }

    fn insertion_point(&self, value: f64) -> usize {
        self.buckets
            .iter()
            .position(|b| b.name > value)
            .unwrap_or(self.buckets.len())
    }

    /// Create an empty bucket for `value` if it is not already present.
    pub fn create(&mut self, value: f64) {
        if self.is_present(value) {
            return;
        }
        let idx = self.insertion_point(value);
        self.buckets.insert(
            idx,
            Bucket {
                name: value,
                count: 0,
            },
        );
    }

    pub fn set_value(&mut self, value: f64) {
        self.variance.set_value(value);
        if let Some(b) = self.buckets.iter_mut().find(|b| b.name == value) {
            b.count += 1;
            return;
        }
        let idx = self.insertion_point(value);
        self.buckets.insert(
            idx,
            Bucket {
                name: value,
                count: 1,
            },
        );
    }

    pub fn size_by_name(&self, name: f64) -> Option<u64> {
        self.buckets.iter().find(|b| b.name == name).map(|b| b.count)
    }

    pub fn size_by_index(&self, index: usize) -> Option<u64> {
        self.buckets.get(index).map(|b| b.count)
    }

    pub fn bucket_name(&self, index: usize) -> Option<f64> {
        self.buckets.get(index).map(|b| b.name)
    }

    /// `" n_buckets (name count)... "` followed by the [`Variance`] fields.
    pub fn save_fields(&self) -> String {
        let mut out = format!(" {}", self.buckets.len());
        for b in &self.buckets {
            out.push_str(&format!(" {} {}", b.name, b.count));
        }
        out.push(' ');
        out.push_str(&self.variance.save_fields());
        out.push(' ');
        out
    }

    pub fn restore_fields(parts: &[&str]) -> Option<(PrecisionHistogram, usize)> {
        let n: usize = parts.first()?.parse().ok()?;
        let mut idx = 1;
        let mut buckets = Vec::with_capacity(n);
        for _ in 0..n {
            let name: f64 = parts.get(idx)?.parse().ok()?;
            let count: u64 = parts.get(idx + 1)?.parse().ok()?;
            buckets.push(Bucket { name, count });
            idx += 2;
        }
        let (variance, used) = Variance::restore_fields(&parts[idx..])?;
        idx += used;
        Some((PrecisionHistogram { variance, buckets }, idx))
    }
}

/// Bounded-capacity histogram that merges adjacent buckets when full.
#[derive(Debug, Clone)]
pub struct Histogram {
    inner: PrecisionHistogram,
    max_size: usize,
    merge: MergeChoice,
}

impl Histogram {
    pub fn new(max_buckets: usize, merge: MergeChoice) -> Self {
        Histogram {
            inner: PrecisionHistogram::new(),
            max_size: max_buckets.max(2),
            merge,
        }
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn precision(&self) -> &PrecisionHistogram {
        &self.inner
    }

    pub fn number_of_buckets(&self) -> usize {
        self.inner.number_of_buckets()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn merge_choice(&self) -> MergeChoice {
        self.merge
    }

    fn composite_name(&self, a: Bucket, b: Bucket) -> f64 {
        match self.merge {
            MergeChoice::Accumulate | MergeChoice::Max => b.name,
            MergeChoice::Mean => {
                let total = (a.size() + b.size()) as f64;
                if total == 0.0 {
                    (a.name + b.name) / 2.0
                } else {
                    (a.name * a.size() as f64 + b.name * b.size() as f64) / total
                }
            }
            MergeChoice::Min => a.name,
        }
    }

    fn composite_size(&self, a: Bucket, b: Bucket) -> u64 {
        match self.merge {
            MergeChoice::Accumulate | MergeChoice::Mean => a.size() + b.size(),
            MergeChoice::Max => b.size(),
            MergeChoice::Min => a.size(),
        }
    }

    fn merge_buckets(&mut self) {
        let old = std::mem::take(&mut self.inner.buckets);
        let mut merged = Vec::with_capacity(old.len() / 2 + 1);
        let mut i = 0;
        while i < old.len() {
            if i + 1 < old.len() {
                let a = old[i];
                let b = old[i + 1];
                merged.push(Bucket {
                    name: self.composite_name(a, b),
                    count: self.composite_size(a, b),
                });
                i += 2;
            } else {
                merged.push(old[i]);
                i += 1;
            }
        }
        self.inner.buckets = merged;
    }

    pub fn set_value(&mut self, value: f64) {
        if self.inner.number_of_buckets() == self.max_size && !self.inner.is_present(value) {
            self.merge_buckets();
        }
        self.inner.set_value(value);
    }

    /// `" max_size merge_id "` followed by the [`PrecisionHistogram`] fields.
    pub fn save_fields(&self) -> String {
        format!(
            " {} {}{}",
            self.max_size,
            self.merge as u32,
            self.inner.save_fields()
        )
    }

    pub fn restore_fields(parts: &[&str]) -> Option<(Histogram, usize)> {
        let max_size: usize = parts.first()?.parse().ok()?;
        let merge_id: u32 = parts.get(1)?.parse().ok()?;
        let merge = MergeChoice::from_id(merge_id).or_else(|| {
            diagnostics::serialization_failed("Histogram::restore_fields", "unknown merge id");
            None
        })?;
        let (inner, used) = PrecisionHistogram::restore_fields(&parts[2..])?;
        Some((
            Histogram {
                inner,
                max_size,
                merge,
            },
            2 + used,
        ))
    }
}
