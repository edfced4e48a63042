//! Running statistics, from a plain mean up through bounded histograms
//! and quantile estimation.
//!
//! The hierarchy is modeled by field composition rather than language
//! inheritance: `Variance` owns a `Mean`, `PrecisionHistogram` owns a
//! `Variance`, and so on, mirroring how this crate also flattens
//! `Process`/`Entity` (see [`crate::process`]).

mod histogram;
mod mean;
mod quantile;
mod simple_histogram;
mod time_variance;
mod variance;

pub use histogram::{Bucket, Histogram, MergeChoice, PrecisionHistogram};
pub use mean::Mean;
pub use quantile::Quantile;
pub use simple_histogram::{SimpleHistogram, WidthSpec};
pub use time_variance::TimeVariance;
pub use variance::Variance;
