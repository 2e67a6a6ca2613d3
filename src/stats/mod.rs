//! Stats module - trendline regression

mod regression;

pub use regression::{LinearFit, SIGNIFICANCE_THRESHOLD};
