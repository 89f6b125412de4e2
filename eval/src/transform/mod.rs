//! Aggregation of raw measurements.
//!
//! - Grouper: repetitions to per-experiment means
//! - Pipeline: the raw aggregator writing condensed CSVs

pub mod grouper;
pub mod pipeline;

pub use grouper::{group_by_experiment, ExperimentGroup};
pub use pipeline::*;
