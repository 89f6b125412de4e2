//! # Sabot evaluation - benchmark aggregation and result tables
//!
//! Turns the raw CSV written by the Sabot benchmark driver into condensed
//! per-experiment tables, then into the LaTeX bandwidth and round-trip-time
//! tables of the evaluation section.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Raw CSV   │────▶│  Aggregate  │────▶│ Condensed   │────▶│   Render    │
//! │ (per run)   │     │ (EXPID mean)│     │ CSV (x4)    │     │ _bw/_rt.tex │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sabot_eval::{aggregate, render, AggregateOptions, RenderOptions};
//! use std::path::Path;
//!
//! aggregate(Path::new("results.csv"), Path::new("out/run"), &AggregateOptions::default())?;
//! render(Path::new("out/run"), Path::new("paper/table"), &RenderOptions::default())?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`logs`] - Console logging
//! - [`models`] - Measurements, experiment ids, condensed rows
//! - [`parser`] - CSV reading and writing
//! - [`transform`] - Grouping and the raw aggregator
//! - [`render`] - LaTeX table rendering

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Aggregation
pub mod transform;

// Rendering
pub mod render;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AggregateError, AggregateResult, CsvError, CsvResult, RenderError, RenderResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    BandwidthCounter, BandwidthSummary, CondensedTable, ExperimentId, LatencyPhase,
    LatencySummary, Measurement, Variant,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    parse_measurements, read_bandwidth_table, read_latency_table, read_measurements,
    write_condensed,
};

// =============================================================================
// Re-exports - Aggregation
// =============================================================================

pub use transform::{
    aggregate, bandwidth_table, condense, filter_repetitions, group_by_experiment, inspect,
    inspect_json, latency_table, AggregateOptions, AggregateReport, CondensedTables,
    ExperimentGroup, DEFAULT_REPETITIONS,
};

// =============================================================================
// Re-exports - Rendering
// =============================================================================

pub use render::{
    render, render_bandwidth_table, render_latency_table, RenderOptions, RenderReport,
    NOTIFY_DIVISOR,
};
