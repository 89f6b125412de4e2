//! Error types for the evaluation pipeline.
//!
//! - [`CsvError`] - reading and writing CSV files, schema checks
//! - [`AggregateError`] - raw measurement aggregation
//! - [`RenderError`] - LaTeX table rendering
//!
//! Lower-level errors convert into the stage errors via `From`,
//! so `?` works across module boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading or writing CSV files.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to open an input file.
    #[error("Cannot open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create an output file.
    #[error("Cannot create '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Low-level CSV reader/writer failure.
    #[error("Invalid CSV format: {0}")]
    Format(#[from] csv::Error),

    /// Flushing buffered output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Required columns absent from the header row.
    #[error("'{path}' is missing required columns: {}", columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    /// A cell could not be parsed as the column's type.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
        message: String,
    },
}

// =============================================================================
// Aggregation Errors
// =============================================================================

/// Errors from the raw aggregator.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// CSV input or output failure.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Normalizing bandwidth by request rate would divide by zero.
    #[error("Experiment '{expid}' has rate 0, cannot normalize bandwidth per request")]
    ZeroRate { expid: String },

    /// A repetition bound of zero would discard every row.
    #[error("Repetition count must be at least 1")]
    InvalidRepetitions,

    /// JSON serialization of an inspection report.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors from the table renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// CSV input failure.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// The round-trip table needs a row that is not in the condensed table.
    #[error("No {variant} measurement for db_size {db_size} at rate {rate}")]
    MissingMeasurement {
        variant: String,
        db_size: u64,
        rate: u64,
    },

    /// A database size of zero has no power-of-two label.
    #[error("Invalid database size {0}: expected a positive number of entries")]
    InvalidDbSize(u64),

    /// Writing a rendered table failed.
    #[error("Cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for aggregation.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;
