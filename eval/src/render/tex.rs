//! LaTeX building blocks shared by the bandwidth and round-trip tables.
//!
//! Output targets `siunitx` (`\qty`), `multirow` and `booktabs`.

use crate::error::{RenderError, RenderResult};

/// Physical unit of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Kibibyte,
    Second,
}

impl Unit {
    /// `siunitx` unit macro.
    pub fn latex(self) -> &'static str {
        match self {
            Self::Kibibyte => r"\kibi\byte",
            Self::Second => r"\second",
        }
    }
}

/// `\qty{value}{unit}` with two decimals.
pub fn qty(value: f64, unit: Unit) -> String {
    format!(r"\qty{{{:.2}}}{{{}}}", value, unit.latex())
}

/// `\multirow{rows}{*}{content}`.
pub fn multirow(rows: usize, content: &str) -> String {
    format!(r"\multirow{{{}}}{{*}}{{{}}}", rows, content)
}

/// Call of a zero-argument macro: `\name{}`.
pub fn macro_call(name: &str) -> String {
    format!(r"\{}{{}}", name)
}

/// `$2^{k}$` with `k = floor(log2(db_size))`.
pub fn power_of_two(db_size: u64) -> RenderResult<String> {
    if db_size == 0 {
        return Err(RenderError::InvalidDbSize(db_size));
    }
    Ok(format!("$2^{{{}}}$", db_size.ilog2()))
}
