//! Table renderer: condensed CSVs → LaTeX tables.
//!
//! Reads `<prefix>_BW_{NoAuth,Auth}.csv` and `<prefix>_RT_Multi_{NoAuth,Auth}.csv`
//! and writes `<output>_bw.tex` and `<output>_rt.tex`.

pub mod bandwidth;
pub mod latency;
pub mod tex;

use std::path::{Path, PathBuf};

pub use bandwidth::render_bandwidth_table;
pub use latency::{render_latency_table, SharedNotify, NOTIFY_DIVISOR};

use crate::error::{RenderError, RenderResult};
use crate::logs::{log_info, log_success};
use crate::models::{prefixed_path, CondensedTable, Variant};
use crate::parser::{read_bandwidth_table, read_latency_table};

/// Default row label macro for the unauthenticated protocol.
pub const DEFAULT_NOAUTH_MACRO: &str = "hprot";

/// Default row label macro for the authenticated protocol.
pub const DEFAULT_AUTH_MACRO: &str = "mprot";

/// Options for the table renderer
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// LaTeX macro (without backslash) naming the no-auth variant
    pub noauth_macro: String,

    /// LaTeX macro (without backslash) naming the auth variant
    pub auth_macro: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            noauth_macro: DEFAULT_NOAUTH_MACRO.to_string(),
            auth_macro: DEFAULT_AUTH_MACRO.to_string(),
        }
    }
}

impl RenderOptions {
    pub fn macro_name(&self, variant: Variant) -> &str {
        match variant {
            Variant::NoAuth => &self.noauth_macro,
            Variant::Auth => &self.auth_macro,
        }
    }
}

/// Paths written by [`render`]
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub bandwidth: PathBuf,
    pub latency: PathBuf,
}

/// Read the condensed tables under `input_prefix` and write both `.tex` files.
pub fn render(
    input_prefix: &Path,
    output_prefix: &Path,
    options: &RenderOptions,
) -> RenderResult<RenderReport> {
    log_info(format!("📖 Reading condensed tables: {}_*.csv", input_prefix.display()));

    let bw_noauth = read_bandwidth_table(&CondensedTable::Bandwidth(Variant::NoAuth).path(input_prefix))?;
    let bw_auth = read_bandwidth_table(&CondensedTable::Bandwidth(Variant::Auth).path(input_prefix))?;
    let rt_noauth = read_latency_table(&CondensedTable::LatencyMulti(Variant::NoAuth).path(input_prefix))?;
    let rt_auth = read_latency_table(&CondensedTable::LatencyMulti(Variant::Auth).path(input_prefix))?;
    log_success(format!(
        "Bandwidth rows: {} / {}, round-trip rows: {} / {}",
        bw_noauth.len(),
        bw_auth.len(),
        rt_noauth.len(),
        rt_auth.len()
    ));

    let bandwidth_tex = render_bandwidth_table(&bw_noauth, &bw_auth, options);
    let latency_tex = render_latency_table(&rt_noauth, &rt_auth, options)?;

    let bandwidth = prefixed_path(output_prefix, "_bw.tex");
    let latency = prefixed_path(output_prefix, "_rt.tex");
    write_tex(&bandwidth, &bandwidth_tex)?;
    write_tex(&latency, &latency_tex)?;

    log_success(format!("💾 {}", bandwidth.display()));
    log_success(format!("💾 {}", latency.display()));

    Ok(RenderReport { bandwidth, latency })
}

fn write_tex(path: &Path, content: &str) -> RenderResult<()> {
    std::fs::write(path, content).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })
}
