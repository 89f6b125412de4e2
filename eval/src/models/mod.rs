//! Domain models for the evaluation pipeline.
//!
//! - [`Measurement`] - One raw benchmark run (one CSV row)
//! - [`BandwidthCounter`] / [`LatencyPhase`] - The measured counters
//! - [`ExperimentId`] - Key shared by repetitions of one configuration
//! - [`Variant`] - Protocol variant (no authentication / authenticated)
//! - [`CondensedTable`] - The condensed CSV files and their names
//! - [`BandwidthSummary`] / [`LatencySummary`] - Condensed rows

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Bytes per kibibyte.
pub const BYTES_PER_KIB: f64 = 1024.0;

/// Microseconds per second.
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

// =============================================================================
// Counters
// =============================================================================

/// Bandwidth counters recorded by the benchmark driver (bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandwidthCounter {
    SendPirUp,
    SendPirDown,
    SendNotifyUp,
    SendNotifyDown,
    RecvGetNotifiedUp,
    RecvGetNotifiedDown,
    RecvPirUp,
    RecvPirDown,
    RecvNotifyUp,
    RecvNotifyDown,
    SendGetNotifiedUp,
    SendGetNotifiedDown,
}

impl BandwidthCounter {
    /// All counters, in raw CSV column order.
    pub const ALL: [Self; 12] = [
        Self::SendPirUp,
        Self::SendPirDown,
        Self::SendNotifyUp,
        Self::SendNotifyDown,
        Self::RecvGetNotifiedUp,
        Self::RecvGetNotifiedDown,
        Self::RecvPirUp,
        Self::RecvPirDown,
        Self::RecvNotifyUp,
        Self::RecvNotifyDown,
        Self::SendGetNotifiedUp,
        Self::SendGetNotifiedDown,
    ];

    /// Terms summed into `BW_Total`.
    ///
    /// `SendGetNotifiedDown` is counted twice, as in the published tables.
    pub const TOTAL_TERMS: [Self; 13] = [
        Self::SendGetNotifiedDown,
        Self::SendPirUp,
        Self::SendPirDown,
        Self::SendNotifyUp,
        Self::SendNotifyDown,
        Self::RecvGetNotifiedUp,
        Self::RecvGetNotifiedDown,
        Self::RecvPirUp,
        Self::RecvPirDown,
        Self::RecvNotifyUp,
        Self::RecvNotifyDown,
        Self::SendGetNotifiedUp,
        Self::SendGetNotifiedDown,
    ];

    /// Raw CSV column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::SendPirUp => "BW_SendPIRUp",
            Self::SendPirDown => "BW_SendPIRDown",
            Self::SendNotifyUp => "BW_SendNotifyUp",
            Self::SendNotifyDown => "BW_SendNotifyDown",
            Self::RecvGetNotifiedUp => "BW_RecvGetNotifiedUp",
            Self::RecvGetNotifiedDown => "BW_RecvGetNotifiedDown",
            Self::RecvPirUp => "BW_RecvPIRUp",
            Self::RecvPirDown => "BW_RecvPIRDown",
            Self::RecvNotifyUp => "BW_RecvNotifyUp",
            Self::RecvNotifyDown => "BW_RecvNotifyDown",
            Self::SendGetNotifiedUp => "BW_SendGetNotifiedUp",
            Self::SendGetNotifiedDown => "BW_SendGetNotifiedDown",
        }
    }
}

/// Protocol phases timed by the benchmark driver (microseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatencyPhase {
    SendPir,
    SendNotify,
    RecvGetNotified,
    RecvPir,
    RecvNotify,
    SendGetNotified,
}

impl LatencyPhase {
    /// All phases, in raw CSV column order.
    pub const ALL: [Self; 6] = [
        Self::SendPir,
        Self::SendNotify,
        Self::RecvGetNotified,
        Self::RecvPir,
        Self::RecvNotify,
        Self::SendGetNotified,
    ];

    /// CSV column name (same in raw and condensed tables).
    pub fn column(self) -> &'static str {
        match self {
            Self::SendPir => "RT_SendPIR",
            Self::SendNotify => "RT_SendNotify",
            Self::RecvGetNotified => "RT_RecvGetNotified",
            Self::RecvPir => "RT_RecvPIR",
            Self::RecvNotify => "RT_RecvNotify",
            Self::SendGetNotified => "RT_SendGetNotified",
        }
    }
}

// =============================================================================
// Raw Measurement
// =============================================================================

/// Configuration columns of the raw CSV.
pub const CONFIG_COLUMNS: [&str; 7] = [
    "db_size",
    "key_length",
    "value_length",
    "malicious",
    "rate",
    "multi_client",
    "num_threads",
];

/// One benchmark repetition as written by the benchmark driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Database size in entries.
    pub db_size: u64,
    pub key_length: u64,
    pub value_length: u64,
    /// Authenticated (malicious-secure) protocol variant.
    pub malicious: bool,
    /// Client request rate.
    pub rate: u64,
    pub multi_client: bool,
    pub num_threads: u64,
    /// Bytes, indexed by [`BandwidthCounter`].
    pub bandwidth: [f64; 12],
    /// Microseconds, indexed by [`LatencyPhase`].
    pub latency: [f64; 6],
}

impl Measurement {
    /// Every column the raw CSV must carry.
    pub fn required_columns() -> Vec<&'static str> {
        CONFIG_COLUMNS
            .iter()
            .copied()
            .chain(BandwidthCounter::ALL.iter().map(|c| c.column()))
            .chain(LatencyPhase::ALL.iter().map(|p| p.column()))
            .collect()
    }

    pub fn experiment_id(&self) -> ExperimentId {
        ExperimentId::from_measurement(self)
    }

    pub fn variant(&self) -> Variant {
        Variant::from_malicious(self.malicious)
    }

    /// Raw byte count of one counter.
    pub fn counter(&self, counter: BandwidthCounter) -> f64 {
        self.bandwidth[counter as usize]
    }

    /// `BW_Total` in kibibytes.
    pub fn bandwidth_total_kib(&self) -> f64 {
        let bytes: f64 = BandwidthCounter::TOTAL_TERMS
            .iter()
            .map(|&c| self.counter(c))
            .sum();
        bytes / BYTES_PER_KIB
    }

    /// One phase's latency in seconds.
    pub fn latency_seconds(&self, phase: LatencyPhase) -> f64 {
        self.latency[phase as usize] / MICROS_PER_SECOND
    }

    /// `RT_Total` in seconds.
    pub fn latency_total_seconds(&self) -> f64 {
        let micros: f64 = self.latency.iter().sum();
        micros / MICROS_PER_SECOND
    }
}

// =============================================================================
// Experiment Identity
// =============================================================================

/// Concatenation of the configuration columns of a row.
///
/// Rows with equal ids are repetitions of the same experiment. Booleans are
/// spelled `True`/`False` so ids match the ones in earlier result tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ExperimentId(String);

impl ExperimentId {
    pub fn from_measurement(m: &Measurement) -> Self {
        Self(format!(
            "{}{}{}{}{}{}{}",
            m.db_size,
            m.key_length,
            m.value_length,
            title_bool(m.malicious),
            m.rate,
            title_bool(m.multi_client),
            m.num_threads,
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn title_bool(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

// =============================================================================
// Variants and Tables
// =============================================================================

/// Protocol variant under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Variant {
    /// Honest-but-curious protocol without authentication.
    NoAuth,
    /// Authenticated, malicious-secure protocol.
    Auth,
}

impl Variant {
    pub const ALL: [Self; 2] = [Self::NoAuth, Self::Auth];

    pub fn from_malicious(malicious: bool) -> Self {
        if malicious {
            Self::Auth
        } else {
            Self::NoAuth
        }
    }

    /// Name used in condensed file suffixes.
    pub fn label(self) -> &'static str {
        match self {
            Self::NoAuth => "NoAuth",
            Self::Auth => "Auth",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Condensed CSV tables produced by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondensedTable {
    /// Single-client normalized bandwidth.
    Bandwidth(Variant),
    /// Multi-client round-trip times.
    LatencyMulti(Variant),
    /// Single-client round-trip times at rate 1 (diagnostic).
    LatencySingle(Variant),
}

impl CondensedTable {
    /// File name suffix appended to the output prefix.
    pub fn suffix(self) -> String {
        match self {
            Self::Bandwidth(v) => format!("_BW_{}.csv", v.label()),
            Self::LatencyMulti(v) => format!("_RT_Multi_{}.csv", v.label()),
            Self::LatencySingle(v) => format!("_RT_Single_{}.csv", v.label()),
        }
    }

    pub fn path(self, prefix: &Path) -> PathBuf {
        prefixed_path(prefix, &self.suffix())
    }
}

/// Append `suffix` to `prefix` verbatim (no path separator in between).
pub fn prefixed_path(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

// =============================================================================
// Condensed Rows
// =============================================================================

/// One experiment in a condensed bandwidth table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandwidthSummary {
    #[serde(rename = "EXPID", default)]
    pub expid: String,
    pub db_size: u64,
    pub rate: u64,
    /// Mean total bandwidth (KiB).
    #[serde(rename = "BW_Total", default)]
    pub bw_total: f64,
    /// Mean total bandwidth per request (KiB).
    #[serde(rename = "BW_Total_Norm")]
    pub bw_total_norm: f64,
}

impl BandwidthSummary {
    pub const HEADERS: [&'static str; 5] = ["EXPID", "db_size", "rate", "BW_Total", "BW_Total_Norm"];

    /// Columns the renderer relies on.
    pub const REQUIRED: [&'static str; 3] = ["db_size", "rate", "BW_Total_Norm"];

    /// Formatted CSV record: integers bare, quantities with two decimals.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.expid.clone(),
            self.db_size.to_string(),
            self.rate.to_string(),
            format!("{:.2}", self.bw_total),
            format!("{:.2}", self.bw_total_norm),
        ]
    }
}

/// One experiment in a condensed round-trip-time table (seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    #[serde(rename = "EXPID", default)]
    pub expid: String,
    pub db_size: u64,
    pub rate: u64,
    #[serde(rename = "RT_SendPIR")]
    pub send_pir: f64,
    #[serde(rename = "RT_SendNotify")]
    pub send_notify: f64,
    #[serde(rename = "RT_RecvGetNotified")]
    pub recv_get_notified: f64,
    #[serde(rename = "RT_RecvPIR")]
    pub recv_pir: f64,
    #[serde(rename = "RT_RecvNotify")]
    pub recv_notify: f64,
    #[serde(rename = "RT_SendGetNotified")]
    pub send_get_notified: f64,
    #[serde(rename = "RT_Total", default)]
    pub total: f64,
}

impl LatencySummary {
    pub const HEADERS: [&'static str; 10] = [
        "EXPID",
        "db_size",
        "rate",
        "RT_SendPIR",
        "RT_SendNotify",
        "RT_RecvGetNotified",
        "RT_RecvPIR",
        "RT_RecvNotify",
        "RT_SendGetNotified",
        "RT_Total",
    ];

    /// Columns the renderer relies on.
    pub const REQUIRED: [&'static str; 8] = [
        "db_size",
        "rate",
        "RT_SendPIR",
        "RT_SendNotify",
        "RT_RecvGetNotified",
        "RT_RecvPIR",
        "RT_RecvNotify",
        "RT_SendGetNotified",
    ];

    pub fn phase(&self, phase: LatencyPhase) -> f64 {
        match phase {
            LatencyPhase::SendPir => self.send_pir,
            LatencyPhase::SendNotify => self.send_notify,
            LatencyPhase::RecvGetNotified => self.recv_get_notified,
            LatencyPhase::RecvPir => self.recv_pir,
            LatencyPhase::RecvNotify => self.recv_notify,
            LatencyPhase::SendGetNotified => self.send_get_notified,
        }
    }

    /// Formatted CSV record: integers bare, quantities with two decimals.
    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![self.expid.clone(), self.db_size.to_string(), self.rate.to_string()];
        record.extend(LatencyPhase::ALL.iter().map(|&p| format!("{:.2}", self.phase(p))));
        record.push(format!("{:.2}", self.total));
        record
    }
}
