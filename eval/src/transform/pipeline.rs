//! Raw aggregator: raw benchmark CSV → condensed per-experiment CSVs.
//!
//! # Steps
//!
//! 1. Drop rows whose `rate` exceeds `repetitions - 1`
//! 2. Partition by protocol variant × single/multi client
//! 3. Group each partition by EXPID and average
//! 4. Single-client partitions → normalized bandwidth tables
//! 5. Multi-client partitions → round-trip-time tables
//! 6. Write `<prefix>_BW_{NoAuth,Auth}.csv` and `<prefix>_RT_Multi_{NoAuth,Auth}.csv`
//!
//! Single-client round-trip times at rate 1 are computed as a diagnostic and
//! only written when [`AggregateOptions::write_single_client`] is set.
//!
//! # Example
//!
//! ```rust,ignore
//! use sabot_eval::{aggregate, AggregateOptions};
//! use std::path::Path;
//!
//! let report = aggregate(
//!     Path::new("results.csv"),
//!     Path::new("out/run1"),
//!     &AggregateOptions::default(),
//! )?;
//! println!("Wrote {} tables", report.written.len());
//! ```

use std::path::{Path, PathBuf};

use super::grouper::{group_by_experiment, ExperimentGroup};
use crate::error::{AggregateError, AggregateResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{BandwidthSummary, CondensedTable, LatencyPhase, LatencySummary, Measurement, Variant};
use crate::parser::{read_measurements, write_condensed};

/// Repetitions per configuration run by the benchmark driver.
pub const DEFAULT_REPETITIONS: u32 = 20;

/// Options for the raw aggregator
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Keep rows with `rate <= repetitions - 1`
    pub repetitions: u32,

    /// Also write the single-client round-trip-time tables
    pub write_single_client: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            repetitions: DEFAULT_REPETITIONS,
            write_single_client: false,
        }
    }
}

/// Condensed tables of one aggregation run, indexed by [`Variant`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CondensedTables {
    bandwidth: [Vec<BandwidthSummary>; 2],
    latency_multi: [Vec<LatencySummary>; 2],
    latency_single: [Vec<LatencySummary>; 2],
}

impl CondensedTables {
    pub fn bandwidth(&self, variant: Variant) -> &[BandwidthSummary] {
        &self.bandwidth[variant as usize]
    }

    pub fn latency_multi(&self, variant: Variant) -> &[LatencySummary] {
        &self.latency_multi[variant as usize]
    }

    pub fn latency_single(&self, variant: Variant) -> &[LatencySummary] {
        &self.latency_single[variant as usize]
    }
}

/// Result of [`aggregate`]
#[derive(Debug, Clone)]
pub struct AggregateReport {
    /// Rows read from the raw CSV
    pub input_rows: usize,

    /// Rows left after the repetition filter
    pub kept_rows: usize,

    /// The condensed tables
    pub tables: CondensedTables,

    /// Files written, in write order
    pub written: Vec<PathBuf>,
}

/// Run the raw aggregator on a file and write the condensed CSVs.
pub fn aggregate(
    input: &Path,
    output_prefix: &Path,
    options: &AggregateOptions,
) -> AggregateResult<AggregateReport> {
    if options.repetitions == 0 {
        return Err(AggregateError::InvalidRepetitions);
    }

    log_info(format!("📖 Reading raw measurements: {}", input.display()));
    let rows = read_measurements(input)?;
    log_success(format!("Read {} rows", rows.len()));

    let input_rows = rows.len();
    let kept = filter_repetitions(rows, options.repetitions);
    let dropped = input_rows - kept.len();
    if dropped > 0 {
        log_info(format!(
            "Dropped {} rows with rate above {}",
            dropped,
            options.repetitions - 1
        ));
    }

    let tables = condense(&kept)?;

    let mut written = Vec::new();
    for variant in Variant::ALL {
        let path = CondensedTable::Bandwidth(variant).path(output_prefix);
        write_bandwidth(&path, tables.bandwidth(variant))?;
        written.push(path);
    }
    for variant in Variant::ALL {
        let path = CondensedTable::LatencyMulti(variant).path(output_prefix);
        write_latency(&path, tables.latency_multi(variant))?;
        written.push(path);
    }
    if options.write_single_client {
        for variant in Variant::ALL {
            let path = CondensedTable::LatencySingle(variant).path(output_prefix);
            write_latency(&path, tables.latency_single(variant))?;
            written.push(path);
        }
    }

    for path in &written {
        log_success(format!("💾 {}", path.display()));
    }

    Ok(AggregateReport {
        input_rows,
        kept_rows: kept.len(),
        tables,
        written,
    })
}

/// Keep the rows with `rate <= repetitions - 1`, whatever their configuration.
pub fn filter_repetitions(rows: Vec<Measurement>, repetitions: u32) -> Vec<Measurement> {
    rows.into_iter()
        .filter(|m| m.rate < u64::from(repetitions))
        .collect()
}

/// Build every condensed table from already-filtered rows.
pub fn condense(rows: &[Measurement]) -> AggregateResult<CondensedTables> {
    let mut tables = CondensedTables::default();

    for variant in Variant::ALL {
        let single: Vec<&Measurement> = partition(rows, variant, false).collect();
        let multi: Vec<&Measurement> = partition(rows, variant, true).collect();
        log_info(format!(
            "{}: {} single-client rows, {} multi-client rows",
            variant,
            single.len(),
            multi.len()
        ));

        let bandwidth = bandwidth_table(single.iter().copied())?;
        log_table(&format!("Bandwidth (KiB per request) / {}", variant), bandwidth.len());
        for row in &bandwidth {
            log_info_indent(
                format!("db_size {:>8}  rate {:>3}  {:.2} KiB", row.db_size, row.rate, row.bw_total_norm),
                1,
            );
        }

        let latency_multi = latency_table(multi.iter().copied());
        log_table(&format!("Round trip (s) / multi-client / {}", variant), latency_multi.len());

        let latency_single = latency_table(single.iter().copied().filter(|m| m.rate == 1));
        log_table(&format!("Round trip (s) / single-client rate 1 / {}", variant), latency_single.len());
        for row in &latency_single {
            log_info_indent(
                format!("db_size {:>8}  {}", row.db_size, phase_summary(row)),
                1,
            );
        }

        tables.bandwidth[variant as usize] = bandwidth;
        tables.latency_multi[variant as usize] = latency_multi;
        tables.latency_single[variant as usize] = latency_single;
    }

    Ok(tables)
}

/// Group a raw CSV by experiment without writing anything.
///
/// With `repetitions`, the same rate filter as [`aggregate`] is applied first.
pub fn inspect(input: &Path, repetitions: Option<u32>) -> AggregateResult<Vec<ExperimentGroup>> {
    let mut rows = read_measurements(input)?;
    if let Some(reps) = repetitions {
        if reps == 0 {
            return Err(AggregateError::InvalidRepetitions);
        }
        rows = filter_repetitions(rows, reps);
    }
    let groups = group_by_experiment(&rows);
    log_success(format!("{} rows in {} experiments", rows.len(), groups.len()));
    Ok(groups)
}

/// [`inspect`] rendered as pretty JSON.
pub fn inspect_json(input: &Path, repetitions: Option<u32>) -> AggregateResult<String> {
    let groups = inspect(input, repetitions)?;
    Ok(serde_json::to_string_pretty(&groups)?)
}

fn partition(
    rows: &[Measurement],
    variant: Variant,
    multi_client: bool,
) -> impl Iterator<Item = &Measurement> {
    rows.iter()
        .filter(move |m| m.variant() == variant && m.multi_client == multi_client)
}

/// Normalized bandwidth per experiment, sorted by (`db_size`, `rate`).
pub fn bandwidth_table<'a, I>(rows: I) -> AggregateResult<Vec<BandwidthSummary>>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut groups = group_by_experiment(rows);
    // Stable: ties keep EXPID order
    groups.sort_by(|a, b| {
        a.db_size
            .total_cmp(&b.db_size)
            .then(a.rate.total_cmp(&b.rate))
    });

    groups.iter().map(bandwidth_summary).collect()
}

fn bandwidth_summary(group: &ExperimentGroup) -> AggregateResult<BandwidthSummary> {
    if group.rate == 0.0 {
        return Err(AggregateError::ZeroRate {
            expid: group.expid.to_string(),
        });
    }
    Ok(BandwidthSummary {
        expid: group.expid.to_string(),
        db_size: group.db_size_entries(),
        rate: group.rate_requests(),
        bw_total: group.bw_total,
        bw_total_norm: group.bw_total / group.rate,
    })
}

/// Mean round-trip times per experiment, sorted by `db_size`.
pub fn latency_table<'a, I>(rows: I) -> Vec<LatencySummary>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut groups = group_by_experiment(rows);
    groups.sort_by(|a, b| a.db_size.total_cmp(&b.db_size));

    groups
        .iter()
        .map(|g| LatencySummary {
            expid: g.expid.to_string(),
            db_size: g.db_size_entries(),
            rate: g.rate_requests(),
            send_pir: g.latency(LatencyPhase::SendPir),
            send_notify: g.latency(LatencyPhase::SendNotify),
            recv_get_notified: g.latency(LatencyPhase::RecvGetNotified),
            recv_pir: g.latency(LatencyPhase::RecvPir),
            recv_notify: g.latency(LatencyPhase::RecvNotify),
            send_get_notified: g.latency(LatencyPhase::SendGetNotified),
            total: g.rt_total,
        })
        .collect()
}

fn write_bandwidth(path: &Path, rows: &[BandwidthSummary]) -> AggregateResult<()> {
    write_condensed(path, &BandwidthSummary::HEADERS, rows.iter().map(|r| r.to_record()))?;
    Ok(())
}

fn write_latency(path: &Path, rows: &[LatencySummary]) -> AggregateResult<()> {
    write_condensed(path, &LatencySummary::HEADERS, rows.iter().map(|r| r.to_record()))?;
    Ok(())
}

fn log_table(title: &str, len: usize) {
    if len == 0 {
        log_warning(format!("{}: no experiments", title));
    } else {
        log_success(format!("{}: {} experiments", title, len));
    }
}

fn phase_summary(row: &LatencySummary) -> String {
    LatencyPhase::ALL
        .iter()
        .map(|&p| format!("{} {:.2}", p.column(), row.phase(p)))
        .collect::<Vec<_>>()
        .join("  ")
}
