//! Group raw repetitions into experiments and average them.
//!
//! ```text
//! Raw rows (one per repetition)        →  Groups (one per EXPID)
//! ┌───────────────────────────────┐      ┌──────────────────────────┐
//! │ EXPID A, BW_Total 2.0, RT ... │      │ EXPID A, 2 reps          │
//! │ EXPID A, BW_Total 4.0, RT ... │  →   │ BW_Total 3.0, RT mean    │
//! │ EXPID B, BW_Total 8.0, RT ... │      ├──────────────────────────┤
//! └───────────────────────────────┘      │ EXPID B, 1 rep           │
//!                                        └──────────────────────────┘
//! ```
//!
//! Every derived column is the plain arithmetic mean over the rows sharing
//! an EXPID. Groups come out in EXPID order.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::models::{ExperimentId, LatencyPhase, Measurement, Variant};

/// Averaged measurements of one experiment configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentGroup {
    pub expid: ExperimentId,
    pub variant: Variant,
    pub multi_client: bool,
    pub key_length: u64,
    pub value_length: u64,
    pub num_threads: u64,
    /// Number of rows averaged.
    pub repetitions: usize,
    pub db_size: f64,
    pub rate: f64,
    /// Mean `BW_Total` (KiB).
    pub bw_total: f64,
    /// Mean per-phase latency (seconds), indexed by [`LatencyPhase`].
    #[serde(serialize_with = "serialize_latency")]
    pub latency: [f64; 6],
    /// Mean `RT_Total` (seconds).
    pub rt_total: f64,
}

impl ExperimentGroup {
    pub fn latency(&self, phase: LatencyPhase) -> f64 {
        self.latency[phase as usize]
    }

    /// Integer database size for condensed output.
    pub fn db_size_entries(&self) -> u64 {
        self.db_size.round() as u64
    }

    /// Integer request rate for condensed output.
    pub fn rate_requests(&self) -> u64 {
        self.rate.round() as u64
    }
}

fn serialize_latency<S: Serializer>(latency: &[f64; 6], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(latency.len()))?;
    for phase in LatencyPhase::ALL {
        map.serialize_entry(phase.column(), &latency[phase as usize])?;
    }
    map.end()
}

/// Group rows by [`ExperimentId`] and average each group.
pub fn group_by_experiment<'a, I>(rows: I) -> Vec<ExperimentGroup>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut groups: BTreeMap<ExperimentId, GroupBuilder> = BTreeMap::new();

    for row in rows {
        groups
            .entry(row.experiment_id())
            .or_insert_with(|| GroupBuilder::new(row))
            .add(row);
    }

    groups
        .into_iter()
        .map(|(expid, builder)| builder.build(expid))
        .collect()
}

/// Running sums for one experiment.
struct GroupBuilder {
    variant: Variant,
    multi_client: bool,
    key_length: u64,
    value_length: u64,
    num_threads: u64,
    count: usize,
    db_size: f64,
    rate: f64,
    bw_total: f64,
    latency: [f64; 6],
    rt_total: f64,
}

impl GroupBuilder {
    fn new(first: &Measurement) -> Self {
        Self {
            variant: first.variant(),
            multi_client: first.multi_client,
            key_length: first.key_length,
            value_length: first.value_length,
            num_threads: first.num_threads,
            count: 0,
            db_size: 0.0,
            rate: 0.0,
            bw_total: 0.0,
            latency: [0.0; 6],
            rt_total: 0.0,
        }
    }

    fn add(&mut self, row: &Measurement) {
        self.count += 1;
        self.db_size += row.db_size as f64;
        self.rate += row.rate as f64;
        self.bw_total += row.bandwidth_total_kib();
        for phase in LatencyPhase::ALL {
            self.latency[phase as usize] += row.latency_seconds(phase);
        }
        self.rt_total += row.latency_total_seconds();
    }

    fn build(self, expid: ExperimentId) -> ExperimentGroup {
        // A builder only exists once a row has been added
        let n = self.count as f64;
        ExperimentGroup {
            expid,
            variant: self.variant,
            multi_client: self.multi_client,
            key_length: self.key_length,
            value_length: self.value_length,
            num_threads: self.num_threads,
            repetitions: self.count,
            db_size: self.db_size / n,
            rate: self.rate / n,
            bw_total: self.bw_total / n,
            latency: self.latency.map(|sum| sum / n),
            rt_total: self.rt_total / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BandwidthCounter;

    fn row(db_size: u64, rate: u64, bw_bytes: f64, send_pir_us: f64) -> Measurement {
        let mut bandwidth = [0.0; 12];
        bandwidth[BandwidthCounter::RecvPirDown as usize] = bw_bytes;
        let mut latency = [0.0; 6];
        latency[LatencyPhase::SendPir as usize] = send_pir_us;
        Measurement {
            db_size,
            key_length: 32,
            value_length: 64,
            malicious: false,
            rate,
            multi_client: false,
            num_threads: 1,
            bandwidth,
            latency,
        }
    }

    #[test]
    fn test_mean_within_group() {
        let rows = vec![row(1024, 1, 2048.0, 1_000_000.0), row(1024, 1, 4096.0, 3_000_000.0)];
        let groups = group_by_experiment(&rows);

        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.repetitions, 2);
        assert_eq!(g.bw_total, 3.0);
        assert_eq!(g.latency(LatencyPhase::SendPir), 2.0);
        assert_eq!(g.rt_total, 2.0);
        assert_eq!(g.db_size_entries(), 1024);
        assert_eq!(g.rate_requests(), 1);
    }

    #[test]
    fn test_no_cross_group_leakage() {
        let rows = vec![
            row(1024, 1, 1024.0, 0.0),
            row(4096, 1, 8192.0, 0.0),
            row(1024, 1, 3072.0, 0.0),
            row(1024, 2, 102400.0, 0.0),
        ];
        let groups = group_by_experiment(&rows);
        assert_eq!(groups.len(), 3);

        let find = |db: f64, rate: f64| {
            groups
                .iter()
                .find(|g| g.db_size == db && g.rate == rate)
                .unwrap()
        };
        assert_eq!(find(1024.0, 1.0).bw_total, 2.0);
        assert_eq!(find(1024.0, 1.0).repetitions, 2);
        assert_eq!(find(4096.0, 1.0).bw_total, 8.0);
        assert_eq!(find(1024.0, 2.0).bw_total, 100.0);
    }

    #[test]
    fn test_groups_in_expid_order() {
        let rows = vec![row(4096, 1, 0.0, 0.0), row(1024, 1, 0.0, 0.0), row(2048, 1, 0.0, 0.0)];
        let groups = group_by_experiment(&rows);
        let ids: Vec<&str> = groups.iter().map(|g| g.expid.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_serialize_latency_by_column() {
        let rows = vec![row(1024, 1, 0.0, 500_000.0)];
        let groups = group_by_experiment(&rows);
        let json = serde_json::to_value(&groups[0]).unwrap();
        assert_eq!(json["latency"]["RT_SendPIR"], 0.5);
        assert_eq!(json["variant"], "NoAuth");
        assert_eq!(json["expid"], "10243264False1False1");
    }
}
