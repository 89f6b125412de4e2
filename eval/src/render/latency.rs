//! Round-trip-time table.
//!
//! One block per database size, one row per (rate, variant) inside it.
//! Notification phases are shown once per block, averaged over the block,
//! in cells spanning every row.

use super::tex::{macro_call, multirow, power_of_two, qty, Unit};
use super::RenderOptions;
use crate::error::{RenderError, RenderResult};
use crate::models::{LatencyPhase, LatencySummary, Variant};

/// Number of (rate, variant) combinations in the experiment design.
///
/// Block-shared notify times are divided by this, not by the number of rows
/// actually present.
pub const NOTIFY_DIVISOR: f64 = 6.0;

const HEADER: &str = concat!(
    r"\scalebox{0.8}{%",
    "\n",
    r"\begin{tabularx}{0.86\textwidth}{rlcrrrrrrr}\toprule",
    r"& & Rate & S-Retrieval & S-Notify & R-GetNotify & R-Retrieval & R-Notify & S-GetNotify & \textbf{Total}\\",
    "\n",
    r"\midrule",
    "\n",
);

const FOOTER: &str = "\\end{tabularx}\n}";

/// Notify-phase times shared by every row of one `db_size` block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedNotify {
    pub send_notify: f64,
    pub recv_get_notified: f64,
    pub recv_notify: f64,
    pub send_get_notified: f64,
}

impl SharedNotify {
    /// Sum each phase over both variants at `db_size`, divided by [`NOTIFY_DIVISOR`].
    pub fn for_db_size(noauth: &[LatencySummary], auth: &[LatencySummary], db_size: u64) -> Self {
        let phase = |p: LatencyPhase| {
            let sum: f64 = noauth
                .iter()
                .chain(auth)
                .filter(|r| r.db_size == db_size)
                .map(|r| r.phase(p))
                .sum();
            sum / NOTIFY_DIVISOR
        };

        Self {
            send_notify: phase(LatencyPhase::SendNotify),
            recv_get_notified: phase(LatencyPhase::RecvGetNotified),
            recv_notify: phase(LatencyPhase::RecvNotify),
            send_get_notified: phase(LatencyPhase::SendGetNotified),
        }
    }
}

/// Render the complete round-trip-time table.
///
/// Database sizes and rates are taken from the authenticated table, both
/// ascending. Every (db_size, rate) must have a row in both tables.
pub fn render_latency_table(
    noauth: &[LatencySummary],
    auth: &[LatencySummary],
    options: &RenderOptions,
) -> RenderResult<String> {
    let db_sizes = sorted_unique(auth.iter().map(|r| r.db_size));
    let rates = sorted_unique(auth.iter().map(|r| r.rate));
    let span = rates.len() * Variant::ALL.len();

    let mut out = String::from(HEADER);

    for db_size in db_sizes {
        let shared = SharedNotify::for_db_size(noauth, auth, db_size);
        let send_cells = format!(
            "{} & {}",
            multirow(span, &qty(shared.send_notify, Unit::Second)),
            multirow(span, &qty(shared.recv_get_notified, Unit::Second)),
        );
        let recv_cells = format!(
            "{} & {}",
            multirow(span, &qty(shared.recv_notify, Unit::Second)),
            multirow(span, &qty(shared.send_get_notified, Unit::Second)),
        );

        let mut block = multirow(span, &power_of_two(db_size)?);
        let mut first = true;

        for &rate in &rates {
            for (variant, table) in [(Variant::NoAuth, noauth), (Variant::Auth, auth)] {
                let row = find_row(table, variant, db_size, rate)?;
                let total = row.send_pir + row.recv_pir + shared.send_notify + shared.recv_notify;
                // Spanning cells belong to the first row only
                let (send_notify, recv_notify) = if first {
                    (send_cells.as_str(), recv_cells.as_str())
                } else {
                    (" & ", " & ")
                };
                first = false;

                block.push_str(&format!(
                    " & {} & {} & {} & {} & {} & {} & \\textbf{{ {} }}\\\\\n",
                    macro_call(options.macro_name(variant)),
                    rate,
                    qty(row.send_pir, Unit::Second),
                    send_notify,
                    qty(row.recv_pir, Unit::Second),
                    recv_notify,
                    qty(total, Unit::Second),
                ));
            }
        }

        out.push_str(&block);
        out.push_str("\\midrule\n");
    }

    out.push_str(FOOTER);
    Ok(out)
}

/// First row in file order matching `db_size` and `rate`.
fn find_row<'a>(
    table: &'a [LatencySummary],
    variant: Variant,
    db_size: u64,
    rate: u64,
) -> RenderResult<&'a LatencySummary> {
    table
        .iter()
        .find(|r| r.db_size == db_size && r.rate == rate)
        .ok_or_else(|| RenderError::MissingMeasurement {
            variant: variant.to_string(),
            db_size,
            rate,
        })
}

fn sorted_unique(values: impl Iterator<Item = u64>) -> Vec<u64> {
    let mut out: Vec<u64> = values.collect();
    out.sort_unstable();
    out.dedup();
    out
}
