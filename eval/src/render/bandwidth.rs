//! Normalized bandwidth table.
//!
//! One row per (variant, rate): the per-request bandwidth for every database
//! size, followed by fixed rows for the systems we compare against.

use super::tex::{macro_call, qty, Unit};
use super::RenderOptions;
use crate::models::{BandwidthSummary, Variant};

const HEADER: &str = concat!(
    r"\scalebox{0.8}{%",
    "\n",
    r"\begin{tabularx}{0.65\textwidth}{lrrrrr}\\\toprule",
    "\n",
    r"& \multicolumn{5}{c}{Number of clients}\\",
    "\n",
    r"& $2^{10}$ & $2^{12}$ & $2^{14}$ & $2^{16}$ & $2^{18}$\\\midrule",
    "\n",
);

/// Published figures of related systems, reproduced verbatim.
pub const REFERENCE_ROWS: [&str; 3] = [
    r"Alpenhorn       & \qty{7.08}{\mebi\byte} & \qty{7.17}{\mebi\byte}& \qty{7.53}{\mebi\byte}& \qty{8.97}{\mebi\byte}& \qty{14.10}{\mebi\byte}\\\addlinespace",
    r"Pudding w/o Nym & \qty{125.57}{\kibi\byte} & \qty{125.57}{\kibi\byte}         & \qty{125.57}{\kibi\byte}         & \qty{125.57}{\kibi\byte}         &\qty{125.57}{\kibi\byte}\\",
    r"Pudding w/ Nym  & \qty{6.99}{\mebi\byte} & \qty{6.99}{\mebi\byte} & \qty{6.99}{\mebi\byte} & \qty{6.99}{\mebi\byte}      & \qty{6.99}{\mebi\byte}\\\bottomrule",
];

const FOOTER: &str = "\\end{tabularx}\n}";

/// Render the complete bandwidth table.
pub fn render_bandwidth_table(
    noauth: &[BandwidthSummary],
    auth: &[BandwidthSummary],
    options: &RenderOptions,
) -> String {
    let mut out = String::from(HEADER);

    out.push_str(&variant_rows(noauth, options.macro_name(Variant::NoAuth)));
    out.push_str("\\addlinespace\n");
    out.push_str(&variant_rows(auth, options.macro_name(Variant::Auth)));
    out.push_str("\\addlinespace\n");

    for row in REFERENCE_ROWS {
        out.push_str(row);
        out.push('\n');
    }
    out.push_str(FOOTER);
    out
}

/// One line per rate, rates in order of first appearance.
fn variant_rows(rows: &[BandwidthSummary], macro_name: &str) -> String {
    let mut out = String::new();

    for rate in rates_in_file_order(rows) {
        let mut at_rate: Vec<&BandwidthSummary> = rows.iter().filter(|r| r.rate == rate).collect();
        at_rate.sort_by_key(|r| r.db_size);

        let cells: Vec<String> = at_rate
            .iter()
            .map(|r| qty(r.bw_total_norm, Unit::Kibibyte))
            .collect();

        out.push_str(&format!(
            "{} ({}) & {} \\\\\n",
            macro_call(macro_name),
            rate,
            cells.join(" & ")
        ));
    }
    out
}

fn rates_in_file_order(rows: &[BandwidthSummary]) -> Vec<u64> {
    let mut rates = Vec::new();
    for row in rows {
        if !rates.contains(&row.rate) {
            rates.push(row.rate);
        }
    }
    rates
}
