//! End-to-end: raw CSV → aggregate → render.

use sabot_eval::{
    aggregate, render, AggregateError, AggregateOptions, CsvError, Measurement, RenderOptions,
};
use std::fs;
use std::path::Path;

/// Raw row in benchmark-driver column order.
struct Raw {
    db_size: u64,
    malicious: bool,
    rate: u64,
    multi_client: bool,
    send_pir_up: u64,
    rt_send_pir: u64,
    rt_send_notify: u64,
    rt_recv_pir: u64,
    rt_recv_notify: u64,
}

impl Raw {
    fn single(db_size: u64, malicious: bool, rate: u64, send_pir_up: u64) -> Self {
        Self {
            db_size,
            malicious,
            rate,
            multi_client: false,
            send_pir_up,
            rt_send_pir: 0,
            rt_send_notify: 0,
            rt_recv_pir: 0,
            rt_recv_notify: 0,
        }
    }

    fn multi(db_size: u64, malicious: bool, rate: u64, rt: [u64; 4]) -> Self {
        Self {
            db_size,
            malicious,
            rate,
            multi_client: true,
            send_pir_up: 0,
            rt_send_pir: rt[0],
            rt_send_notify: rt[1],
            rt_recv_pir: rt[2],
            rt_recv_notify: rt[3],
        }
    }

    fn line(&self) -> String {
        let mut cells = vec![
            "TwoDB".to_string(),
            self.db_size.to_string(),
            "32".to_string(),
            "64".to_string(),
            self.malicious.to_string(),
            self.rate.to_string(),
            self.multi_client.to_string(),
            "1".to_string(),
        ];
        cells.push(self.send_pir_up.to_string());
        cells.extend((1..12).map(|_| "0".to_string()));
        cells.extend([
            self.rt_send_pir.to_string(),
            self.rt_send_notify.to_string(),
            "0".to_string(),
            self.rt_recv_pir.to_string(),
            self.rt_recv_notify.to_string(),
            "0".to_string(),
        ]);
        cells.push("0".to_string());
        cells.join(",")
    }
}

fn write_raw(path: &Path, rows: &[Raw]) {
    let mut header = vec!["db_type"];
    header.extend(Measurement::required_columns());
    header.push("repetition");

    let mut text = header.join(",");
    text.push('\n');
    for row in rows {
        text.push_str(&row.line());
        text.push('\n');
    }
    fs::write(path, text).unwrap();
}

fn sample_rows() -> Vec<Raw> {
    vec![
        // Two repetitions of the same single-client experiment: 2048 B and 4096 B
        Raw::single(1024, false, 1, 2048),
        Raw::single(1024, false, 1, 4096),
        Raw::single(4096, false, 1, 10240),
        Raw::single(1024, true, 1, 8192),
        // Above the repetition bound, dropped
        Raw::single(1024, false, 5, 999_999),
        // Multi-client round trips (µs): send_pir, send_notify, recv_pir, recv_notify
        Raw::multi(1024, false, 1, [500_000, 600_000, 1_000_000, 600_000]),
        Raw::multi(1024, true, 1, [750_000, 600_000, 1_500_000, 600_000]),
        Raw::multi(1024, false, 2, [1_000_000, 600_000, 2_000_000, 600_000]),
        Raw::multi(1024, true, 2, [1_250_000, 600_000, 2_500_000, 600_000]),
    ]
}

#[test]
fn test_aggregate_writes_condensed_tables() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("results.csv");
    write_raw(&raw, &sample_rows());

    let prefix = dir.path().join("run");
    let options = AggregateOptions {
        repetitions: 3,
        write_single_client: false,
    };
    let report = aggregate(&raw, &prefix, &options).unwrap();

    assert_eq!(report.input_rows, 9);
    assert_eq!(report.kept_rows, 8);
    assert_eq!(report.written.len(), 4);

    let bw_noauth = fs::read_to_string(dir.path().join("run_BW_NoAuth.csv")).unwrap();
    assert_eq!(
        bw_noauth,
        concat!(
            "EXPID,db_size,rate,BW_Total,BW_Total_Norm\n",
            "10243264False1False1,1024,1,3.00,3.00\n",
            "40963264False1False1,4096,1,10.00,10.00\n",
        )
    );

    let bw_auth = fs::read_to_string(dir.path().join("run_BW_Auth.csv")).unwrap();
    assert!(bw_auth.ends_with("10243264True1False1,1024,1,8.00,8.00\n"));

    let rt_auth = fs::read_to_string(dir.path().join("run_RT_Multi_Auth.csv")).unwrap();
    assert_eq!(rt_auth.lines().count(), 3);
    assert!(rt_auth.contains(",1024,1,0.75,0.60,0.00,1.50,0.60,0.00,3.45\n"));

    assert!(!dir.path().join("run_RT_Single_NoAuth.csv").exists());
}

#[test]
fn test_single_client_tables_optional() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("results.csv");
    write_raw(&raw, &sample_rows());

    let prefix = dir.path().join("run");
    let options = AggregateOptions {
        repetitions: 3,
        write_single_client: true,
    };
    let report = aggregate(&raw, &prefix, &options).unwrap();

    assert_eq!(report.written.len(), 6);
    let single = fs::read_to_string(dir.path().join("run_RT_Single_NoAuth.csv")).unwrap();
    // header + db_size 1024 + db_size 4096
    assert_eq!(single.lines().count(), 3);
}

#[test]
fn test_render_tables() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("results.csv");
    write_raw(&raw, &sample_rows());

    let prefix = dir.path().join("run");
    let options = AggregateOptions {
        repetitions: 3,
        write_single_client: false,
    };
    aggregate(&raw, &prefix, &options).unwrap();

    let out = dir.path().join("table");
    let report = render(&prefix, &out, &RenderOptions::default()).unwrap();
    assert_eq!(report.bandwidth, dir.path().join("table_bw.tex"));
    assert_eq!(report.latency, dir.path().join("table_rt.tex"));

    let bw = fs::read_to_string(&report.bandwidth).unwrap();
    assert!(bw.contains("\\hprot{} (1) & \\qty{3.00}{\\kibi\\byte} & \\qty{10.00}{\\kibi\\byte} \\\\\n"));
    assert!(bw.contains("\\mprot{} (1) & \\qty{8.00}{\\kibi\\byte} \\\\\n"));
    assert!(bw.contains("Pudding w/ Nym"));

    let rt = fs::read_to_string(&report.latency).unwrap();
    // One block for 2^10 spanning 2 rates x 2 variants; shared notify = 4 x 0.60 / 6 = 0.40
    assert_eq!(rt.matches("\\multirow{4}{*}{$2^{10}$}").count(), 1);
    assert_eq!(rt.matches("\\multirow{4}{*}{\\qty{0.40}{\\second}}").count(), 2);
    // rate 1, no auth: 0.50 + 1.00 + 0.40 + 0.40
    assert!(rt.contains(" & \\hprot{} & 1 & \\qty{0.50}{\\second} & "));
    assert!(rt.contains("\\textbf{ \\qty{2.30}{\\second} }\\\\\n"));
    // rate 2, auth: 1.25 + 2.50 + 0.40 + 0.40
    assert!(rt.contains(" & \\mprot{} & 2 & \\qty{1.25}{\\second} &  &  & \\qty{2.50}{\\second} &  &  & \\textbf{ \\qty{4.55}{\\second} }\\\\\n"));
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("results.csv");
    write_raw(&raw, &sample_rows());
    let options = AggregateOptions {
        repetitions: 3,
        write_single_client: true,
    };

    let mut outputs = Vec::new();
    for run in ["a", "b"] {
        let prefix = dir.path().join(run);
        let out = dir.path().join(format!("{}_tex", run));
        let agg = aggregate(&raw, &prefix, &options).unwrap();
        let rendered = render(&prefix, &out, &RenderOptions::default()).unwrap();

        let mut files: Vec<Vec<u8>> = agg.written.iter().map(|p| fs::read(p).unwrap()).collect();
        files.push(fs::read(&rendered.bandwidth).unwrap());
        files.push(fs::read(&rendered.latency).unwrap());
        outputs.push(files);
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_missing_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("results.csv");
    fs::write(&raw, "db_size,rate\n1024,1\n").unwrap();

    let err = aggregate(&raw, &dir.path().join("run"), &AggregateOptions::default()).unwrap_err();
    assert!(matches!(err, AggregateError::Csv(CsvError::MissingColumns { .. })));
    assert!(!dir.path().join("run_BW_NoAuth.csv").exists());
}

#[test]
fn test_everything_filtered_gives_header_only_tables() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("results.csv");
    write_raw(&raw, &[Raw::single(1024, false, 7, 1024)]);

    let report = aggregate(&raw, &dir.path().join("run"), &AggregateOptions {
        repetitions: 2,
        write_single_client: false,
    })
    .unwrap();

    assert_eq!(report.kept_rows, 0);
    for path in &report.written {
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 1, "{}", path.display());
    }
}

#[test]
fn test_zero_repetitions_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("results.csv");
    write_raw(&raw, &sample_rows());

    let err = aggregate(&raw, &dir.path().join("run"), &AggregateOptions {
        repetitions: 0,
        write_single_client: false,
    })
    .unwrap_err();
    assert!(matches!(err, AggregateError::InvalidRepetitions));
}
