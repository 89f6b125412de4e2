//! CSV ingestion and output.
//!
//! Reads the raw benchmark CSV into [`Measurement`]s, reads and writes the
//! condensed tables. Every reader checks the header row before touching
//! data so a wrong file fails with the list of missing columns.

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{
    BandwidthCounter, BandwidthSummary, LatencyPhase, LatencySummary, Measurement,
};

/// Open a file for reading, keeping the path in the error.
fn open(path: &Path) -> CsvResult<File> {
    File::open(path).map_err(|source| CsvError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Map each required column to its position, or fail listing all absent ones.
pub fn require_columns<'a>(
    headers: &StringRecord,
    required: &[&'a str],
    path: &Path,
) -> CsvResult<HashMap<&'a str, usize>> {
    let mut positions = HashMap::with_capacity(required.len());
    let mut missing = Vec::new();

    for &column in required {
        match headers.iter().position(|h| h == column) {
            Some(idx) => {
                positions.insert(column, idx);
            }
            None => missing.push(column.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(CsvError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }
    Ok(positions)
}

// =============================================================================
// Raw Measurements
// =============================================================================

/// Read every row of a raw benchmark CSV.
pub fn read_measurements(path: &Path) -> CsvResult<Vec<Measurement>> {
    parse_measurements(open(path)?, path)
}

/// Parse raw benchmark rows from any reader; `source` names it in errors.
pub fn parse_measurements<R: Read>(reader: R, source: &Path) -> CsvResult<Vec<Measurement>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let required = Measurement::required_columns();
    let columns = require_columns(&headers, &required, source)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push(measurement_from_record(&record, &columns)?);
    }
    Ok(rows)
}

fn measurement_from_record(
    record: &StringRecord,
    columns: &HashMap<&str, usize>,
) -> CsvResult<Measurement> {
    let cell = Cell { record, columns };

    let mut bandwidth = [0.0; 12];
    for counter in BandwidthCounter::ALL {
        bandwidth[counter as usize] = cell.float(counter.column())?;
    }
    let mut latency = [0.0; 6];
    for phase in LatencyPhase::ALL {
        latency[phase as usize] = cell.float(phase.column())?;
    }

    Ok(Measurement {
        db_size: cell.integer("db_size")?,
        key_length: cell.integer("key_length")?,
        value_length: cell.integer("value_length")?,
        malicious: cell.boolean("malicious")?,
        rate: cell.integer("rate")?,
        multi_client: cell.boolean("multi_client")?,
        num_threads: cell.integer("num_threads")?,
        bandwidth,
        latency,
    })
}

/// Typed access to the cells of one record.
struct Cell<'r> {
    record: &'r StringRecord,
    columns: &'r HashMap<&'r str, usize>,
}

impl Cell<'_> {
    fn raw(&self, column: &str) -> &str {
        self.columns
            .get(column)
            .and_then(|&idx| self.record.get(idx))
            .unwrap_or("")
    }

    fn invalid(&self, column: &str, message: &str) -> CsvError {
        CsvError::InvalidValue {
            line: self.record.position().map(|p| p.line()).unwrap_or(0),
            column: column.to_string(),
            value: self.raw(column).to_string(),
            message: message.to_string(),
        }
    }

    fn float(&self, column: &str) -> CsvResult<f64> {
        self.raw(column)
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(column, "expected a number"))
    }

    fn integer(&self, column: &str) -> CsvResult<u64> {
        let raw = self.raw(column);
        if let Ok(v) = raw.parse::<u64>() {
            return Ok(v);
        }
        // Tolerate integral floats such as "1024.0"
        match raw.parse::<f64>() {
            Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
            _ => Err(self.invalid(column, "expected a non-negative integer")),
        }
    }

    fn boolean(&self, column: &str) -> CsvResult<bool> {
        match self.raw(column) {
            "true" | "True" | "TRUE" | "1" => Ok(true),
            "false" | "False" | "FALSE" | "0" => Ok(false),
            _ => Err(self.invalid(column, "expected true or false")),
        }
    }
}

// =============================================================================
// Condensed Tables
// =============================================================================

/// Read a condensed bandwidth table.
pub fn read_bandwidth_table(path: &Path) -> CsvResult<Vec<BandwidthSummary>> {
    read_condensed(path, &BandwidthSummary::REQUIRED)
}

/// Read a condensed round-trip-time table.
pub fn read_latency_table(path: &Path) -> CsvResult<Vec<LatencySummary>> {
    read_condensed(path, &LatencySummary::REQUIRED)
}

fn read_condensed<T: DeserializeOwned>(path: &Path, required: &[&str]) -> CsvResult<Vec<T>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(open(path)?);
    let headers = rdr.headers()?.clone();
    require_columns(&headers, required, path)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Write a condensed table. The header row is written even with no records.
pub fn write_condensed<I>(path: &Path, headers: &[&str], records: I) -> CsvResult<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let file = File::create(path).map_err(|source| CsvError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);

    wtr.write_record(headers)?;
    for record in records {
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn raw_header() -> String {
        let mut cols = vec!["db_type".to_string()];
        cols.extend(Measurement::required_columns().iter().map(|c| c.to_string()));
        cols.push("repetition".to_string());
        cols.join(",")
    }

    fn raw_row(db_size: u64, malicious: &str, rate: u64, send_pir_up: u64, rt_send_pir: u64) -> String {
        // db_type, 7 config columns, 12 BW counters, 6 RT counters, repetition
        let mut cells = vec![
            "TwoDB".to_string(),
            db_size.to_string(),
            "32".into(),
            "64".into(),
            malicious.into(),
            rate.to_string(),
            "false".into(),
            "1".into(),
        ];
        cells.push(send_pir_up.to_string());
        cells.extend((1..12).map(|_| "0".to_string()));
        cells.push(rt_send_pir.to_string());
        cells.extend((1..6).map(|_| "0".to_string()));
        cells.push("0".into());
        cells.join(",")
    }

    #[test]
    fn test_parse_raw_rows() {
        let csv = format!(
            "{}\n{}\n{}\n",
            raw_header(),
            raw_row(1024, "false", 1, 2048, 1_500_000),
            raw_row(4096, "true", 2, 10, 0)
        );
        let rows = parse_measurements(csv.as_bytes(), Path::new("raw.csv")).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].db_size, 1024);
        assert!(!rows[0].malicious);
        assert_eq!(rows[0].counter(BandwidthCounter::SendPirUp), 2048.0);
        assert_eq!(rows[0].latency_seconds(LatencyPhase::SendPir), 1.5);
        assert!(rows[1].malicious);
        assert_eq!(rows[1].rate, 2);
    }

    #[test]
    fn test_title_case_booleans() {
        let csv = format!("{}\n{}\n", raw_header(), raw_row(1024, "True", 1, 0, 0));
        let rows = parse_measurements(csv.as_bytes(), Path::new("raw.csv")).unwrap();
        assert!(rows[0].malicious);
    }

    #[test]
    fn test_missing_columns_listed() {
        let csv = "db_size,rate\n1024,1\n";
        let err = parse_measurements(csv.as_bytes(), Path::new("raw.csv")).unwrap_err();
        match err {
            CsvError::MissingColumns { path, columns } => {
                assert_eq!(path, PathBuf::from("raw.csv"));
                assert!(columns.contains(&"malicious".to_string()));
                assert!(columns.contains(&"BW_SendPIRUp".to_string()));
                assert!(!columns.contains(&"rate".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_value_reports_line() {
        let bad = raw_row(1024, "maybe", 1, 0, 0);
        let csv = format!("{}\n{}\n", raw_header(), bad);
        let err = parse_measurements(csv.as_bytes(), Path::new("raw.csv")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Line 2"));
        assert!(msg.contains("malicious"));
        assert!(msg.contains("maybe"));
    }

    #[test]
    fn test_header_only_is_empty() {
        let csv = format!("{}\n", raw_header());
        let rows = parse_measurements(csv.as_bytes(), Path::new("raw.csv")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_condensed_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_BW_NoAuth.csv");
        let row = BandwidthSummary {
            expid: "10243264False1False1".into(),
            db_size: 1024,
            rate: 1,
            bw_total: 3.0,
            bw_total_norm: 3.0,
        };
        write_condensed(&path, &BandwidthSummary::HEADERS, vec![row.to_record()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "EXPID,db_size,rate,BW_Total,BW_Total_Norm\n10243264False1False1,1024,1,3.00,3.00\n"
        );
        assert_eq!(read_bandwidth_table(&path).unwrap(), vec![row]);
    }

    #[test]
    fn test_empty_condensed_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_RT_Multi_Auth.csv");
        write_condensed(&path, &LatencySummary::HEADERS, Vec::new()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(read_latency_table(&path).unwrap().is_empty());
    }

    #[test]
    fn test_condensed_missing_file() {
        let err = read_bandwidth_table(Path::new("/nonexistent/x_BW_Auth.csv")).unwrap_err();
        assert!(matches!(err, CsvError::Open { .. }));
    }
}
