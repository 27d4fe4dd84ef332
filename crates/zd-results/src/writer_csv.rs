//! CSV output (§6's canonical format).
//!
//! Column order (`src/io/csvwriter.hpp`):
//! `name,time,flow_in,flow_out,pressure_in,pressure_out`.

use std::path::Path;

use crate::error::ResultsResult;
use crate::types::{ResultRow, SummaryRow};

pub fn write_csv(path: &Path, rows: &[ResultRow]) -> ResultsResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["name", "time", "flow_in", "flow_out", "pressure_in", "pressure_out"])?;
    for row in rows {
        writer.write_record([
            row.name.as_str(),
            &row.time.to_string(),
            &row.flow_in.to_string(),
            &row.flow_out.to_string(),
            &row.pressure_in.to_string(),
            &row.pressure_out.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Same column set minus `time`, one row per block, for the
/// mean-over-last-cycle summary mode.
pub fn write_summary_csv(path: &Path, rows: &[SummaryRow]) -> ResultsResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["name", "flow_in", "flow_out", "pressure_in", "pressure_out"])?;
    for row in rows {
        writer.write_record([
            row.name.as_str(),
            &row.flow_in.to_string(),
            &row.flow_out.to_string(),
            &row.pressure_in.to_string(),
            &row.pressure_out.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultRow;

    #[test]
    fn writes_header_and_one_row_per_sample() {
        let dir = std::env::temp_dir().join(format!("zd-results-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.csv");
        let rows = vec![ResultRow {
            name: "vessel0".into(),
            time: 0.5,
            flow_in: 1.0,
            flow_out: 0.9,
            pressure_in: 100.0,
            pressure_out: 80.0,
        }];
        write_csv(&path, &rows).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("name,time,flow_in,flow_out,pressure_in,pressure_out"));
        assert!(content.contains("vessel0"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
