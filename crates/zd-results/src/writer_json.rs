//! JSON-by-variable output (§6's JSON variant, `src/io/jsonwriter.hpp`):
//! one shared `time` array, then `flow_in`/`flow_out`/`pressure_in`/
//! `pressure_out` each mapping block name to its aligned value series.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::ResultsResult;
use crate::types::ResultRow;
use zd_core::numeric::Real;

#[derive(Debug, Serialize)]
pub struct JsonByVariable {
    pub time: Vec<Real>,
    pub flow_in: BTreeMap<String, Vec<Real>>,
    pub flow_out: BTreeMap<String, Vec<Real>>,
    pub pressure_in: BTreeMap<String, Vec<Real>>,
    pub pressure_out: BTreeMap<String, Vec<Real>>,
}

pub fn group_by_variable(rows: &[ResultRow]) -> JsonByVariable {
    let mut flow_in: BTreeMap<String, Vec<Real>> = BTreeMap::new();
    let mut flow_out: BTreeMap<String, Vec<Real>> = BTreeMap::new();
    let mut pressure_in: BTreeMap<String, Vec<Real>> = BTreeMap::new();
    let mut pressure_out: BTreeMap<String, Vec<Real>> = BTreeMap::new();

    for row in rows {
        flow_in.entry(row.name.clone()).or_default().push(row.flow_in);
        flow_out.entry(row.name.clone()).or_default().push(row.flow_out);
        pressure_in.entry(row.name.clone()).or_default().push(row.pressure_in);
        pressure_out.entry(row.name.clone()).or_default().push(row.pressure_out);
    }

    let time = match rows.first() {
        Some(first) => rows.iter().filter(|r| r.name == first.name).map(|r| r.time).collect(),
        None => Vec::new(),
    };

    JsonByVariable { time, flow_in, flow_out, pressure_in, pressure_out }
}

pub fn write_json(path: &Path, rows: &[ResultRow]) -> ResultsResult<()> {
    let grouped = group_by_variable(rows);
    let content = serde_json::to_string_pretty(&grouped)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_rows_by_block_name() {
        let rows = vec![
            ResultRow { name: "vessel0".into(), time: 0.0, flow_in: 1.0, flow_out: 1.0, pressure_in: 10.0, pressure_out: 9.0 },
            ResultRow { name: "vessel0".into(), time: 0.1, flow_in: 2.0, flow_out: 2.0, pressure_in: 20.0, pressure_out: 19.0 },
            ResultRow { name: "vessel1".into(), time: 0.0, flow_in: 3.0, flow_out: 3.0, pressure_in: 30.0, pressure_out: 29.0 },
            ResultRow { name: "vessel1".into(), time: 0.1, flow_in: 4.0, flow_out: 4.0, pressure_in: 40.0, pressure_out: 39.0 },
        ];
        let grouped = group_by_variable(&rows);
        assert_eq!(grouped.time, vec![0.0, 0.1]);
        assert_eq!(grouped.flow_in["vessel0"], vec![1.0, 2.0]);
        assert_eq!(grouped.flow_in["vessel1"], vec![3.0, 4.0]);
    }
}
