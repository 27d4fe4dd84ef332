//! Pulls per-block, per-time-step rows out of a recorded simulation.
//!
//! A block's `P_in`/`Q_in`/`P_out`/`Q_out` are read off its first
//! inlet/outlet [`zd_graph::Node`]'s `pres_dof`/`flow_dof` rather than its
//! internal variable ordering, so this works the same way for every block
//! type without needing to know each one's `y` layout.

use zd_blocks::Block;
use zd_model::Model;

use crate::error::{ResultsError, ResultsResult};
use crate::types::ResultRow;

/// A block is eligible for output rows if its name carries the "vessel"
/// naming convention (`src/model/block.hpp`'s vessel/junction/BC
/// classification, simplified here to a name-prefix check since the loader
/// names vessel blocks directly after their `vessel_name` field).
pub fn is_vessel_block(name: &str) -> bool {
    name.starts_with("vessel")
}

pub fn extract_rows(
    model: &Model,
    times: &[zd_core::Real],
    states: &[zd_system::State],
) -> ResultsResult<Vec<ResultRow>> {
    if times.len() != states.len() {
        return Err(ResultsError::Malformed {
            what: "time and state series have different lengths".to_string(),
        });
    }

    let mut rows = Vec::new();
    for block in model.blocks() {
        if !is_vessel_block(block.name()) {
            continue;
        }
        let inlet = block.inlet_nodes().first().ok_or_else(|| ResultsError::Malformed {
            what: format!("block \"{}\" has no inlet node to report", block.name()),
        })?;
        let outlet = block.outlet_nodes().first().ok_or_else(|| ResultsError::Malformed {
            what: format!("block \"{}\" has no outlet node to report", block.name()),
        })?;

        for (t, state) in times.iter().zip(states.iter()) {
            rows.push(ResultRow {
                name: block.name().to_string(),
                time: *t,
                flow_in: state.y[inlet.flow_dof],
                flow_out: state.y[outlet.flow_dof],
                pressure_in: state.y[inlet.pres_dof],
                pressure_out: state.y[outlet.pres_dof],
            });
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vessel_prefix_matches_loader_naming() {
        assert!(is_vessel_block("vessel0"));
        assert!(!is_vessel_block("INFLOW"));
    }
}
