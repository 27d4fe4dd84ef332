//! Wire schema for the solver's JSON input (§6): `simulation_parameters`,
//! `vessels`, `boundary_conditions`, `junctions`.
//!
//! Field naming follows `src/io/configreader.hpp`'s convention
//! (`vessel_id`/`vessel_name`, `zero_d_element_type`/`zero_d_element_values`,
//! `bc_type`/`bc_values`, `junction_type`) rather than inventing a new one.

use serde::{Deserialize, Serialize};

fn default_cycles() -> u32 {
    1
}
fn default_pts_per_cycle() -> u32 {
    1000
}
fn default_abs_tol() -> f64 {
    1e-8
}
fn default_max_newton_iter() -> usize {
    30
}
fn default_rho_infinity() -> f64 {
    0.5
}
fn default_cardiac_cycle_period() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationParameters {
    #[serde(default = "default_cycles")]
    pub number_of_cardiac_cycles: u32,
    #[serde(default = "default_pts_per_cycle")]
    pub number_of_time_pts_per_cardiac_cycle: u32,
    #[serde(default = "default_abs_tol")]
    pub absolute_tolerance: f64,
    #[serde(default = "default_max_newton_iter")]
    pub maximum_newton_iterations: usize,
    #[serde(default = "default_rho_infinity")]
    pub rho_infinity: f64,
    /// Wall-clock duration of one cardiac cycle. The reference solver infers
    /// this from a periodic inflow boundary condition's time series; reading
    /// it back out of an arbitrary BC here would make `Solver` depend on
    /// which BC happens to be periodic, so it's a direct field instead.
    #[serde(default = "default_cardiac_cycle_period")]
    pub cardiac_cycle_period: f64,
    pub steady_initial: bool,
    pub output_last_cycle_only: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            number_of_cardiac_cycles: default_cycles(),
            number_of_time_pts_per_cardiac_cycle: default_pts_per_cycle(),
            absolute_tolerance: default_abs_tol(),
            maximum_newton_iterations: default_max_newton_iter(),
            rho_infinity: default_rho_infinity(),
            cardiac_cycle_period: default_cardiac_cycle_period(),
            steady_initial: false,
            output_last_cycle_only: false,
        }
    }
}

/// Either a constant scalar or a sampled `(t, v)` curve, optionally periodic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Constant(f64),
    TimeSeries {
        t: Vec<f64>,
        v: Vec<f64>,
        #[serde(default = "default_true")]
        periodic: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VesselConfig {
    pub vessel_id: u32,
    pub vessel_name: String,
    pub zero_d_element_type: String,
    pub zero_d_element_values: VesselValues,
    #[serde(default)]
    pub boundary_conditions: VesselBoundaryConditions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VesselValues {
    #[serde(rename = "R_poiseuille")]
    pub r_poiseuille: f64,
    #[serde(default, rename = "C")]
    pub c: f64,
    #[serde(default, rename = "L")]
    pub l: f64,
    #[serde(default)]
    pub stenosis_coefficient: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VesselBoundaryConditions {
    #[serde(default)]
    pub inlet: Option<String>,
    #[serde(default)]
    pub outlet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundaryConditionConfig {
    pub bc_name: String,
    #[serde(flatten)]
    pub kind: BcKind,
}

/// `bc_type` selects the variant; its fields are nested one level down under
/// `bc_values`, matching the real wire format's `{bc_name, bc_type,
/// bc_values: {...}}` shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "bc_type", content = "bc_values")]
pub enum BcKind {
    #[serde(rename = "FLOW")]
    Flow { q: ParamValue },
    #[serde(rename = "PRESSURE")]
    Pressure { p: ParamValue },
    #[serde(rename = "RESISTANCE")]
    Resistance { r: f64, pd: ParamValue },
    #[serde(rename = "RCR")]
    Rcr { rp: f64, c: f64, rd: f64, pd: ParamValue },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JunctionConfig {
    pub junction_name: String,
    pub junction_type: String,
    pub inlet_vessels: Vec<u32>,
    pub outlet_vessels: Vec<u32>,
    #[serde(default)]
    pub junction_values: Option<JunctionValues>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JunctionValues {
    #[serde(default)]
    pub r: Vec<f64>,
}

/// Top-level document, assembled into a [`crate::loader::load_model`] call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub simulation_parameters: SimulationParameters,
    #[serde(default)]
    pub vessels: Vec<VesselConfig>,
    #[serde(default)]
    pub boundary_conditions: Vec<BoundaryConditionConfig>,
    #[serde(default)]
    pub junctions: Vec<JunctionConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_resistance_terminated_vessel() {
        let text = r#"
        {
          "simulation_parameters": {
            "number_of_cardiac_cycles": 1,
            "number_of_time_pts_per_cardiac_cycle": 100,
            "steady_initial": true,
            "output_last_cycle_only": false
          },
          "vessels": [
            {
              "vessel_id": 0,
              "vessel_name": "vessel0",
              "zero_d_element_type": "BloodVessel",
              "zero_d_element_values": {"R_poiseuille": 100.0, "C": 0.0, "L": 0.0},
              "boundary_conditions": {"inlet": "INFLOW", "outlet": "OUT"}
            }
          ],
          "boundary_conditions": [
            {"bc_name": "INFLOW", "bc_type": "FLOW", "bc_values": {"q": 5.0}},
            {"bc_name": "OUT", "bc_type": "RESISTANCE", "bc_values": {"r": 10.0, "pd": 0.0}}
          ],
          "junctions": []
        }
        "#;
        let cfg: Config = serde_json::from_str(text).unwrap();
        assert_eq!(cfg.vessels.len(), 1);
        assert_eq!(cfg.boundary_conditions.len(), 2);
        assert!(matches!(cfg.boundary_conditions[0].kind, BcKind::Flow { .. }));
        assert!(matches!(cfg.boundary_conditions[1].kind, BcKind::Resistance { .. }));
    }
}
