//! Materializes a parsed [`Config`] into a [`zd_model::Model`].
//!
//! Node topology follows the vessel/junction/BC connectivity encoded in the
//! config rather than any separately-declared node list: a vessel's
//! inlet/outlet [`Node`] is cloned into whichever junction or boundary
//! condition references it, so the DOF pair is genuinely shared between the
//! two blocks rather than re-registered.

use std::collections::HashMap;

use zd_blocks::{
    FlowReferenceBc, Junction, PressureReferenceBc, ResistanceBc, ResistiveJunction,
    WindkesselBc,
};
use zd_core::{ParamStore, Parameter};
use zd_graph::Node;
use zd_model::Model;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{
    BcKind, BoundaryConditionConfig, Config, JunctionConfig, ParamValue, SimulationParameters,
    VesselConfig,
};

fn to_parameter(v: &ParamValue) -> ConfigResult<Parameter> {
    match v {
        ParamValue::Constant(x) => Ok(Parameter::constant(*x)),
        ParamValue::TimeSeries { t, v, periodic } => {
            Parameter::series(t.clone(), v.clone(), *periodic).map_err(ConfigError::from)
        }
    }
}

/// Build a [`Model`] from `config`, returning it alongside the run's
/// simulation parameters.
///
/// Only the block types whose JSON shape is unambiguous from the wire
/// schema are reachable here: [`zd_blocks::BloodVessel`] vessels,
/// [`Junction`]/[`ResistiveJunction`] junctions, and one-port boundary
/// conditions (flow, pressure, resistance, RCR). Multi-port or closed-loop
/// elements (`ClosedLoopRCR`, coronary BCs, `ClosedLoopHeartPulmonary`,
/// `BloodVesselJunction`) have no config shape defined on the wire format
/// and are left to direct [`Model`] construction.
pub fn load_model(config: &Config) -> ConfigResult<(Model, SimulationParameters)> {
    let mut model = Model::new(ParamStore::new());

    let mut vessel_nodes: HashMap<u32, (Node, Node)> = HashMap::new();
    for v in &config.vessels {
        let inlet = model.register_node(format!("{}:in", v.vessel_name));
        let outlet = model.register_node(format!("{}:out", v.vessel_name));
        vessel_nodes.insert(v.vessel_id, (inlet, outlet));
    }

    for v in &config.vessels {
        add_vessel(&mut model, v, &vessel_nodes)?;
    }

    for j in &config.junctions {
        add_junction(&mut model, j, &vessel_nodes)?;
    }

    for v in &config.vessels {
        if let Some(bc_name) = &v.boundary_conditions.inlet {
            let bc = find_bc(config, bc_name)?;
            let (inlet, _) = vessel_nodes
                .get(&v.vessel_id)
                .expect("vessel just registered above")
                .clone();
            add_bc(&mut model, bc, inlet)?;
        }
        if let Some(bc_name) = &v.boundary_conditions.outlet {
            let bc = find_bc(config, bc_name)?;
            let (_, outlet) = vessel_nodes
                .get(&v.vessel_id)
                .expect("vessel just registered above")
                .clone();
            add_bc(&mut model, bc, outlet)?;
        }
    }

    model.setup();
    Ok((model, config.simulation_parameters.clone()))
}

fn add_vessel(
    model: &mut Model,
    v: &VesselConfig,
    nodes: &HashMap<u32, (Node, Node)>,
) -> ConfigResult<()> {
    let (inlet, outlet) = nodes
        .get(&v.vessel_id)
        .expect("vessel just registered above")
        .clone();
    match v.zero_d_element_type.as_str() {
        "BloodVessel" => {
            let r_id = model.params_mut().push(
                format!("{}.R", v.vessel_name),
                Parameter::constant(v.zero_d_element_values.r_poiseuille),
            );
            let c_id = model
                .params_mut()
                .push(format!("{}.C", v.vessel_name), Parameter::constant(v.zero_d_element_values.c));
            let l_id = model
                .params_mut()
                .push(format!("{}.L", v.vessel_name), Parameter::constant(v.zero_d_element_values.l));
            let stenosis_id = model.params_mut().push(
                format!("{}.stenosis", v.vessel_name),
                Parameter::constant(v.zero_d_element_values.stenosis_coefficient),
            );
            model.add_block(Box::new(zd_blocks::BloodVessel::new(
                v.vessel_name.clone(),
                inlet,
                outlet,
                r_id,
                c_id,
                l_id,
                stenosis_id,
            )))?;
            Ok(())
        }
        other => Err(ConfigError::UnknownBlockType {
            what: "zero_d_element_type",
            value: other.to_string(),
        }),
    }
}

fn add_junction(
    model: &mut Model,
    j: &JunctionConfig,
    nodes: &HashMap<u32, (Node, Node)>,
) -> ConfigResult<()> {
    let mut inlet_nodes = Vec::with_capacity(j.inlet_vessels.len());
    for id in &j.inlet_vessels {
        let (_, outlet) = nodes.get(id).ok_or_else(|| ConfigError::MissingReference {
            what: format!(
                "junction \"{}\" references unknown vessel id {id}",
                j.junction_name
            ),
        })?;
        inlet_nodes.push(outlet.clone());
    }
    let mut outlet_nodes = Vec::with_capacity(j.outlet_vessels.len());
    for id in &j.outlet_vessels {
        let (inlet, _) = nodes.get(id).ok_or_else(|| ConfigError::MissingReference {
            what: format!(
                "junction \"{}\" references unknown vessel id {id}",
                j.junction_name
            ),
        })?;
        outlet_nodes.push(inlet.clone());
    }

    match j.junction_type.as_str() {
        "NORMAL_JUNCTION" => {
            model.add_block(Box::new(Junction::new(
                j.junction_name.clone(),
                inlet_nodes,
                outlet_nodes,
            )))?;
        }
        "resistive_junction" | "RESISTIVE_JUNCTION" => {
            let n_branches = inlet_nodes.len() + outlet_nodes.len();
            let r_values: &[f64] = j
                .junction_values
                .as_ref()
                .map(|jv| jv.r.as_slice())
                .unwrap_or(&[]);
            if r_values.len() != n_branches {
                return Err(ConfigError::MissingReference {
                    what: format!(
                        "junction \"{}\" needs {n_branches} resistances, found {}",
                        j.junction_name,
                        r_values.len()
                    ),
                });
            }
            let mut r_ids = Vec::with_capacity(n_branches);
            for (k, r) in r_values.iter().enumerate() {
                r_ids.push(
                    model
                        .params_mut()
                        .push(format!("{}.R{k}", j.junction_name), Parameter::constant(*r)),
                );
            }
            model.add_block(Box::new(ResistiveJunction::new(
                j.junction_name.clone(),
                inlet_nodes,
                outlet_nodes,
                r_ids,
            )))?;
        }
        other => {
            return Err(ConfigError::UnknownBlockType {
                what: "junction_type",
                value: other.to_string(),
            })
        }
    }
    Ok(())
}

fn find_bc<'a>(config: &'a Config, name: &str) -> ConfigResult<&'a BoundaryConditionConfig> {
    config
        .boundary_conditions
        .iter()
        .find(|bc| bc.bc_name == name)
        .ok_or_else(|| ConfigError::MissingReference {
            what: format!("boundary condition \"{name}\" not found"),
        })
}

fn add_bc(model: &mut Model, bc: &BoundaryConditionConfig, node: Node) -> ConfigResult<()> {
    match &bc.kind {
        BcKind::Flow { q } => {
            let q_id = model
                .params_mut()
                .push(format!("{}.Q", bc.bc_name), to_parameter(q)?);
            model.add_block(Box::new(FlowReferenceBc::new(bc.bc_name.clone(), node, q_id)))?;
        }
        BcKind::Pressure { p } => {
            let p_id = model
                .params_mut()
                .push(format!("{}.P", bc.bc_name), to_parameter(p)?);
            model.add_block(Box::new(PressureReferenceBc::new(bc.bc_name.clone(), node, p_id)))?;
        }
        BcKind::Resistance { r, pd } => {
            let r_id = model
                .params_mut()
                .push(format!("{}.R", bc.bc_name), Parameter::constant(*r));
            let pd_id = model
                .params_mut()
                .push(format!("{}.Pd", bc.bc_name), to_parameter(pd)?);
            model.add_block(Box::new(ResistanceBc::new(bc.bc_name.clone(), node, r_id, pd_id)))?;
        }
        BcKind::Rcr { rp, c, rd, pd } => {
            let rp_id = model
                .params_mut()
                .push(format!("{}.Rp", bc.bc_name), Parameter::constant(*rp));
            let c_id = model
                .params_mut()
                .push(format!("{}.C", bc.bc_name), Parameter::constant(*c));
            let rd_id = model
                .params_mut()
                .push(format!("{}.Rd", bc.bc_name), Parameter::constant(*rd));
            let pd_id = model
                .params_mut()
                .push(format!("{}.Pd", bc.bc_name), to_parameter(pd)?);
            model.add_block(Box::new(WindkesselBc::new(
                bc.bc_name.clone(),
                node,
                rp_id,
                c_id,
                rd_id,
                pd_id,
            )))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
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
              "zero_d_element_values": {"R_poiseuille": 100.0, "C": 1e-3, "L": 1e-4},
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
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn loads_single_vessel_with_flow_and_resistance_bc() {
        let cfg = sample_config();
        let (model, sim) = load_model(&cfg).unwrap();
        assert_eq!(model.blocks().len(), 3);
        assert_eq!(sim.number_of_cardiac_cycles, 1);
        assert!(model.size() > 0);
    }

    #[test]
    fn unknown_zero_d_element_type_is_rejected() {
        let mut cfg = sample_config();
        cfg.vessels[0].zero_d_element_type = "NotARealElement".to_string();
        let err = load_model(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBlockType { .. }));
    }

    #[test]
    fn missing_boundary_condition_reference_is_rejected() {
        let mut cfg = sample_config();
        cfg.vessels[0].boundary_conditions.inlet = Some("NOPE".to_string());
        let err = load_model(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::MissingReference { .. }));
    }

    #[test]
    fn two_vessels_joined_by_normal_junction() {
        let text = r#"
        {
          "simulation_parameters": {"steady_initial": true, "output_last_cycle_only": false},
          "vessels": [
            {
              "vessel_id": 0, "vessel_name": "v0", "zero_d_element_type": "BloodVessel",
              "zero_d_element_values": {"R_poiseuille": 1.0},
              "boundary_conditions": {"inlet": "INFLOW"}
            },
            {
              "vessel_id": 1, "vessel_name": "v1", "zero_d_element_type": "BloodVessel",
              "zero_d_element_values": {"R_poiseuille": 1.0},
              "boundary_conditions": {"outlet": "OUT"}
            }
          ],
          "boundary_conditions": [
            {"bc_name": "INFLOW", "bc_type": "FLOW", "bc_values": {"q": 1.0}},
            {"bc_name": "OUT", "bc_type": "RESISTANCE", "bc_values": {"r": 5.0, "pd": 0.0}}
          ],
          "junctions": [
            {"junction_name": "J0", "junction_type": "NORMAL_JUNCTION", "inlet_vessels": [0], "outlet_vessels": [1]}
          ]
        }
        "#;
        let cfg: Config = serde_json::from_str(text).unwrap();
        let (model, _) = load_model(&cfg).unwrap();
        assert_eq!(model.blocks().len(), 5);
    }
}
