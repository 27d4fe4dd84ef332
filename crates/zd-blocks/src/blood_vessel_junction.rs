//! Junction built from one `BloodVessel` per outlet, all sharing the
//! junction's single inlet node pressure but each routed through its own
//! internal flow variable, tied together by one mass-conservation row
//! (`Q_in = sum_i flow_i`).
//!
//! Each outlet carries its own R/C/L/stenosis (the original solver's
//! `Parameters` struct has one array per quantity, one entry per outlet —
//! broader than a prose table listing only R/L/stenosis would suggest; this
//! follows the parameter layout actually read and written by the reference
//! implementation, per this crate's convention of treating block parameter
//! layout as fixed and documented rather than guessed).

use zd_core::numeric::Real;
use zd_core::{ParamId, ParamStore, ZdResult};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use crate::blood_vessel::BloodVessel;
use crate::common::{setup_dofs_, sys_err};
use crate::traits::Block;

/// Per-outlet RCL stenosis parameters, one set per branch.
#[derive(Clone, Copy, Debug)]
pub struct BranchParams {
    pub r_id: ParamId,
    pub c_id: ParamId,
    pub l_id: ParamId,
    pub stenosis_id: ParamId,
}

pub struct BloodVesselJunction {
    name: String,
    inlet: [Node; 1],
    outlet_nodes: Vec<Node>,
    branch_params: Vec<BranchParams>,
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
    global_param_ids: Vec<ParamId>,
    branches: Vec<BloodVessel>,
    mass_eqn: usize,
}

impl BloodVesselJunction {
    pub fn new(
        name: impl Into<String>,
        inlet: Node,
        outlet_nodes: Vec<Node>,
        branch_params: Vec<BranchParams>,
    ) -> Self {
        assert_eq!(outlet_nodes.len(), branch_params.len());
        let mut global_param_ids = Vec::with_capacity(branch_params.len() * 4);
        for b in &branch_params {
            global_param_ids.extend([b.r_id, b.c_id, b.l_id, b.stenosis_id]);
        }
        let name = name.into();
        Self {
            name,
            inlet: [inlet],
            outlet_nodes,
            branch_params,
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
            global_param_ids,
            branches: Vec::new(),
            mass_eqn: 0,
        }
    }

    fn num_outlets(&self) -> usize {
        self.outlet_nodes.len()
    }
}

impl Block for BloodVesselJunction {
    fn name(&self) -> &str {
        &self.name
    }
    fn inlet_nodes(&self) -> &[Node] {
        &self.inlet
    }
    fn outlet_nodes(&self) -> &[Node] {
        &self.outlet_nodes
    }
    fn global_var_ids(&self) -> &[usize] {
        &self.global_var_ids
    }
    fn global_eqn_ids(&self) -> &[usize] {
        &self.global_eqn_ids
    }
    fn global_param_ids(&self) -> &[ParamId] {
        &self.global_param_ids
    }

    fn num_triplets(&self) -> NumTriplets {
        let n = self.num_outlets();
        NumTriplets::new(2 * n, 10 * n + n + 1, 2 * n)
    }

    fn setup_dofs(&mut self, dofhandler: &mut DofHandler) {
        let n = self.num_outlets();
        let flow_names: Vec<String> = (0..n).map(|i| format!("flow_{i}")).collect();
        let flow_name_refs: Vec<&str> = flow_names.iter().map(String::as_str).collect();
        let (vars, eqns) = setup_dofs_(dofhandler, &self.inlet, &self.outlet_nodes, 1, &flow_name_refs);
        self.mass_eqn = eqns[0];
        self.global_var_ids = vars;
        self.global_eqn_ids = eqns;

        // flow_i DOFs are the last `n` entries appended by `setup_dofs_`.
        let flow_dofs: Vec<usize> = self.global_var_ids[self.global_var_ids.len() - n..].to_vec();

        self.branches = (0..n)
            .map(|i| {
                let b = self.branch_params[i];
                let mut bv = BloodVessel::new(
                    format!("{}_bv{i}", self.name),
                    self.inlet[0].clone(),
                    self.outlet_nodes[i].clone(),
                    b.r_id,
                    b.c_id,
                    b.l_id,
                    b.stenosis_id,
                );
                bv.setup_dofs(dofhandler);
                bv.redirect_inlet_flow_dof(flow_dofs[i]);
                bv
            })
            .collect();
    }

    fn update_constant(&self, system: &mut dyn System, params: &ParamStore) -> ZdResult<()> {
        for bv in &self.branches {
            bv.update_constant(system, params)?;
        }
        let n = self.num_outlets();
        let q_in = self.global_var_ids[1];
        let flow_dofs = &self.global_var_ids[self.global_var_ids.len() - n..];
        system.set_f(self.mass_eqn, q_in, 1.0).map_err(|e| sys_err(&self.name, e))?;
        for &f in flow_dofs {
            system.set_f(self.mass_eqn, f, -1.0).map_err(|e| sys_err(&self.name, e))?;
        }
        Ok(())
    }

    fn update_solution(
        &mut self,
        system: &mut dyn System,
        params: &ParamStore,
        y: &mut nalgebra::DVector<Real>,
        ydot: &nalgebra::DVector<Real>,
    ) -> ZdResult<()> {
        for bv in &mut self.branches {
            bv.update_solution(system, params, y, ydot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zd_core::{NodeId, Parameter};
    use zd_system::{DenseSystem, System};

    #[test]
    fn mass_conservation_and_branch_equations_hold() {
        let mut dh = DofHandler::new();
        let inlet = Node::register(NodeId::from_index(0), "in", &mut dh);
        let out0 = Node::register(NodeId::from_index(1), "out0", &mut dh);
        let out1 = Node::register(NodeId::from_index(2), "out1", &mut dh);
        let mut params = ParamStore::new();
        let mk = |p: &mut ParamStore, r: Real| BranchParams {
            r_id: p.push("R", Parameter::constant(r)),
            c_id: p.push("C", Parameter::constant(0.0)),
            l_id: p.push("L", Parameter::constant(0.0)),
            stenosis_id: p.push("stenosis", Parameter::constant(0.0)),
        };
        let b0 = mk(&mut params, 1.0);
        let b1 = mk(&mut params, 2.0);

        let mut block = BloodVesselJunction::new(
            "BVJ0",
            inlet.clone(),
            vec![out0.clone(), out1.clone()],
            vec![b0, b1],
        );
        block.setup_dofs(&mut dh);

        let mut sys = DenseSystem::new(dh.size());
        block.update_constant(&mut sys, &params).unwrap();
        let mut y0 = nalgebra::DVector::zeros(dh.size());
        let ydot0 = nalgebra::DVector::zeros(dh.size());
        block.update_solution(&mut sys, &params, &mut y0, &ydot0).unwrap();
        sys.compress().unwrap();

        let q0 = 4.0;
        let q1 = 2.0;
        let q_in = q0 + q1;

        let n = block.num_outlets();
        let flow_dofs: Vec<usize> = block.global_var_ids()[block.global_var_ids().len() - n..].to_vec();
        let mut y = nalgebra::DVector::zeros(dh.size());
        y[inlet.flow_dof] = q_in;
        y[flow_dofs[0]] = q0;
        y[flow_dofs[1]] = q1;
        let ydot = nalgebra::DVector::zeros(dh.size());

        let r = sys.residual(&y, &ydot);
        // mass conservation: Q_in = sum(flow_i)
        assert!(r[block.mass_eqn].abs() < 1e-10);
        assert_eq!(out0.name, "out0");
        assert_eq!(out1.name, "out1");
    }
}
