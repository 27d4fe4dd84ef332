//! Junction whose branches are each a pure resistor into a shared internal
//! node pressure `P_c`, rather than an ideal (pressure-continuous) junction.
//!
//! For each inlet `i`: `P_in,i - R_in,i*Q_in,i - P_c = 0`.
//! For each outlet `j`: `P_c - R_out,j*Q_out,j - P_out,j = 0`.
//! Plus one mass-conservation row: `sum Q_in = sum Q_out`.

use zd_core::{ParamId, ParamStore};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use crate::common::{setup_dofs_, sys_err};
use crate::traits::Block;

pub struct ResistiveJunction {
    name: String,
    inlet_nodes: Vec<Node>,
    outlet_nodes: Vec<Node>,
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
    global_param_ids: Vec<ParamId>,
    r_ids: Vec<ParamId>,
}

impl ResistiveJunction {
    /// `r_ids` holds one resistance parameter per branch, inlets first then
    /// outlets, matching `inlet_nodes` then `outlet_nodes` order.
    pub fn new(
        name: impl Into<String>,
        inlet_nodes: Vec<Node>,
        outlet_nodes: Vec<Node>,
        r_ids: Vec<ParamId>,
    ) -> Self {
        Self {
            name: name.into(),
            global_param_ids: r_ids.clone(),
            inlet_nodes,
            outlet_nodes,
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
            r_ids,
        }
    }

    fn num_inlets(&self) -> usize {
        self.inlet_nodes.len()
    }
    fn num_outlets(&self) -> usize {
        self.outlet_nodes.len()
    }
}

impl Block for ResistiveJunction {
    fn name(&self) -> &str {
        &self.name
    }
    fn inlet_nodes(&self) -> &[Node] {
        &self.inlet_nodes
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
        let n = self.num_inlets() + self.num_outlets();
        NumTriplets::new(0, n * 4, 0)
    }

    fn setup_dofs(&mut self, dofhandler: &mut DofHandler) {
        let n = self.num_inlets() + self.num_outlets();
        let (vars, eqns) = setup_dofs_(
            dofhandler,
            &self.inlet_nodes,
            &self.outlet_nodes,
            n + 1,
            &["pressure_c"],
        );
        self.global_var_ids = vars;
        self.global_eqn_ids = eqns;
    }

    fn update_constant(&self, system: &mut dyn System, params: &ParamStore) -> zd_core::ZdResult<()> {
        let n_inlets = self.num_inlets();
        let n_outlets = self.num_outlets();
        let n = n_inlets + n_outlets;
        let pc = *self.global_var_ids.last().unwrap();

        for i in 0..n_inlets {
            let r = params.evaluate(self.r_ids[i], 0.0);
            system
                .set_f(self.global_eqn_ids[i], self.global_var_ids[i * 2], 1.0)
                .map_err(|e| sys_err(&self.name, e))?;
            system
                .set_f(self.global_eqn_ids[i], self.global_var_ids[i * 2 + 1], -r)
                .map_err(|e| sys_err(&self.name, e))?;
            system
                .set_f(self.global_eqn_ids[i], pc, -1.0)
                .map_err(|e| sys_err(&self.name, e))?;
        }
        for i in n_inlets..n {
            let r = params.evaluate(self.r_ids[i], 0.0);
            system
                .set_f(self.global_eqn_ids[i], self.global_var_ids[i * 2], -1.0)
                .map_err(|e| sys_err(&self.name, e))?;
            system
                .set_f(self.global_eqn_ids[i], self.global_var_ids[i * 2 + 1], -r)
                .map_err(|e| sys_err(&self.name, e))?;
            system
                .set_f(self.global_eqn_ids[i], pc, 1.0)
                .map_err(|e| sys_err(&self.name, e))?;
        }

        let mass_eqn = self.global_eqn_ids[n];
        let mut i = 1;
        while i < n_inlets * 2 {
            system
                .set_f(mass_eqn, self.global_var_ids[i], 1.0)
                .map_err(|e| sys_err(&self.name, e))?;
            i += 2;
        }
        let mut i = n_inlets * 2 + 1;
        while i < n * 2 {
            system
                .set_f(mass_eqn, self.global_var_ids[i], -1.0)
                .map_err(|e| sys_err(&self.name, e))?;
            i += 2;
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
    fn one_inlet_two_outlets_resistive_split() {
        let mut dh = DofHandler::new();
        let inlet = Node::register(NodeId::from_index(0), "in", &mut dh);
        let out1 = Node::register(NodeId::from_index(1), "out1", &mut dh);
        let out2 = Node::register(NodeId::from_index(2), "out2", &mut dh);
        let mut params = ParamStore::new();
        let r_in = params.push("R_in", Parameter::constant(1.0));
        let r_out1 = params.push("R_out1", Parameter::constant(2.0));
        let r_out2 = params.push("R_out2", Parameter::constant(2.0));

        let mut block = ResistiveJunction::new(
            "RJ0",
            vec![inlet.clone()],
            vec![out1.clone(), out2.clone()],
            vec![r_in, r_out1, r_out2],
        );
        block.setup_dofs(&mut dh);

        let mut sys = DenseSystem::new(dh.size());
        block.update_constant(&mut sys, &params).unwrap();
        sys.compress().unwrap();

        let q_in = 10.0;
        let q_out1 = 5.0;
        let q_out2 = 5.0;
        let pc = 50.0;
        let p_in = pc + 1.0 * q_in;
        let p_out1 = pc - 2.0 * q_out1;
        let p_out2 = pc - 2.0 * q_out2;

        let mut y = nalgebra::DVector::zeros(dh.size());
        y[inlet.pres_dof] = p_in;
        y[inlet.flow_dof] = q_in;
        y[out1.pres_dof] = p_out1;
        y[out1.flow_dof] = q_out1;
        y[out2.pres_dof] = p_out2;
        y[out2.flow_dof] = q_out2;
        y[*block.global_var_ids.last().unwrap()] = pc;
        let ydot = nalgebra::DVector::zeros(dh.size());

        let r = sys.residual(&y, &ydot);
        for &e in &block.global_eqn_ids {
            assert!(r[e].abs() < 1e-10);
        }
    }
}
