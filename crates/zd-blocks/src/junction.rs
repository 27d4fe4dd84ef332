//! Ideal junction: arbitrary inlets/outlets, pressure continuous across all
//! of them, mass conserved.
//!
//! `y = [P_in,1, Q_in,1, ..., P_out,1, Q_out,1, ...]`. The last equation is
//! mass conservation (`sum Q_in = sum Q_out`); every earlier equation ties
//! one node's pressure to the first node's pressure.

use zd_core::{ParamId, ParamStore};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use crate::common::{setup_dofs_, sys_err};
use crate::traits::Block;

pub struct Junction {
    name: String,
    inlet_nodes: Vec<Node>,
    outlet_nodes: Vec<Node>,
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
}

impl Junction {
    pub fn new(name: impl Into<String>, inlet_nodes: Vec<Node>, outlet_nodes: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            inlet_nodes,
            outlet_nodes,
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
        }
    }

    fn num_inlets(&self) -> usize {
        self.inlet_nodes.len()
    }

    fn num_outlets(&self) -> usize {
        self.outlet_nodes.len()
    }
}

impl Block for Junction {
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
        &[]
    }

    fn num_triplets(&self) -> NumTriplets {
        let n = self.num_inlets() + self.num_outlets();
        NumTriplets::new(0, (n.saturating_sub(1)) * 2 + n, 0)
    }

    fn setup_dofs(&mut self, dofhandler: &mut DofHandler) {
        let n = self.num_inlets() + self.num_outlets();
        let (vars, eqns) = setup_dofs_(dofhandler, &self.inlet_nodes, &self.outlet_nodes, n, &[]);
        self.global_var_ids = vars;
        self.global_eqn_ids = eqns;
    }

    fn update_constant(&self, system: &mut dyn System, _params: &ParamStore) -> zd_core::ZdResult<()> {
        let n_inlets = self.num_inlets();
        let n_outlets = self.num_outlets();
        let n = n_inlets + n_outlets;

        for i in 0..n.saturating_sub(1) {
            system
                .set_f(self.global_eqn_ids[i], self.global_var_ids[0], 1.0)
                .map_err(|e| sys_err(&self.name, e))?;
            system
                .set_f(self.global_eqn_ids[i], self.global_var_ids[2 * i + 2], -1.0)
                .map_err(|e| sys_err(&self.name, e))?;
        }

        let mass_eqn = self.global_eqn_ids[n - 1];
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
    use zd_core::NodeId;
    use zd_system::{DenseSystem, System};

    #[test]
    fn one_inlet_two_outlets_conserves_mass_and_pressure() {
        let mut dh = DofHandler::new();
        let inlet = Node::register(NodeId::from_index(0), "in", &mut dh);
        let out1 = Node::register(NodeId::from_index(1), "out1", &mut dh);
        let out2 = Node::register(NodeId::from_index(2), "out2", &mut dh);
        let params = ParamStore::new();

        let mut block = Junction::new("J0", vec![inlet.clone()], vec![out1.clone(), out2.clone()]);
        block.setup_dofs(&mut dh);

        let mut sys = DenseSystem::new(dh.size());
        block.update_constant(&mut sys, &params).unwrap();
        sys.compress().unwrap();

        let mut y = nalgebra::DVector::zeros(dh.size());
        y[inlet.pres_dof] = 100.0;
        y[out1.pres_dof] = 100.0;
        y[out2.pres_dof] = 100.0;
        y[inlet.flow_dof] = 10.0;
        y[out1.flow_dof] = 6.0;
        y[out2.flow_dof] = 4.0;
        let ydot = nalgebra::DVector::zeros(dh.size());

        let r = sys.residual(&y, &ydot);
        for &e in &block.global_eqn_ids {
            assert!(r[e].abs() < 1e-10);
        }
    }
}
