//! Pure resistance boundary condition: `P - R(t)*Q - Pd(t) = 0`.

use zd_core::numeric::Real;
use zd_core::{ParamId, ParamStore};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use crate::common::{setup_dofs_, sys_err};
use crate::traits::Block;

/// A resistor to a (possibly time-varying) distal pressure.
pub struct ResistanceBc {
    name: String,
    node: [Node; 1],
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
    global_param_ids: Vec<ParamId>,
    r_id: ParamId,
    pd_id: ParamId,
}

impl ResistanceBc {
    pub fn new(name: impl Into<String>, node: Node, r_id: ParamId, pd_id: ParamId) -> Self {
        Self {
            name: name.into(),
            node: [node],
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
            global_param_ids: vec![r_id, pd_id],
            r_id,
            pd_id,
        }
    }
}

impl Block for ResistanceBc {
    fn name(&self) -> &str {
        &self.name
    }
    fn inlet_nodes(&self) -> &[Node] {
        &self.node
    }
    fn outlet_nodes(&self) -> &[Node] {
        &[]
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
        NumTriplets::new(0, 2, 0)
    }

    fn setup_dofs(&mut self, dofhandler: &mut DofHandler) {
        let (vars, eqns) = setup_dofs_(dofhandler, &self.node, &[], 1, &[]);
        self.global_var_ids = vars;
        self.global_eqn_ids = eqns;
    }

    fn update_constant(&self, system: &mut dyn System, _params: &ParamStore) -> zd_core::ZdResult<()> {
        system
            .set_f(self.global_eqn_ids[0], self.global_var_ids[0], 1.0)
            .map_err(|e| sys_err(&self.name, e))?;
        Ok(())
    }

    fn update_time(
        &mut self,
        system: &mut dyn System,
        params: &ParamStore,
        t: Real,
    ) -> zd_core::ZdResult<()> {
        let r = params.evaluate(self.r_id, t);
        system
            .set_f(self.global_eqn_ids[0], self.global_var_ids[1], -r)
            .map_err(|e| sys_err(&self.name, e))?;
        system.set_c(self.global_eqn_ids[0], -params.evaluate(self.pd_id, t));
        Ok(())
    }

    fn to_steady(&mut self, params: &mut ParamStore) {
        params.get_mut(self.r_id).to_steady();
        params.get_mut(self.pd_id).to_steady();
    }

    fn to_unsteady(&mut self, params: &mut ParamStore) {
        params.get_mut(self.r_id).to_unsteady();
        params.get_mut(self.pd_id).to_unsteady();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zd_core::{NodeId, Parameter};
    use zd_system::{DenseSystem, System};

    #[test]
    fn pressure_equals_resistance_times_flow_plus_distal() {
        let mut dh = DofHandler::new();
        let node = Node::register(NodeId::from_index(0), "bc", &mut dh);
        let mut params = ParamStore::new();
        let r_id = params.push("R", Parameter::constant(2.0));
        let pd_id = params.push("Pd", Parameter::constant(10.0));
        let mut block = ResistanceBc::new("RESISTANCE0", node, r_id, pd_id);
        block.setup_dofs(&mut dh);

        let mut sys = DenseSystem::new(dh.size());
        block.update_constant(&mut sys, &params).unwrap();
        block.update_time(&mut sys, &params, 0.0).unwrap();
        sys.compress().unwrap();

        let y = nalgebra::DVector::from_vec(vec![20.0, 5.0]);
        let ydot = nalgebra::DVector::zeros(2);
        let r = sys.residual(&y, &ydot);
        // P - R*Q - Pd = 20 - 2*5 - 10 = 0
        assert!(r[block.global_eqn_ids[0]].abs() < 1e-12);
    }
}
