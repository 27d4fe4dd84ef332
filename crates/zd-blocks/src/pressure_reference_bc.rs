//! Prescribed-pressure boundary condition: `P - P_ref(t) = 0`.

use zd_core::numeric::Real;
use zd_core::{ParamId, ParamStore};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use crate::common::{setup_dofs_, sys_err};
use crate::traits::Block;

/// Fixes the pressure at a single node to a (possibly time-varying) value.
pub struct PressureReferenceBc {
    name: String,
    node: [Node; 1],
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
    global_param_ids: Vec<ParamId>,
    p_id: ParamId,
}

impl PressureReferenceBc {
    pub fn new(name: impl Into<String>, node: Node, p_id: ParamId) -> Self {
        Self {
            name: name.into(),
            node: [node],
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
            global_param_ids: vec![p_id],
            p_id,
        }
    }
}

impl Block for PressureReferenceBc {
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
        NumTriplets::new(0, 1, 0)
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
        system.set_c(self.global_eqn_ids[0], -params.evaluate(self.p_id, t));
        Ok(())
    }

    fn to_steady(&mut self, params: &mut ParamStore) {
        params.get_mut(self.p_id).to_steady();
    }

    fn to_unsteady(&mut self, params: &mut ParamStore) {
        params.get_mut(self.p_id).to_unsteady();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zd_core::{NodeId, Parameter};
    use zd_system::{DenseSystem, System};

    #[test]
    fn prescribes_pressure_at_time() {
        let mut dh = DofHandler::new();
        let node = Node::register(NodeId::from_index(0), "bc", &mut dh);
        let mut params = ParamStore::new();
        let p_id = params.push("P", Parameter::constant(80.0));
        let mut block = PressureReferenceBc::new("PRESSURE0", node, p_id);
        block.setup_dofs(&mut dh);

        let mut sys = DenseSystem::new(dh.size());
        block.update_constant(&mut sys, &params).unwrap();
        sys.compress().unwrap();
        block.update_time(&mut sys, &params, 0.0).unwrap();

        assert_eq!(sys.f[(block.global_eqn_ids[0], block.global_var_ids[0])], 1.0);
        assert_eq!(sys.c[block.global_eqn_ids[0]], -80.0);
    }
}
