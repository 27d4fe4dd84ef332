//! Closed-loop RCR: a Windkessel stencil with both an inlet and an outlet
//! node, used when the distal side connects into another closed-loop block
//! instead of a fixed reference pressure.
//!
//! `y = [P_in, Q_in, P_out, Q_out, P_c]`.
//! - `C*dP_c/dt + Q_out - Q_in = 0`
//! - `P_in - P_c - Rp*Q_in = 0`
//! - `P_c - P_out - Rd*Q_out = 0`
//!
//! Rp/C/Rd are constant for this block in the original solver ("can be
//! unsteady if needed, not currently implemented"); only `to_steady` varies
//! them, via the shared `ParamStore` caching.

use zd_core::{ParamId, ParamStore};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use crate::common::{setup_dofs_, sys_err};
use crate::traits::Block;

pub struct ClosedLoopRcrBc {
    name: String,
    inlet: [Node; 1],
    outlet: [Node; 1],
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
    global_param_ids: Vec<ParamId>,
    rp_id: ParamId,
    c_id: ParamId,
    rd_id: ParamId,
}

impl ClosedLoopRcrBc {
    pub fn new(
        name: impl Into<String>,
        inlet: Node,
        outlet: Node,
        rp_id: ParamId,
        c_id: ParamId,
        rd_id: ParamId,
    ) -> Self {
        Self {
            name: name.into(),
            inlet: [inlet],
            outlet: [outlet],
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
            global_param_ids: vec![rp_id, c_id, rd_id],
            rp_id,
            c_id,
            rd_id,
        }
    }
}

impl Block for ClosedLoopRcrBc {
    fn name(&self) -> &str {
        &self.name
    }
    fn inlet_nodes(&self) -> &[Node] {
        &self.inlet
    }
    fn outlet_nodes(&self) -> &[Node] {
        &self.outlet
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
        NumTriplets::new(1, 8, 0)
    }

    fn setup_dofs(&mut self, dofhandler: &mut DofHandler) {
        let (vars, eqns) = setup_dofs_(dofhandler, &self.inlet, &self.outlet, 3, &["P_c"]);
        self.global_var_ids = vars;
        self.global_eqn_ids = eqns;
    }

    fn update_constant(&self, system: &mut dyn System, params: &ParamStore) -> zd_core::ZdResult<()> {
        let [p_in, q_in, p_out, q_out, pc] = [
            self.global_var_ids[0],
            self.global_var_ids[1],
            self.global_var_ids[2],
            self.global_var_ids[3],
            self.global_var_ids[4],
        ];
        let [e0, e1, e2] = [
            self.global_eqn_ids[0],
            self.global_eqn_ids[1],
            self.global_eqn_ids[2],
        ];
        let rp = params.evaluate(self.rp_id, 0.0);
        let c = params.evaluate(self.c_id, 0.0);
        let rd = params.evaluate(self.rd_id, 0.0);

        system.set_f(e0, q_in, -1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e0, q_out, 1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e1, p_in, 1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e1, pc, -1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e2, p_out, -1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e2, pc, 1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_e(e0, pc, c).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e1, q_in, -rp).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e2, q_out, -rd).map_err(|e| sys_err(&self.name, e))?;
        Ok(())
    }

    fn to_steady(&mut self, params: &mut ParamStore) {
        params.get_mut(self.c_id).to_steady();
    }

    fn to_unsteady(&mut self, params: &mut ParamStore) {
        params.get_mut(self.c_id).to_unsteady();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zd_core::{NodeId, Parameter};
    use zd_system::{DenseSystem, System};

    #[test]
    fn steady_residual_is_zero_with_matching_flows() {
        let mut dh = DofHandler::new();
        let inlet = Node::register(NodeId::from_index(0), "in", &mut dh);
        let outlet = Node::register(NodeId::from_index(1), "out", &mut dh);
        let mut params = ParamStore::new();
        let rp_id = params.push("Rp", Parameter::constant(1.0));
        let c_id = params.push("C", Parameter::constant(2.0));
        let rd_id = params.push("Rd", Parameter::constant(4.0));
        let mut block = ClosedLoopRcrBc::new("CLRCR0", inlet, outlet, rp_id, c_id, rd_id);
        block.setup_dofs(&mut dh);

        let mut sys = DenseSystem::new(dh.size());
        block.update_constant(&mut sys, &params).unwrap();
        sys.compress().unwrap();

        let q = 2.0;
        let pc = 10.0;
        let p_in = pc + 1.0 * q;
        let p_out = pc - 4.0 * q;
        let y = nalgebra::DVector::from_vec(vec![p_in, q, p_out, q, pc]);
        let ydot = nalgebra::DVector::zeros(5);
        let r = sys.residual(&y, &ydot);
        for &e in &block.global_eqn_ids {
            assert!(r[e].abs() < 1e-10);
        }
    }
}
