//! Windkessel (RCR) boundary condition: proximal resistance, capacitance to
//! an internal pressure variable, distal resistance to a reference pressure.
//!
//! `y = [P, Q, P_c]`. Governing equations (code order, matches the original
//! solver rather than the doc comment in its header, which lists them the
//! other way round):
//! - `P - P_c - Rp*Q = 0`
//! - `Rd*Q - P_c - Rd*C*dP_c/dt + Pd = 0`

use zd_core::numeric::Real;
use zd_core::{ParamId, ParamStore};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use crate::common::{setup_dofs_, sys_err};
use crate::traits::Block;

pub struct WindkesselBc {
    name: String,
    node: [Node; 1],
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
    global_param_ids: Vec<ParamId>,
    rp_id: ParamId,
    c_id: ParamId,
    rd_id: ParamId,
    pd_id: ParamId,
}

impl WindkesselBc {
    pub fn new(
        name: impl Into<String>,
        node: Node,
        rp_id: ParamId,
        c_id: ParamId,
        rd_id: ParamId,
        pd_id: ParamId,
    ) -> Self {
        Self {
            name: name.into(),
            node: [node],
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
            global_param_ids: vec![rp_id, c_id, rd_id, pd_id],
            rp_id,
            c_id,
            rd_id,
            pd_id,
        }
    }
}

impl Block for WindkesselBc {
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
        NumTriplets::new(1, 5, 0)
    }

    fn setup_dofs(&mut self, dofhandler: &mut DofHandler) {
        let (vars, eqns) = setup_dofs_(dofhandler, &self.node, &[], 2, &["pressure_c"]);
        self.global_var_ids = vars;
        self.global_eqn_ids = eqns;
    }

    fn update_constant(&self, system: &mut dyn System, _params: &ParamStore) -> zd_core::ZdResult<()> {
        let [p, q, pc] = [self.global_var_ids[0], self.global_var_ids[1], self.global_var_ids[2]];
        let [e0, e1] = [self.global_eqn_ids[0], self.global_eqn_ids[1]];
        system.set_f(e0, p, 1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e0, pc, -1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e1, pc, -1.0).map_err(|e| sys_err(&self.name, e))?;
        let _ = q;
        Ok(())
    }

    fn update_time(
        &mut self,
        system: &mut dyn System,
        params: &ParamStore,
        t: Real,
    ) -> zd_core::ZdResult<()> {
        let [q, pc] = [self.global_var_ids[1], self.global_var_ids[2]];
        let [e0, e1] = [self.global_eqn_ids[0], self.global_eqn_ids[1]];
        let rp = params.evaluate(self.rp_id, t);
        let rd = params.evaluate(self.rd_id, t);
        let c = params.evaluate(self.c_id, t);
        let pd = params.evaluate(self.pd_id, t);

        system.set_e(e1, pc, -rd * c).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e0, q, -rp).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e1, q, rd).map_err(|e| sys_err(&self.name, e))?;
        system.set_c(e1, pd);
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
    fn steady_state_residual_is_zero_for_consistent_state() {
        let mut dh = DofHandler::new();
        let node = Node::register(NodeId::from_index(0), "bc", &mut dh);
        let mut params = ParamStore::new();
        let rp_id = params.push("Rp", Parameter::constant(1.0));
        let c_id = params.push("C", Parameter::constant(2.0));
        let rd_id = params.push("Rd", Parameter::constant(10.0));
        let pd_id = params.push("Pd", Parameter::constant(0.0));
        let mut block = WindkesselBc::new("RCR0", node, rp_id, c_id, rd_id, pd_id);
        block.setup_dofs(&mut dh);

        let mut sys = DenseSystem::new(dh.size());
        block.update_constant(&mut sys, &params).unwrap();
        block.update_time(&mut sys, &params, 0.0).unwrap();
        sys.compress().unwrap();

        // Q = 1, Rd*Q = 10 => Pc = 10 (steady, ydot=0); P = Pc + Rp*Q = 11
        let q = 1.0;
        let pc = 10.0;
        let p = pc + 1.0 * q;
        let y = nalgebra::DVector::from_vec(vec![p, q, pc]);
        let ydot = nalgebra::DVector::zeros(3);
        let r = sys.residual(&y, &ydot);
        assert!(r[block.global_eqn_ids[0]].abs() < 1e-10);
        assert!(r[block.global_eqn_ids[1]].abs() < 1e-10);
    }
}
