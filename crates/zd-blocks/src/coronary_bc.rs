//! Coronary boundary conditions: a resistance-capacitance ladder feeding an
//! intramyocardial compliance, either driven by its own externally-supplied
//! time series ([`OpenLoopCoronaryBc`]) or by the pressure of a ventricle
//! chamber owned by another block in the network ([`ClosedLoopCoronaryBc`]).

use std::cell::Cell;

use zd_core::numeric::Real;
use zd_core::{ParamId, ParamStore, ZdResult};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use crate::common::{setup_dofs_, sys_err};
use crate::heart_pulmonary::ClosedLoopHeartPulmonary;
use crate::traits::{Block, BlockLookup};

/// Open-loop coronary BC: `y = [P_in, Q_in, V_im]`, one internal variable.
///
/// Unsteady stencil:
/// - `Ram*Ca*dP_in/dt - Ram*Ra*Ca*dQ_in/dt - P_in + (Ra+Ram)*Q_in + V_im/Cim = 0`
/// - `Q_in - Ca*dP_in/dt + Ca*Ra*dQ_in/dt - dV_im/dt = 0`
///
/// Steady stencil drops the capacitive (E-matrix) terms entirely and ties
/// `V_im` directly to `P_im` through `Cim`, matching what the original
/// solver does for its `issteady` branch rather than just zeroing `Ca`/`Cim`.
pub struct OpenLoopCoronaryBc {
    name: String,
    node: [Node; 1],
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
    global_param_ids: Vec<ParamId>,
    ra_id: ParamId,
    ram_id: ParamId,
    rv_id: ParamId,
    ca_id: ParamId,
    cim_id: ParamId,
    pim_id: ParamId,
    pv_id: ParamId,
    steady: Cell<bool>,
}

impl OpenLoopCoronaryBc {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        node: Node,
        ra_id: ParamId,
        ram_id: ParamId,
        rv_id: ParamId,
        ca_id: ParamId,
        cim_id: ParamId,
        pim_id: ParamId,
        pv_id: ParamId,
    ) -> Self {
        Self {
            name: name.into(),
            node: [node],
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
            global_param_ids: vec![ra_id, ram_id, rv_id, ca_id, cim_id, pim_id, pv_id],
            ra_id,
            ram_id,
            rv_id,
            ca_id,
            cim_id,
            pim_id,
            pv_id,
            steady: Cell::new(false),
        }
    }
}

impl Block for OpenLoopCoronaryBc {
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
        NumTriplets::new(4, 8, 0)
    }

    fn setup_dofs(&mut self, dofhandler: &mut DofHandler) {
        let (vars, eqns) = setup_dofs_(dofhandler, &self.node, &[], 2, &["volume_im"]);
        self.global_var_ids = vars;
        self.global_eqn_ids = eqns;
    }

    fn update_time(
        &mut self,
        system: &mut dyn System,
        params: &ParamStore,
        t: Real,
    ) -> ZdResult<()> {
        let [p_in, q_in, v_im] = [
            self.global_var_ids[0],
            self.global_var_ids[1],
            self.global_var_ids[2],
        ];
        let [e0, e1] = [self.global_eqn_ids[0], self.global_eqn_ids[1]];

        let ra = params.evaluate(self.ra_id, t);
        let ram = params.evaluate(self.ram_id, t);
        let rv = params.evaluate(self.rv_id, t);
        let ca = params.evaluate(self.ca_id, t);
        let cim = params.evaluate(self.cim_id, t);
        let pim = params.evaluate(self.pim_id, t);
        let pv = params.evaluate(self.pv_id, t);
        let _ = rv;

        if self.steady.get() {
            system.set_e(e0, p_in, 0.0).map_err(|e| sys_err(&self.name, e))?;
            system.set_e(e0, q_in, 0.0).map_err(|e| sys_err(&self.name, e))?;
            system.set_e(e1, p_in, 0.0).map_err(|e| sys_err(&self.name, e))?;
            system.set_e(e1, q_in, 0.0).map_err(|e| sys_err(&self.name, e))?;

            system.set_f(e0, p_in, -1.0).map_err(|e| sys_err(&self.name, e))?;
            system
                .set_f(e0, q_in, ra + ram)
                .map_err(|e| sys_err(&self.name, e))?;
            system
                .set_f(e0, v_im, 1.0 / cim)
                .map_err(|e| sys_err(&self.name, e))?;
            system.set_f(e1, q_in, 1.0).map_err(|e| sys_err(&self.name, e))?;
            system.set_f(e1, v_im, 0.0).map_err(|e| sys_err(&self.name, e))?;

            system.set_c(e0, 0.0);
            system.set_c(e1, -(pim - pv) / ram);
        } else {
            system
                .set_e(e0, p_in, ram * ca)
                .map_err(|e| sys_err(&self.name, e))?;
            system
                .set_e(e0, q_in, -ram * ra * ca)
                .map_err(|e| sys_err(&self.name, e))?;
            system.set_e(e1, p_in, -ca).map_err(|e| sys_err(&self.name, e))?;
            system
                .set_e(e1, q_in, ca * ra)
                .map_err(|e| sys_err(&self.name, e))?;

            system.set_f(e0, p_in, -1.0).map_err(|e| sys_err(&self.name, e))?;
            system
                .set_f(e0, q_in, ra + ram)
                .map_err(|e| sys_err(&self.name, e))?;
            system
                .set_f(e0, v_im, 1.0 / cim)
                .map_err(|e| sys_err(&self.name, e))?;
            system.set_f(e1, q_in, 1.0).map_err(|e| sys_err(&self.name, e))?;

            system.set_c(e0, pim / cim);
            system.set_c(e1, 0.0);
        }
        Ok(())
    }

    fn to_steady(&mut self, params: &mut ParamStore) {
        self.steady.set(true);
        params.get_mut(self.pim_id).to_steady();
        params.get_mut(self.pv_id).to_steady();
    }

    fn to_unsteady(&mut self, params: &mut ParamStore) {
        self.steady.set(false);
        params.get_mut(self.pim_id).to_unsteady();
        params.get_mut(self.pv_id).to_unsteady();
    }
}

/// Closed-loop coronary BC: same RC ladder as the open-loop variant but with
/// an outlet node too, and its `V_im` row driven by `im * P_ventricle`
/// instead of an externally-supplied `P_im` series. `im` (`iml` or `imr`)
/// and the ventricle pressure DOF are both owned by the heart block and
/// pulled in once via `update_model_dependent_params`.
///
/// `y = [P_in, Q_in, P_out, Q_out, V_im]`.
pub struct ClosedLoopCoronaryBc {
    name: String,
    inlet: [Node; 1],
    outlet: [Node; 1],
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
    global_param_ids: Vec<ParamId>,
    ra_id: ParamId,
    ram_id: ParamId,
    rv_id: ParamId,
    ca_id: ParamId,
    cim_id: ParamId,
    side: CoronarySide,
    im: Cell<Real>,
    ventricle_var_id: Cell<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoronarySide {
    Left,
    Right,
}

impl ClosedLoopCoronaryBc {
    pub fn new(
        name: impl Into<String>,
        inlet: Node,
        outlet: Node,
        ra_id: ParamId,
        ram_id: ParamId,
        rv_id: ParamId,
        ca_id: ParamId,
        cim_id: ParamId,
        side: CoronarySide,
    ) -> Self {
        Self {
            name: name.into(),
            inlet: [inlet],
            outlet: [outlet],
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
            global_param_ids: vec![ra_id, ram_id, rv_id, ca_id, cim_id],
            ra_id,
            ram_id,
            rv_id,
            ca_id,
            cim_id,
            side,
            im: Cell::new(0.0),
            ventricle_var_id: Cell::new(0),
        }
    }
}

impl Block for ClosedLoopCoronaryBc {
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
        NumTriplets::new(5, 9, 0)
    }

    fn setup_dofs(&mut self, dofhandler: &mut DofHandler) {
        let (vars, eqns) = setup_dofs_(dofhandler, &self.inlet, &self.outlet, 3, &["volume_im"]);
        self.global_var_ids = vars;
        self.global_eqn_ids = eqns;
    }

    fn update_constant(&self, system: &mut dyn System, params: &ParamStore) -> ZdResult<()> {
        let [p_in, q_in, p_out, q_out, v_im] = [
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
        let ra = params.evaluate(self.ra_id, 0.0);
        let ram = params.evaluate(self.ram_id, 0.0);
        let rv = params.evaluate(self.rv_id, 0.0);
        let ca = params.evaluate(self.ca_id, 0.0);
        let cim = params.evaluate(self.cim_id, 0.0);

        system.set_e(e0, p_in, -ram * ca).map_err(|e| sys_err(&self.name, e))?;
        system
            .set_e(e0, q_in, ram * ra * ca)
            .map_err(|e| sys_err(&self.name, e))?;
        system.set_e(e1, p_in, -ca).map_err(|e| sys_err(&self.name, e))?;
        system.set_e(e1, q_in, ca * ra).map_err(|e| sys_err(&self.name, e))?;
        system.set_e(e1, v_im, -1.0).map_err(|e| sys_err(&self.name, e))?;

        system.set_f(e0, p_in, -1.0).map_err(|e| sys_err(&self.name, e))?;
        system
            .set_f(e0, q_in, ra + ram)
            .map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e0, p_out, 1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e0, q_out, rv).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e1, q_in, 1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e1, q_out, -1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e2, p_out, cim).map_err(|e| sys_err(&self.name, e))?;
        system
            .set_f(e2, q_out, cim * rv)
            .map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e2, v_im, -1.0).map_err(|e| sys_err(&self.name, e))?;
        Ok(())
    }

    fn update_solution(
        &mut self,
        system: &mut dyn System,
        params: &ParamStore,
        y: &mut nalgebra::DVector<Real>,
        _ydot: &nalgebra::DVector<Real>,
    ) -> ZdResult<()> {
        let cim = params.evaluate(self.cim_id, 0.0);
        let p_im = self.im.get() * y[self.ventricle_var_id.get()];
        system
            .set_c(self.global_eqn_ids[2], -cim * p_im);
        Ok(())
    }

    fn update_model_dependent_params(&mut self, params: &ParamStore, lookup: &dyn BlockLookup) {
        let Some(heart) = lookup.block_by_name("CLH") else {
            return;
        };
        let Some(heart) = heart.as_any().downcast_ref::<ClosedLoopHeartPulmonary>() else {
            return;
        };
        match self.side {
            CoronarySide::Left => {
                self.im.set(heart.iml_value(params));
                self.ventricle_var_id.set(heart.lv_pressure_dof());
            }
            CoronarySide::Right => {
                self.im.set(heart.imr_value(params));
                self.ventricle_var_id.set(heart.rv_pressure_dof());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zd_core::{NodeId, Parameter};
    use zd_system::{DenseSystem, System};

    fn params(steady_pim: Real, steady_pv: Real) -> (ParamStore, [ParamId; 7]) {
        let mut p = ParamStore::new();
        let ra = p.push("Ra", Parameter::constant(1.0));
        let ram = p.push("Ram", Parameter::constant(2.0));
        let rv = p.push("Rv", Parameter::constant(0.5));
        let ca = p.push("Ca", Parameter::constant(3.0));
        let cim = p.push("Cim", Parameter::constant(4.0));
        let pim = p.push("Pim", Parameter::constant(steady_pim));
        let pv = p.push("Pv", Parameter::constant(steady_pv));
        (p, [ra, ram, rv, ca, cim, pim, pv])
    }

    #[test]
    fn steady_residual_is_zero_for_consistent_state() {
        let mut dh = DofHandler::new();
        let node = Node::register(NodeId::from_index(0), "cor", &mut dh);
        let (mut params, [ra, ram, rv, ca, cim, pim, pv]) = params(20.0, 4.0);
        let mut block = OpenLoopCoronaryBc::new("COR0", node, ra, ram, rv, ca, cim, pim, pv);
        let _ = (rv, ca, pv);
        block.setup_dofs(&mut dh);
        block.to_steady(&mut params);

        let mut sys = DenseSystem::new(dh.size());
        block.update_time(&mut sys, &params, 0.0).unwrap();
        sys.compress().unwrap();

        // Steady stencil: Q_in = (Pim-Pv)/Ram; P_in = (Ra+Ram)*Q_in + V_im/Cim.
        let ra_val = params.evaluate(ra, 0.0);
        let ram_val = params.evaluate(ram, 0.0);
        let cim_val = params.evaluate(cim, 0.0);
        let q_in = (20.0 - 4.0) / ram_val;
        let v_im = 50.0;
        let p_in = (ra_val + ram_val) * q_in + v_im / cim_val;
        let y = nalgebra::DVector::from_vec(vec![p_in, q_in, v_im]);
        let ydot = nalgebra::DVector::zeros(3);
        let r = sys.residual(&y, &ydot);
        for &e in &block.global_eqn_ids {
            assert!(r[e].abs() < 1e-9);
        }
    }
}
