//! RCL blood vessel with an optional nonlinear stenosis term.
//!
//! `y = [P_in, Q_in, P_out, Q_out, P_c]`, params `[R, C, L, stenosis]`.
//! - `P_in - P_out - (R + R_ste)*Q_in - L*dQ_out/dt = 0`
//! - `Q_in - Q_out - C*dP_c/dt = 0`
//! - `P_in - (R + R_ste)*Q_in - P_c = 0`
//!
//! `R_ste = stenosis * |Q_in|` is nonlinear in `Q_in`, so it is recomputed
//! every Newton iteration in `update_solution` (not `update_constant`) and
//! contributes a D-matrix term (`D = ∂c/∂y`, same sign as the `c`/`F*y`
//! convention) on top of its F-matrix linearization.

use std::cell::Cell;

use nalgebra::{DMatrix, DVector};
use zd_core::numeric::Real;
use zd_core::{ParamId, ParamStore, ZdResult};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use crate::common::{setup_dofs_, sys_err};
use crate::traits::Block;

pub struct BloodVessel {
    name: String,
    inlet: [Node; 1],
    outlet: [Node; 1],
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
    global_param_ids: Vec<ParamId>,
    r_id: ParamId,
    c_id: ParamId,
    l_id: ParamId,
    stenosis_id: ParamId,
    c_cache: Cell<Option<Real>>,
}

impl BloodVessel {
    pub fn new(
        name: impl Into<String>,
        inlet: Node,
        outlet: Node,
        r_id: ParamId,
        c_id: ParamId,
        l_id: ParamId,
        stenosis_id: ParamId,
    ) -> Self {
        Self {
            name: name.into(),
            inlet: [inlet],
            outlet: [outlet],
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
            global_param_ids: vec![r_id, c_id, l_id, stenosis_id],
            r_id,
            c_id,
            l_id,
            stenosis_id,
            c_cache: Cell::new(None),
        }
    }
}

impl BloodVessel {
    /// Redirect this vessel's inlet-flow column from the shared node DOF it
    /// was set up with to `dof`. Used by [`crate::blood_vessel_junction::BloodVesselJunction`]
    /// to give each per-outlet sub-vessel its own internal flow variable
    /// while still sharing the junction's single inlet node pressure.
    pub(crate) fn redirect_inlet_flow_dof(&mut self, dof: usize) {
        self.global_var_ids[1] = dof;
    }
}

impl Block for BloodVessel {
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
        NumTriplets::new(2, 10, 2)
    }

    fn setup_dofs(&mut self, dofhandler: &mut DofHandler) {
        let (vars, eqns) = setup_dofs_(dofhandler, &self.inlet, &self.outlet, 3, &["pressure_c"]);
        self.global_var_ids = vars;
        self.global_eqn_ids = eqns;
    }

    fn update_constant(&self, system: &mut dyn System, params: &ParamStore) -> ZdResult<()> {
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
        let r = params.evaluate(self.r_id, 0.0);
        let c = params.evaluate(self.c_id, 0.0);
        let l = params.evaluate(self.l_id, 0.0);

        system.set_e(e0, q_out, -l).map_err(|e| sys_err(&self.name, e))?;
        system.set_e(e1, pc, -c).map_err(|e| sys_err(&self.name, e))?;

        system.set_f(e0, p_in, 1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e0, q_in, -r).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e0, p_out, -1.0).map_err(|e| sys_err(&self.name, e))?;

        system.set_f(e1, q_in, 1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e1, q_out, -1.0).map_err(|e| sys_err(&self.name, e))?;

        system.set_f(e2, p_in, 1.0).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e2, q_in, -r).map_err(|e| sys_err(&self.name, e))?;
        system.set_f(e2, pc, -1.0).map_err(|e| sys_err(&self.name, e))?;
        Ok(())
    }

    fn update_solution(
        &mut self,
        system: &mut dyn System,
        params: &ParamStore,
        y: &mut DVector<Real>,
        _ydot: &DVector<Real>,
    ) -> ZdResult<()> {
        let q_in_dof = self.global_var_ids[1];
        let q_in = y[q_in_dof].abs();
        let stenosis = params.evaluate(self.stenosis_id, 0.0);
        let r = params.evaluate(self.r_id, 0.0);

        let fac1 = -stenosis * q_in;
        let fac2 = fac1 - r;

        system
            .set_f(self.global_eqn_ids[0], q_in_dof, fac2)
            .map_err(|e| sys_err(&self.name, e))?;
        system
            .set_f(self.global_eqn_ids[2], q_in_dof, fac2)
            .map_err(|e| sys_err(&self.name, e))?;
        system
            .set_d(self.global_eqn_ids[0], q_in_dof, fac1)
            .map_err(|e| sys_err(&self.name, e))?;
        system
            .set_d(self.global_eqn_ids[2], q_in_dof, fac1)
            .map_err(|e| sys_err(&self.name, e))?;
        Ok(())
    }

    fn to_steady(&mut self, params: &mut ParamStore) {
        let current = params.get(self.c_id).evaluate(0.0);
        self.c_cache.set(Some(current));
        let _ = params.get_mut(self.c_id).update(&[0.0]);
    }

    fn to_unsteady(&mut self, params: &mut ParamStore) {
        if let Some(c) = self.c_cache.take() {
            let _ = params.get_mut(self.c_id).update(&[c]);
        }
    }

    fn update_gradient(
        &self,
        x: &mut DMatrix<Real>,
        yvec: &mut DVector<Real>,
        row_offset: usize,
        y: &DVector<Real>,
        ydot: &DVector<Real>,
    ) -> ZdResult<()> {
        let [y0, y1, y2, y3, y4] = [
            y[self.global_var_ids[0]],
            y[self.global_var_ids[1]],
            y[self.global_var_ids[2]],
            y[self.global_var_ids[3]],
            y[self.global_var_ids[4]],
        ];
        let dy3 = ydot[self.global_var_ids[3]];
        let dy4 = ydot[self.global_var_ids[4]];

        let [e0, e1, e2] = [
            row_offset + self.global_eqn_ids[0],
            row_offset + self.global_eqn_ids[1],
            row_offset + self.global_eqn_ids[2],
        ];

        x[(e0, self.r_id)] = y1;
        x[(e2, self.r_id)] = y1;
        x[(e0, self.l_id)] = dy3;
        x[(e1, self.c_id)] = dy4;

        yvec[e0] = y0 - y2;
        yvec[e1] = y1 - y3;
        yvec[e2] = y0 - y4;

        let fac1 = y1.abs() * y1;
        x[(e0, self.stenosis_id)] = fac1;
        x[(e2, self.stenosis_id)] = fac1;
        Ok(())
    }
}
