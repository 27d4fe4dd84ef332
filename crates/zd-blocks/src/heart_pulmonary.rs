//! Four-chamber heart plus pulmonary circulation, for closed-loop runs that
//! model the whole circulatory loop rather than bounding it with prescribed
//! BCs. One inlet node (right atrium inflow), one outlet node (aortic
//! outflow), twelve internal variables, fourteen equations.
//!
//! Elastance-driven chambers (ventricles) and exponential pressure-volume
//! chambers (atria) are both gated by a periodic atrial-activation function
//! `AA(t)`, and four ideal diodes (valves) zero both their flow coefficient
//! and the flow DOF itself whenever the chamber they drain has stopped
//! emptying into the next one.
//!
//! Reference for the underlying model: Sankaran et al., "Patient-specific
//! multiscale modeling of blood flow for coronary artery bypass graft
//! surgery", Annals of Biomedical Engineering 40(10), 2012.

use nalgebra::DVector;
use zd_core::numeric::Real;
use zd_core::{ParamId, ParamStore, ZdResult};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use crate::common::sys_err;
use crate::traits::Block;

const PI: Real = std::f64::consts::PI;

const ELASTANCE_MODES: [(Real, Real); 25] = [
    (0.283748803, 0.000000000),
    (0.031830626, -0.374299825),
    (-0.209472400, -0.018127770),
    (0.020520047, 0.073971113),
    (0.008316883, -0.047249597),
    (-0.041677660, 0.003212163),
    (0.000867323, 0.019441411),
    (-0.001675379, -0.005565534),
    (-0.011252277, 0.003401432),
    (-0.000414677, 0.008376795),
    (0.000253749, -0.000071880),
    (-0.002584966, 0.001566861),
    (0.000584752, 0.003143555),
    (0.000028502, -0.000024787),
    (0.000022961, -0.000007476),
    (0.000018735, -0.000001281),
    (0.000015573, 0.000001781),
    (0.000013133, 0.000003494),
    (0.000011199, 0.000004507),
    (0.000009634, 0.000005117),
    (0.000008343, 0.000005481),
    (0.000007265, 0.000005687),
    (0.000006354, 0.000005789),
    (0.000005575, 0.000005821),
    (0.000004903, 0.000005805),
];

/// The 27 parameters of the heart/pulmonary block, held by name since they
/// are looked up from a config section rather than per-block wiring.
#[derive(Clone, Copy, Debug)]
pub struct HeartParameters {
    pub tsa: ParamId,
    pub tpwave: ParamId,
    pub erv_s: ParamId,
    pub elv_s: ParamId,
    pub iml: ParamId,
    pub imr: ParamId,
    pub lra_v: ParamId,
    pub rra_v: ParamId,
    pub lrv_a: ParamId,
    pub rrv_a: ParamId,
    pub lla_v: ParamId,
    pub rla_v: ParamId,
    pub llv_a: ParamId,
    pub rlv_ao: ParamId,
    pub vrv_u: ParamId,
    pub vlv_u: ParamId,
    pub rpd: ParamId,
    pub cp: ParamId,
    pub cpa: ParamId,
    pub kxp_ra: ParamId,
    pub kxv_ra: ParamId,
    pub kxp_la: ParamId,
    pub kxv_la: ParamId,
    pub emax_ra: ParamId,
    pub emax_la: ParamId,
    pub vaso_ra: ParamId,
    pub vaso_la: ParamId,
}

impl HeartParameters {
    fn ids(&self) -> [ParamId; 27] {
        [
            self.tsa,
            self.tpwave,
            self.erv_s,
            self.elv_s,
            self.iml,
            self.imr,
            self.lra_v,
            self.rra_v,
            self.lrv_a,
            self.rrv_a,
            self.lla_v,
            self.rla_v,
            self.llv_a,
            self.rlv_ao,
            self.vrv_u,
            self.vlv_u,
            self.rpd,
            self.cp,
            self.cpa,
            self.kxp_ra,
            self.kxv_ra,
            self.kxp_la,
            self.kxv_la,
            self.emax_ra,
            self.emax_la,
            self.vaso_ra,
            self.vaso_la,
        ]
    }
}

pub struct ClosedLoopHeartPulmonary {
    name: String,
    inlet: [Node; 1],
    outlet: [Node; 1],
    global_var_ids: Vec<usize>,
    global_eqn_ids: Vec<usize>,
    global_param_ids: Vec<ParamId>,
    params: HeartParameters,
    cardiac_cycle_period: Real,
    activation: Real,
    elv: Real,
    erv: Real,
    psi_ra: Real,
    psi_la: Real,
    psi_ra_derivative: Real,
    psi_la_derivative: Real,
    valve_ra_rv: Real,
    valve_rv_pul: Real,
    valve_la_lv: Real,
    valve_lv_ao: Real,
}

impl ClosedLoopHeartPulmonary {
    pub fn new(
        name: impl Into<String>,
        inlet: Node,
        outlet: Node,
        params: HeartParameters,
        cardiac_cycle_period: Real,
    ) -> Self {
        Self {
            name: name.into(),
            inlet: [inlet],
            outlet: [outlet],
            global_var_ids: Vec::new(),
            global_eqn_ids: Vec::new(),
            global_param_ids: params.ids().to_vec(),
            params,
            cardiac_cycle_period,
            activation: 0.0,
            elv: 0.0,
            erv: 0.0,
            psi_ra: 0.0,
            psi_la: 0.0,
            psi_ra_derivative: 0.0,
            psi_la_derivative: 0.0,
            valve_ra_rv: 1.0,
            valve_rv_pul: 1.0,
            valve_la_lv: 1.0,
            valve_lv_ao: 1.0,
        }
    }

    /// Seed volumes/pulmonary pressure the way the reference solver does;
    /// chamber pressures are left to the initial Newton solve.
    pub fn set_initial_conditions(&self, y: &mut DVector<Real>) {
        y[self.global_var_ids[4]] = 38.43; // RA volume
        y[self.global_var_ids[7]] = 96.07; // RV volume
        y[self.global_var_ids[11]] = 38.43; // LA volume
        y[self.global_var_ids[14]] = 96.07; // LV volume
        y[self.global_var_ids[9]] = 8.0; // pulmonary pressure
    }

    /// Scaling from LV pressure to intramyocardial pressure, read by the
    /// closed-loop left coronary BC.
    pub fn iml_value(&self, params: &ParamStore) -> Real {
        params.evaluate(self.params.iml, 0.0)
    }

    /// Scaling from RV pressure to intramyocardial pressure, read by the
    /// closed-loop right coronary BC.
    pub fn imr_value(&self, params: &ParamStore) -> Real {
        params.evaluate(self.params.imr, 0.0)
    }

    /// Solution DOF carrying the left-ventricle pressure.
    pub fn lv_pressure_dof(&self) -> usize {
        self.global_var_ids[13]
    }

    /// Solution DOF carrying the right-ventricle pressure.
    pub fn rv_pressure_dof(&self) -> usize {
        self.global_var_ids[6]
    }

    fn activation_and_elastance(&mut self, params: &ParamStore, t: Real) {
        let t_cardiac = self.cardiac_cycle_period;
        let tsa = t_cardiac * params.evaluate(self.params.tsa, t);
        let tpwave = t_cardiac / params.evaluate(self.params.tpwave, t);
        let t_in_cycle = t.rem_euclid(t_cardiac);

        self.activation = if t_in_cycle <= tpwave {
            0.5 * (1.0 - (2.0 * PI * (t_in_cycle - tpwave + tsa) / tsa).cos())
        } else if t_in_cycle >= (t_cardiac - tsa) + tpwave && t_in_cycle < t_cardiac {
            0.5 * (1.0 - (2.0 * PI * (t_in_cycle - tpwave - (t_cardiac - tsa)) / tsa).cos())
        } else {
            0.0
        };

        let mut elv_i = 0.0;
        for (i, (a, b)) in ELASTANCE_MODES.iter().enumerate() {
            let phase = 2.0 * PI * i as Real * t_in_cycle / t_cardiac;
            elv_i += a * phase.cos() - b * phase.sin();
        }
        self.elv = elv_i * params.evaluate(self.params.elv_s, t);
        self.erv = elv_i * params.evaluate(self.params.erv_s, t);
    }

    fn psi_atria(&mut self, params: &ParamStore, y: &DVector<Real>) {
        let ra_volume = y[self.global_var_ids[4]];
        let la_volume = y[self.global_var_ids[11]];
        let kxp_ra = params.evaluate(self.params.kxp_ra, 0.0);
        let kxv_ra = params.evaluate(self.params.kxv_ra, 0.0);
        let kxp_la = params.evaluate(self.params.kxp_la, 0.0);
        let kxv_la = params.evaluate(self.params.kxv_la, 0.0);
        let vaso_ra = params.evaluate(self.params.vaso_ra, 0.0);
        let vaso_la = params.evaluate(self.params.vaso_la, 0.0);

        self.psi_ra = kxp_ra * (((ra_volume - vaso_ra) * kxv_ra).exp() - 1.0);
        self.psi_la = kxp_la * (((la_volume - vaso_la) * kxv_la).exp() - 1.0);
        self.psi_ra_derivative = kxp_ra * ((ra_volume - vaso_ra) * kxv_ra).exp() * kxv_ra;
        self.psi_la_derivative = kxp_la * ((la_volume - vaso_la) * kxv_la).exp() * kxv_la;
    }

    /// Zero a flow coefficient AND clamp the flow DOF to zero once the
    /// diode it belongs to shuts, the way the reference solver patches `y`
    /// in place rather than leaving the column unconstrained.
    fn valve_positions(&mut self, y: &mut DVector<Real>) {
        self.valve_ra_rv = 1.0;
        self.valve_rv_pul = 1.0;
        self.valve_la_lv = 1.0;
        self.valve_lv_ao = 1.0;

        let p_ra = y[self.global_var_ids[0]];
        let p_rv = y[self.global_var_ids[6]];
        let q_ra = y[self.global_var_ids[5]];
        if p_ra <= p_rv && q_ra <= 0.0 {
            self.valve_ra_rv = 0.0;
            y[self.global_var_ids[5]] = 0.0;
        }

        let p_pul = y[self.global_var_ids[9]];
        let q_rv = y[self.global_var_ids[8]];
        if p_rv <= p_pul && q_rv <= 0.0 {
            self.valve_rv_pul = 0.0;
            y[self.global_var_ids[8]] = 0.0;
        }

        let p_la = y[self.global_var_ids[10]];
        let p_lv = y[self.global_var_ids[13]];
        let q_la = y[self.global_var_ids[12]];
        if p_la <= p_lv && q_la <= 0.0 {
            self.valve_la_lv = 0.0;
            y[self.global_var_ids[12]] = 0.0;
        }

        let p_ao = y[self.global_var_ids[2]];
        let q_lv = y[self.global_var_ids[15]];
        if p_lv <= p_ao && q_lv <= 0.0 {
            self.valve_lv_ao = 0.0;
            y[self.global_var_ids[15]] = 0.0;
        }
    }
}

impl Block for ClosedLoopHeartPulmonary {
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
        NumTriplets::new(10, 33, 2)
    }

    fn setup_dofs(&mut self, dofhandler: &mut DofHandler) {
        let (vars, eqns) = crate::common::setup_dofs_(
            dofhandler,
            &self.inlet,
            &self.outlet,
            14,
            &[
                "V_RA", "Q_RA", "P_RV", "V_RV", "Q_RV", "P_pul", "P_LA", "V_LA", "Q_LA", "P_LV",
                "V_LV", "Q_LV",
            ],
        );
        self.global_var_ids = vars;
        self.global_eqn_ids = eqns;
    }

    fn update_constant(&self, system: &mut dyn System, params: &ParamStore) -> ZdResult<()> {
        let v = &self.global_var_ids;
        let e = &self.global_eqn_ids;
        let cpa = params.evaluate(self.params.cpa, 0.0);
        let lra_v = params.evaluate(self.params.lra_v, 0.0);
        let lrv_a = params.evaluate(self.params.lrv_a, 0.0);
        let cp = params.evaluate(self.params.cp, 0.0);
        let lla_v = params.evaluate(self.params.lla_v, 0.0);
        let llv_a = params.evaluate(self.params.llv_a, 0.0);

        system.set_e(e[1], v[2], cpa).map_err(|err| sys_err(&self.name, err))?;
        system.set_e(e[2], v[4], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system.set_e(e[3], v[5], lra_v).map_err(|err| sys_err(&self.name, err))?;
        system.set_e(e[5], v[7], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system.set_e(e[6], v[8], lrv_a).map_err(|err| sys_err(&self.name, err))?;
        system.set_e(e[7], v[9], cp).map_err(|err| sys_err(&self.name, err))?;
        system.set_e(e[9], v[11], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system.set_e(e[10], v[12], lla_v).map_err(|err| sys_err(&self.name, err))?;
        system.set_e(e[12], v[14], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system.set_e(e[13], v[15], llv_a).map_err(|err| sys_err(&self.name, err))?;
        Ok(())
    }

    fn update_time(&mut self, _system: &mut dyn System, params: &ParamStore, t: Real) -> ZdResult<()> {
        self.activation_and_elastance(params, t);
        Ok(())
    }

    fn update_solution(
        &mut self,
        system: &mut dyn System,
        params: &ParamStore,
        y: &mut DVector<Real>,
        _ydot: &DVector<Real>,
    ) -> ZdResult<()> {
        self.psi_atria(params, y);
        self.valve_positions(y);

        let v = self.global_var_ids.clone();
        let e = self.global_eqn_ids.clone();
        let emax_ra = params.evaluate(self.params.emax_ra, 0.0);
        let emax_la = params.evaluate(self.params.emax_la, 0.0);
        let vaso_ra = params.evaluate(self.params.vaso_ra, 0.0);
        let vaso_la = params.evaluate(self.params.vaso_la, 0.0);
        let rra_v = params.evaluate(self.params.rra_v, 0.0);
        let vrv_u = params.evaluate(self.params.vrv_u, 0.0);
        let rrv_a = params.evaluate(self.params.rrv_a, 0.0);
        let rpd = params.evaluate(self.params.rpd, 0.0);
        let rla_v = params.evaluate(self.params.rla_v, 0.0);
        let vlv_u = params.evaluate(self.params.vlv_u, 0.0);
        let rlv_ao = params.evaluate(self.params.rlv_ao, 0.0);

        let aa = self.activation;

        // Eq 0: right atrium pressure.
        system.set_f(e[0], v[0], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[0], v[4], -aa * emax_ra)
            .map_err(|err| sys_err(&self.name, err))?;
        system.set_c(e[0], aa * emax_ra * vaso_ra + self.psi_ra * (aa - 1.0));
        system
            .set_d(e[0], v[4], self.psi_ra_derivative * (aa - 1.0))
            .map_err(|err| sys_err(&self.name, err))?;

        // Eq 1: aortic pressure.
        system
            .set_f(e[1], v[15], -self.valve_lv_ao)
            .map_err(|err| sys_err(&self.name, err))?;
        system.set_f(e[1], v[3], 1.0).map_err(|err| sys_err(&self.name, err))?;

        // Eq 2: right atrium volume.
        system
            .set_f(e[2], v[5], self.valve_ra_rv)
            .map_err(|err| sys_err(&self.name, err))?;
        system.set_f(e[2], v[1], -1.0).map_err(|err| sys_err(&self.name, err))?;

        // Eq 3: right atrium outflow.
        system
            .set_f(e[3], v[5], rra_v * self.valve_ra_rv)
            .map_err(|err| sys_err(&self.name, err))?;
        system.set_f(e[3], v[0], -1.0).map_err(|err| sys_err(&self.name, err))?;
        system.set_f(e[3], v[6], 1.0).map_err(|err| sys_err(&self.name, err))?;

        // Eq 4: right ventricle pressure.
        system.set_f(e[4], v[6], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[4], v[7], -self.erv)
            .map_err(|err| sys_err(&self.name, err))?;
        system.set_c(e[4], self.erv * vrv_u);

        // Eq 5: right ventricle volume.
        system
            .set_f(e[5], v[5], -self.valve_ra_rv)
            .map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[5], v[8], self.valve_rv_pul)
            .map_err(|err| sys_err(&self.name, err))?;

        // Eq 6: right ventricle outflow.
        system.set_f(e[6], v[6], -1.0).map_err(|err| sys_err(&self.name, err))?;
        system.set_f(e[6], v[9], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[6], v[8], rrv_a * self.valve_rv_pul)
            .map_err(|err| sys_err(&self.name, err))?;

        // Eq 7: pulmonary pressure.
        system
            .set_f(e[7], v[8], -self.valve_rv_pul)
            .map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[7], v[9], 1.0 / rpd)
            .map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[7], v[10], -1.0 / rpd)
            .map_err(|err| sys_err(&self.name, err))?;

        // Eq 8: left atrium pressure.
        system.set_f(e[8], v[10], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[8], v[11], -aa * emax_la)
            .map_err(|err| sys_err(&self.name, err))?;
        system.set_c(e[8], aa * emax_la * vaso_la + self.psi_la * (aa - 1.0));
        system
            .set_d(e[8], v[11], self.psi_la_derivative * (aa - 1.0))
            .map_err(|err| sys_err(&self.name, err))?;

        // Eq 9: left atrium volume.
        system
            .set_f(e[9], v[8], -self.valve_rv_pul)
            .map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[9], v[12], self.valve_la_lv)
            .map_err(|err| sys_err(&self.name, err))?;

        // Eq 10: left atrium outflow.
        system.set_f(e[10], v[10], -1.0).map_err(|err| sys_err(&self.name, err))?;
        system.set_f(e[10], v[13], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[10], v[12], rla_v * self.valve_la_lv)
            .map_err(|err| sys_err(&self.name, err))?;

        // Eq 11: left ventricle pressure.
        system.set_f(e[11], v[13], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[11], v[14], -self.elv)
            .map_err(|err| sys_err(&self.name, err))?;
        system.set_c(e[11], self.elv * vlv_u);

        // Eq 12: left ventricle volume.
        system
            .set_f(e[12], v[12], -self.valve_la_lv)
            .map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[12], v[15], self.valve_lv_ao)
            .map_err(|err| sys_err(&self.name, err))?;

        // Eq 13: left ventricle outflow.
        system.set_f(e[13], v[13], -1.0).map_err(|err| sys_err(&self.name, err))?;
        system.set_f(e[13], v[2], 1.0).map_err(|err| sys_err(&self.name, err))?;
        system
            .set_f(e[13], v[15], rlv_ao * self.valve_lv_ao)
            .map_err(|err| sys_err(&self.name, err))?;

        Ok(())
    }

    fn to_steady(&mut self, _params: &mut ParamStore) {
        // The reference solver runs its steady pre-solve over the
        // prescribed-BC subset of a model only; the heart/pulmonary block
        // has no steady-state counterpart (its state is inherently
        // periodic), so it is excluded from that pass at the model level.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zd_core::{NodeId, Parameter};
    use zd_system::DenseSystem;

    fn build_params(store: &mut ParamStore) -> HeartParameters {
        let c = |store: &mut ParamStore, name: &str, v: Real| store.push(name, Parameter::constant(v));
        HeartParameters {
            tsa: c(store, "Tsa", 0.5),
            tpwave: c(store, "tpwave", 5.0),
            erv_s: c(store, "Erv_s", 1.0),
            elv_s: c(store, "Elv_s", 1.0),
            iml: c(store, "iml", 0.5),
            imr: c(store, "imr", 0.3),
            lra_v: c(store, "Lra_v", 1e-4),
            rra_v: c(store, "Rra_v", 0.01),
            lrv_a: c(store, "Lrv_a", 1e-4),
            rrv_a: c(store, "Rrv_a", 0.01),
            lla_v: c(store, "Lla_v", 1e-4),
            rla_v: c(store, "Rla_v", 0.01),
            llv_a: c(store, "Llv_a", 1e-4),
            rlv_ao: c(store, "Rlv_ao", 0.01),
            vrv_u: c(store, "Vrv_u", 40.0),
            vlv_u: c(store, "Vlv_u", 40.0),
            rpd: c(store, "Rpd", 0.2),
            cp: c(store, "Cp", 4.0),
            cpa: c(store, "Cpa", 2.0),
            kxp_ra: c(store, "Kxp_ra", 0.02),
            kxv_ra: c(store, "Kxv_ra", 0.025),
            kxp_la: c(store, "Kxp_la", 0.02),
            kxv_la: c(store, "Kxv_la", 0.025),
            emax_ra: c(store, "Emax_ra", 0.5),
            emax_la: c(store, "Emax_la", 0.5),
            vaso_ra: c(store, "Vaso_ra", 15.0),
            vaso_la: c(store, "Vaso_la", 15.0),
        }
    }

    #[test]
    fn setup_dofs_assigns_sixteen_vars_and_fourteen_equations() {
        let mut dh = DofHandler::new();
        let inlet = Node::register(NodeId::from_index(0), "ra_in", &mut dh);
        let outlet = Node::register(NodeId::from_index(1), "aorta", &mut dh);
        let mut store = ParamStore::new();
        let params = build_params(&mut store);
        let mut block = ClosedLoopHeartPulmonary::new("CLH", inlet, outlet, params, 1.0);
        block.setup_dofs(&mut dh);
        assert_eq!(block.global_var_ids().len(), 16);
        assert_eq!(block.global_eqn_ids().len(), 14);
    }

    #[test]
    fn shut_valve_zeroes_both_coefficient_and_flow_dof() {
        let mut dh = DofHandler::new();
        let inlet = Node::register(NodeId::from_index(0), "ra_in", &mut dh);
        let outlet = Node::register(NodeId::from_index(1), "aorta", &mut dh);
        let mut store = ParamStore::new();
        let params = build_params(&mut store);
        let mut block = ClosedLoopHeartPulmonary::new("CLH", inlet, outlet, params, 1.0);
        block.setup_dofs(&mut dh);

        let mut sys = DenseSystem::new(dh.size());
        block.update_constant(&mut sys, &store).unwrap();
        block.update_time(&mut sys, &store, 0.0).unwrap();

        let mut y = DVector::zeros(dh.size());
        // RA pressure below RV pressure, RA outflow already non-positive:
        // the RA->RV valve should shut.
        y[block.global_var_ids[0]] = 1.0;
        y[block.global_var_ids[6]] = 5.0;
        y[block.global_var_ids[5]] = -0.5;
        block.update_solution(&mut sys, &store, &mut y, &DVector::zeros(dh.size())).unwrap();
        sys.compress().unwrap();

        assert_eq!(block.valve_ra_rv, 0.0);
        assert_eq!(y[block.global_var_ids[5]], 0.0);
    }
}
