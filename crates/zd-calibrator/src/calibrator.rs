//! Least-squares parameter recovery (§4.8).
//!
//! Builds a tall matrix `X` (`N·T` rows, one per DOF per observation, by `P`
//! columns, one per model parameter) and right-hand side `Y`, fans each
//! observation out to every block's `update_gradient`, then solves the
//! normal equations `(XᵀX)·α = XᵀY`.

use nalgebra::{DMatrix, DVector};
use zd_core::numeric::Real;
use zd_model::Model;

use crate::error::{CalibratorError, CalibratorResult};

/// Assemble and solve the overdetermined system, returning one recovered
/// value per parameter in the model's `ParamStore`, indexed by `ParamId`.
pub fn calibrate(
    model: &Model,
    observations: &[(DVector<Real>, DVector<Real>)],
) -> CalibratorResult<DVector<Real>> {
    if observations.is_empty() {
        return Err(CalibratorError::InvalidArg {
            what: "at least one observation is required",
        });
    }
    let n = model.size();
    for (i, (y, ydot)) in observations.iter().enumerate() {
        if y.len() != n || ydot.len() != n {
            return Err(CalibratorError::MalformedObservations {
                what: format!("observation {i} has the wrong dimension for this model"),
            });
        }
    }

    let p = model.params().len();
    let t = observations.len();
    let mut x = DMatrix::zeros(n * t, p);
    let mut yvec = DVector::zeros(n * t);

    for (obs_idx, (y, ydot)) in observations.iter().enumerate() {
        let row_offset = obs_idx * n;
        for block in model.blocks() {
            block
                .update_gradient(&mut x, &mut yvec, row_offset, y, ydot)
                .map_err(CalibratorError::from)?;
        }
    }

    tracing::debug!(rows = n * t, cols = p, "solving calibration normal equations");

    let xtx = x.transpose() * &x;
    let xty = x.transpose() * &yvec;
    xtx.lu().solve(&xty).ok_or_else(|| {
        tracing::error!("normal equations matrix is singular");
        CalibratorError::SingularNormalEquations {
            what: format!("{p}x{p} normal equations matrix has no unique solution"),
        }
    })
}

/// Render the recovered parameter vector the way `applications/calibrator.cpp`
/// does: one `block_name.param_name = value` line per parameter a block
/// actually references.
pub fn format_results(model: &Model, alpha: &DVector<Real>) -> Vec<String> {
    let mut lines = Vec::new();
    for block in model.blocks() {
        for &param_id in block.global_param_ids() {
            lines.push(format!(
                "{}.{} = {:e}",
                block.name(),
                model.params().name(param_id),
                alpha[param_id]
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use zd_blocks::BloodVessel;
    use zd_core::{Parameter, ParamStore};

    #[test]
    fn recovers_exact_vessel_parameters_from_noiseless_observations() {
        let r_true = 2.0;
        let c_true = 0.5;
        let l_true = 0.1;
        let stenosis_true = 0.3;

        let mut params = ParamStore::new();
        let r_id = params.push("R", Parameter::constant(r_true));
        let c_id = params.push("C", Parameter::constant(c_true));
        let l_id = params.push("L", Parameter::constant(l_true));
        let stenosis_id = params.push("stenosis", Parameter::constant(stenosis_true));

        let mut model = Model::new(params);
        let inlet = model.register_node("IN");
        let outlet = model.register_node("OUT");
        model
            .add_block(Box::new(BloodVessel::new(
                "V0",
                inlet,
                outlet,
                r_id,
                c_id,
                l_id,
                stenosis_id,
            )))
            .unwrap();
        model.setup();
        assert_eq!(model.size(), 5);

        // Synthesize (y, ydot) pairs that exactly satisfy the vessel's three
        // governing equations for varied Q_in / dQ_out/dt / dP_c/dt, so the
        // recovered parameters should match the true ones to solver precision.
        let q_ins = [1.0, 2.0, -1.5, 0.5, 3.0];
        let dqouts = [0.5, -0.2, 0.3, 0.1, -0.4];
        let dpcs = [0.2, 0.1, -0.15, 0.05, 0.3];

        let mut observations = Vec::new();
        for i in 0..5 {
            let q_in = q_ins[i];
            let dqout = dqouts[i];
            let dpc = dpcs[i];
            let r_ste = stenosis_true * q_in.abs();

            let p_out = 10.0 + i as Real;
            let p_in = p_out + (r_true + r_ste) * q_in + l_true * dqout;
            let q_out = q_in - c_true * dpc;
            let p_c = p_in - (r_true + r_ste) * q_in;

            let y = DVector::from_vec(vec![p_in, q_in, p_out, q_out, p_c]);
            let mut ydot = DVector::zeros(5);
            ydot[3] = dqout;
            ydot[4] = dpc;
            observations.push((y, ydot));
        }

        let alpha = calibrate(&model, &observations).unwrap();
        assert!((alpha[r_id] - r_true).abs() < 1e-6);
        assert!((alpha[c_id] - c_true).abs() < 1e-6);
        assert!((alpha[l_id] - l_true).abs() < 1e-6);
        assert!((alpha[stenosis_id] - stenosis_true).abs() < 1e-6);

        let lines = format_results(&model, &alpha);
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().any(|l| l.starts_with("V0.R =")));
    }

    #[test]
    fn rejects_empty_observation_set() {
        let model = Model::new(ParamStore::new());
        let err = calibrate(&model, &[]).unwrap_err();
        assert!(matches!(err, CalibratorError::InvalidArg { .. }));
    }
}
