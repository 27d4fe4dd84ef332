//! `Solver`: the scripting-binding object §6 describes — `run()`,
//! `get_full_result()`, `get_single_result(name)`,
//! `get_single_result_avg(name)`, `update_block_params(name, values)` — as a
//! plain Rust API. The actual FFI/PyO3 surface that would wrap this for a
//! scripting language is an external-collaborator concern; this is the
//! object it would wrap.

use zd_blocks::Block;
use zd_config::{Config, SimulationParameters, load_model};
use zd_core::numeric::Real;
use zd_integrator::{NewtonOptions, SimOptions, SimRecord, run_sim};
use zd_model::Model;
use zd_results::{ResultRow, SummaryRow, extract_rows, mean_last_cycle};
use zd_system::{SparseSystem, System};

use crate::error::{AppError, AppResult};

pub struct Solver {
    model: Model,
    system: SparseSystem,
    sim_opts: SimOptions,
    cardiac_cycle_period: Real,
    pub output_last_cycle_only: bool,
    last_run: Option<SimRecord>,
}

impl Solver {
    /// Build a solver from a parsed configuration, performing the
    /// symbolic-reserve phase up front so `run` only does numeric work.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let (mut model, sim_params) = load_model(config)?;
        let mut system = SparseSystem::new(model.size());
        model.reserve(&mut system)?;
        let sim_opts = sim_options_from(&sim_params);
        Ok(Self {
            model,
            system,
            sim_opts,
            cardiac_cycle_period: sim_params.cardiac_cycle_period,
            output_last_cycle_only: sim_params.output_last_cycle_only,
            last_run: None,
        })
    }

    pub fn run(&mut self) -> AppResult<()> {
        let record = run_sim(&mut self.model, &mut self.system, &self.sim_opts)?;
        self.last_run = Some(record);
        Ok(())
    }

    pub fn get_full_result(&self) -> AppResult<Vec<ResultRow>> {
        let record = self.last_run.as_ref().ok_or(AppError::NotRun)?;
        Ok(extract_rows(&self.model, &record.t, &record.state)?)
    }

    /// Every vessel block's values averaged over the last cardiac cycle —
    /// the CLI/binding surface's "output last cycle only" mode.
    pub fn get_full_result_summary(&self) -> AppResult<Vec<SummaryRow>> {
        let rows = self.get_full_result()?;
        Ok(mean_last_cycle(&rows, self.cardiac_cycle_period)?)
    }

    pub fn get_single_result(&self, name: &str) -> AppResult<Vec<ResultRow>> {
        let rows: Vec<ResultRow> = self
            .get_full_result()?
            .into_iter()
            .filter(|r| r.name == name)
            .collect();
        if rows.is_empty() {
            return Err(AppError::BlockNotFound(name.to_string()));
        }
        Ok(rows)
    }

    pub fn get_single_result_avg(&self, name: &str) -> AppResult<SummaryRow> {
        let rows = self.get_single_result(name)?;
        let summary = mean_last_cycle(&rows, self.cardiac_cycle_period)?;
        summary
            .into_iter()
            .next()
            .ok_or_else(|| AppError::BlockNotFound(name.to_string()))
    }

    /// Overwrite one block's parameter values in declaration order
    /// (`Block::global_param_ids`).
    pub fn update_block_params(&mut self, name: &str, values: &[Real]) -> AppResult<()> {
        let idx = self
            .model
            .block_index(name)
            .ok_or_else(|| AppError::BlockNotFound(name.to_string()))?;
        let param_ids: Vec<_> = self.model.blocks()[idx].global_param_ids().to_vec();
        if param_ids.len() != values.len() {
            return Err(AppError::ParamCountMismatch {
                name: name.to_string(),
                expected: param_ids.len(),
                got: values.len(),
            });
        }
        for (id, value) in param_ids.iter().zip(values.iter()) {
            self.model.params_mut().get_mut(*id).update(&[*value])?;
        }
        Ok(())
    }

    pub fn model(&self) -> &Model {
        &self.model
    }
}

fn sim_options_from(sim_params: &SimulationParameters) -> SimOptions {
    let dt = sim_params.cardiac_cycle_period
        / sim_params.number_of_time_pts_per_cardiac_cycle.max(1) as Real;
    let t_end = sim_params.cardiac_cycle_period * sim_params.number_of_cardiac_cycles as Real;
    SimOptions {
        rho_inf: sim_params.rho_infinity,
        dt,
        t_end,
        max_steps: (sim_params.number_of_time_pts_per_cardiac_cycle as usize
            * sim_params.number_of_cardiac_cycles as usize)
            .max(1),
        record_every: 1,
        steady_initial: sim_params.steady_initial,
        steady_max_iter: 10,
        newton: NewtonOptions {
            max_iter: sim_params.maximum_newton_iterations,
            atol: sim_params.absolute_tolerance,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_vessel_config() -> Config {
        let text = r#"
        {
          "simulation_parameters": {
            "number_of_cardiac_cycles": 1,
            "number_of_time_pts_per_cardiac_cycle": 20,
            "cardiac_cycle_period": 1.0,
            "steady_initial": true,
            "output_last_cycle_only": false
          },
          "vessels": [
            {
              "vessel_id": 0,
              "vessel_name": "vessel0",
              "zero_d_element_type": "BloodVessel",
              "zero_d_element_values": {"R_poiseuille": 100.0, "C": 1e-4, "L": 1e-4},
              "boundary_conditions": {"inlet": "INFLOW", "outlet": "OUT"}
            }
          ],
          "boundary_conditions": [
            {"bc_name": "INFLOW", "bc_type": "FLOW", "bc_values": {"q": 5.0}},
            {"bc_name": "OUT", "bc_type": "RESISTANCE", "bc_values": {"r": 10.0, "pd": 0.0}}
          ],
          "junctions": []
        }
        "#;
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn run_then_query_roundtrips() {
        let cfg = single_vessel_config();
        let mut solver = Solver::from_config(&cfg).unwrap();
        solver.run().unwrap();
        let full = solver.get_full_result().unwrap();
        assert!(!full.is_empty());
        let single = solver.get_single_result("vessel0").unwrap();
        assert!(single.iter().all(|r| r.name == "vessel0"));
        let avg = solver.get_single_result_avg("vessel0").unwrap();
        assert_eq!(avg.name, "vessel0");
    }

    #[test]
    fn query_before_run_is_rejected() {
        let cfg = single_vessel_config();
        let solver = Solver::from_config(&cfg).unwrap();
        assert!(matches!(solver.get_full_result(), Err(AppError::NotRun)));
    }

    #[test]
    fn update_block_params_rejects_wrong_length() {
        let cfg = single_vessel_config();
        let mut solver = Solver::from_config(&cfg).unwrap();
        let err = solver.update_block_params("vessel0", &[1.0]).unwrap_err();
        assert!(matches!(err, AppError::ParamCountMismatch { .. }));
    }

    #[test]
    fn update_block_params_on_unknown_block_is_rejected() {
        let cfg = single_vessel_config();
        let mut solver = Solver::from_config(&cfg).unwrap();
        let err = solver.update_block_params("nope", &[1.0]).unwrap_err();
        assert!(matches!(err, AppError::BlockNotFound(_)));
    }
}
