//! The `Block` contract every 0D element variant implements.

use std::any::Any;

use nalgebra::{DMatrix, DVector};
use zd_core::numeric::Real;
use zd_core::{ParamId, ParamStore, ZdResult};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

/// Read-only access to the rest of a model's blocks by name, for the rare
/// block whose coefficients are owned by another block instead of its own
/// parameters (e.g. a closed-loop coronary BC reading a ventricular
/// pressure DOF out of the heart block). Implemented by `Model` once that
/// crate exists; blocks only ever see it through this narrow interface.
pub trait BlockLookup {
    fn block_by_name(&self, name: &str) -> Option<&dyn Block>;
}

/// A 0D element contributing rows and columns to the global DAE system.
///
/// The six methods below are called by the `Model` fan-out in this fixed
/// order within a step: `update_constant` once at setup, `update_time` once
/// per step, `update_solution` once per Newton iteration. `to_steady` /
/// `to_unsteady` bracket the optional steady pre-solve. `update_gradient` is
/// only called by the calibrator. Every method has a no-op default so a
/// block that has nothing to contribute to a given phase (e.g. a pressure
/// reference has no `update_solution`) need not override it.
pub trait Block: Any {
    fn name(&self) -> &str;
    fn inlet_nodes(&self) -> &[Node];
    fn outlet_nodes(&self) -> &[Node];
    fn global_var_ids(&self) -> &[usize];
    fn global_eqn_ids(&self) -> &[usize];
    fn global_param_ids(&self) -> &[ParamId];

    /// Upper bound on the (row, column) positions this block will ever write
    /// in each of E, F, D, used to reserve sparse storage.
    fn num_triplets(&self) -> NumTriplets;

    /// Declare equations and internal variables, populating
    /// `global_var_ids`/`global_eqn_ids` via [`crate::common::setup_dofs_`].
    fn setup_dofs(&mut self, dofhandler: &mut DofHandler);

    /// Write entries into E, F, D that never change during the simulation.
    fn update_constant(&self, _system: &mut dyn System, _params: &ParamStore) -> ZdResult<()> {
        Ok(())
    }

    /// Write entries and/or `c` components that depend on `t` but not `y`.
    fn update_time(&mut self, _system: &mut dyn System, _params: &ParamStore, _t: Real) -> ZdResult<()> {
        Ok(())
    }

    /// Write entries that depend on the current Newton iterate.
    ///
    /// `y` is mutable because a shut heart valve must clamp its flow DOF to
    /// zero in the iterate itself, not just in the matrix: once every F/D
    /// entry touching that column is gated to zero, nothing else pins the
    /// column, so the Newton solve leaves it to drift unless the block
    /// pins it directly (mirrors what the reference solver does).
    fn update_solution(
        &mut self,
        _system: &mut dyn System,
        _params: &ParamStore,
        _y: &mut DVector<Real>,
        _ydot: &DVector<Real>,
    ) -> ZdResult<()> {
        Ok(())
    }

    /// Switch time-dependent parameters (and, for capacitive blocks, the
    /// E-matrix stencil) into steady mode ahead of the steady pre-solve.
    fn to_steady(&mut self, _params: &mut ParamStore) {}

    /// Restore whatever `to_steady` changed.
    fn to_unsteady(&mut self, _params: &mut ParamStore) {}

    /// Pull coefficients owned by another named block, once every block's
    /// `setup_dofs` has run. Called at most once per block, before the
    /// first `update_constant`. Almost every block leaves this a no-op;
    /// `ClosedLoopCoronaryBc` is the one that uses it.
    fn update_model_dependent_params(&mut self, _params: &ParamStore, _lookup: &dyn BlockLookup) {}

    /// Narrow downcast for the few blocks `update_model_dependent_params`
    /// needs to reach into concretely.
    fn as_any(&self) -> &dyn Any {
        self
    }

    /// Contribute rows to the calibrator's overdetermined least-squares
    /// system at observation row offset `row_offset` (a multiple of the
    /// system size N).
    fn update_gradient(
        &self,
        _x: &mut DMatrix<Real>,
        _yvec: &mut DVector<Real>,
        _row_offset: usize,
        _y: &DVector<Real>,
        _ydot: &DVector<Real>,
    ) -> ZdResult<()> {
        Ok(())
    }
}
