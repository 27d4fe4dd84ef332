//! Aggregates blocks, the shared parameter store, and the DOF graph into one
//! fan-out surface the integrator and calibrator drive.
//!
//! A graph plus a name-indexed bag of boxed trait objects, keyed by
//! insertion order rather than a map, since block evaluation order is part
//! of the contract: blocks are iterated in stored order everywhere.

use std::collections::HashMap;

use nalgebra::DVector;
use zd_core::numeric::Real;
use zd_core::{NodeId, ParamId, ParamStore};
use zd_graph::{DofHandler, Node};
use zd_system::{NumTriplets, System};

use zd_blocks::{Block, BlockLookup};

use crate::error::{ModelError, ModelResult};

/// A 0D hemodynamic network: an ordered list of blocks sharing one
/// `DofHandler` and one `ParamStore`.
pub struct Model {
    blocks: Vec<Box<dyn Block>>,
    name_index: HashMap<String, usize>,
    params: ParamStore,
    dofhandler: DofHandler,
    next_node_id: u32,
}

impl Model {
    pub fn new(params: ParamStore) -> Self {
        Self {
            blocks: Vec::new(),
            name_index: HashMap::new(),
            params,
            dofhandler: DofHandler::new(),
            next_node_id: 0,
        }
    }

    /// Register a fresh node (and its pressure/flow DOFs) against this
    /// model's own `DofHandler`, so blocks built from it end up wired into
    /// the same system `setup_dofs` will later populate. A config loader
    /// calls this once per `vessel_name` before constructing the blocks
    /// that reference it; two blocks sharing an inlet/outlet pass the same
    /// `Node` clone rather than each registering their own.
    pub fn register_node(&mut self, name: impl Into<String>) -> Node {
        let id = NodeId::from_index(self.next_node_id);
        self.next_node_id += 1;
        Node::register(id, name, &mut self.dofhandler)
    }

    /// Append a block, rejecting a name collision up front rather than
    /// letting two blocks silently shadow each other in `block_by_name`.
    pub fn add_block(&mut self, block: Box<dyn Block>) -> ModelResult<()> {
        let name = block.name().to_string();
        if self.name_index.contains_key(&name) {
            return Err(ModelError::DuplicateBlockName { name });
        }
        let idx = self.blocks.len();
        self.name_index.insert(name, idx);
        self.blocks.push(block);
        Ok(())
    }

    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamStore {
        &mut self.params
    }

    pub fn dofhandler(&self) -> &DofHandler {
        &self.dofhandler
    }

    /// System dimension N.
    pub fn size(&self) -> usize {
        self.dofhandler.size()
    }

    pub fn blocks(&self) -> &[Box<dyn Block>] {
        &self.blocks
    }

    pub fn block_index(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// Run every block's `setup_dofs` in insertion order, then resolve
    /// cross-block coefficient lookups (§4.3: `ClosedLoopCoronaryBc` reading
    /// the heart block). Must be called exactly once, before `reserve`.
    pub fn setup(&mut self) {
        for block in &mut self.blocks {
            block.setup_dofs(&mut self.dofhandler);
        }
        self.resolve_cross_block_params();
    }

    /// Gives each block a chance to pull coefficients owned by another named
    /// block. Implemented with a take-and-replace so a block can hold `&mut
    /// self` for the call while `self` (standing in for `BlockLookup`) stays
    /// readable for the others — the block being updated is parked behind a
    /// placeholder for the duration of its own call.
    fn resolve_cross_block_params(&mut self) {
        for i in 0..self.blocks.len() {
            let mut block: Box<dyn Block> = std::mem::replace(&mut self.blocks[i], Box::new(NullBlock));
            block.update_model_dependent_params(&self.params, self);
            self.blocks[i] = block;
        }
    }

    /// Aggregate per-block triplet upper bounds into the bound used to
    /// reserve sparse storage (§4.5 `get_num_triplets`).
    pub fn num_triplets(&self) -> NumTriplets {
        let mut total = NumTriplets::default();
        for b in &self.blocks {
            total.accumulate(b.num_triplets());
        }
        total
    }

    pub fn update_constant(&self, system: &mut dyn System) -> ModelResult<()> {
        for b in &self.blocks {
            b.update_constant(system, &self.params)?;
        }
        Ok(())
    }

    /// `c` is a dense overwrite target, not a sparse position, so it is
    /// cleared once at the top of each step before the union of
    /// `update_time` and `update_solution` rewrites every row they own.
    pub fn update_time(&mut self, system: &mut dyn System, t: Real) -> ModelResult<()> {
        system.reset_c();
        for b in &mut self.blocks {
            b.update_time(system, &self.params, t)?;
        }
        Ok(())
    }

    pub fn update_solution(
        &mut self,
        system: &mut dyn System,
        y: &mut DVector<Real>,
        ydot: &DVector<Real>,
    ) -> ModelResult<()> {
        for b in &mut self.blocks {
            b.update_solution(system, &self.params, y, ydot)?;
        }
        Ok(())
    }

    pub fn to_steady(&mut self) {
        for b in &mut self.blocks {
            b.to_steady(&mut self.params);
        }
    }

    pub fn to_unsteady(&mut self) {
        for b in &mut self.blocks {
            b.to_unsteady(&mut self.params);
        }
    }

    /// §4.9 symbolic reserve pass: `update_constant`, `update_time(0)`, then
    /// `update_solution` with a vector of ones (forcing every
    /// solution-dependent entry to be written once), then compress. Must
    /// run once, after `setup` and before the first real time step.
    pub fn reserve(&mut self, system: &mut dyn System) -> ModelResult<()> {
        self.update_constant(system)?;
        self.update_time(system, 0.0)?;
        let mut ones = DVector::from_element(system.size(), 1.0);
        let ydot_ones = DVector::from_element(system.size(), 1.0);
        self.update_solution(system, &mut ones, &ydot_ones)?;
        system.compress()?;
        Ok(())
    }
}

impl BlockLookup for Model {
    fn block_by_name(&self, name: &str) -> Option<&dyn Block> {
        self.name_index.get(name).map(|&i| self.blocks[i].as_ref())
    }
}

/// Transient placeholder swapped into `blocks[i]` only for the duration of
/// that block's own `update_model_dependent_params` call. Never reachable
/// from outside `resolve_cross_block_params`.
struct NullBlock;

impl Block for NullBlock {
    fn name(&self) -> &str {
        ""
    }
    fn inlet_nodes(&self) -> &[Node] {
        &[]
    }
    fn outlet_nodes(&self) -> &[Node] {
        &[]
    }
    fn global_var_ids(&self) -> &[usize] {
        &[]
    }
    fn global_eqn_ids(&self) -> &[usize] {
        &[]
    }
    fn global_param_ids(&self) -> &[ParamId] {
        &[]
    }
    fn num_triplets(&self) -> NumTriplets {
        NumTriplets::default()
    }
    fn setup_dofs(&mut self, _dofhandler: &mut DofHandler) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use zd_blocks::{FlowReferenceBc, PressureReferenceBc, ResistanceBc};
    use zd_core::Parameter;
    use zd_system::DenseSystem;

    #[test]
    fn two_block_network_converges_to_ohms_law() {
        let mut params = ParamStore::new();
        let q_id = params.push("Q", Parameter::constant(3.0));
        let r_id = params.push("R", Parameter::constant(5.0));
        let pd_id = params.push("Pd", Parameter::constant(0.0));

        let mut model = Model::new(params);
        let node = model.register_node("N0");

        model
            .add_block(Box::new(FlowReferenceBc::new("FLOW0", node.clone(), q_id)))
            .unwrap();
        model
            .add_block(Box::new(ResistanceBc::new("RESISTANCE0", node, r_id, pd_id)))
            .unwrap();

        model.setup();
        assert_eq!(model.size(), 2);

        let mut sys = DenseSystem::new(model.size());
        model.reserve(&mut sys).unwrap();

        let y = DVector::from_vec(vec![15.0, 3.0]);
        let ydot = DVector::zeros(2);
        let r = sys.residual(&y, &ydot);
        assert!(r.iter().all(|v| v.abs() < 1e-10));
    }

    #[test]
    fn duplicate_block_name_is_rejected() {
        let mut params = ParamStore::new();
        let p_id = params.push("P", Parameter::constant(1.0));
        let mut model = Model::new(params);
        let node = model.register_node("N0");
        model
            .add_block(Box::new(PressureReferenceBc::new("PRESSURE0", node.clone(), p_id)))
            .unwrap();
        let err = model
            .add_block(Box::new(PressureReferenceBc::new("PRESSURE0", node, p_id)))
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateBlockName { .. }));
    }
}
