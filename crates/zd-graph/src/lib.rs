//! zd-graph: the node and degree-of-freedom layer of the zerodsolver workspace.
//!
//! Deliberately thin: blocks own their own connectivity (`inlet_nodes` /
//! `outlet_nodes`, `global_var_ids`, `global_eqn_ids`) directly, so this
//! crate only needs to provide the [`Node`] type itself and the
//! [`DofHandler`] that assigns global indices during a model's symbolic
//! setup phase.

pub mod dofhandler;
pub mod error;
pub mod node;

pub use dofhandler::DofHandler;
pub use error::GraphError;
pub use node::Node;
