//! zd-model: owns the blocks, the shared parameter store, and the node/DOF
//! graph for one 0D network, and fans calls out to every block in stored
//! order.

pub mod error;
pub mod model;

pub use error::{ModelError, ModelResult};
pub use model::Model;
