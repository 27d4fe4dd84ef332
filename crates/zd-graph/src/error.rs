//! Graph-layer error types.

use thiserror::Error;
use zd_core::ZdError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("variable name not registered with the DOF handler: {name}")]
    VariableNotFound { name: String },

    #[error("node id out of bounds: {index} (len={len})")]
    NodeOob { index: usize, len: usize },
}

impl From<GraphError> for ZdError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::VariableNotFound { name } => ZdError::IndexOutOfRange { name },
            GraphError::NodeOob { index, len } => ZdError::IndexOob {
                what: "node",
                index,
                len,
            },
        }
    }
}
