//! Error types for system assembly and linear solves.

use thiserror::Error;
use zd_core::ZdError;

#[derive(Error, Debug, Clone)]
pub enum SystemError {
    #[error("position ({row}, {col}) was not registered during the symbolic reserve phase")]
    UnreservedPosition { row: usize, col: usize },

    #[error("row {row} out of bounds (system size {size})")]
    RowOob { row: usize, size: usize },

    #[error("sparse LU symbolic analysis failed: {what}")]
    SymbolicFailed { what: String },

    #[error("sparse LU factorization failed: {what}")]
    SingularJacobian { what: String },

    #[error("dense LU factorization failed: matrix is singular")]
    SingularDense,
}

pub type SystemResult<T> = Result<T, SystemError>;

impl From<SystemError> for ZdError {
    fn from(e: SystemError) -> Self {
        match e {
            SystemError::UnreservedPosition { row, col } => ZdError::Invariant {
                what: Box::leak(
                    format!("position ({row}, {col}) not in reserved sparsity pattern").into_boxed_str(),
                ),
            },
            SystemError::RowOob { row, size } => ZdError::IndexOob {
                what: "system row",
                index: row,
                len: size,
            },
            SystemError::SymbolicFailed { what } | SystemError::SingularJacobian { what } => {
                ZdError::SingularJacobian { what }
            }
            SystemError::SingularDense => ZdError::SingularJacobian {
                what: "dense Jacobian LU factorization failed".to_string(),
            },
        }
    }
}
