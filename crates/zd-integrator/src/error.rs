//! Errors encountered while stepping the generalized-α integrator.

use thiserror::Error;
use zd_core::ZdError;
use zd_model::ModelError;
use zd_system::SystemError;

#[derive(Error, Debug)]
pub enum IntegratorError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Newton iteration did not converge within {max_iter} iterations: {what}")]
    NonConvergence { max_iter: usize, what: String },

    #[error("steady pre-solve did not converge within {max_iter} outer iterations")]
    SteadyNonConvergence { max_iter: usize },

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("system error: {0}")]
    System(#[from] SystemError),
}

pub type IntegratorResult<T> = Result<T, IntegratorError>;

impl From<IntegratorError> for ZdError {
    fn from(e: IntegratorError) -> Self {
        match e {
            IntegratorError::InvalidArg { what } => ZdError::InvalidArg { what },
            IntegratorError::NonConvergence { what, .. } => ZdError::NonConvergence { what },
            IntegratorError::SteadyNonConvergence { max_iter } => ZdError::NonConvergence {
                what: format!("steady pre-solve exceeded {max_iter} outer iterations"),
            },
            IntegratorError::Model(e) => e.into(),
            IntegratorError::System(e) => e.into(),
        }
    }
}
