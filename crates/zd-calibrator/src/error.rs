//! Errors while recovering block parameters from observed trajectories.

use thiserror::Error;
use zd_core::ZdError;
use zd_graph::GraphError;
use zd_model::ModelError;

#[derive(Error, Debug)]
pub enum CalibratorError {
    #[error("invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("observation set malformed: {what}")]
    MalformedObservations { what: String },

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("block error: {0}")]
    Block(#[from] ZdError),

    #[error("normal equations matrix is singular: {what}")]
    SingularNormalEquations { what: String },

    #[error("failed to parse observation JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CalibratorResult<T> = Result<T, CalibratorError>;

impl From<CalibratorError> for ZdError {
    fn from(e: CalibratorError) -> Self {
        match e {
            CalibratorError::InvalidArg { what } => ZdError::InvalidArg { what },
            CalibratorError::MalformedObservations { what } => ZdError::Config { what },
            CalibratorError::Graph(e) => e.into(),
            CalibratorError::Model(e) => e.into(),
            CalibratorError::Block(e) => e,
            CalibratorError::SingularNormalEquations { what } => {
                ZdError::SingularJacobian { what }
            }
            CalibratorError::Json(e) => ZdError::Config { what: e.to_string() },
        }
    }
}
