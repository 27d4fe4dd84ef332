//! Error types for the `Solver` facade.

use zd_calibrator::CalibratorError;
use zd_config::ConfigError;
use zd_core::ZdError;
use zd_integrator::IntegratorError;
use zd_model::ModelError;
use zd_results::ResultsError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("integrator error: {0}")]
    Integrator(#[from] IntegratorError),

    #[error("results error: {0}")]
    Results(#[from] ResultsError),

    #[error("calibrator error: {0}")]
    Calibrator(#[from] CalibratorError),

    #[error("block \"{0}\" not found")]
    BlockNotFound(String),

    #[error("solver has not been run yet")]
    NotRun,

    #[error("block \"{name}\" has {expected} parameters, got {got}")]
    ParamCountMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("parameter error: {0}")]
    Param(#[from] ZdError),
}

pub type AppResult<T> = Result<T, AppError>;
