//! Errors that can occur while assembling or running a model.

use thiserror::Error;
use zd_blocks::BlockError;
use zd_core::ZdError;
use zd_system::SystemError;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("duplicate block name: {name}")]
    DuplicateBlockName { name: String },

    #[error("block error: {0}")]
    Block(#[from] BlockError),

    #[error("system error: {0}")]
    System(#[from] SystemError),

    #[error("model setup error: {what}")]
    Setup { what: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<ModelError> for ZdError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::DuplicateBlockName { name } => ZdError::InvalidArg {
                what: Box::leak(format!("duplicate block name: {name}").into_boxed_str()),
            },
            ModelError::Block(e) => e.into(),
            ModelError::System(e) => e.into(),
            ModelError::Setup { what } => ZdError::Invariant {
                what: Box::leak(what.into_boxed_str()),
            },
        }
    }
}
