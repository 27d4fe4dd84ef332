//! Error types for block assembly.

use thiserror::Error;
use zd_core::ZdError;
use zd_system::SystemError;

/// Errors that can occur while a block declares or assembles itself.
#[derive(Error, Debug, Clone)]
pub enum BlockError {
    #[error("block {block} expects {expected} parameter(s), got {got}")]
    ParamCountMismatch {
        block: String,
        expected: usize,
        got: usize,
    },

    #[error("block {block} expects {expected} inlet node(s), got {got}")]
    InletCountMismatch {
        block: String,
        expected: usize,
        got: usize,
    },

    #[error("block {block} expects {expected} outlet node(s), got {got}")]
    OutletCountMismatch {
        block: String,
        expected: usize,
        got: usize,
    },

    #[error("system assembly error in block {block}: {source}")]
    System {
        block: String,
        #[source]
        source: SystemError,
    },
}

pub type BlockResult<T> = Result<T, BlockError>;

impl From<BlockError> for ZdError {
    fn from(e: BlockError) -> Self {
        match e {
            BlockError::ParamCountMismatch {
                block: _,
                expected,
                got,
            } => ZdError::SizeMismatch {
                what: "block parameters",
                expected,
                got,
            },
            BlockError::InletCountMismatch {
                block: _,
                expected,
                got,
            } => ZdError::SizeMismatch {
                what: "block inlet nodes",
                expected,
                got,
            },
            BlockError::OutletCountMismatch {
                block: _,
                expected,
                got,
            } => ZdError::SizeMismatch {
                what: "block outlet nodes",
                expected,
                got,
            },
            BlockError::System { block: _, source } => source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BlockError::ParamCountMismatch {
            block: "vessel0".into(),
            expected: 4,
            got: 2,
        };
        assert!(err.to_string().contains("vessel0"));
    }
}
