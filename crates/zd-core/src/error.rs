use thiserror::Error;

pub type ZdResult<T> = Result<T, ZdError>;

/// Shared error contract used across the workspace.
///
/// Crate-local error enums (`BlockError`, `SystemError`, `ConfigError`, ...)
/// convert into this one at crate boundaries via `#[from]`.
#[derive(Error, Debug)]
pub enum ZdError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },

    #[error("Parameter count mismatch updating {what}: expected {expected}, got {got}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Newton iteration did not converge: {what}")]
    NonConvergence { what: String },

    #[error("Sparse LU factorization failed: {what}")]
    SingularJacobian { what: String },

    #[error("Variable name not registered with the DOF handler: {name}")]
    IndexOutOfRange { name: String },

    #[error("Configuration error: {what}")]
    Config { what: String },
}
