//! zd-app: the scripting-binding surface of §6 — a `Solver` object wrapping
//! config loading, the generalized-α run loop, and result queries behind
//! `run`/`get_full_result`/`get_single_result`/`get_single_result_avg`/
//! `update_block_params`.

pub mod error;
pub mod solver;

pub use error::{AppError, AppResult};
pub use solver::Solver;
