//! zd-core: stable foundation for the zerodsolver workspace.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for graph objects)
//! - param (Parameter values and the flat ParamStore)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod param;

// Re-exports: nice ergonomics for downstream crates
pub use error::{ZdError, ZdResult};
pub use ids::*;
pub use numeric::*;
pub use param::{ParamId, ParamStore, Parameter};
