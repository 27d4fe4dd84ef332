//! zd-integrator: the generalized-α DAE time-stepping scheme that advances a
//! [`zd_model::Model`] against a [`zd_system::System`] backend.
//!
//! Provides:
//! - The generalized-α implicit integrator with an inner Newton solve
//! - A §4.4 steady pre-solve ahead of the transient loop
//! - A fixed-step runner with decimated recording

pub mod error;
pub mod integrator;
pub mod sim;

pub use error::{IntegratorError, IntegratorResult};
pub use integrator::{GeneralizedAlpha, NewtonOptions};
pub use sim::{SimOptions, SimRecord, run_sim};
