//! zd-calibrator: recovers block parameters from observed `(y, ẏ)`
//! trajectories by least squares (§4.8).

pub mod calibrator;
pub mod error;
pub mod observations;

pub use calibrator::{calibrate, format_results};
pub use error::{CalibratorError, CalibratorResult};
pub use observations::ObservationSet;
