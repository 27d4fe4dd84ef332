//! Result row shapes.

use serde::{Deserialize, Serialize};
use zd_core::numeric::Real;

/// One block's state at one recorded time step (§6 output rule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub name: String,
    pub time: Real,
    pub flow_in: Real,
    pub flow_out: Real,
    pub pressure_in: Real,
    pub pressure_out: Real,
}

/// A block's values averaged over the last cardiac cycle (§6 "mean over the
/// last cycle" output mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub name: String,
    pub flow_in: Real,
    pub flow_out: Real,
    pub pressure_in: Real,
    pub pressure_out: Real,
}
