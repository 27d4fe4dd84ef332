//! zd-blocks: the 0D element library.
//!
//! Every element variant implements the [`Block`] trait, writing its
//! contributions into a `dyn zd_system::System` through flat
//! [`zd_core::ParamId`] indirection rather than owning parameter values
//! directly. `Model` (in `zd-model`) owns the blocks, the shared
//! [`zd_core::ParamStore`], and the `DofHandler`/`Node` graph they're wired
//! onto.

pub mod blood_vessel;
pub mod blood_vessel_junction;
pub mod closed_loop_rcr;
pub mod common;
pub mod coronary_bc;
pub mod error;
pub mod flow_reference_bc;
pub mod heart_pulmonary;
pub mod junction;
pub mod pressure_reference_bc;
pub mod resistance_bc;
pub mod resistive_junction;
pub mod traits;
pub mod windkessel_bc;

pub use blood_vessel::BloodVessel;
pub use blood_vessel_junction::{BloodVesselJunction, BranchParams};
pub use closed_loop_rcr::ClosedLoopRcrBc;
pub use coronary_bc::{ClosedLoopCoronaryBc, CoronarySide, OpenLoopCoronaryBc};
pub use error::{BlockError, BlockResult};
pub use flow_reference_bc::FlowReferenceBc;
pub use heart_pulmonary::{ClosedLoopHeartPulmonary, HeartParameters};
pub use junction::Junction;
pub use pressure_reference_bc::PressureReferenceBc;
pub use resistance_bc::ResistanceBc;
pub use resistive_junction::ResistiveJunction;
pub use traits::{Block, BlockLookup};
pub use windkessel_bc::WindkesselBc;
