//! Block version tally over a trailing window of the chain
//!
//! [`TallyEngine`] keeps a version histogram for the last `W` blocks and
//! slides it forward as the tip advances, fetching only the blocks that
//! enter and leave the window. [`retarget`] computes difficulty retarget
//! boundaries, [`versionbits`] decodes BIP9 signaling, and [`report`] turns
//! a snapshot into display-ready shares.

pub mod constants;
pub mod engine;
pub mod error;
pub mod histogram;
pub mod report;
pub mod retarget;
pub mod versionbits;

pub use engine::{AdvanceOutcome, TallyConfig, TallyEngine, WindowState};
pub use error::{TallyError, TallyResult};
pub use histogram::VersionHistogram;
pub use report::TallyReport;
pub use retarget::{next_retarget_height, RetargetSchedule};
pub use rpc_core::BlockVersion;
