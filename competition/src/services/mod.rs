//! Services - the imperative shell around the pure core.
//!
//! Each service loads documents through the repository, runs the pure
//! transition from `tanda-core`, and writes the result back. Nothing is
//! treated as having happened until the store acknowledges the write.

pub mod heats;
pub mod registry;
pub mod schedule;

pub use heats::{HeatConfirmationFlow, HeatGeneration};
pub use registry::{CellOverview, LiveCompetitionRegistry};
pub use schedule::ScheduleService;
