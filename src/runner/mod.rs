//! Run orchestration: sequencing, isolation, interruption.

pub mod coordinator;
pub mod interrupt;

pub use coordinator::{run_isolated, RunCoordinator, RunOutcome, RunProgress};
pub use interrupt::InterruptFlag;
