//! Background scheduling for noticeboard.
//!
//! Runs the publication sweep on a fixed interval. The sweep itself lives
//! in `noticeboard-core`; this crate owns the timer, run isolation and
//! run bookkeeping.

mod executor;
pub mod scheduler;

pub use scheduler::{
    JobError, JobExecutor, SchedulerConfig, SchedulerHandle, SchedulerState, run_scheduler,
};
