//! Kernel - one agent, one cycle at a time.

mod runner;
mod scheduler;

pub use runner::{Agent, CycleReport};
pub use scheduler::{CognitiveCycleScheduler, RunReport, SchedulerState, StopReason};
