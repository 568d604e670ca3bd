//! Gatherer Kernel - the agent's sense, fuse, arbitrate, act loop.
//!
//! This crate owns the agent's lifetime state, turns simulator snapshots into activation vectors,
//! maps chosen actions back onto simulator commands, and drives the whole thing on a dedicated
//! worker task with cooperative abort.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod fusion;
pub mod kernel;
pub mod memory;
pub mod observability;
pub mod world;

pub use config::KernelConfig;
pub use dispatch::{ActuatorDispatch, DispatchOutcome};
pub use error::CycleError;
pub use fusion::{SensorFusion, Signals};
pub use kernel::{
    Agent, CognitiveCycleScheduler, CycleReport, RunReport, SchedulerState, StopReason,
};
pub use memory::{AgentMemory, MemorySnapshot};
pub use world::{SandboxBuilder, SandboxWorld, SimulatorCommand, WorldError, WorldServer};
