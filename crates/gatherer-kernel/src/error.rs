//! Failure taxonomy for one cognitive cycle.

use gatherer_core::CreatureAction;

use crate::world::WorldError;

/// Why a cycle could not complete. Every variant stops the control loop; none is retried.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// Connection drop or malformed response from the simulator.
    #[error("simulator call failed: {0}")]
    Simulator(#[from] WorldError),

    /// Dispatch needed a tracked target or leaflet that fusion did not record.
    #[error("inconsistent state: {action} requires {missing}, but none is tracked")]
    InconsistentState {
        action: CreatureAction,
        missing: &'static str,
    },

    /// The snapshot does not describe a usable scene.
    #[error("malformed scene: {0}")]
    MalformedScene(String),
}

impl CycleError {
    pub fn missing(action: CreatureAction, missing: &'static str) -> Self {
        Self::InconsistentState { action, missing }
    }
}
