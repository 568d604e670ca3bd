//! World - the simulator contract the kernel drives.

mod sandbox;

use async_trait::async_trait;
use gatherer_core::{CreatureState, Inventory};
use serde::{Deserialize, Serialize};

pub use sandbox::{SandboxBuilder, SandboxWorld};

/// Fire-and-forget commands understood by the world simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulatorCommand {
    /// Spin in place with opposite wheel speeds.
    Rotate { left: f64, right: f64, speed: f64 },
    /// Drive straight along `orientation` (radians).
    MoveForward { speed: f64, orientation: f64 },
    NavigateTo { speed: f64, x: f64, y: f64 },
    /// Put a jewel in the sack.
    Collect { item: String },
    /// Eat a food item.
    Consume { item: String },
    Deliver { leaflet_id: String },
    Halt,
}

impl SimulatorCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rotate { .. } => "rotate",
            Self::MoveForward { .. } => "move_forward",
            Self::NavigateTo { .. } => "navigate_to",
            Self::Collect { .. } => "collect",
            Self::Consume { .. } => "consume",
            Self::Deliver { .. } => "deliver",
            Self::Halt => "halt",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("not connected to the world server")]
    Disconnected,

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("unknown creature: {0}")]
    UnknownCreature(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Request/response access to the world simulator.
///
/// Calls are awaited one at a time by the cycle worker. Implementations hold whatever connection
/// handle they need; [`WorldServer::release`] must be safe to call more than once and is invoked
/// on every worker exit path, including cancellation.
#[async_trait]
pub trait WorldServer: Send + Sync {
    /// Creature pose, fuel, leaflets and everything in view.
    async fn creature_state(&self, name: &str) -> Result<CreatureState, WorldError>;

    /// Per-color sack contents.
    async fn inventory(&self, bag_id: &str) -> Result<Inventory, WorldError>;

    async fn send(&self, agent_id: &str, command: SimulatorCommand) -> Result<(), WorldError>;

    fn is_connected(&self) -> bool;

    /// Drop the connection handle.
    fn release(&self) {}
}
