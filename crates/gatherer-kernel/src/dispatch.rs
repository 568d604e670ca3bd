//! Dispatch - maps the winning action onto a simulator command.

use gatherer_core::CreatureAction;

use crate::config::ActuationConfig;
use crate::error::CycleError;
use crate::memory::AgentMemory;
use crate::world::{SimulatorCommand, WorldServer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    /// Every leaflet has been delivered; the agent is done.
    TaskComplete,
}

/// Turns actions into commands and keeps delivery bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActuatorDispatch {
    actuation: ActuationConfig,
}

impl ActuatorDispatch {
    pub fn new(actuation: ActuationConfig) -> Self {
        Self { actuation }
    }

    /// The command `action` maps to, given what fusion tracked this cycle. `DoNothing` maps to no
    /// command. Targeted actions without a tracked target are a contract violation.
    pub fn command_for(
        &self,
        action: CreatureAction,
        memory: &AgentMemory,
    ) -> Result<Option<SimulatorCommand>, CycleError> {
        let a = &self.actuation;
        let command = match action {
            CreatureAction::DoNothing => return Ok(None),
            CreatureAction::RotateClockwise => SimulatorCommand::Rotate {
                left: a.rotate_left,
                right: a.rotate_right,
                speed: a.rotate_speed,
            },
            CreatureAction::GoAhead => SimulatorCommand::MoveForward {
                speed: a.forward_speed,
                orientation: memory.orientation,
            },
            CreatureAction::GoToJewel => {
                let jewel = tracked(action, &memory.closest_jewel, "a tracked jewel")?;
                navigate(a.navigate_speed, jewel)
            }
            CreatureAction::GoToFood => {
                let food = tracked(action, &memory.closest_food, "a tracked food")?;
                navigate(a.navigate_speed, food)
            }
            CreatureAction::GoToDeliverySpot => {
                let spot = tracked(action, &memory.delivery_spot, "a tracked delivery spot")?;
                navigate(a.navigate_speed, spot)
            }
            CreatureAction::PickUpJewel => SimulatorCommand::Collect {
                item: tracked(action, &memory.closest_jewel, "a tracked jewel")?
                    .name
                    .clone(),
            },
            CreatureAction::EatFood => SimulatorCommand::Consume {
                item: tracked(action, &memory.closest_food, "a tracked food")?
                    .name
                    .clone(),
            },
            CreatureAction::DeliverLeaflet => SimulatorCommand::Deliver {
                leaflet_id: tracked(action, &memory.active_leaflet, "an active leaflet")?
                    .id
                    .clone(),
            },
            CreatureAction::Stop => SimulatorCommand::Halt,
        };
        Ok(Some(command))
    }

    /// Post-send bookkeeping. Delivering marks the active leaflet delivered and reports
    /// completion once all three are in.
    pub fn settle(
        &self,
        action: CreatureAction,
        memory: &mut AgentMemory,
    ) -> Result<DispatchOutcome, CycleError> {
        memory.last_action = Some(action);
        if action != CreatureAction::DeliverLeaflet {
            return Ok(DispatchOutcome::Continue);
        }

        let index = tracked(action, &memory.active_leaflet, "an active leaflet")?.index;
        let done = memory.mark_delivered(index);
        tracing::info!(leaflet = index, "leaflet delivered");

        if done {
            tracing::info!("all leaflets delivered");
            Ok(DispatchOutcome::TaskComplete)
        } else {
            Ok(DispatchOutcome::Continue)
        }
    }

    /// Sends the command for `action` and settles memory once the simulator accepted it.
    pub async fn execute<W>(
        &self,
        action: CreatureAction,
        memory: &mut AgentMemory,
        world: &W,
        agent_id: &str,
    ) -> Result<DispatchOutcome, CycleError>
    where
        W: WorldServer + ?Sized,
    {
        if let Some(command) = self.command_for(action, memory)? {
            world.send(agent_id, command).await?;
        }
        self.settle(action, memory)
    }
}

fn tracked<'a, T>(
    action: CreatureAction,
    slot: &'a Option<T>,
    missing: &'static str,
) -> Result<&'a T, CycleError> {
    slot.as_ref()
        .ok_or_else(|| CycleError::missing(action, missing))
}

fn navigate(speed: f64, target: &gatherer_core::WorldObject) -> SimulatorCommand {
    SimulatorCommand::NavigateTo {
        speed,
        x: target.x,
        y: target.y,
    }
}
