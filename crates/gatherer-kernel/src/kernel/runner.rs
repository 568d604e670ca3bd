//! Runner - a single agent's sense, fuse, arbitrate, act cycle.

use gatherer_core::{ActivationVector, CreatureAction, CreatureState, CycleContext, Inventory};
use gatherer_rules::{Arbiter, RuleBank};

use crate::config::{CreatureConfig, KernelConfig};
use crate::dispatch::{ActuatorDispatch, DispatchOutcome};
use crate::error::CycleError;
use crate::fusion::SensorFusion;
use crate::memory::AgentMemory;
use crate::world::WorldServer;

/// Everything one cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub vector: ActivationVector,
    pub action: CreatureAction,
    pub outcome: DispatchOutcome,
}

/// The agent: fusion, arbitration and dispatch around an exclusively owned [`AgentMemory`].
pub struct Agent {
    creature: CreatureConfig,
    seed: u64,
    fusion: SensorFusion,
    arbiter: Arbiter,
    dispatch: ActuatorDispatch,
    memory: AgentMemory,
    cycle: u64,
}

impl Agent {
    pub fn new(config: &KernelConfig, bank: RuleBank) -> Self {
        Self {
            creature: config.creature.clone(),
            seed: config.seed,
            fusion: SensorFusion::new(config.thresholds),
            arbiter: Arbiter::new(bank),
            dispatch: ActuatorDispatch::new(config.actuation),
            memory: AgentMemory::new(),
            cycle: 0,
        }
    }

    pub fn creature(&self) -> &CreatureConfig {
        &self.creature
    }

    pub fn memory(&self) -> &AgentMemory {
        &self.memory
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    /// Completed cycles so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn perceive(
        &mut self,
        creature: &CreatureState,
        inventory: &Inventory,
    ) -> Result<ActivationVector, CycleError> {
        self.fusion.build(creature, inventory, &mut self.memory)
    }

    pub fn decide(&mut self, vector: &ActivationVector) -> CreatureAction {
        let mut rng = CycleContext::new(self.cycle, self.seed).rng_for_agent(&self.creature.id);
        self.arbiter.select(vector, &mut rng)
    }

    pub async fn act<W>(
        &mut self,
        action: CreatureAction,
        world: &W,
    ) -> Result<DispatchOutcome, CycleError>
    where
        W: WorldServer + ?Sized,
    {
        self.dispatch
            .execute(action, &mut self.memory, world, &self.creature.id)
            .await
    }

    pub(crate) fn finish_cycle(&mut self) -> u64 {
        self.cycle += 1;
        self.cycle
    }

    /// Runs one full cycle without interruption points.
    pub async fn step<W>(&mut self, world: &W) -> Result<CycleReport, CycleError>
    where
        W: WorldServer + ?Sized,
    {
        let creature = world.creature_state(&self.creature.name).await?;
        let inventory = world.inventory(&self.creature.bag_id).await?;

        let vector = self.perceive(&creature, &inventory)?;
        let action = self.decide(&vector);
        let outcome = self.act(action, world).await?;
        let cycle = self.cycle;
        self.finish_cycle();

        Ok(CycleReport {
            cycle,
            vector,
            action,
            outcome,
        })
    }
}
