//! Scheduler - drives the cognitive cycle on a dedicated worker task.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gatherer_core::{CreatureAction, LEAFLET_COUNT};
use gatherer_rules::RuleBank;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::runner::Agent;
use crate::config::KernelConfig;
use crate::dispatch::DispatchOutcome;
use crate::error::CycleError;
use crate::memory::MemorySnapshot;
use crate::observability::{EventEmitter, EventWriter, KernelEvent};
use crate::world::WorldServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// The configured cycle budget was used up.
    CycleLimit,
    /// All leaflets delivered.
    TaskComplete,
    Aborted,
    Failed(String),
}

/// Result of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub cycles: u64,
    pub reason: StopReason,
    pub delivered: [bool; LEAFLET_COUNT],
}

/// Owns one agent and runs its cycle loop on a spawned task.
///
/// State machine: `Idle -> Running -> Stopped`. `start` only acts from `Idle`. `abort` is a
/// message to the worker, observed at the top of each iteration and raced against every simulator
/// call; the worker releases the world connection on every exit path.
pub struct CognitiveCycleScheduler<W>
where
    W: WorldServer + 'static,
{
    world: Arc<W>,
    config: KernelConfig,
    agent: Option<Agent>,
    events: Option<EventEmitter>,
    run_id: String,
    abort_tx: watch::Sender<bool>,
    state_tx: Option<watch::Sender<SchedulerState>>,
    state_rx: watch::Receiver<SchedulerState>,
    snapshot_tx: Option<watch::Sender<MemorySnapshot>>,
    snapshot_rx: watch::Receiver<MemorySnapshot>,
    worker: Option<JoinHandle<RunReport>>,
    torn_down: Arc<AtomicBool>,
}

impl<W> CognitiveCycleScheduler<W>
where
    W: WorldServer + 'static,
{
    pub fn new(world: Arc<W>, config: KernelConfig, bank: RuleBank) -> Self {
        let agent = Agent::new(&config, bank);
        let (abort_tx, _) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let (snapshot_tx, snapshot_rx) = watch::channel(MemorySnapshot::default());

        Self {
            world,
            config,
            agent: Some(agent),
            events: None,
            run_id: uuid::Uuid::new_v4().to_string(),
            abort_tx,
            state_tx: Some(state_tx),
            state_rx,
            snapshot_tx: Some(snapshot_tx),
            snapshot_rx,
            worker: None,
            torn_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Record start, delivery and stop events to `events`.
    pub fn with_events(mut self, events: EventEmitter) -> Self {
        self.events = Some(events);
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn state(&self) -> SchedulerState {
        *self.state_rx.borrow()
    }

    /// The agent has been torn down (task complete or aborted with teardown) and cannot run again.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// Stable memory copies, published after every cycle.
    pub fn snapshots(&self) -> watch::Receiver<MemorySnapshot> {
        self.snapshot_rx.clone()
    }

    /// Spawns the worker. Returns `false` (and does nothing) unless the scheduler is `Idle`.
    pub fn start(&mut self) -> bool {
        if self.state() != SchedulerState::Idle || self.is_torn_down() {
            return false;
        }
        let (Some(agent), Some(state_tx), Some(snapshot_tx)) = (
            self.agent.take(),
            self.state_tx.take(),
            self.snapshot_tx.take(),
        ) else {
            return false;
        };

        state_tx.send_replace(SchedulerState::Running);

        let worker = Worker {
            agent,
            world: Arc::clone(&self.world),
            max_cycles: self.config.max_cycles,
            delay: self.config.cycle_delay(),
            run_id: self.run_id.clone(),
            events: self.events.clone().map(EventEmitter::spawn_writer),
            abort: self.abort_tx.subscribe(),
            snapshots: snapshot_tx,
            torn_down: Arc::clone(&self.torn_down),
        };
        let guard = ReleaseGuard {
            world: Arc::clone(&self.world),
            state: state_tx,
        };

        tracing::info!(run_id = %self.run_id, max_cycles = ?self.config.max_cycles, "starting agent");
        self.worker = Some(tokio::spawn(worker.run(guard)));
        true
    }

    /// Asks the worker to stop. With `teardown`, the agent is also destroyed and the scheduler can
    /// never be started again.
    pub fn abort(&mut self, teardown: bool) {
        tracing::info!(run_id = %self.run_id, teardown, "aborting agent");
        self.abort_tx.send_replace(true);

        if teardown {
            self.torn_down.store(true, Ordering::SeqCst);
            self.agent = None;
        }
        // Never started: there is no worker to move us to Stopped.
        if let Some(state_tx) = self.state_tx.as_ref() {
            state_tx.send_replace(SchedulerState::Stopped);
        }
    }

    /// Waits for the worker to finish. `None` if it was never started or already joined.
    ///
    /// Cancel safe: dropping the future before completion leaves the worker joinable.
    pub async fn join(&mut self) -> Option<RunReport> {
        let result = self.worker.as_mut()?.await;
        self.worker = None;
        match result {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(run_id = %self.run_id, error = %e, "cycle worker did not finish cleanly");
                None
            }
        }
    }

    /// Starts (if idle) and waits for the run to end.
    pub async fn run_to_end(&mut self) -> Option<RunReport> {
        self.start();
        self.join().await
    }
}

/// Releases the world connection and marks the scheduler stopped, however the worker exits.
struct ReleaseGuard<W>
where
    W: WorldServer + 'static,
{
    world: Arc<W>,
    state: watch::Sender<SchedulerState>,
}

impl<W> Drop for ReleaseGuard<W>
where
    W: WorldServer + 'static,
{
    fn drop(&mut self) {
        self.world.release();
        self.state.send_replace(SchedulerState::Stopped);
    }
}

struct Worker<W>
where
    W: WorldServer + 'static,
{
    agent: Agent,
    world: Arc<W>,
    max_cycles: Option<u64>,
    delay: std::time::Duration,
    run_id: String,
    events: Option<EventWriter>,
    abort: watch::Receiver<bool>,
    snapshots: watch::Sender<MemorySnapshot>,
    torn_down: Arc<AtomicBool>,
}

impl<W> Worker<W>
where
    W: WorldServer + 'static,
{
    async fn run(mut self, guard: ReleaseGuard<W>) -> RunReport {
        self.emit(KernelEvent::new("agent_start", "Agent started"));

        let reason = self.cycle_loop().await;
        if reason == StopReason::TaskComplete {
            self.torn_down.store(true, Ordering::SeqCst);
        }

        let report = RunReport {
            run_id: self.run_id.clone(),
            cycles: self.agent.cycle(),
            reason,
            delivered: self.agent.memory().delivered_flags(),
        };

        tracing::info!(
            run_id = %report.run_id,
            cycles = report.cycles,
            reason = ?report.reason,
            "agent stopped"
        );
        self.emit(
            KernelEvent::new("agent_stop", "Agent stopped").with_metadata(
                serde_json::to_value(&report).unwrap_or(serde_json::Value::Null),
            ),
        );
        if let Some(events) = self.events.take() {
            events.close().await;
        }

        drop(guard);
        report
    }

    async fn cycle_loop(&mut self) -> StopReason {
        loop {
            if *self.abort.borrow() {
                return StopReason::Aborted;
            }
            if self.max_cycles == Some(self.agent.cycle()) {
                return StopReason::CycleLimit;
            }

            let (action, outcome) = match self.run_cycle().await {
                Ok(Some(done)) => done,
                Ok(None) => return StopReason::Aborted,
                Err(e) => {
                    tracing::error!(run_id = %self.run_id, cycle = self.agent.cycle(), error = %e, "cycle failed");
                    self.emit(KernelEvent::new("cycle_failed", e.to_string()));
                    return StopReason::Failed(e.to_string());
                }
            };

            let cycle = self.agent.cycle();
            self.snapshots
                .send_replace(self.agent.memory().snapshot(cycle));

            if action == CreatureAction::DeliverLeaflet {
                self.emit(KernelEvent::new("leaflet_delivered", "Leaflet delivered").with_metadata(
                    serde_json::json!({ "delivered": self.agent.memory().delivered_flags() }),
                ));
            }
            if outcome == DispatchOutcome::TaskComplete {
                return StopReason::TaskComplete;
            }
            if self.max_cycles == Some(cycle) {
                return StopReason::CycleLimit;
            }

            if !self.delay.is_zero()
                && abortable(&mut self.abort, tokio::time::sleep(self.delay))
                    .await
                    .is_none()
            {
                return StopReason::Aborted;
            }
        }
    }

    /// One cycle with an abort point around each simulator call. `Ok(None)` means aborted.
    async fn run_cycle(&mut self) -> Result<Option<(CreatureAction, DispatchOutcome)>, CycleError> {
        let world = &*self.world;
        let name = self.agent.creature().name.clone();
        let bag_id = self.agent.creature().bag_id.clone();

        tracing::debug!(cycle = self.agent.cycle(), "cycle start");

        let Some(creature) = abortable(&mut self.abort, world.creature_state(&name)).await else {
            return Ok(None);
        };
        let creature = creature?;

        let Some(inventory) = abortable(&mut self.abort, world.inventory(&bag_id)).await else {
            return Ok(None);
        };
        let inventory = inventory?;

        let vector = self.agent.perceive(&creature, &inventory)?;
        let action = self.agent.decide(&vector);

        let Some(outcome) = abortable(&mut self.abort, self.agent.act(action, world)).await else {
            return Ok(None);
        };
        let outcome = outcome?;

        let cycle = self.agent.finish_cycle();
        tracing::debug!(cycle, action = %action, ?outcome, "cycle end");
        Ok(Some((action, outcome)))
    }

    fn emit(&self, event: KernelEvent) {
        if let Some(events) = &self.events {
            events.send(event.with_run(&self.run_id, self.agent.cycle()));
        }
    }
}

/// Resolves once abort is requested, or once the scheduler side has gone away.
async fn until_aborted(abort: &mut watch::Receiver<bool>) {
    let _ = abort.wait_for(|aborted| *aborted).await;
}

/// Races `fut` against abort. `None` means abort won.
async fn abortable<T>(abort: &mut watch::Receiver<bool>, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        _ = until_aborted(abort) => None,
        out = fut => Some(out),
    }
}
