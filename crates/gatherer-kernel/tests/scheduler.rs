use std::sync::Arc;
use std::time::Duration;

use gatherer_core::JewelColor;
use gatherer_kernel::observability::EventEmitter;
use gatherer_kernel::{
    Agent, CognitiveCycleScheduler, KernelConfig, RunReport, SandboxWorld, SchedulerState,
    SimulatorCommand, StopReason,
};
use gatherer_rules::RuleBank;

fn config(max_cycles: Option<u64>) -> KernelConfig {
    KernelConfig {
        max_cycles,
        seed: 42,
        ..KernelConfig::default()
    }
}

fn scheduler(
    world: &Arc<SandboxWorld>,
    config: KernelConfig,
) -> CognitiveCycleScheduler<SandboxWorld> {
    CognitiveCycleScheduler::new(Arc::clone(world), config, RuleBank::standard())
}

async fn join(s: &mut CognitiveCycleScheduler<SandboxWorld>) -> RunReport {
    tokio::time::timeout(Duration::from_secs(10), s.join())
        .await
        .expect("worker did not stop in time")
        .expect("worker produced no report")
}

/// A creature parked on a delivery spot (no fuel, so it cannot drive off) with jewels for all
/// three leaflets.
fn ready_world() -> SandboxWorld {
    SandboxWorld::builder()
        .creature("Creature_1", 0.0, 0.0)
        .fuel(0.0)
        .delivery_spot(10.0, 0.0)
        .sack(JewelColor::Red, 3)
        .leaflet("L1", [(JewelColor::Red, 1)])
        .leaflet("L2", [(JewelColor::Red, 1)])
        .leaflet("L3", [(JewelColor::Red, 1)])
        .build()
}

#[tokio::test]
async fn bounded_run_stops_at_cycle_limit() {
    let world = Arc::new(SandboxWorld::demo_arena());
    let mut s = scheduler(&world, config(Some(5)));
    assert_eq!(s.state(), SchedulerState::Idle);

    assert!(s.start());
    assert!(!s.start(), "second start is a no-op");
    let report = join(&mut s).await;

    assert_eq!(report.reason, StopReason::CycleLimit);
    assert_eq!(report.cycles, 5);
    assert_eq!(report.run_id, s.run_id());
    assert_eq!(s.state(), SchedulerState::Stopped);
    assert_eq!(world.release_count(), 1);
    assert!(!s.is_torn_down());
}

#[tokio::test]
async fn zero_cycle_budget_runs_nothing() {
    let world = Arc::new(SandboxWorld::demo_arena());
    let mut s = scheduler(&world, config(Some(0)));

    let report = s.run_to_end().await.expect("report");

    assert_eq!(report.cycles, 0);
    assert_eq!(report.reason, StopReason::CycleLimit);
    assert!(world.commands().is_empty());
}

#[tokio::test]
async fn delivering_all_leaflets_completes_and_tears_down() {
    let world = Arc::new(ready_world());
    let mut s = scheduler(&world, config(Some(500)));

    s.start();
    let report = join(&mut s).await;

    assert_eq!(report.reason, StopReason::TaskComplete);
    assert_eq!(report.delivered, [true, true, true]);
    assert_eq!(world.delivered_leaflets(), vec!["L1", "L2", "L3"]);
    assert_eq!(s.state(), SchedulerState::Stopped);
    assert!(s.is_torn_down());
    assert!(!s.start(), "a torn-down agent cannot restart");
    assert_eq!(world.release_count(), 1);
}

#[tokio::test]
async fn ready_agent_walks_to_a_distant_spot() {
    // Facing away from the spot, so only navigation can close the distance.
    let world = Arc::new(
        SandboxWorld::builder()
            .creature("Creature_1", 0.0, 0.0)
            .pitch_degrees(180.0)
            .delivery_spot(100.0, 0.0)
            .sack(JewelColor::Red, 3)
            .leaflet("L1", [(JewelColor::Red, 1)])
            .leaflet("L2", [(JewelColor::Red, 1)])
            .leaflet("L3", [(JewelColor::Red, 1)])
            .build(),
    );
    let mut s = scheduler(&world, config(Some(500)));

    s.start();
    let report = join(&mut s).await;

    assert_eq!(report.reason, StopReason::TaskComplete);
    assert_eq!(report.delivered, [true, true, true]);
    assert!(world
        .commands()
        .iter()
        .any(|c| matches!(c, SimulatorCommand::NavigateTo { x, .. } if *x == 100.0)));
}

#[tokio::test]
async fn abort_interrupts_a_pending_simulator_call() {
    let world = Arc::new(SandboxWorld::demo_arena());
    world.set_call_delay(Some(Duration::from_secs(60)));
    let mut s = scheduler(&world, config(None));

    s.start();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(s.state(), SchedulerState::Running);

    s.abort(false);
    let report = join(&mut s).await;

    assert_eq!(report.reason, StopReason::Aborted);
    assert_eq!(report.cycles, 0);
    assert_eq!(s.state(), SchedulerState::Stopped);
    assert_eq!(world.release_count(), 1);
    assert!(!s.is_torn_down());
}

#[tokio::test]
async fn abort_interrupts_the_inter_cycle_delay() {
    let world = Arc::new(SandboxWorld::demo_arena());
    let mut s = scheduler(
        &world,
        KernelConfig {
            cycle_delay_ms: 60_000,
            ..config(None)
        },
    );
    let mut snapshots = s.snapshots();

    s.start();
    tokio::time::timeout(Duration::from_secs(10), snapshots.changed())
        .await
        .expect("first cycle finished")
        .expect("worker alive");
    s.abort(true);
    let report = join(&mut s).await;

    assert_eq!(report.reason, StopReason::Aborted);
    assert_eq!(report.cycles, 1);
    assert!(s.is_torn_down());
    assert_eq!(world.release_count(), 1);
}

#[tokio::test]
async fn abort_before_start_is_terminal() {
    let world = Arc::new(SandboxWorld::demo_arena());
    let mut s = scheduler(&world, config(None));

    s.abort(true);

    assert_eq!(s.state(), SchedulerState::Stopped);
    assert!(s.is_torn_down());
    assert!(!s.start());
    assert!(s.join().await.is_none());
    assert_eq!(world.release_count(), 0);
}

#[tokio::test]
async fn simulator_failure_stops_the_loop() {
    // Each cycle makes three calls; the first call of cycle two drops the connection.
    let world = Arc::new(
        SandboxWorld::builder()
            .creature("Creature_1", 300.0, 300.0)
            .fail_at_call(4)
            .build(),
    );
    let mut s = scheduler(&world, config(Some(10)));

    s.start();
    let report = join(&mut s).await;

    assert!(matches!(report.reason, StopReason::Failed(_)), "{:?}", report.reason);
    assert_eq!(report.cycles, 1);
    assert_eq!(world.release_count(), 1);
}

#[tokio::test]
async fn malformed_scene_stops_the_loop() {
    let world = Arc::new(
        SandboxWorld::builder()
            .without_creature_record()
            .build(),
    );
    let mut s = scheduler(&world, config(Some(10)));

    let report = s.run_to_end().await.expect("report");

    match report.reason {
        StopReason::Failed(message) => assert!(message.contains("malformed scene"), "{message}"),
        other => panic!("unexpected stop reason {other:?}"),
    }
    assert_eq!(report.cycles, 0);
    assert!(world.commands().is_empty());
}

#[tokio::test]
async fn snapshots_follow_the_cycle_counter() {
    let world = Arc::new(SandboxWorld::demo_arena());
    let mut s = scheduler(&world, config(Some(3)));
    let snapshots = s.snapshots();
    assert_eq!(snapshots.borrow().cycle, 0);

    s.start();
    join(&mut s).await;

    let last = snapshots.borrow().clone();
    assert_eq!(last.cycle, 3);
    assert!(last.last_action.is_some());
    assert_eq!(last.delivered, [false, false, false]);
    assert_eq!(last.leaflets.len(), 3);
}

#[tokio::test]
async fn same_seed_replays_the_same_commands() {
    let run = || async {
        let world = Arc::new(SandboxWorld::demo_arena());
        let mut s = scheduler(&world, config(Some(40)));
        s.start();
        join(&mut s).await;
        world.commands()
    };

    let first = run().await;
    let second = run().await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn run_events_are_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let events = EventEmitter::new(dir.path().join("events.jsonl"));
    let world = Arc::new(ready_world());
    let mut s = scheduler(&world, config(Some(500))).with_events(events.clone());

    s.start();
    join(&mut s).await;

    let recorded = events.read_recent(100);
    let kinds: Vec<&str> = recorded.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(kinds.first(), Some(&"agent_start"));
    assert_eq!(kinds.last(), Some(&"agent_stop"));
    assert_eq!(kinds.iter().filter(|k| **k == "leaflet_delivered").count(), 3);
    assert!(recorded
        .iter()
        .all(|e| e.run_id.as_deref() == Some(s.run_id())));
}

#[tokio::test]
async fn agent_steps_one_cycle_at_a_time() {
    let world = SandboxWorld::demo_arena();
    let mut agent = Agent::new(&config(None), RuleBank::standard());

    let first = agent.step(&world).await.unwrap();
    let second = agent.step(&world).await.unwrap();

    assert_eq!(first.cycle, 0);
    assert_eq!(second.cycle, 1);
    assert_eq!(agent.cycle(), 2);
    assert_eq!(agent.arbiter().last_choice(), Some(second.action));
    assert_eq!(agent.memory().last_action, Some(second.action));
}
