//! In-process world used by tests and `gatherer run`.
//!
//! Not a physics engine: the creature is a point, every object is visible, and motion is a fixed
//! step per command. It is enough to exercise the full cycle without a running simulator.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use gatherer_core::{
    Category, ColorCounts, CreatureState, Inventory, JewelColor, Leaflet, WorldObject,
};

use super::{SimulatorCommand, WorldError, WorldServer};

/// Distance covered per unit of speed by one motion command.
const STEP: f64 = 10.0;
/// Degrees turned per unit of rotate speed.
const TURN_DEGREES: f64 = 7.5;
/// Collect, consume and deliver only succeed within this distance.
const REACH: f64 = 30.0;
const FULL_FUEL: f64 = 1000.0;

#[derive(Debug, Clone)]
struct Item {
    name: String,
    category: Category,
    x: f64,
    y: f64,
}

#[derive(Debug)]
struct SandboxState {
    creature_id: String,
    creature_name: String,
    x: f64,
    y: f64,
    pitch_degrees: f64,
    fuel: f64,
    report_creature: bool,
    items: Vec<Item>,
    leaflets: Vec<Leaflet>,
    delivered: Vec<String>,
    sack: Inventory,
    commands: Vec<SimulatorCommand>,
    rejected: Vec<SimulatorCommand>,
    calls: usize,
    fail_at_call: Option<usize>,
    call_delay: Option<Duration>,
}

impl SandboxState {
    fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }

    fn snapshot(&self) -> CreatureState {
        let mut scene: Vec<WorldObject> = self
            .items
            .iter()
            .map(|i| {
                WorldObject::new(&i.name, i.category, i.x, i.y, self.distance_to(i.x, i.y))
            })
            .collect();
        if self.report_creature {
            scene.insert(
                0,
                WorldObject::new(&self.creature_name, Category::Creature, self.x, self.y, 0.0),
            );
        }

        CreatureState {
            id: self.creature_id.clone(),
            name: self.creature_name.clone(),
            pitch_degrees: self.pitch_degrees,
            fuel: self.fuel,
            x: self.x,
            y: self.y,
            leaflets: self.leaflets.clone(),
            scene,
        }
    }

    fn advance(&mut self, dx: f64, dy: f64, speed: f64) {
        if self.fuel <= 0.0 {
            return;
        }
        self.x += dx;
        self.y += dy;
        self.fuel = (self.fuel - speed.abs()).max(0.0);
    }

    fn take_item(&mut self, name: &str, pred: fn(Category) -> bool) -> Option<Item> {
        let pos = self.items.iter().position(|i| {
            i.name == name && pred(i.category) && self.distance_to(i.x, i.y) <= REACH
        })?;
        Some(self.items.remove(pos))
    }

    fn spot_in_reach(&self) -> bool {
        self.items
            .iter()
            .any(|i| i.category.is_delivery_spot() && self.distance_to(i.x, i.y) <= REACH)
    }

    /// Applies a command; returns `false` if the world refused it.
    fn apply(&mut self, command: &SimulatorCommand) -> bool {
        match command {
            SimulatorCommand::Rotate { left, right, speed } => {
                let direction = if left >= right { 1.0 } else { -1.0 };
                self.pitch_degrees += direction * speed.abs() * TURN_DEGREES;
                true
            }
            SimulatorCommand::MoveForward { speed, orientation } => {
                let d = speed * STEP;
                self.advance(orientation.cos() * d, orientation.sin() * d, *speed);
                true
            }
            SimulatorCommand::NavigateTo { speed, x, y } => {
                let remaining = self.distance_to(*x, *y);
                if remaining > f64::EPSILON {
                    let d = (speed * STEP).min(remaining);
                    let (ux, uy) = ((x - self.x) / remaining, (y - self.y) / remaining);
                    self.pitch_degrees = uy.atan2(ux).to_degrees();
                    self.advance(ux * d, uy * d, *speed);
                }
                true
            }
            SimulatorCommand::Collect { item } => {
                match self.take_item(item, Category::is_jewel) {
                    Some(Item {
                        category: Category::Jewel(color),
                        ..
                    }) => {
                        self.sack.jewels[color] += 1;
                        true
                    }
                    _ => false,
                }
            }
            SimulatorCommand::Consume { item } => {
                if self.take_item(item, Category::is_food).is_some() {
                    self.sack.food += 1;
                    self.fuel = FULL_FUEL;
                    true
                } else {
                    false
                }
            }
            SimulatorCommand::Deliver { leaflet_id } => self.deliver(leaflet_id),
            SimulatorCommand::Halt => true,
        }
    }

    fn deliver(&mut self, leaflet_id: &str) -> bool {
        if !self.spot_in_reach() || self.delivered.iter().any(|d| d == leaflet_id) {
            return false;
        }
        let Some(index) = self.leaflets.iter().position(|l| l.id == leaflet_id) else {
            return false;
        };
        let required = self.leaflets[index].required;
        if !self.sack.jewels.covers(&required) {
            return false;
        }

        for (color, n) in required.iter() {
            self.sack.jewels[color] -= n;
        }
        self.delivered.push(leaflet_id.to_string());
        self.leaflets[index].active = false;
        self.activate_next();
        true
    }

    fn activate_next(&mut self) {
        if self.leaflets.iter().any(|l| l.active) {
            return;
        }
        let delivered = &self.delivered;
        if let Some(next) = self
            .leaflets
            .iter_mut()
            .find(|l| !delivered.iter().any(|d| *d == l.id))
        {
            next.active = true;
        }
    }
}

/// In-process [`WorldServer`] implementation.
#[derive(Debug)]
pub struct SandboxWorld {
    state: Mutex<SandboxState>,
    connected: AtomicBool,
    releases: AtomicUsize,
}

impl SandboxWorld {
    pub fn builder() -> SandboxBuilder {
        SandboxBuilder::default()
    }

    /// Walled arena with one delivery spot, a little food, and enough jewels for three small
    /// leaflets.
    pub fn demo_arena() -> Self {
        use JewelColor::*;

        Self::builder()
            .creature("Creature_1", 400.0, 200.0)
            .fuel(900.0)
            .wall(400.0, 25.0)
            .wall(400.0, 580.0)
            .wall(25.0, 300.0)
            .wall(775.0, 300.0)
            .delivery_spot(415.0, 252.0)
            .food(415.0, 212.0)
            .jewel(Red, 200.0, 200.0)
            .jewel(Red, 420.0, 100.0)
            .jewel(Green, 340.0, 220.0)
            .jewel(Blue, 440.0, 240.0)
            .jewel(Yellow, 500.0, 220.0)
            .jewel(Magenta, 400.0, 340.0)
            .jewel(White, 310.0, 240.0)
            .jewel(White, 500.0, 400.0)
            .leaflet("1", [(Red, 1), (Green, 1)])
            .leaflet("2", [(Blue, 1), (Yellow, 1), (White, 1)])
            .leaflet("3", [(Red, 1), (Magenta, 1), (White, 1)])
            .build()
    }

    fn lock(&self) -> MutexGuard<'_, SandboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts a call, failing it (and dropping the connection) if it is the injected failure.
    fn begin_call(&self) -> Result<Option<Duration>, WorldError> {
        if !self.is_connected() {
            return Err(WorldError::Disconnected);
        }
        let mut state = self.lock();
        state.calls += 1;
        if state.fail_at_call == Some(state.calls) {
            self.connected.store(false, Ordering::SeqCst);
            return Err(WorldError::Disconnected);
        }
        Ok(state.call_delay)
    }

    /// Every accepted command, in order.
    pub fn commands(&self) -> Vec<SimulatorCommand> {
        self.lock().commands.clone()
    }

    /// Commands the world refused (out of reach, missing item, unmet leaflet).
    pub fn rejected(&self) -> Vec<SimulatorCommand> {
        self.lock().rejected.clone()
    }

    pub fn delivered_leaflets(&self) -> Vec<String> {
        self.lock().delivered.clone()
    }

    pub fn position(&self) -> (f64, f64) {
        let state = self.lock();
        (state.x, state.y)
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Make every subsequent call take `delay` before answering.
    pub fn set_call_delay(&self, delay: Option<Duration>) {
        self.lock().call_delay = delay;
    }
}

#[async_trait]
impl WorldServer for SandboxWorld {
    async fn creature_state(&self, name: &str) -> Result<CreatureState, WorldError> {
        if let Some(delay) = self.begin_call()? {
            tokio::time::sleep(delay).await;
        }
        let state = self.lock();
        if state.creature_name != name {
            return Err(WorldError::UnknownCreature(name.to_string()));
        }
        Ok(state.snapshot())
    }

    async fn inventory(&self, _bag_id: &str) -> Result<Inventory, WorldError> {
        if let Some(delay) = self.begin_call()? {
            tokio::time::sleep(delay).await;
        }
        Ok(self.lock().sack)
    }

    async fn send(&self, agent_id: &str, command: SimulatorCommand) -> Result<(), WorldError> {
        if let Some(delay) = self.begin_call()? {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.lock();
        if state.creature_id != agent_id {
            return Err(WorldError::UnknownCreature(agent_id.to_string()));
        }
        if state.apply(&command) {
            state.commands.push(command);
        } else {
            tracing::debug!(command = command.name(), "sandbox refused command");
            state.rejected.push(command);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// Builder for [`SandboxWorld`].
#[derive(Debug)]
pub struct SandboxBuilder {
    state: SandboxState,
    counter: usize,
}

impl Default for SandboxBuilder {
    fn default() -> Self {
        Self {
            state: SandboxState {
                creature_id: "Creature_1".to_string(),
                creature_name: "Creature_1".to_string(),
                x: 0.0,
                y: 0.0,
                pitch_degrees: 0.0,
                fuel: FULL_FUEL,
                report_creature: true,
                items: Vec::new(),
                leaflets: Vec::new(),
                delivered: Vec::new(),
                sack: Inventory::default(),
                commands: Vec::new(),
                rejected: Vec::new(),
                calls: 0,
                fail_at_call: None,
                call_delay: None,
            },
            counter: 0,
        }
    }
}

impl SandboxBuilder {
    pub fn creature(mut self, name: impl Into<String>, x: f64, y: f64) -> Self {
        let name = name.into();
        self.state.creature_id = name.clone();
        self.state.creature_name = name;
        self.state.x = x;
        self.state.y = y;
        self
    }

    pub fn pitch_degrees(mut self, degrees: f64) -> Self {
        self.state.pitch_degrees = degrees;
        self
    }

    pub fn fuel(mut self, fuel: f64) -> Self {
        self.state.fuel = fuel;
        self
    }

    fn item(mut self, prefix: &str, category: Category, x: f64, y: f64) -> Self {
        self.counter += 1;
        self.state.items.push(Item {
            name: format!("{prefix}_{}", self.counter),
            category,
            x,
            y,
        });
        self
    }

    pub fn wall(self, x: f64, y: f64) -> Self {
        self.item("Brick", Category::Wall, x, y)
    }

    pub fn jewel(self, color: JewelColor, x: f64, y: f64) -> Self {
        self.item("Jewel", Category::Jewel(color), x, y)
    }

    pub fn food(self, x: f64, y: f64) -> Self {
        self.item("Food", Category::Food { perishable: true }, x, y)
    }

    pub fn nut(self, x: f64, y: f64) -> Self {
        self.item("Food", Category::Food { perishable: false }, x, y)
    }

    pub fn delivery_spot(self, x: f64, y: f64) -> Self {
        self.item("DeliverySpot", Category::DeliverySpot, x, y)
    }

    pub fn leaflet(
        mut self,
        id: impl Into<String>,
        required: impl IntoIterator<Item = (JewelColor, u32)>,
    ) -> Self {
        self.state.leaflets.push(Leaflet::new(
            id,
            ColorCounts::from_pairs(required),
            false,
        ));
        self
    }

    pub fn sack(mut self, color: JewelColor, count: u32) -> Self {
        self.state.sack.jewels[color] += count;
        self
    }

    /// Leave the creature's own record out of the scene, as a broken proxy would.
    pub fn without_creature_record(mut self) -> Self {
        self.state.report_creature = false;
        self
    }

    /// The `n`th call (1-based, any method) fails with a dropped connection.
    pub fn fail_at_call(mut self, n: usize) -> Self {
        self.state.fail_at_call = Some(n);
        self
    }

    pub fn build(mut self) -> SandboxWorld {
        self.state.activate_next();
        SandboxWorld {
            state: Mutex::new(self.state),
            connected: AtomicBool::new(true),
            releases: AtomicUsize::new(0),
        }
    }
}
