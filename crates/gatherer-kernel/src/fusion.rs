//! Sensor fusion - raw snapshot to activation vector.

use gatherer_core::{
    degrees_to_radians, normalize_angle, ActivationVector, Category, ColorCounts, CreatureState,
    Inventory, Slot, WorldObject, LEAFLET_COUNT,
};

use crate::config::Thresholds;
use crate::error::CycleError;
use crate::memory::{ActiveLeaflet, AgentMemory};

/// Raw signals before gating, kept for tracing and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub wall_ahead: bool,
    pub jewel_ahead: bool,
    pub food_ahead: bool,
    pub delivery_spot_ahead: bool,
    pub jewel_exists: bool,
    pub food_exists: bool,
    pub delivery_spot_exists: bool,
    /// A delivery spot is somewhere in view, at any distance, before gating.
    pub delivery_spot_in_view: bool,
    pub can_deliver: bool,
}

impl Signals {
    /// Straight MAX/MIN mapping of the gated signals. `Stop` is never raised by perception.
    pub fn to_vector(&self) -> ActivationVector {
        ActivationVector::all_min()
            .with(Slot::WallAhead, self.wall_ahead)
            .with(Slot::JewelAhead, self.jewel_ahead)
            .with(Slot::FoodAhead, self.food_ahead)
            .with(Slot::DeliverySpotAhead, self.delivery_spot_ahead)
            .with(Slot::JewelExists, self.jewel_exists)
            .with(Slot::FoodExists, self.food_exists)
            .with(Slot::DeliverySpotExists, self.delivery_spot_exists)
    }

    /// Applies the delivery overrides. First match wins and replaces all eight slots:
    /// - ready to deliver, no spot in view: search as if walled in
    /// - ready to deliver, spot ahead: deliver
    /// - not ready, spot ahead: steer away from the spot
    ///
    /// A ready agent with a visible but distant spot keeps the plain vector, so it can head for
    /// the spot.
    pub fn resolve(&self) -> ActivationVector {
        if self.can_deliver && !self.delivery_spot_in_view {
            ActivationVector::only(Slot::WallAhead)
        } else if self.delivery_spot_ahead {
            if self.can_deliver {
                ActivationVector::only(Slot::DeliverySpotAhead)
            } else {
                ActivationVector::only(Slot::WallAhead)
            }
        } else {
            self.to_vector()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SensorFusion {
    thresholds: Thresholds,
}

impl SensorFusion {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Builds this cycle's activation vector and refreshes `memory`'s tracked targets and leaflet
    /// bookkeeping.
    pub fn build(
        &self,
        creature: &CreatureState,
        inventory: &Inventory,
        memory: &mut AgentMemory,
    ) -> Result<ActivationVector, CycleError> {
        let signals = self.signals(creature, inventory, memory)?;
        let vector = signals.resolve();
        tracing::debug!(?signals, ?vector, "fused snapshot");
        Ok(vector)
    }

    /// Steps 1-5 of fusion: everything up to, but not including, the overrides.
    pub fn signals(
        &self,
        creature: &CreatureState,
        inventory: &Inventory,
        memory: &mut AgentMemory,
    ) -> Result<Signals, CycleError> {
        if !creature.scene.iter().any(|o| o.category == Category::Creature) {
            return Err(CycleError::MalformedScene(format!(
                "no creature record in snapshot for {}",
                creature.name
            )));
        }
        if creature.leaflets.len() > LEAFLET_COUNT {
            return Err(CycleError::MalformedScene(format!(
                "expected at most {LEAFLET_COUNT} leaflets, got {}",
                creature.leaflets.len()
            )));
        }

        memory.orientation = normalize_angle(degrees_to_radians(creature.pitch_degrees));
        memory.inventory = *inventory;

        let required = scan_leaflets(creature, memory);
        let still_needed = required.deficit(&inventory.jewels);
        let can_deliver = memory.can_deliver();

        let scene = &creature.scene;
        let t = &self.thresholds;
        let within = |pred: fn(Category) -> bool, limit: f64| {
            scene
                .iter()
                .any(|o| pred(o.category) && o.distance <= limit)
        };

        let mut signals = Signals {
            wall_ahead: within(Category::is_wall, t.wall_ahead),
            jewel_ahead: within(Category::is_jewel, t.item_ahead),
            food_ahead: within(Category::is_food, t.item_ahead),
            delivery_spot_ahead: within(Category::is_delivery_spot, t.item_ahead),
            can_deliver,
            ..Signals::default()
        };

        memory.closest_jewel = closest(scene, Category::is_jewel);
        memory.closest_food = closest(scene, Category::is_food);
        memory.delivery_spot = closest(scene, Category::is_delivery_spot);

        signals.jewel_exists = memory
            .closest_jewel
            .as_ref()
            .and_then(|j| j.category.jewel_color())
            .is_some_and(|color| still_needed[color.index()] > 0);
        signals.food_exists = memory.closest_food.is_some() && creature.fuel < t.fuel_hungry;
        signals.delivery_spot_in_view = memory.delivery_spot.is_some();
        signals.delivery_spot_exists = signals.delivery_spot_in_view && can_deliver;

        Ok(signals)
    }
}

/// Walks the leaflets in order, skipping delivered ones, up to and including the first active one.
/// Records the active leaflet in memory and returns the summed requirements of the walked leaflets.
fn scan_leaflets(creature: &CreatureState, memory: &mut AgentMemory) -> ColorCounts {
    memory.active_leaflet = None;
    let mut required = ColorCounts::ZERO;

    for (index, leaflet) in creature.leaflets.iter().enumerate() {
        if memory.is_delivered(index) {
            continue;
        }
        memory.observe_leaflet(index, leaflet);
        required.add(&leaflet.required);
        if leaflet.active {
            memory.active_leaflet = Some(ActiveLeaflet {
                id: leaflet.id.clone(),
                index,
            });
            break;
        }
    }

    required
}

fn closest(scene: &[WorldObject], pred: fn(Category) -> bool) -> Option<WorldObject> {
    scene
        .iter()
        .filter(|o| pred(o.category))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
        .cloned()
}
