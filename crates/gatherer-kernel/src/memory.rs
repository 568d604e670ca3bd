//! Agent-lifetime state shared between fusion and dispatch.

use gatherer_core::{CreatureAction, Inventory, Leaflet, WorldObject, LEAFLET_COUNT};
use serde::Serialize;

/// Bookkeeping for one of the three leaflets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeafletRecord {
    delivered: bool,
    /// Current inventory satisfies this leaflet in full.
    pub completion: bool,
    /// Last manifest seen for this index.
    pub leaflet: Option<Leaflet>,
}

impl LeafletRecord {
    pub fn delivered(&self) -> bool {
        self.delivered
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveLeaflet {
    pub id: String,
    pub index: usize,
}

/// State owned by the cycle worker for the agent's whole lifetime.
///
/// `delivered` flags are monotonic: the only writer is [`AgentMemory::mark_delivered`], and nothing
/// clears them.
#[derive(Debug, Clone, Default)]
pub struct AgentMemory {
    leaflets: [LeafletRecord; LEAFLET_COUNT],
    pub closest_jewel: Option<WorldObject>,
    pub closest_food: Option<WorldObject>,
    pub delivery_spot: Option<WorldObject>,
    pub active_leaflet: Option<ActiveLeaflet>,
    /// Mirror of the sack as of the current cycle.
    pub inventory: Inventory,
    /// Normalized orientation (radians) as of the current cycle.
    pub orientation: f64,
    pub last_action: Option<CreatureAction>,
}

impl AgentMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaflet(&self, index: usize) -> Option<&LeafletRecord> {
        self.leaflets.get(index)
    }

    pub fn is_delivered(&self, index: usize) -> bool {
        self.leaflets.get(index).is_some_and(|r| r.delivered)
    }

    pub fn all_delivered(&self) -> bool {
        self.leaflets.iter().all(|r| r.delivered)
    }

    pub fn delivered_flags(&self) -> [bool; LEAFLET_COUNT] {
        core::array::from_fn(|i| self.leaflets[i].delivered)
    }

    pub fn completion_flags(&self) -> [bool; LEAFLET_COUNT] {
        core::array::from_fn(|i| self.leaflets[i].completion)
    }

    /// Refreshes the manifest mirror and completion flag for a non-delivered leaflet.
    pub(crate) fn observe_leaflet(&mut self, index: usize, leaflet: &Leaflet) {
        let inventory = self.inventory;
        if let Some(record) = self.leaflets.get_mut(index) {
            record.completion = inventory.can_satisfy(leaflet);
            record.leaflet = Some(leaflet.clone());
        }
    }

    /// Marks a leaflet handed in. Returns `true` once all leaflets are delivered.
    pub fn mark_delivered(&mut self, index: usize) -> bool {
        if let Some(record) = self.leaflets.get_mut(index) {
            record.delivered = true;
            record.completion = false;
        }
        self.all_delivered()
    }

    /// The inventory covers every requirement of the active leaflet.
    pub fn can_deliver(&self) -> bool {
        let Some(active) = &self.active_leaflet else {
            return false;
        };
        self.leaflets
            .get(active.index)
            .filter(|r| !r.delivered)
            .and_then(|r| r.leaflet.as_ref())
            .is_some_and(|l| self.inventory.can_satisfy(l))
    }

    pub fn snapshot(&self, cycle: u64) -> MemorySnapshot {
        MemorySnapshot {
            cycle,
            delivered: self.delivered_flags(),
            completion: self.completion_flags(),
            inventory: self.inventory,
            leaflets: self.leaflets.iter().map(|r| r.leaflet.clone()).collect(),
            active_leaflet: self.active_leaflet.clone(),
            closest_jewel: self.closest_jewel.as_ref().map(|o| o.name.clone()),
            closest_food: self.closest_food.as_ref().map(|o| o.name.clone()),
            delivery_spot: self.delivery_spot.as_ref().map(|o| o.name.clone()),
            last_action: self.last_action,
        }
    }
}

/// Read-only copy of [`AgentMemory`] for diagnostic viewers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemorySnapshot {
    pub cycle: u64,
    pub delivered: [bool; LEAFLET_COUNT],
    pub completion: [bool; LEAFLET_COUNT],
    pub inventory: Inventory,
    pub leaflets: Vec<Option<Leaflet>>,
    pub active_leaflet: Option<ActiveLeaflet>,
    pub closest_jewel: Option<String>,
    pub closest_food: Option<String>,
    pub delivery_spot: Option<String>,
    pub last_action: Option<CreatureAction>,
}
