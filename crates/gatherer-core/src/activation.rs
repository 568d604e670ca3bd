use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const MAX_ACTIVATION: f64 = 1.0;
pub const MIN_ACTIVATION: f64 = 0.0;

/// The eight named inputs fusion produces each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Slot {
    WallAhead,
    JewelAhead,
    FoodAhead,
    DeliverySpotAhead,
    JewelExists,
    FoodExists,
    DeliverySpotExists,
    Stop,
}

impl Slot {
    pub const ALL: [Slot; 8] = [
        Slot::WallAhead,
        Slot::JewelAhead,
        Slot::FoodAhead,
        Slot::DeliverySpotAhead,
        Slot::JewelExists,
        Slot::FoodExists,
        Slot::DeliverySpotExists,
        Slot::Stop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Slot::WallAhead => "WallAhead",
            Slot::JewelAhead => "JewelAhead",
            Slot::FoodAhead => "FoodAhead",
            Slot::DeliverySpotAhead => "DeliverySpotAhead",
            Slot::JewelExists => "JewelExists",
            Slot::FoodExists => "FoodExists",
            Slot::DeliverySpotExists => "DeliverySpotExists",
            Slot::Stop => "Stop",
        }
    }
}

/// Fixed-size activation vector.
///
/// Every slot always holds either [`MAX_ACTIVATION`] or [`MIN_ACTIVATION`]; the representation is a
/// bitset, so an unset or intermediate value cannot be constructed.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActivationVector {
    bits: u8,
}

impl ActivationVector {
    /// All slots at `MIN_ACTIVATION`.
    pub const fn all_min() -> Self {
        Self { bits: 0 }
    }

    /// Exactly one slot at `MAX_ACTIVATION`, the rest at `MIN_ACTIVATION`.
    pub fn only(slot: Slot) -> Self {
        Self::all_min().with(slot, true)
    }

    pub fn with(mut self, slot: Slot, on: bool) -> Self {
        self.set(slot, on);
        self
    }

    pub fn set(&mut self, slot: Slot, on: bool) {
        let mask = 1u8 << (slot as u8);
        if on {
            self.bits |= mask;
        } else {
            self.bits &= !mask;
        }
    }

    pub fn is_max(&self, slot: Slot) -> bool {
        self.bits & (1u8 << (slot as u8)) != 0
    }

    pub fn is_min(&self, slot: Slot) -> bool {
        !self.is_max(slot)
    }

    pub fn get(&self, slot: Slot) -> f64 {
        if self.is_max(slot) {
            MAX_ACTIVATION
        } else {
            MIN_ACTIVATION
        }
    }

    /// `(slot, activation)` for all eight slots, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, f64)> + '_ {
        Slot::ALL.into_iter().map(|s| (s, self.get(s)))
    }

    pub fn max_count(&self) -> u32 {
        self.bits.count_ones()
    }
}

impl fmt::Debug for ActivationVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (slot, value) in self.iter() {
            map.entry(&slot.name(), &value);
        }
        map.finish()
    }
}
