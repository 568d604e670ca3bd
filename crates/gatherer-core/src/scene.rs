//! Scene snapshot types as reported by the world simulator.

use core::fmt;
use core::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of leaflets handed to the creature for the whole task.
pub const LEAFLET_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JewelColor {
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    White,
}

impl JewelColor {
    pub const ALL: [JewelColor; 6] = [
        JewelColor::Red,
        JewelColor::Green,
        JewelColor::Blue,
        JewelColor::Yellow,
        JewelColor::Magenta,
        JewelColor::White,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            JewelColor::Red => "Red",
            JewelColor::Green => "Green",
            JewelColor::Blue => "Blue",
            JewelColor::Yellow => "Yellow",
            JewelColor::Magenta => "Magenta",
            JewelColor::White => "White",
        }
    }
}

impl fmt::Display for JewelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One count per jewel color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorCounts([u32; 6]);

impl ColorCounts {
    pub const ZERO: ColorCounts = ColorCounts([0; 6]);

    pub fn from_pairs(pairs: impl IntoIterator<Item = (JewelColor, u32)>) -> Self {
        let mut counts = Self::ZERO;
        for (color, n) in pairs {
            counts[color] += n;
        }
        counts
    }

    pub fn get(&self, color: JewelColor) -> u32 {
        self.0[color.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn add(&mut self, other: &ColorCounts) {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a += b;
        }
    }

    /// True when every color in `self` is at least the count in `required`.
    pub fn covers(&self, required: &ColorCounts) -> bool {
        self.0.iter().zip(required.0).all(|(have, need)| *have >= need)
    }

    /// Signed `self - other` per color.
    pub fn deficit(&self, other: &ColorCounts) -> [i64; 6] {
        let mut out = [0i64; 6];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = i64::from(self.0[i]) - i64::from(other.0[i]);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (JewelColor, u32)> + '_ {
        JewelColor::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

impl Index<JewelColor> for ColorCounts {
    type Output = u32;

    fn index(&self, color: JewelColor) -> &u32 {
        &self.0[color.index()]
    }
}

impl IndexMut<JewelColor> for ColorCounts {
    fn index_mut(&mut self, color: JewelColor) -> &mut u32 {
        &mut self.0[color.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Category {
    /// Brick obstacle.
    Wall,
    Jewel(JewelColor),
    /// `perishable` distinguishes apples from nuts; both are food for the agent.
    Food { perishable: bool },
    DeliverySpot,
    Creature,
}

impl Category {
    pub fn is_wall(self) -> bool {
        matches!(self, Category::Wall)
    }

    pub fn is_jewel(self) -> bool {
        matches!(self, Category::Jewel(_))
    }

    pub fn is_food(self) -> bool {
        matches!(self, Category::Food { .. })
    }

    pub fn is_delivery_spot(self) -> bool {
        matches!(self, Category::DeliverySpot)
    }

    pub fn jewel_color(self) -> Option<JewelColor> {
        match self {
            Category::Jewel(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldObject {
    pub name: String,
    pub category: Category,
    pub x: f64,
    pub y: f64,
    /// Distance to the observing creature, as reported by the simulator.
    pub distance: f64,
}

impl WorldObject {
    pub fn new(name: impl Into<String>, category: Category, x: f64, y: f64, distance: f64) -> Self {
        Self {
            name: name.into(),
            category,
            x,
            y,
            distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Leaflet {
    pub id: String,
    pub required: ColorCounts,
    /// Set by the simulator on the leaflet currently being pursued.
    pub active: bool,
}

impl Leaflet {
    pub fn new(id: impl Into<String>, required: ColorCounts, active: bool) -> Self {
        Self {
            id: id.into(),
            required,
            active,
        }
    }
}

/// Held jewel counts ("sack").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Inventory {
    pub jewels: ColorCounts,
    pub food: u32,
}

impl Inventory {
    pub fn can_satisfy(&self, leaflet: &Leaflet) -> bool {
        self.jewels.covers(&leaflet.required)
    }
}

/// Creature snapshot for one cycle, including what it can see.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CreatureState {
    pub id: String,
    pub name: String,
    /// Pitch in degrees, as the simulator reports it.
    pub pitch_degrees: f64,
    pub fuel: f64,
    pub x: f64,
    pub y: f64,
    pub leaflets: Vec<Leaflet>,
    /// Everything in view. Contains the creature itself as a `Category::Creature` record.
    pub scene: Vec<WorldObject>,
}
