use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Every external action the creature can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CreatureAction {
    DoNothing,
    RotateClockwise,
    GoAhead,
    GoToJewel,
    GoToFood,
    GoToDeliverySpot,
    PickUpJewel,
    EatFood,
    DeliverLeaflet,
    Stop,
}

impl CreatureAction {
    pub const ALL: [CreatureAction; 10] = [
        CreatureAction::DoNothing,
        CreatureAction::RotateClockwise,
        CreatureAction::GoAhead,
        CreatureAction::GoToJewel,
        CreatureAction::GoToFood,
        CreatureAction::GoToDeliverySpot,
        CreatureAction::PickUpJewel,
        CreatureAction::EatFood,
        CreatureAction::DeliverLeaflet,
        CreatureAction::Stop,
    ];

    /// Label used by the cognitive runtime for the matching action chunk.
    pub fn label(self) -> &'static str {
        match self {
            CreatureAction::DoNothing => "DO_NOTHING",
            CreatureAction::RotateClockwise => "ROTATE_CLOCKWISE",
            CreatureAction::GoAhead => "GO_AHEAD",
            CreatureAction::GoToJewel => "GO_JEWEL",
            CreatureAction::GoToFood => "GO_FOOD",
            CreatureAction::GoToDeliverySpot => "GO_DELIVER",
            CreatureAction::PickUpJewel => "GET_JEWEL",
            CreatureAction::EatFood => "EAT_FOOD",
            CreatureAction::DeliverLeaflet => "DELIVER_LEAFLET",
            CreatureAction::Stop => "STOP",
        }
    }
}

impl fmt::Display for CreatureAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown creature action label: {0:?}")]
pub struct ParseActionError(pub String);

impl FromStr for CreatureAction {
    type Err = ParseActionError;

    /// Case-insensitive, like the runtime's enum parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CreatureAction::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}
