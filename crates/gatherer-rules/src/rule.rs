use gatherer_core::{ActivationVector, CreatureAction, Slot};

/// Weight of a rule committed without an explicit weight.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Condition-action rule. Immutable once built.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub action: CreatureAction,
    predicate: fn(&ActivationVector) -> bool,
    pub weight: f64,
    /// Whether the predicate may fire on a majority rather than a full match. Every standard rule
    /// tests a single slot, so this only records how the rule was committed.
    pub partial_match: bool,
}

impl Rule {
    pub fn new(
        id: &'static str,
        action: CreatureAction,
        predicate: fn(&ActivationVector) -> bool,
    ) -> Self {
        Self {
            id,
            action,
            predicate,
            weight: DEFAULT_WEIGHT,
            partial_match: false,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_partial_match(mut self, on: bool) -> Self {
        self.partial_match = on;
        self
    }

    pub fn matches(&self, input: &ActivationVector) -> bool {
        (self.predicate)(input)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleBankError {
    #[error("rule {id} has weight {weight} outside [0, 1]")]
    WeightOutOfRange { id: &'static str, weight: f64 },

    #[error("no rule produces action {0}")]
    MissingAction(CreatureAction),

    #[error("rule {0} produces DO_NOTHING, which is reserved for the no-candidate case")]
    ReservedAction(&'static str),
}

/// The committed rule set.
#[derive(Debug, Clone)]
pub struct RuleBank {
    rules: Vec<Rule>,
}

impl RuleBank {
    /// Validates and freezes a rule set.
    ///
    /// Every action except `DoNothing` must be produced by at least one rule, so that the bank
    /// and the dispatcher stay exhaustive over [`CreatureAction`].
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleBankError> {
        for rule in &rules {
            if !(0.0..=1.0).contains(&rule.weight) {
                return Err(RuleBankError::WeightOutOfRange {
                    id: rule.id,
                    weight: rule.weight,
                });
            }
            if rule.action == CreatureAction::DoNothing {
                return Err(RuleBankError::ReservedAction(rule.id));
            }
        }

        for action in CreatureAction::ALL {
            if action == CreatureAction::DoNothing {
                continue;
            }
            if !rules.iter().any(|r| r.action == action) {
                return Err(RuleBankError::MissingAction(action));
            }
        }

        Ok(Self { rules })
    }

    /// The nine fixed rules of the gatherer agent.
    pub fn standard() -> Self {
        let rules = vec![
            Rule::new("avoid_wall", CreatureAction::RotateClockwise, |v| {
                v.is_max(Slot::WallAhead)
            }),
            Rule::new("go_ahead", CreatureAction::GoAhead, |v| {
                v.is_min(Slot::WallAhead)
            }),
            Rule::new("go_jewel", CreatureAction::GoToJewel, |v| {
                v.is_max(Slot::JewelExists)
            })
            .with_weight(0.7)
            .with_partial_match(true),
            Rule::new("go_food", CreatureAction::GoToFood, |v| {
                v.is_max(Slot::FoodExists)
            })
            .with_weight(0.5)
            .with_partial_match(true),
            Rule::new("go_deliver", CreatureAction::GoToDeliverySpot, |v| {
                v.is_max(Slot::DeliverySpotExists)
            })
            .with_weight(0.9)
            .with_partial_match(true),
            Rule::new("get_jewel", CreatureAction::PickUpJewel, |v| {
                v.is_max(Slot::JewelAhead)
            })
            .with_weight(0.8)
            .with_partial_match(true),
            Rule::new("eat_food", CreatureAction::EatFood, |v| {
                v.is_max(Slot::FoodAhead)
            })
            .with_weight(0.6)
            .with_partial_match(true),
            Rule::new("deliver_leaflet", CreatureAction::DeliverLeaflet, |v| {
                v.is_max(Slot::DeliverySpotAhead)
            })
            .with_weight(0.9)
            .with_partial_match(true),
            Rule::new("stop", CreatureAction::Stop, |v| v.is_max(Slot::Stop))
                .with_weight(1.0)
                .with_partial_match(true),
        ];

        match Self::new(rules) {
            Ok(bank) => bank,
            Err(e) => unreachable!("standard rule bank is invalid: {e}"),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
