use gatherer_core::{ActivationVector, CreatureAction, DeterministicRng};

use crate::{Rule, RuleBank};

/// Picks exactly one action per cycle from a [`RuleBank`].
///
/// Each call:
/// - Evaluates every rule against the input vector; matching rules are candidates.
/// - No candidate yields `DoNothing`; a single candidate wins outright.
/// - Several candidates are resolved by drawing uniformly in `[0, total_weight)` and taking the
///   first candidate whose cumulative weight interval contains the draw.
#[derive(Debug, Clone)]
pub struct Arbiter {
    bank: RuleBank,
    last_candidates: Vec<CreatureAction>,
    last_choice: Option<CreatureAction>,
}

impl Arbiter {
    pub fn new(bank: RuleBank) -> Self {
        Self {
            bank,
            last_candidates: Vec::new(),
            last_choice: None,
        }
    }

    pub fn bank(&self) -> &RuleBank {
        &self.bank
    }

    /// Candidate actions of the most recent `select` call, in rule order.
    pub fn last_candidates(&self) -> &[CreatureAction] {
        &self.last_candidates
    }

    pub fn last_choice(&self) -> Option<CreatureAction> {
        self.last_choice
    }

    pub fn candidates<'a>(&'a self, input: &'a ActivationVector) -> impl Iterator<Item = &'a Rule> {
        self.bank.rules().iter().filter(move |r| r.matches(input))
    }

    pub fn select<R: DeterministicRng>(
        &mut self,
        input: &ActivationVector,
        rng: &mut R,
    ) -> CreatureAction {
        let candidates: Vec<&Rule> = self
            .bank
            .rules()
            .iter()
            .filter(|r| r.matches(input))
            .collect();
        let chosen = weighted_pick(&candidates, rng);

        tracing::debug!(
            candidates = candidates.len(),
            action = %chosen,
            "arbitration"
        );

        self.last_candidates = candidates.iter().map(|r| r.action).collect();
        self.last_choice = Some(chosen);
        chosen
    }
}

fn weighted_pick<R: DeterministicRng>(candidates: &[&Rule], rng: &mut R) -> CreatureAction {
    match candidates {
        [] => CreatureAction::DoNothing,
        [only] => only.action,
        [first, ..] => {
            let total: f64 = candidates.iter().map(|r| r.weight).sum();
            // All-zero weights leave nothing to draw from; fall back to rule order.
            if total <= 0.0 {
                return first.action;
            }

            let draw = rng.next_f64_below(total);
            let mut upper = 0.0;
            for rule in candidates {
                upper += rule.weight;
                if draw < upper {
                    return rule.action;
                }
            }

            // Rounding can leave the draw just past the last bound.
            candidates
                .iter()
                .rev()
                .find(|r| r.weight > 0.0)
                .map_or(first.action, |r| r.action)
        }
    }
}
