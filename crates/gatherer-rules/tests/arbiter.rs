use std::collections::BTreeMap;

use gatherer_core::{ActivationVector, CreatureAction, CycleContext, Slot, SplitMix64};
use gatherer_rules::{Arbiter, Rule, RuleBank, RuleBankError};

fn arbiter() -> Arbiter {
    Arbiter::new(RuleBank::standard())
}

#[test]
fn standard_bank_has_nine_rules_with_documented_weights() {
    let bank = RuleBank::standard();
    assert_eq!(bank.len(), 9);

    let weights: BTreeMap<CreatureAction, f64> =
        bank.rules().iter().map(|r| (r.action, r.weight)).collect();
    assert_eq!(weights[&CreatureAction::RotateClockwise], 1.0);
    assert_eq!(weights[&CreatureAction::GoAhead], 1.0);
    assert_eq!(weights[&CreatureAction::GoToJewel], 0.7);
    assert_eq!(weights[&CreatureAction::GoToFood], 0.5);
    assert_eq!(weights[&CreatureAction::GoToDeliverySpot], 0.9);
    assert_eq!(weights[&CreatureAction::PickUpJewel], 0.8);
    assert_eq!(weights[&CreatureAction::EatFood], 0.6);
    assert_eq!(weights[&CreatureAction::DeliverLeaflet], 0.9);
    assert_eq!(weights[&CreatureAction::Stop], 1.0);
}

#[test]
fn wall_ahead_alone_rotates() {
    let mut arb = arbiter();
    let mut rng = SplitMix64::new(7);
    let v = ActivationVector::only(Slot::WallAhead);
    assert_eq!(arb.select(&v, &mut rng), CreatureAction::RotateClockwise);
    assert_eq!(arb.last_candidates(), &[CreatureAction::RotateClockwise]);
}

#[test]
fn single_candidate_is_deterministic_across_seeds() {
    let single = ActivationVector::only(Slot::WallAhead);
    let mut arb = arbiter();
    for seed in 0..32 {
        let mut rng = SplitMix64::new(seed);
        assert_eq!(arb.select(&single, &mut rng), CreatureAction::RotateClockwise);
    }

    // WallAhead=MAX rules out GoAhead, so a wall plus a delivery spot ahead is a two-way draw.
    let pair = ActivationVector::only(Slot::DeliverySpotAhead).with(Slot::WallAhead, true);
    assert_eq!(arb.candidates(&pair).count(), 2);
}

#[test]
fn zero_candidates_yield_do_nothing() {
    let empty = RuleBank::new(
        RuleBank::standard()
            .rules()
            .iter()
            .map(|r| {
                if r.action == CreatureAction::GoAhead {
                    // Never fires.
                    Rule::new("go_ahead_never", CreatureAction::GoAhead, |_| false)
                } else {
                    *r
                }
            })
            .collect(),
    )
    .expect("valid bank");

    let mut arb = Arbiter::new(empty);
    let mut rng = SplitMix64::new(1);
    let v = ActivationVector::all_min();
    assert_eq!(arb.select(&v, &mut rng), CreatureAction::DoNothing);
    assert_eq!(arb.select(&v, &mut rng), CreatureAction::DoNothing);
    assert!(arb.last_candidates().is_empty());
}

#[test]
fn weighted_draw_never_leaves_candidate_support() {
    let v = ActivationVector::all_min()
        .with(Slot::JewelExists, true)
        .with(Slot::FoodExists, true)
        .with(Slot::JewelAhead, true);
    let allowed = [
        CreatureAction::GoAhead,
        CreatureAction::GoToJewel,
        CreatureAction::GoToFood,
        CreatureAction::PickUpJewel,
    ];

    let mut arb = arbiter();
    for cycle in 0..500 {
        let mut rng = CycleContext::new(cycle, 42).rng_for_agent("Creature_1");
        let chosen = arb.select(&v, &mut rng);
        assert!(allowed.contains(&chosen), "cycle {cycle}: {chosen}");
    }
}

#[test]
fn weighted_draw_tracks_weights() {
    // GoAhead (1.0) vs GoToFood (0.5): expect roughly 2:1.
    let v = ActivationVector::only(Slot::FoodExists);
    let mut arb = arbiter();
    let mut counts: BTreeMap<CreatureAction, u32> = BTreeMap::new();
    let mut rng = SplitMix64::new(0xDEC0DE);
    for _ in 0..6000 {
        *counts.entry(arb.select(&v, &mut rng)).or_default() += 1;
    }

    let ahead = counts[&CreatureAction::GoAhead] as f64;
    let food = counts[&CreatureAction::GoToFood] as f64;
    let ratio = ahead / food;
    assert!((1.7..2.3).contains(&ratio), "ratio={ratio} counts={counts:?}");
}

#[test]
fn same_seed_replays_same_choices() {
    let v = ActivationVector::all_min()
        .with(Slot::JewelExists, true)
        .with(Slot::DeliverySpotExists, true);

    let run = || {
        let mut arb = arbiter();
        (0..50)
            .map(|cycle| {
                let mut rng = CycleContext::new(cycle, 9).rng_for_agent("Creature_1");
                arb.select(&v, &mut rng)
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[test]
fn bank_rejects_out_of_range_weight_and_missing_actions() {
    let mut rules: Vec<Rule> = RuleBank::standard().rules().to_vec();
    rules[2] = rules[2].with_weight(1.5);
    assert!(matches!(
        RuleBank::new(rules),
        Err(RuleBankError::WeightOutOfRange { .. })
    ));

    let rules: Vec<Rule> = RuleBank::standard()
        .rules()
        .iter()
        .copied()
        .filter(|r| r.action != CreatureAction::Stop)
        .collect();
    assert_eq!(
        RuleBank::new(rules).unwrap_err(),
        RuleBankError::MissingAction(CreatureAction::Stop)
    );
}
