use gatherer_core::{ActivationVector, Slot, MAX_ACTIVATION, MIN_ACTIVATION};

#[test]
fn every_slot_holds_one_of_the_two_constants() {
    let vectors = [
        ActivationVector::all_min(),
        ActivationVector::only(Slot::WallAhead),
        ActivationVector::all_min()
            .with(Slot::JewelExists, true)
            .with(Slot::FoodAhead, true),
    ];

    for v in vectors {
        let slots: Vec<_> = v.iter().collect();
        assert_eq!(slots.len(), 8);
        for (slot, value) in slots {
            assert!(
                value == MAX_ACTIVATION || value == MIN_ACTIVATION,
                "{slot:?} = {value}"
            );
        }
    }
}

#[test]
fn only_sets_a_single_slot() {
    let v = ActivationVector::only(Slot::DeliverySpotAhead);
    assert_eq!(v.max_count(), 1);
    for slot in Slot::ALL {
        assert_eq!(v.is_max(slot), slot == Slot::DeliverySpotAhead);
    }
}

#[test]
fn set_and_clear_roundtrip() {
    let mut v = ActivationVector::all_min();
    v.set(Slot::Stop, true);
    assert_eq!(v.get(Slot::Stop), MAX_ACTIVATION);
    v.set(Slot::Stop, false);
    assert_eq!(v, ActivationVector::all_min());
}
